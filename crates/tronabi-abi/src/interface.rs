//! JSON ABI interface parsing.
//!
//! Accepts the standard Solidity ABI array as well as the object TRON nodes
//! return from `getcontract` (`{"entrys": [...]}`). Record kinds and
//! `stateMutability` are matched case-insensitively; kinds other than
//! functions, events and the constructor are skipped.
//!
//! Building an interface is atomic: a single malformed record fails the whole
//! parse and nothing is returned.
//!
//! # Usage
//! ```ignore
//! let iface = Interface::parse(TRC20_ABI)?;
//! let calldata = iface.method("transfer")?.encode_call(&[to, amount])?;
//! let decoded = iface.decode_log(&log)?;
//! ```

use crate::decoder::ArgumentDecoder;
use crate::encoder::ArgumentEncoder;
use crate::event::{DecodedLog, Event, EventInput, RawLog};
use crate::fingerprint::{function_selector, signature};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use tronabi_core::address::default_translator;
use tronabi_core::word::Word;
use tronabi_core::{AbiError, AbiResult, AbiValue, AddressTranslator, ParamType};

// ─── JSON records ─────────────────────────────────────────────────────────────

/// Records of either document form: the plain array, or the TRON node object
/// with the records under `entrys` (alias `entries`).
fn document_records(json: &str) -> AbiResult<Vec<AbiRecord>> {
    let records = match serde_json::from_str::<Json>(json)? {
        Json::Object(mut document) => document
            .remove("entrys")
            .or_else(|| document.remove("entries"))
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field("entrys"))?,
        other => other,
    };
    Ok(serde_json::from_value(records)?)
}

#[derive(Debug, Deserialize)]
struct AbiRecord {
    #[serde(rename = "type", default = "default_record_kind")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    #[serde(default, rename = "stateMutability")]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

fn default_record_kind() -> String {
    "function".into()
}

#[derive(Debug, Deserialize)]
struct AbiParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<AbiParam>,
    #[serde(default)]
    indexed: bool,
}

impl AbiParam {
    /// Type string with `tuple` expanded from `components`, keeping any
    /// array suffix: `tuple[]` with `(uint256,bool)` → `(uint256,bool)[]`.
    fn type_string(&self) -> String {
        match self.ty.strip_prefix("tuple") {
            Some(suffix) if !suffix.starts_with('(') => {
                let inner: Vec<String> =
                    self.components.iter().map(AbiParam::type_string).collect();
                format!("({}){}", inner.join(","), suffix)
            }
            _ => self.ty.clone(),
        }
    }

    fn param_type(&self) -> AbiResult<ParamType> {
        ParamType::parse(&self.type_string())
    }
}

fn parse_params(params: &[AbiParam]) -> AbiResult<Vec<Param>> {
    params
        .iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone(),
                ty: p.param_type()?,
            })
        })
        .collect()
}

fn types_of(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.ty.clone()).collect()
}

// ─── Methods ──────────────────────────────────────────────────────────────────

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
}

/// A contract function.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    /// Canonical `name(t1,t2,...)`.
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: Option<String>,
    /// `pure`/`view` (or the legacy `constant` flag).
    pub constant: bool,
    input_encoder: ArgumentEncoder,
    input_decoder: ArgumentDecoder,
    output_decoder: ArgumentDecoder,
}

impl Method {
    fn from_record(
        record: &AbiRecord,
        translator: &Arc<dyn AddressTranslator>,
    ) -> AbiResult<Self> {
        let inputs = parse_params(&record.inputs)?;
        let outputs = parse_params(&record.outputs)?;
        let input_types = types_of(&inputs);
        let signature = signature(&record.name, &input_types);
        let selector = function_selector(&signature);

        let state_mutability = record.state_mutability.as_ref().map(|s| s.to_ascii_lowercase());
        let constant = record.constant.unwrap_or(false)
            || matches!(state_mutability.as_deref(), Some("pure" | "view"));

        Ok(Self {
            name: record.name.clone(),
            signature,
            selector,
            input_encoder: ArgumentEncoder::with_translator(
                input_types.clone(),
                translator.clone(),
            ),
            input_decoder: ArgumentDecoder::with_translator(input_types, translator.clone()),
            output_decoder: ArgumentDecoder::with_translator(
                types_of(&outputs),
                translator.clone(),
            ),
            inputs,
            outputs,
            state_mutability,
            constant,
        })
    }

    pub fn selector_hex(&self) -> String {
        hex::encode(self.selector)
    }

    /// ABI-encode the arguments (no selector).
    pub fn encode_inputs(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        self.input_encoder.encode_all(args)
    }

    /// Call data: selector followed by the encoded arguments.
    pub fn encode_call(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let encoded = self.encode_inputs(args)?;
        let mut out = Vec::with_capacity(4 + encoded.len());
        out.extend_from_slice(&self.selector);
        out.extend_from_slice(&encoded);
        Ok(out)
    }

    /// Decode call data produced by [`Method::encode_call`], checking the
    /// selector.
    pub fn decode_inputs(&self, calldata: &[u8]) -> AbiResult<Vec<AbiValue>> {
        let (selector, args) = split_selector(calldata)?;
        if selector != self.selector {
            return Err(AbiError::SelectorMismatch {
                expected: self.selector_hex(),
                got: hex::encode(selector),
            });
        }
        self.input_decoder.decode_all(args)
    }

    /// Decode a call's return data.
    pub fn decode_outputs(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        self.output_decoder.decode_all(data)
    }
}

fn split_selector(calldata: &[u8]) -> AbiResult<([u8; 4], &[u8])> {
    if calldata.len() < 4 {
        return Err(AbiError::TruncatedInput {
            needed: 4,
            available: calldata.len(),
        });
    }
    let (head, rest) = calldata.split_at(4);
    let mut selector = [0u8; 4];
    selector.copy_from_slice(head);
    Ok((selector, rest))
}

/// The contract constructor. Its arguments are appended to the deployment
/// bytecode without a selector.
#[derive(Debug, Clone)]
pub struct Constructor {
    pub inputs: Vec<Param>,
    encoder: ArgumentEncoder,
    decoder: ArgumentDecoder,
}

impl Constructor {
    fn from_record(record: &AbiRecord, translator: &Arc<dyn AddressTranslator>) -> AbiResult<Self> {
        let inputs = parse_params(&record.inputs)?;
        let types = types_of(&inputs);
        Ok(Self {
            encoder: ArgumentEncoder::with_translator(types.clone(), translator.clone()),
            decoder: ArgumentDecoder::with_translator(types, translator.clone()),
            inputs,
        })
    }

    pub fn encode_args(&self, args: &[AbiValue]) -> AbiResult<Vec<u8>> {
        self.encoder.encode_all(args)
    }

    pub fn decode_args(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        self.decoder.decode_all(data)
    }
}

fn event_from_record(
    record: &AbiRecord,
    translator: &Arc<dyn AddressTranslator>,
) -> AbiResult<Event> {
    let inputs = record
        .inputs
        .iter()
        .map(|p| {
            Ok(EventInput {
                name: p.name.clone(),
                ty: p.param_type()?,
                indexed: p.indexed,
            })
        })
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(Event::new(
        record.name.clone(),
        inputs,
        record.anonymous,
        translator.clone(),
    ))
}

// ─── Interface ────────────────────────────────────────────────────────────────

/// Parsed contract interface. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct Interface {
    methods: Vec<Method>,
    events: Vec<Event>,
    constructor: Option<Constructor>,
    methods_by_name: HashMap<String, usize>,
    methods_by_selector: HashMap<[u8; 4], usize>,
    events_by_name: HashMap<String, usize>,
    events_by_selector: HashMap<Word, usize>,
    translator: Arc<dyn AddressTranslator>,
}

impl Interface {
    /// Parse a JSON ABI using the process-wide default address translator.
    pub fn parse(json: &str) -> AbiResult<Self> {
        Self::parse_with(json, default_translator())
    }

    /// Parse a JSON ABI with an injected address translator.
    pub fn parse_with(json: &str, translator: Arc<dyn AddressTranslator>) -> AbiResult<Self> {
        let records = document_records(json)?;

        let mut methods = Vec::new();
        let mut events = Vec::new();
        let mut constructor = None;
        for record in &records {
            match record.kind.to_ascii_lowercase().as_str() {
                "function" => methods.push(Method::from_record(record, &translator)?),
                "event" => events.push(event_from_record(record, &translator)?),
                "constructor" => constructor = Some(Constructor::from_record(record, &translator)?),
                other => trace!(kind = other, name = %record.name, "skipping ABI record"),
            }
        }

        let mut methods_by_name = HashMap::new();
        let mut methods_by_selector = HashMap::new();
        for (i, m) in methods.iter().enumerate() {
            methods_by_name.entry(m.name.clone()).or_insert(i);
            methods_by_selector.entry(m.selector).or_insert(i);
        }
        let mut events_by_name = HashMap::new();
        let mut events_by_selector = HashMap::new();
        for (i, e) in events.iter().enumerate() {
            events_by_name.entry(e.name.clone()).or_insert(i);
            if let Some(selector) = e.selector() {
                events_by_selector.entry(selector).or_insert(i);
            }
        }

        debug!(
            methods = methods.len(),
            events = events.len(),
            constructor = constructor.is_some(),
            "parsed ABI interface"
        );

        Ok(Self {
            methods,
            events,
            constructor,
            methods_by_name,
            methods_by_selector,
            events_by_name,
            events_by_selector,
            translator,
        })
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    pub fn translator(&self) -> &Arc<dyn AddressTranslator> {
        &self.translator
    }

    /// Look up a method by name. Overloads resolve to the first declared.
    pub fn method(&self, name: &str) -> AbiResult<&Method> {
        self.methods_by_name
            .get(name)
            .map(|&i| &self.methods[i])
            .ok_or_else(|| AbiError::UnknownMethod { name: name.into() })
    }

    /// Every overload declared under `name`, in declaration order.
    pub fn overloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Method> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    pub fn method_by_selector(&self, selector: [u8; 4]) -> Option<&Method> {
        self.methods_by_selector.get(&selector).map(|&i| &self.methods[i])
    }

    pub fn event(&self, name: &str) -> AbiResult<&Event> {
        self.events_by_name
            .get(name)
            .map(|&i| &self.events[i])
            .ok_or_else(|| AbiError::UnknownEvent { name: name.into() })
    }

    pub fn event_by_selector(&self, selector: &Word) -> Option<&Event> {
        self.events_by_selector.get(selector).map(|&i| &self.events[i])
    }

    /// Find the method from the call data's selector and decode its arguments.
    pub fn decode_call(&self, calldata: &[u8]) -> AbiResult<(&Method, Vec<AbiValue>)> {
        let (selector, _) = split_selector(calldata)?;
        let method = self
            .method_by_selector(selector)
            .ok_or_else(|| AbiError::UnknownMethod {
                name: format!("0x{}", hex::encode(selector)),
            })?;
        Ok((method, method.decode_inputs(calldata)?))
    }

    /// Decode a log whose topic 0 matches a known event.
    ///
    /// Logs without topics or with an unknown selector are not an error:
    /// `Ok(None)` is returned so callers can filter foreign logs.
    pub fn decode_log(&self, log: &RawLog) -> AbiResult<Option<DecodedLog>> {
        let Some(event) = log.topics.first().and_then(|t| self.event_by_selector(t)) else {
            trace!(topics = log.topics.len(), "log matches no known event");
            return Ok(None);
        };
        event.decode(log).map(Some)
    }

    /// Decode every log that belongs to this interface, in order.
    ///
    /// Fails only when a log matches a known event but cannot be decoded.
    pub fn scan_logs(&self, logs: &[RawLog]) -> AbiResult<Vec<DecodedLog>> {
        let mut decoded = Vec::new();
        for log in logs {
            if let Some(d) = self.decode_log(log)? {
                decoded.push(d);
            }
        }
        debug!(total = logs.len(), matched = decoded.len(), "scanned logs");
        Ok(decoded)
    }

    /// [`Interface::scan_logs`] across the rayon thread pool. Output keeps
    /// input order.
    pub fn par_scan_logs(&self, logs: &[RawLog]) -> AbiResult<Vec<DecodedLog>> {
        let results: Vec<Option<DecodedLog>> = logs
            .par_iter()
            .map(|log| self.decode_log(log))
            .collect::<AbiResult<_>>()?;
        let decoded: Vec<DecodedLog> = results.into_iter().flatten().collect();
        debug!(total = logs.len(), matched = decoded.len(), "scanned logs in parallel");
        Ok(decoded)
    }
}
