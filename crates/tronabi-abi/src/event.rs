//! Event log decoding.
//!
//! A log carries the emitting address, up to four 32-byte topics and a data
//! blob. For non-anonymous events topic 0 is the event selector and indexed
//! inputs start at topic 1; anonymous events use every topic for inputs.
//! Non-indexed inputs are ABI-decoded together from the data blob.
//!
//! Indexed inputs of reference types (strings, bytes, arrays, tuples) are
//! stored as their Keccak-256 hash, so they decode to the raw 32-byte topic
//! as `FixedBytes`.

use crate::decoder::{decode_value, ArgumentDecoder, DecodeContext};
use crate::fingerprint::{event_selector, signature};
use serde::Serialize;
use std::sync::Arc;
use tronabi_core::address::{raw_address, CHAIN_ADDRESS_LEN};
use tronabi_core::value::decode_hex;
use tronabi_core::word::{Word, WORD_SIZE};
use tronabi_core::{AbiError, AbiResult, AbiValue, AddressTranslator, ParamType};

/// A raw log as emitted by the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLog {
    /// 20 raw bytes, 21 bytes with a TRON prefix, or a 32-byte word.
    pub address: Vec<u8>,
    pub topics: Vec<Word>,
    pub data: Vec<u8>,
}

impl RawLog {
    pub fn new(address: Vec<u8>, topics: Vec<Word>, data: Vec<u8>) -> Self {
        Self {
            address,
            topics,
            data,
        }
    }

    /// Build from hex strings (`0x` optional), the form nodes return.
    pub fn from_hex(address: &str, topics: &[&str], data: &str) -> AbiResult<Self> {
        let topics = topics
            .iter()
            .map(|t| {
                let bytes = decode_hex(t)?;
                Word::try_from(bytes.as_slice()).map_err(|_| AbiError::BytesSizeMismatch {
                    expected: WORD_SIZE,
                    got: bytes.len(),
                })
            })
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(Self::new(decode_hex(address)?, topics, decode_hex(data)?))
    }
}

/// A decoded log: inputs in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedLog {
    pub event: String,
    pub address: AbiValue,
    pub fields: Vec<(String, AbiValue)>,
}

impl DecodedLog {
    pub fn field(&self, name: &str) -> Option<&AbiValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// One declared event input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub name: String,
    pub ty: ParamType,
    pub indexed: bool,
}

/// Decodes the pieces of a log for one event: the emitting address, single
/// topics and the data blob.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    topic_types: Vec<ParamType>,
    data: ArgumentDecoder,
    translator: Arc<dyn AddressTranslator>,
}

impl EventDecoder {
    pub fn new(inputs: &[EventInput], translator: Arc<dyn AddressTranslator>) -> Self {
        let (indexed, plain): (Vec<&EventInput>, Vec<&EventInput>) =
            inputs.iter().partition(|i| i.indexed);
        Self {
            topic_types: indexed.into_iter().map(|i| i.ty.clone()).collect(),
            data: ArgumentDecoder::with_translator(
                plain.into_iter().map(|i| i.ty.clone()).collect(),
                translator.clone(),
            ),
            translator,
        }
    }

    /// Translate the emitting contract address.
    pub fn decode_address(&self, address: &[u8]) -> AbiResult<AbiValue> {
        let raw = match address.len() {
            CHAIN_ADDRESS_LEN => raw_address(address)?,
            21 => raw_address(&address[1..])?,
            WORD_SIZE => raw_address(&address[WORD_SIZE - CHAIN_ADDRESS_LEN..])?,
            n => {
                return Err(AbiError::InvalidAddress {
                    reason: format!("log address has {n} bytes"),
                })
            }
        };
        self.translator.from_chain_address(&raw)
    }

    /// Decode the `index`-th indexed input from its topic.
    pub fn decode_topic(&self, index: usize, topic: &Word) -> AbiResult<AbiValue> {
        let ty = self
            .topic_types
            .get(index)
            .ok_or(AbiError::MissingTopic { index })?;
        if !ty.is_value_type() {
            return Ok(AbiValue::FixedBytes(topic.to_vec()));
        }
        decode_value(ty, &mut DecodeContext::new(topic), self.translator.as_ref())
    }

    /// Decode every indexed input from `topics` (selector already removed).
    pub fn decode_topics(&self, topics: &[Word]) -> AbiResult<Vec<AbiValue>> {
        (0..self.topic_types.len())
            .map(|i| {
                let topic = topics.get(i).ok_or(AbiError::MissingTopic { index: i })?;
                self.decode_topic(i, topic)
            })
            .collect()
    }

    /// Decode every non-indexed input from the data blob.
    pub fn decode_data(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        self.data.decode_all(data)
    }
}

/// A parsed event definition.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    /// Canonical `Name(t1,t2,...)`.
    pub signature: String,
    pub anonymous: bool,
    pub inputs: Vec<EventInput>,
    selector: Word,
    decoder: EventDecoder,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<EventInput>,
        anonymous: bool,
        translator: Arc<dyn AddressTranslator>,
    ) -> Self {
        let name = name.into();
        let types: Vec<ParamType> = inputs.iter().map(|i| i.ty.clone()).collect();
        let signature = signature(&name, &types);
        let selector = event_selector(&signature);
        let decoder = EventDecoder::new(&inputs, translator);
        Self {
            name,
            signature,
            anonymous,
            inputs,
            selector,
            decoder,
        }
    }

    /// Topic 0 of every log this event emits. Anonymous events do not emit
    /// it, so `None` is returned for them.
    pub fn selector(&self) -> Option<Word> {
        (!self.anonymous).then_some(self.selector)
    }

    pub fn decoder(&self) -> &EventDecoder {
        &self.decoder
    }

    /// Whether `log` carries this event's selector.
    pub fn matches(&self, log: &RawLog) -> bool {
        match self.selector() {
            Some(selector) => log.topics.first() == Some(&selector),
            None => false,
        }
    }

    /// Decode `log` against this event.
    pub fn decode(&self, log: &RawLog) -> AbiResult<DecodedLog> {
        let topics = if self.anonymous {
            &log.topics[..]
        } else {
            let first = log.topics.first().ok_or(AbiError::MissingTopic { index: 0 })?;
            if *first != self.selector {
                return Err(AbiError::SelectorMismatch {
                    expected: format!("0x{}", hex::encode(self.selector)),
                    got: format!("0x{}", hex::encode(first)),
                });
            }
            &log.topics[1..]
        };
        let topic_base = usize::from(!self.anonymous);

        let address = self.decoder.decode_address(&log.address)?;
        let mut data_values = self.decoder.decode_data(&log.data)?.into_iter();

        let mut fields = Vec::with_capacity(self.inputs.len());
        let mut topic_index = 0;
        for input in &self.inputs {
            let value = if input.indexed {
                let topic = topics.get(topic_index).ok_or(AbiError::MissingTopic {
                    index: topic_base + topic_index,
                })?;
                let value = self.decoder.decode_topic(topic_index, topic)?;
                topic_index += 1;
                value
            } else {
                data_values.next().ok_or(AbiError::ArgumentCount {
                    expected: self.inputs.len(),
                    got: fields.len(),
                })?
            };
            fields.push((input.name.clone(), value));
        }

        Ok(DecodedLog {
            event: self.name.clone(),
            address,
            fields,
        })
    }
}
