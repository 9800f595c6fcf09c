//! tronabi CLI: encode and decode contract calls, results and event logs.
//!
//! # Commands
//! ```text
//! tronabi selector      --signature "transfer(address,uint)"
//! tronabi encode        --types "address,uint256" --values '["T...", "1000000"]'
//! tronabi decode        --types "address,uint256" --data <hex>
//! tronabi encode-call   --abi <path.json> --function <name> --args <json>
//! tronabi decode-call   --abi <path.json> --calldata <hex>
//! tronabi decode-output --abi <path.json> --function <name> --data <hex>
//! tronabi decode-log    --abi <path.json> --address <hex> --topics <hex...> --data <hex>
//! tronabi info
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tronabi_abi::{
    function_selector, event_selector, signature, AbiValue, ArgumentDecoder, ArgumentEncoder,
    Interface, Param, ParamType, RawLog,
};
use tronabi_observability::init_tracing;

mod config;

use config::{AddressFormat, CodecConfig};

#[derive(Parser)]
#[command(
    name = "tronabi",
    about = "Contract ABI encoder/decoder for TRON and EVM chains",
    long_about = "
tronabi: encode call data, decode call data, return values and event logs.

Addresses are read as TRON Base58Check (T...), 41-prefixed hex or raw 20-byte
hex, and printed according to --address-format.

ENVIRONMENT VARIABLES:
  RUST_LOG    log filter, overrides --log-level and the config file
",
    version
)]
struct Cli {
    /// JSON config file ({\"address_format\": \"tron\", \"log\": {...}})
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Address representation for arguments and output
    #[arg(long, global = true, value_enum)]
    address_format: Option<AddressFormat>,

    /// Global log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the method selector and event topic of a signature
    Selector {
        /// e.g. "transfer(address,uint256)"; types are canonicalized first
        #[arg(long)]
        signature: String,
    },

    /// ABI-encode values
    Encode {
        /// Comma-separated type list, e.g. "uint256,(address,bytes)[]"
        #[arg(long)]
        types: String,
        /// JSON array of values, one per type
        #[arg(long)]
        values: String,
    },

    /// ABI-decode data
    Decode {
        /// Comma-separated type list
        #[arg(long)]
        types: String,
        /// Encoded data (hex)
        #[arg(long)]
        data: String,
    },

    /// Encode a function call (selector + arguments)
    #[command(name = "encode-call")]
    EncodeCall {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: PathBuf,
        /// Function name
        #[arg(long)]
        function: String,
        /// JSON array of arguments, e.g. '["TR7NHq...", "1000000"]'
        #[arg(long, default_value = "[]")]
        args: String,
    },

    /// Decode call data using an ABI JSON file
    #[command(name = "decode-call")]
    DecodeCall {
        #[arg(long)]
        abi: PathBuf,
        /// Call data (hex)
        #[arg(long)]
        calldata: String,
    },

    /// Decode a function's return data
    #[command(name = "decode-output")]
    DecodeOutput {
        #[arg(long)]
        abi: PathBuf,
        #[arg(long)]
        function: String,
        /// Return data (hex)
        #[arg(long)]
        data: String,
    },

    /// Decode an event log
    #[command(name = "decode-log")]
    DecodeLog {
        #[arg(long)]
        abi: PathBuf,
        /// Emitting contract address (hex)
        #[arg(long, default_value = "0x0000000000000000000000000000000000000000")]
        address: String,
        /// topics[0] = event selector, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex)
        #[arg(long, default_value = "0x")]
        data: String,
    },

    /// Show build and capability info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CodecConfig::load(cli.config.as_deref())?;
    if let Some(format) = cli.address_format {
        config.address_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if cli.log_json {
        config.log.json = true;
    }
    init_tracing(&config.log);
    debug!(address_format = ?config.address_format, "configuration loaded");

    let ctx = Ctx {
        config,
        json: cli.json,
    };

    match cli.command {
        Commands::Selector { signature } => cmd_selector(&ctx, &signature),
        Commands::Encode { types, values } => cmd_encode(&ctx, &types, &values),
        Commands::Decode { types, data } => cmd_decode(&ctx, &types, &data),
        Commands::EncodeCall {
            abi,
            function,
            args,
        } => cmd_encode_call(&ctx, &abi, &function, &args),
        Commands::DecodeCall { abi, calldata } => cmd_decode_call(&ctx, &abi, &calldata),
        Commands::DecodeOutput {
            abi,
            function,
            data,
        } => cmd_decode_output(&ctx, &abi, &function, &data),
        Commands::DecodeLog {
            abi,
            address,
            topics,
            data,
        } => cmd_decode_log(&ctx, &abi, &address, &topics, &data),
        Commands::Info => cmd_info(),
    }
}

/// Resolved settings shared by every command.
struct Ctx {
    config: CodecConfig,
    json: bool,
}

impl Ctx {
    fn load_interface(&self, path: &Path) -> Result<Interface> {
        let abi_json = std::fs::read_to_string(path)
            .with_context(|| format!("read ABI file '{}'", path.display()))?;
        Interface::parse_with(&abi_json, self.config.address_format.translator())
            .with_context(|| format!("parse ABI file '{}'", path.display()))
    }

    /// Print `(name, type, value)` rows, as a JSON object or as text.
    fn print_values(
        &self,
        header: &[(&str, String)],
        rows: &[(String, String, &AbiValue)],
    ) -> Result<()> {
        if self.json {
            let mut object = serde_json::Map::new();
            for (key, value) in header {
                object.insert((*key).to_string(), serde_json::Value::String(value.clone()));
            }
            let values: Vec<serde_json::Value> = rows
                .iter()
                .map(|(name, ty, value)| {
                    serde_json::json!({
                        "name": name,
                        "type": ty,
                        "value": self.config.render(value),
                    })
                })
                .collect();
            object.insert("values".into(), serde_json::Value::Array(values));
            println!("{}", serde_json::to_string_pretty(&object)?);
        } else {
            for (key, value) in header {
                println!("{key}: {value}");
            }
            for (i, (name, ty, value)) in rows.iter().enumerate() {
                let label = if name.is_empty() { format!("[{i}]") } else { name.clone() };
                println!("  {label} ({ty}): {}", self.config.render(value));
            }
        }
        Ok(())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn decode_hex_arg(what: &str, s: &str) -> Result<Vec<u8>> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).with_context(|| format!("invalid {what} hex"))
}

/// Parse a comma-separated type list; tuples may contain commas.
fn parse_type_list(types: &str) -> Result<Vec<ParamType>> {
    match ParamType::parse(&format!("({types})"))
        .with_context(|| format!("invalid type list '{types}'"))?
    {
        ParamType::Tuple(list) => Ok(list),
        other => bail!("invalid type list '{types}': parsed as {other}"),
    }
}

/// Convert a JSON array of arguments into values for `types`.
fn parse_args(types: &[ParamType], json: &str) -> Result<Vec<AbiValue>> {
    let json: serde_json::Value = serde_json::from_str(json).context("parse args JSON")?;
    let items = json
        .as_array()
        .ok_or_else(|| anyhow!("arguments must be a JSON array"))?;
    if items.len() != types.len() {
        bail!("expected {} arguments, got {}", types.len(), items.len());
    }
    types
        .iter()
        .zip(items)
        .enumerate()
        .map(|(i, (ty, item))| {
            AbiValue::from_json(ty, item).with_context(|| format!("argument {i} ({ty})"))
        })
        .collect()
}

fn param_rows<'a>(params: &[Param], values: &'a [AbiValue]) -> Vec<(String, String, &'a AbiValue)> {
    params
        .iter()
        .zip(values)
        .map(|(p, v)| (p.name.clone(), p.ty.to_string(), v))
        .collect()
}

fn type_rows<'a>(
    types: &[ParamType],
    values: &'a [AbiValue],
) -> Vec<(String, String, &'a AbiValue)> {
    types
        .iter()
        .zip(values)
        .map(|(t, v)| (String::new(), t.to_string(), v))
        .collect()
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_selector(ctx: &Ctx, text: &str) -> Result<()> {
    let open = text
        .find('(')
        .ok_or_else(|| anyhow!("signature must look like name(type,...)"))?;
    let name = text[..open].trim();
    let types = match ParamType::parse(&text[open..]).context("invalid signature")? {
        ParamType::Tuple(types) => types,
        other => bail!("invalid signature parameter list: {other}"),
    };
    let canonical = signature(name, &types);
    let method = hex::encode(function_selector(&canonical));
    let topic = hex::encode(event_selector(&canonical));

    if ctx.json {
        let out = serde_json::json!({
            "signature": canonical,
            "selector": format!("0x{method}"),
            "topic": format!("0x{topic}"),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Signature: {canonical}");
        println!("Selector:  0x{method}");
        println!("Topic:     0x{topic}");
    }
    Ok(())
}

fn cmd_encode(ctx: &Ctx, types: &str, values: &str) -> Result<()> {
    let types = parse_type_list(types)?;
    let values = parse_args(&types, values)?;
    let encoder = ArgumentEncoder::with_translator(types, ctx.config.address_format.translator());
    let encoded = encoder.encode_all(&values)?;
    println!("0x{}", hex::encode(encoded));
    Ok(())
}

fn cmd_decode(ctx: &Ctx, types: &str, data: &str) -> Result<()> {
    let types = parse_type_list(types)?;
    let bytes = decode_hex_arg("data", data)?;
    let translator = ctx.config.address_format.translator();
    let decoder = ArgumentDecoder::with_translator(types.clone(), translator);
    let values = decoder.decode_all(&bytes)?;
    ctx.print_values(&[], &type_rows(&types, &values))
}

fn cmd_encode_call(ctx: &Ctx, abi: &Path, function: &str, args: &str) -> Result<()> {
    let iface = ctx.load_interface(abi)?;
    let method = iface.method(function)?;
    let types: Vec<ParamType> = method.inputs.iter().map(|p| p.ty.clone()).collect();
    let values = parse_args(&types, args)?;
    let calldata = method.encode_call(&values)?;
    println!("0x{}", hex::encode(calldata));
    Ok(())
}

fn cmd_decode_call(ctx: &Ctx, abi: &Path, calldata: &str) -> Result<()> {
    let iface = ctx.load_interface(abi)?;
    let bytes = decode_hex_arg("calldata", calldata)?;
    let (method, values) = iface.decode_call(&bytes)?;
    ctx.print_values(
        &[
            ("function", method.signature.clone()),
            ("selector", format!("0x{}", method.selector_hex())),
        ],
        &param_rows(&method.inputs, &values),
    )
}

fn cmd_decode_output(ctx: &Ctx, abi: &Path, function: &str, data: &str) -> Result<()> {
    let iface = ctx.load_interface(abi)?;
    let method = iface.method(function)?;
    let bytes = decode_hex_arg("data", data)?;
    let values = method.decode_outputs(&bytes)?;
    ctx.print_values(
        &[("function", method.signature.clone())],
        &param_rows(&method.outputs, &values),
    )
}

fn cmd_decode_log(
    ctx: &Ctx,
    abi: &Path,
    address: &str,
    topics: &[String],
    data: &str,
) -> Result<()> {
    let iface = ctx.load_interface(abi)?;
    let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
    let log = RawLog::from_hex(address, &topic_refs, data).context("invalid log")?;

    let Some(decoded) = iface.decode_log(&log)? else {
        bail!("log does not match any event in '{}'", abi.display());
    };
    let event = log
        .topics
        .first()
        .and_then(|t| iface.event_by_selector(t))
        .ok_or_else(|| anyhow!("event '{}' not found by selector", decoded.event))?;
    let rows: Vec<(String, String, &AbiValue)> = event
        .inputs
        .iter()
        .zip(&decoded.fields)
        .map(|(input, (name, value))| {
            let ty = if input.indexed {
                format!("{} indexed", input.ty)
            } else {
                input.ty.to_string()
            };
            (name.clone(), ty, value)
        })
        .collect();
    let address = match ctx.config.render(&decoded.address) {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    };
    ctx.print_values(
        &[("event", event.signature.clone()), ("address", address)],
        &rows,
    )
}

fn cmd_info() -> Result<()> {
    println!("tronabi v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Capabilities:");
    println!("  ✓ ABI encoding / decoding   (head/tail, nested tuples and arrays)");
    println!("  ✓ Function call data        (4-byte keccak selectors)");
    println!("  ✓ Event log decoding        (indexed topics + data)");
    println!("  ✓ JSON ABI parsing          (Solidity arrays, TRON `entrys` objects)");
    println!("  ✓ TRON addresses            (41-prefixed hex, Base58Check)");
    println!("  ✓ Parallel log scans        (Rayon)");
    println!();
    println!("Types: bool, uintN, intN, address, bytesN, bytes, string, tuples, T[N], T[]");
    Ok(())
}
