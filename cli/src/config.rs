//! CLI configuration: a JSON file passed with `--config`, overridden by flags.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tronabi_abi::tron::to_base58;
use tronabi_abi::{AbiValue, AddressTranslator, HexAddressTranslator, TronAddressTranslator};
use tronabi_observability::LogConfig;

/// How addresses are read from arguments and printed in results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AddressFormat {
    /// Raw 20-byte hex (`0x…`).
    Hex,
    /// TRON `41…` addresses, printed as Base58Check (`T…`).
    #[default]
    Tron,
}

impl AddressFormat {
    pub fn translator(self) -> Arc<dyn AddressTranslator> {
        match self {
            AddressFormat::Hex => Arc::new(HexAddressTranslator),
            AddressFormat::Tron => Arc::new(TronAddressTranslator),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub address_format: AddressFormat,
    #[serde(default)]
    pub log: LogConfig,
}

impl CodecConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parse config file '{}'", path.display()))
    }

    /// JSON rendering of a decoded value. TRON addresses become Base58Check.
    pub fn render(&self, value: &AbiValue) -> serde_json::Value {
        match value {
            AbiValue::Address(bytes) if self.address_format == AddressFormat::Tron => {
                match to_base58(bytes) {
                    Ok(text) => serde_json::Value::String(text),
                    Err(_) => value.to_json(),
                }
            }
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(|v| self.render(v)).collect())
            }
            other => other.to_json(),
        }
    }
}
