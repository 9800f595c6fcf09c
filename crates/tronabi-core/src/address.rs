//! Address translation hook.
//!
//! The ABI stores addresses as the 20 raw chain bytes right-aligned in a
//! word. Callers usually want a different representation (TRON `41…`
//! addresses, checksummed hex, ...), so encoders and decoders go through an
//! [`AddressTranslator`] at the address leaf.
//!
//! Translators are injected where interfaces and argument codecs are built.
//! A process-wide default also exists for callers that do not inject one:
//! it can be installed exactly once, before any encode/decode call relies on
//! it, and falls back to [`HexAddressTranslator`].

use crate::error::{AbiError, AbiResult};
use crate::value::{decode_hex, AbiValue};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Length of a raw chain address.
pub const CHAIN_ADDRESS_LEN: usize = 20;

/// Strategy converting between raw chain addresses and caller-facing values.
///
/// Implementations must be stateless or internally synchronized: one
/// translator is shared by every call made through an interface.
pub trait AddressTranslator: Send + Sync + fmt::Debug {
    /// Raw 20 chain bytes → caller-facing value.
    fn from_chain_address(&self, raw: &[u8; CHAIN_ADDRESS_LEN]) -> AbiResult<AbiValue>;

    /// Caller-facing value → raw 20 chain bytes.
    ///
    /// Unsupported value kinds fail with `ValueTypeNotSupported`.
    fn to_chain_address(&self, value: &AbiValue) -> AbiResult<[u8; CHAIN_ADDRESS_LEN]>;
}

/// Default strategy: addresses are raw bytes or hex strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexAddressTranslator;

impl AddressTranslator for HexAddressTranslator {
    fn from_chain_address(&self, raw: &[u8; CHAIN_ADDRESS_LEN]) -> AbiResult<AbiValue> {
        Ok(AbiValue::Address(raw.to_vec()))
    }

    fn to_chain_address(&self, value: &AbiValue) -> AbiResult<[u8; CHAIN_ADDRESS_LEN]> {
        match value {
            AbiValue::Address(b) | AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                raw_address(b)
            }
            AbiValue::String(s) => raw_address(&decode_hex(s)?),
            other => Err(AbiError::value_mismatch("address", other.kind())),
        }
    }
}

/// Check that `bytes` is exactly one raw chain address.
pub fn raw_address(bytes: &[u8]) -> AbiResult<[u8; CHAIN_ADDRESS_LEN]> {
    <[u8; CHAIN_ADDRESS_LEN]>::try_from(bytes).map_err(|_| AbiError::InvalidAddress {
        reason: format!(
            "expected {CHAIN_ADDRESS_LEN} bytes, got {}",
            bytes.len()
        ),
    })
}

static DEFAULT_TRANSLATOR: OnceLock<Arc<dyn AddressTranslator>> = OnceLock::new();

/// Install the process-wide default translator.
///
/// Succeeds once; later calls fail with `TranslatorAlreadyInstalled`, as does
/// a call made after the default was first read.
pub fn install_default_translator(translator: Arc<dyn AddressTranslator>) -> AbiResult<()> {
    DEFAULT_TRANSLATOR
        .set(translator)
        .map_err(|_| AbiError::TranslatorAlreadyInstalled)
}

/// The process-wide default translator ([`HexAddressTranslator`] unless
/// another one was installed first).
pub fn default_translator() -> Arc<dyn AddressTranslator> {
    DEFAULT_TRANSLATOR
        .get_or_init(|| Arc::new(HexAddressTranslator))
        .clone()
}
