//! TRON address translation.
//!
//! A TRON address is the 20-byte chain address prefixed with `0x41`
//! (21 bytes), usually shown in Base58Check (`T...`). The ABI itself only
//! carries the 20 raw bytes, so the prefix is added on decode and stripped
//! on encode.

use tronabi_core::address::{raw_address, CHAIN_ADDRESS_LEN};
use tronabi_core::value::decode_hex;
use tronabi_core::{AbiError, AbiResult, AbiValue, AddressTranslator};

/// Mainnet address prefix byte.
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// Prefix byte plus the raw chain address.
pub const TRON_ADDRESS_LEN: usize = CHAIN_ADDRESS_LEN + 1;

/// Decodes addresses to 21-byte `41…` values and encodes from 20/21-byte
/// values, hex strings or Base58Check strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TronAddressTranslator;

impl AddressTranslator for TronAddressTranslator {
    fn from_chain_address(&self, raw: &[u8; CHAIN_ADDRESS_LEN]) -> AbiResult<AbiValue> {
        Ok(AbiValue::Address(with_prefix(raw)))
    }

    fn to_chain_address(&self, value: &AbiValue) -> AbiResult<[u8; CHAIN_ADDRESS_LEN]> {
        match value {
            AbiValue::Address(b) | AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => strip_prefix(b),
            AbiValue::String(s) if s.starts_with('T') => strip_prefix(&from_base58(s)?),
            AbiValue::String(s) => strip_prefix(&decode_hex(s)?),
            other => Err(AbiError::value_mismatch("address", other.kind())),
        }
    }
}

fn with_prefix(raw: &[u8; CHAIN_ADDRESS_LEN]) -> Vec<u8> {
    let mut out = Vec::with_capacity(TRON_ADDRESS_LEN);
    out.push(TRON_ADDRESS_PREFIX);
    out.extend_from_slice(raw);
    out
}

/// Accept 21 bytes with the `0x41` prefix, or the bare 20 bytes.
fn strip_prefix(bytes: &[u8]) -> AbiResult<[u8; CHAIN_ADDRESS_LEN]> {
    match bytes {
        [TRON_ADDRESS_PREFIX, rest @ ..] if rest.len() == CHAIN_ADDRESS_LEN => raw_address(rest),
        _ if bytes.len() == TRON_ADDRESS_LEN => Err(AbiError::InvalidAddress {
            reason: format!("unexpected address prefix 0x{:02x}", bytes[0]),
        }),
        _ => raw_address(bytes),
    }
}

/// Base58Check text of a 21-byte TRON address (or a bare 20-byte one).
pub fn to_base58(address: &[u8]) -> AbiResult<String> {
    let full = match address.len() {
        CHAIN_ADDRESS_LEN => with_prefix(&raw_address(address)?),
        _ => with_prefix(&strip_prefix(address)?),
    };
    Ok(bs58::encode(full).with_check().into_string())
}

/// Decode a Base58Check TRON address into its 21 bytes.
pub fn from_base58(text: &str) -> AbiResult<Vec<u8>> {
    let bytes = bs58::decode(text)
        .with_check(None)
        .into_vec()
        .map_err(|e| AbiError::InvalidAddress {
            reason: format!("invalid base58check address '{text}': {e}"),
        })?;
    if bytes.len() != TRON_ADDRESS_LEN || bytes[0] != TRON_ADDRESS_PREFIX {
        return Err(AbiError::InvalidAddress {
            reason: format!("'{text}' is not a TRON address"),
        });
    }
    Ok(bytes)
}
