//! One-shot encoding and decoding from type strings.
//!
//! Convenience wrappers for callers without an interface: the type strings
//! are parsed on every call, so hot paths should hold an
//! [`ArgumentEncoder`] / [`ArgumentDecoder`] instead.

use crate::decoder::ArgumentDecoder;
use crate::encoder::ArgumentEncoder;
use std::sync::Arc;
use tronabi_core::{AbiResult, AbiValue, AddressTranslator, ParamType};

fn parse_types(types: &[&str]) -> AbiResult<Vec<ParamType>> {
    types.iter().map(|t| ParamType::parse(t)).collect()
}

/// Encode `values` as a tuple of `types` with the default address translator.
pub fn encode_values(types: &[&str], values: &[AbiValue]) -> AbiResult<Vec<u8>> {
    ArgumentEncoder::parse(types)?.encode_all(values)
}

/// Decode `data` as a tuple of `types` with the default address translator.
pub fn decode_values(types: &[&str], data: &[u8]) -> AbiResult<Vec<AbiValue>> {
    ArgumentDecoder::parse(types)?.decode_all(data)
}

pub fn encode_values_with(
    types: &[&str],
    values: &[AbiValue],
    translator: Arc<dyn AddressTranslator>,
) -> AbiResult<Vec<u8>> {
    ArgumentEncoder::with_translator(parse_types(types)?, translator).encode_all(values)
}

pub fn decode_values_with(
    types: &[&str],
    data: &[u8],
    translator: Arc<dyn AddressTranslator>,
) -> AbiResult<Vec<AbiValue>> {
    ArgumentDecoder::with_translator(parse_types(types)?, translator).decode_all(data)
}
