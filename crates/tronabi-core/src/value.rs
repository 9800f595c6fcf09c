//! Typed values accepted by encoders and produced by decoders.
//!
//! `AbiValue` is the tagged union every encoder consumes. Native Rust
//! values convert into it through `From`; JSON values convert through
//! [`AbiValue::from_json`], which needs the target `ParamType` to pick an
//! interpretation and raises `ValueTypeNotSupported` when it cannot.

use crate::error::{AbiError, AbiResult};
use crate::types::ParamType;
use alloy_primitives::{Sign, I256, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;
use std::str::FromStr;

/// A single ABI value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Bool(bool),
    Uint(U256),
    Int(I256),
    /// Address in whatever representation the active address translator uses.
    /// The default translator yields the raw 20 chain bytes.
    Address(Vec<u8>),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// Fixed-size and dynamic arrays alike.
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// Short variant name, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    /// Build an array value from anything convertible.
    pub fn array<T: Into<AbiValue>>(items: impl IntoIterator<Item = T>) -> Self {
        AbiValue::Array(items.into_iter().map(Into::into).collect())
    }

    /// Build a tuple value from anything convertible.
    pub fn tuple<T: Into<AbiValue>>(items: impl IntoIterator<Item = T>) -> Self {
        AbiValue::Tuple(items.into_iter().map(Into::into).collect())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Byte payload of `Address`, `FixedBytes` and `Bytes` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Address(b) | AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Elements of an array or tuple.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Convert a JSON value into an `AbiValue` of the given type.
    ///
    /// - integers: JSON numbers, decimal strings, or `0x` hex strings
    /// - bytes / addresses: hex strings (`0x` optional)
    /// - addresses that are not hex (e.g. Base58 TRON addresses) are kept as
    ///   `String` and left to the address translator
    /// - arrays / tuples: JSON arrays
    pub fn from_json(ty: &ParamType, json: &Json) -> AbiResult<Self> {
        let mismatch = || AbiError::value_mismatch(ty.to_string(), json_kind(json));
        match ty {
            ParamType::Bool => json.as_bool().map(AbiValue::Bool).ok_or_else(mismatch),
            ParamType::Uint(_) => {
                let text = json_number_text(json).ok_or_else(mismatch)?;
                parse_uint(&text).map(AbiValue::Uint).ok_or_else(mismatch)
            }
            ParamType::Int(_) => {
                let text = json_number_text(json).ok_or_else(mismatch)?;
                parse_int(&text).map(AbiValue::Int).ok_or_else(mismatch)
            }
            ParamType::Address => {
                let s = json.as_str().ok_or_else(mismatch)?;
                match decode_hex(s) {
                    Ok(bytes) => Ok(AbiValue::Address(bytes)),
                    Err(_) => Ok(AbiValue::String(s.to_string())),
                }
            }
            ParamType::FixedBytes(_) => {
                let s = json.as_str().ok_or_else(mismatch)?;
                decode_hex(s).map(AbiValue::FixedBytes)
            }
            ParamType::Bytes => {
                let s = json.as_str().ok_or_else(mismatch)?;
                decode_hex(s).map(AbiValue::Bytes)
            }
            ParamType::String => json
                .as_str()
                .map(|s| AbiValue::String(s.to_string()))
                .ok_or_else(mismatch),
            ParamType::Array(inner) | ParamType::FixedArray(inner, _) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                items
                    .iter()
                    .map(|item| AbiValue::from_json(inner, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::Array)
            }
            ParamType::Tuple(types) => {
                let items = json.as_array().ok_or_else(mismatch)?;
                if items.len() != types.len() {
                    return Err(AbiError::LengthMismatch {
                        expected: types.len(),
                        got: items.len(),
                    });
                }
                types
                    .iter()
                    .zip(items)
                    .map(|(t, item)| AbiValue::from_json(t, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::Tuple)
            }
        }
    }

    /// Human-oriented JSON: integers as decimal strings, bytes as `0x` hex.
    pub fn to_json(&self) -> Json {
        match self {
            AbiValue::Bool(b) => Json::Bool(*b),
            AbiValue::Uint(u) => Json::String(u.to_string()),
            AbiValue::Int(i) => Json::String(i.to_string()),
            AbiValue::Address(b) | AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                Json::String(format!("0x{}", hex::encode(b)))
            }
            AbiValue::String(s) => Json::String(s.clone()),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                Json::Array(items.iter().map(AbiValue::to_json).collect())
            }
        }
    }
}

/// Decode an optionally `0x`-prefixed hex string.
pub fn decode_hex(s: &str) -> AbiResult<Vec<u8>> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Ok(hex::decode(digits)?)
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn json_number_text(json: &Json) -> Option<String> {
    match json {
        Json::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Json::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn parse_uint(text: &str) -> Option<U256> {
    if let Some(hex) = text.strip_prefix("0x") {
        return U256::from_str_radix(hex, 16).ok();
    }
    U256::from_str_radix(text, 10).ok()
}

fn parse_int(text: &str) -> Option<I256> {
    if let Some(hex) = text.strip_prefix("0x") {
        let magnitude = U256::from_str_radix(hex, 16).ok()?;
        return I256::try_from(magnitude).ok();
    }
    if let Some(hex) = text.strip_prefix("-0x") {
        let magnitude = U256::from_str_radix(hex, 16).ok()?;
        return I256::checked_from_sign_and_abs(Sign::Negative, magnitude);
    }
    I256::from_str(text).ok()
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(v: $t) -> Self {
                AbiValue::Uint(U256::from(v))
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for AbiValue {
            fn from(v: $t) -> Self {
                AbiValue::Int(I256::try_from(v as i128).unwrap_or_default())
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);
impl_from_signed!(i8, i16, i32, i64, i128, isize);

impl From<bool> for AbiValue {
    fn from(v: bool) -> Self {
        AbiValue::Bool(v)
    }
}

impl From<U256> for AbiValue {
    fn from(v: U256) -> Self {
        AbiValue::Uint(v)
    }
}

impl From<I256> for AbiValue {
    fn from(v: I256) -> Self {
        AbiValue::Int(v)
    }
}

impl From<&str> for AbiValue {
    fn from(v: &str) -> Self {
        AbiValue::String(v.to_string())
    }
}

impl From<String> for AbiValue {
    fn from(v: String) -> Self {
        AbiValue::String(v)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(v: Vec<u8>) -> Self {
        AbiValue::Bytes(v)
    }
}

impl From<&[u8]> for AbiValue {
    fn from(v: &[u8]) -> Self {
        AbiValue::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for AbiValue {
    fn from(v: [u8; N]) -> Self {
        AbiValue::FixedBytes(v.to_vec())
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Address(b) | AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => {
                write!(f, "0x{}", hex::encode(b))
            }
            AbiValue::String(s) => write!(f, "{s:?}"),
            AbiValue::Array(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(v) => {
                let parts: Vec<_> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ty(s: &str) -> ParamType {
        ParamType::parse(s).unwrap()
    }

    #[test]
    fn native_conversions() {
        assert_eq!(AbiValue::from(7u8), AbiValue::Uint(U256::from(7u8)));
        assert_eq!(AbiValue::from(-1i32), AbiValue::Int(I256::MINUS_ONE));
        assert_eq!(AbiValue::from("abc"), AbiValue::String("abc".into()));
        assert_eq!(AbiValue::from([1u8, 2]), AbiValue::FixedBytes(vec![1, 2]));
        assert_eq!(AbiValue::from(vec![1u8, 2]), AbiValue::Bytes(vec![1, 2]));
        assert_eq!(
            AbiValue::array([1u64, 2]),
            AbiValue::Array(vec![AbiValue::from(1u64), AbiValue::from(2u64)])
        );
    }

    #[test]
    fn json_integers() {
        let v = AbiValue::from_json(&ty("uint256"), &json!("1000000000000000000000")).unwrap();
        assert_eq!(v.to_string(), "1000000000000000000000");
        let v = AbiValue::from_json(&ty("uint8"), &json!(42)).unwrap();
        assert_eq!(v, AbiValue::from(42u64));
        let v = AbiValue::from_json(&ty("uint256"), &json!("0xff")).unwrap();
        assert_eq!(v, AbiValue::from(255u64));
        let v = AbiValue::from_json(&ty("int256"), &json!(-5)).unwrap();
        assert_eq!(v, AbiValue::from(-5i64));
        let v = AbiValue::from_json(&ty("int256"), &json!("-0x10")).unwrap();
        assert_eq!(v, AbiValue::from(-16i64));
    }

    #[test]
    fn json_int256_min_in_both_radixes() {
        let hex_min = format!("-0x8{}", "0".repeat(63));
        let v = AbiValue::from_json(&ty("int256"), &json!(hex_min)).unwrap();
        assert_eq!(v, AbiValue::Int(I256::MIN));
        let dec_min = I256::MIN.to_string();
        let v = AbiValue::from_json(&ty("int256"), &json!(dec_min)).unwrap();
        assert_eq!(v, AbiValue::Int(I256::MIN));

        let too_low = format!("-0x8{}1", "0".repeat(62));
        let err = AbiValue::from_json(&ty("int256"), &json!(too_low)).unwrap_err();
        assert!(matches!(err, AbiError::ValueTypeNotSupported { .. }));
    }

    #[test]
    fn json_composites() {
        let t = ty("(address,bytes,string[])");
        let v = AbiValue::from_json(&t, &json!(["0x0102", "0xdead", ["a", "b"]])).unwrap();
        assert_eq!(
            v,
            AbiValue::Tuple(vec![
                AbiValue::Address(vec![1, 2]),
                AbiValue::Bytes(vec![0xde, 0xad]),
                AbiValue::array(["a", "b"]),
            ])
        );
        assert_eq!(v.to_json(), json!(["0x0102", "0xdead", ["a", "b"]]));
    }

    #[test]
    fn json_mismatch_is_rejected() {
        let err = AbiValue::from_json(&ty("bool"), &json!("yes")).unwrap_err();
        assert!(matches!(err, AbiError::ValueTypeNotSupported { .. }));
        let err = AbiValue::from_json(&ty("(bool,bool)"), &json!([true])).unwrap_err();
        assert!(matches!(err, AbiError::LengthMismatch { expected: 2, got: 1 }));
        let err = AbiValue::from_json(&ty("bytes"), &json!("0xzz")).unwrap_err();
        assert!(matches!(err, AbiError::InvalidHex(_)));
    }

    #[test]
    fn non_hex_address_is_left_to_translator() {
        let v = AbiValue::from_json(&ty("address"), &json!("TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"))
            .unwrap();
        assert!(matches!(v, AbiValue::String(_)));
    }

    #[test]
    fn serde_round_trip() {
        let val = AbiValue::tuple([AbiValue::from(true), AbiValue::from(-3i64)]);
        let text = serde_json::to_string(&val).unwrap();
        let back: AbiValue = serde_json::from_str(&text).unwrap();
        assert_eq!(val, back);
    }
}
