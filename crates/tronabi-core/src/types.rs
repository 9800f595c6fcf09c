//! ABI type grammar.
//!
//! `ParamType` is the recursive type tree every encoder and decoder walks.
//! It is built once from a type string such as `"(uint256,bytes)[]"` and
//! shared read-only afterwards.

use crate::error::{AbiError, AbiResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width used when `uint` / `int` are declared without a suffix.
pub const DEFAULT_INT_BITS: usize = 256;

/// A node of the ABI type tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// `bool`
    Bool,
    /// `uintN`. Width in bits as declared (bare `uint` is 256).
    Uint(usize),
    /// `intN`. Width in bits as declared (bare `int` is 256).
    Int(usize),
    /// `address`
    Address,
    /// `bytesN`. Length in bytes.
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `(T1,T2,...)`
    Tuple(Vec<ParamType>),
    /// `T[N]`
    FixedArray(Box<ParamType>, usize),
    /// `T[]`
    Array(Box<ParamType>),
}

impl ParamType {
    /// Parse a textual type descriptor into a type tree.
    ///
    /// Array suffixes are stripped from the whole string first, so
    /// `(uint256,bool)[]` is an array of tuples. `tuple(...)` is accepted as
    /// an alias of `(...)`.
    pub fn parse(s: &str) -> AbiResult<Self> {
        let t = s.trim();
        if t.is_empty() {
            return Err(AbiError::unsupported(s));
        }

        if let Some(head) = t.strip_suffix(']') {
            let open = head.rfind('[').ok_or_else(|| AbiError::unsupported(t))?;
            let inner = ParamType::parse(&head[..open])?;
            let size = &head[open + 1..];
            if size.is_empty() {
                return Ok(ParamType::Array(Box::new(inner)));
            }
            let len = parse_decimal(size).ok_or_else(|| AbiError::unsupported(t))?;
            return Ok(ParamType::FixedArray(Box::new(inner), len));
        }

        let tuple_body = t.strip_prefix("tuple").filter(|r| r.starts_with('(')).unwrap_or(t);
        if let Some(rest) = tuple_body.strip_prefix('(') {
            let body = rest.strip_suffix(')').ok_or_else(|| AbiError::malformed(t))?;
            let elems = split_tuple(body).ok_or_else(|| AbiError::malformed(t))?;
            let components = elems
                .into_iter()
                .map(ParamType::parse)
                .collect::<AbiResult<Vec<_>>>()?;
            return Ok(ParamType::Tuple(components));
        }

        parse_leaf(t)
    }

    /// Whether values of this type live in the tail region.
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Whether the type is an elementary value type.
    ///
    /// Only value types are stored verbatim when used as indexed event
    /// inputs; everything else is replaced by its Keccak-256 hash.
    pub fn is_value_type(&self) -> bool {
        match self {
            ParamType::Bool | ParamType::Uint(_) | ParamType::Int(_) | ParamType::Address => true,
            ParamType::FixedBytes(n) => *n <= 32,
            _ => false,
        }
    }

    /// Number of bytes a static value of this type occupies in the head.
    /// Dynamic types occupy a single offset word. `None` when the size does
    /// not fit in a `usize`.
    pub fn head_size(&self) -> Option<usize> {
        match self {
            ParamType::FixedBytes(n) => Some(padded_len(*n)),
            ParamType::FixedArray(inner, len) if !inner.is_dynamic() => {
                inner.head_size()?.checked_mul(*len)
            }
            ParamType::Tuple(types) if !self.is_dynamic() => types
                .iter()
                .try_fold(0usize, |acc, ty| acc.checked_add(ty.head_size()?)),
            _ => Some(32),
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamType::parse(s)
    }
}

/// Canonical form: bare `int`/`uint` are printed as `int256`/`uint256` and
/// tuples as `(a,b)`. This is the text hashed into selectors.
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Address => write!(f, "address"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, ty) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{ty}")?;
                }
                write!(f, ")")
            }
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
        }
    }
}

/// Round `len` up to the next multiple of 32.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(32) * 32
}

fn parse_leaf(t: &str) -> AbiResult<ParamType> {
    match t {
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "address" => return Ok(ParamType::Address),
        "bytes" => return Ok(ParamType::Bytes),
        _ => {}
    }

    if let Some(rest) = t.strip_prefix("uint") {
        return parse_width(rest).map(ParamType::Uint).ok_or_else(|| AbiError::unsupported(t));
    }
    if let Some(rest) = t.strip_prefix("int") {
        return parse_width(rest).map(ParamType::Int).ok_or_else(|| AbiError::unsupported(t));
    }
    if let Some(rest) = t.strip_prefix("bytes") {
        return parse_decimal(rest)
            .map(ParamType::FixedBytes)
            .ok_or_else(|| AbiError::unsupported(t));
    }

    Err(AbiError::unsupported(t))
}

/// Integer width suffix. Empty means the default width.
fn parse_width(suffix: &str) -> Option<usize> {
    if suffix.is_empty() {
        return Some(DEFAULT_INT_BITS);
    }
    parse_decimal(suffix)
}

/// Strictly positive decimal number without sign or whitespace.
fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<usize>().ok().filter(|n| *n > 0)
}

/// Split a tuple body at top-level commas.
///
/// Returns `None` when parentheses are unbalanced.
fn split_tuple(body: &str) -> Option<Vec<&str>> {
    if body.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut elems = Vec::new();
    let mut depth: isize = 0;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                elems.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    elems.push(&body[start..]);
    Some(elems)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ParamType {
        ParamType::parse(s).unwrap()
    }

    #[test]
    fn parses_leaf_types() {
        assert_eq!(p("bool"), ParamType::Bool);
        assert_eq!(p("address"), ParamType::Address);
        assert_eq!(p("string"), ParamType::String);
        assert_eq!(p("bytes"), ParamType::Bytes);
        assert_eq!(p("bytes32"), ParamType::FixedBytes(32));
        assert_eq!(p("uint"), ParamType::Uint(256));
        assert_eq!(p("uint8"), ParamType::Uint(8));
        assert_eq!(p("int"), ParamType::Int(256));
        assert_eq!(p("int24"), ParamType::Int(24));
    }

    #[test]
    fn array_suffix_wins_over_tuple() {
        assert_eq!(
            p("(uint256,bool)[]"),
            ParamType::Array(Box::new(ParamType::Tuple(vec![
                ParamType::Uint(256),
                ParamType::Bool
            ])))
        );
        assert_eq!(
            p("address[2][]"),
            ParamType::Array(Box::new(ParamType::FixedArray(
                Box::new(ParamType::Address),
                2
            )))
        );
    }

    #[test]
    fn nested_tuples_split_at_top_level_only() {
        let ty = p("(uint256,(bytes,bool[])[2],string)");
        match ty {
            ParamType::Tuple(ref parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[1].to_string(), "(bytes,bool[])[2]");
            }
            _ => panic!("expected tuple, got {ty:?}"),
        }
        assert_eq!(p("tuple(uint,int)"), p("(uint256,int256)"));
        assert_eq!(p("()"), ParamType::Tuple(vec![]));
    }

    #[test]
    fn unbalanced_tuple_is_malformed() {
        for bad in ["(uint256,bool", "((uint256)", "(a),(b)", "(uint256))"] {
            let err = ParamType::parse(bad).unwrap_err();
            assert!(
                matches!(err, AbiError::MalformedTuple { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn unknown_leaf_is_unsupported() {
        for bad in ["fixed128x18", "uintx", "bytes0", "uint256[0]", "foo[]", "", "function"] {
            let err = ParamType::parse(bad).unwrap_err();
            assert!(
                matches!(err, AbiError::UnsupportedType { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn is_dynamic_bottom_up() {
        assert!(!p("uint256").is_dynamic());
        assert!(!p("bytes32").is_dynamic());
        assert!(!p("(address,uint8)").is_dynamic());
        assert!(!p("uint256[3]").is_dynamic());
        assert!(p("bytes").is_dynamic());
        assert!(p("string").is_dynamic());
        assert!(p("uint256[]").is_dynamic());
        assert!(p("string[2]").is_dynamic());
        assert!(p("(uint256,(bool,bytes))").is_dynamic());
    }

    #[test]
    fn canonical_display_widens_bare_ints() {
        assert_eq!(p("uint").to_string(), "uint256");
        assert_eq!(p("tuple(int,address)[]").to_string(), "(int256,address)[]");
    }

    #[test]
    fn head_size_of_static_composites() {
        assert_eq!(p("uint8").head_size(), Some(32));
        assert_eq!(p("(uint256,bool)").head_size(), Some(64));
        assert_eq!(p("(uint256,bool)[3]").head_size(), Some(192));
        assert_eq!(p("string[3]").head_size(), Some(32));
    }

    #[test]
    fn head_size_overflow_is_none() {
        assert_eq!(p("uint256[18446744073709551615]").head_size(), None);
        assert_eq!(p("uint8[2][9223372036854775807]").head_size(), None);
        let half = format!("uint256[{}]", usize::MAX / 64);
        assert_eq!(p(&format!("({half},{half},{half})")).head_size(), None);
        assert_eq!(p("uint256[18446744073709551615][]").head_size(), Some(32));
    }
}
