//! ABI encoder.
//!
//! Values are written into an [`EncodeContext`], which keeps two regions:
//! the head (static values and offset words) and the tail (dynamic payloads).
//! Offset words are reserved as zero placeholders and patched in
//! [`EncodeContext::finish`] once the final head length is known:
//!
//! ```text
//! offset = head_len + tail_len_when_reserved
//! ```
//!
//! Dynamic tuples, dynamic fixed arrays and dynamic arrays encode their
//! elements into a nested context whose finished bytes become one tail entry,
//! so nested offsets are relative to the start of that nested encoding.
//!
//! # Usage
//! ```ignore
//! let encoder = ArgumentEncoder::parse(&["address", "uint256"])?;
//! let data = encoder.encode_all(&[addr.into(), 1_000_000u64.into()])?;
//! ```

use std::sync::Arc;
use tronabi_core::address::default_translator;
use tronabi_core::word::{
    bool_to_word, int_fits, int_to_word, left_pad, right_pad, uint_fits, uint_to_word,
    usize_to_word, Word, WORD_SIZE,
};
use tronabi_core::{AbiError, AbiResult, AbiValue, AddressTranslator, ParamType, I256, U256};

/// Pending offset word: where it sits in the head and where its payload
/// starts in the tail.
#[derive(Debug, Clone, Copy)]
struct OffsetPatch {
    head_pos: usize,
    tail_pos: usize,
}

/// One encoding region (the top level or a nested dynamic composite).
#[derive(Debug, Default)]
pub struct EncodeContext {
    head: Vec<u8>,
    tail: Vec<u8>,
    patches: Vec<OffsetPatch>,
}

impl EncodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_word(&mut self, word: Word) {
        self.head.extend_from_slice(&word);
    }

    /// Append `bytes` to the head, zero-filled to a word boundary.
    pub fn write_padded(&mut self, bytes: &[u8]) {
        self.head.extend_from_slice(&right_pad(bytes));
    }

    /// Reserve an offset word pointing at the current end of the tail.
    pub fn reserve_offset(&mut self) {
        self.patches.push(OffsetPatch {
            head_pos: self.head.len(),
            tail_pos: self.tail.len(),
        });
        self.head.extend_from_slice(&[0u8; WORD_SIZE]);
    }

    pub fn write_tail_word(&mut self, word: Word) {
        self.tail.extend_from_slice(&word);
    }

    pub fn write_tail(&mut self, bytes: &[u8]) {
        self.tail.extend_from_slice(bytes);
    }

    pub fn head_len(&self) -> usize {
        self.head.len()
    }

    /// Patch every offset word and return `head ++ tail`.
    pub fn finish(self) -> Vec<u8> {
        let EncodeContext {
            mut head,
            tail,
            patches,
        } = self;
        let head_len = head.len();
        for patch in patches {
            let word = usize_to_word(head_len + patch.tail_pos);
            head[patch.head_pos..patch.head_pos + WORD_SIZE].copy_from_slice(&word);
        }
        head.extend_from_slice(&tail);
        head
    }
}

/// Encode one value of type `ty` into `ctx`.
pub fn encode_value(
    ty: &ParamType,
    ctx: &mut EncodeContext,
    value: &AbiValue,
    translator: &dyn AddressTranslator,
) -> AbiResult<()> {
    match ty {
        ParamType::Bool => match value {
            AbiValue::Bool(b) => {
                ctx.write_word(bool_to_word(*b));
                Ok(())
            }
            other => Err(mismatch(ty, other)),
        },
        ParamType::Uint(bits) => {
            let v = unsigned_value(ty, value)?;
            if !uint_fits(v, *bits) {
                return Err(out_of_range(ty, v));
            }
            ctx.write_word(uint_to_word(v));
            Ok(())
        }
        ParamType::Int(bits) => {
            let v = signed_value(ty, value)?;
            if !int_fits(v, *bits) {
                return Err(out_of_range(ty, v));
            }
            ctx.write_word(int_to_word(v));
            Ok(())
        }
        ParamType::Address => {
            let raw = translator.to_chain_address(value)?;
            ctx.write_word(left_pad(&raw)?);
            Ok(())
        }
        ParamType::FixedBytes(size) => {
            let bytes = byte_value(ty, value)?;
            if bytes.len() != *size {
                return Err(AbiError::BytesSizeMismatch {
                    expected: *size,
                    got: bytes.len(),
                });
            }
            ctx.write_padded(bytes);
            Ok(())
        }
        ParamType::Bytes => {
            let bytes = byte_value(ty, value)?;
            encode_dynamic_bytes(ctx, bytes);
            Ok(())
        }
        ParamType::String => match value {
            AbiValue::String(s) => {
                encode_dynamic_bytes(ctx, s.as_bytes());
                Ok(())
            }
            other => Err(mismatch(ty, other)),
        },
        ParamType::FixedArray(inner, len) => {
            let items = sequence_value(ty, value)?;
            check_len(*len, items.len())?;
            if ty.is_dynamic() {
                ctx.reserve_offset();
                let nested = encode_nested(std::iter::repeat(&**inner), items, translator)?;
                ctx.write_tail(&nested);
                Ok(())
            } else {
                items
                    .iter()
                    .try_for_each(|item| encode_value(inner, ctx, item, translator))
            }
        }
        ParamType::Array(inner) => {
            let items = sequence_value(ty, value)?;
            ctx.reserve_offset();
            ctx.write_tail_word(usize_to_word(items.len()));
            let nested = encode_nested(std::iter::repeat(&**inner), items, translator)?;
            ctx.write_tail(&nested);
            Ok(())
        }
        ParamType::Tuple(types) => {
            let items = sequence_value(ty, value)?;
            check_len(types.len(), items.len())?;
            if ty.is_dynamic() {
                ctx.reserve_offset();
                let nested = encode_nested(types.iter(), items, translator)?;
                ctx.write_tail(&nested);
                Ok(())
            } else {
                types
                    .iter()
                    .zip(items)
                    .try_for_each(|(t, item)| encode_value(t, ctx, item, translator))
            }
        }
    }
}

/// Length word followed by the zero-padded payload, both in the tail.
fn encode_dynamic_bytes(ctx: &mut EncodeContext, bytes: &[u8]) {
    ctx.reserve_offset();
    ctx.write_tail_word(usize_to_word(bytes.len()));
    ctx.write_tail(&right_pad(bytes));
}

fn encode_nested<'t>(
    types: impl Iterator<Item = &'t ParamType>,
    items: &[AbiValue],
    translator: &dyn AddressTranslator,
) -> AbiResult<Vec<u8>> {
    let mut nested = EncodeContext::new();
    for (ty, item) in types.zip(items) {
        encode_value(ty, &mut nested, item, translator)?;
    }
    Ok(nested.finish())
}

fn unsigned_value(ty: &ParamType, value: &AbiValue) -> AbiResult<U256> {
    match value {
        AbiValue::Uint(u) => Ok(*u),
        AbiValue::Int(i) if i.is_negative() => Err(out_of_range(ty, i)),
        AbiValue::Int(i) => Ok(i.unsigned_abs()),
        other => Err(mismatch(ty, other)),
    }
}

fn signed_value(ty: &ParamType, value: &AbiValue) -> AbiResult<I256> {
    match value {
        AbiValue::Int(i) => Ok(*i),
        AbiValue::Uint(u) => I256::try_from(*u).map_err(|_| out_of_range(ty, u)),
        other => Err(mismatch(ty, other)),
    }
}

fn byte_value<'v>(ty: &ParamType, value: &'v AbiValue) -> AbiResult<&'v [u8]> {
    match value {
        AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Ok(b),
        other => Err(mismatch(ty, other)),
    }
}

fn sequence_value<'v>(ty: &ParamType, value: &'v AbiValue) -> AbiResult<&'v [AbiValue]> {
    value.as_slice().ok_or_else(|| mismatch(ty, value))
}

fn check_len(expected: usize, got: usize) -> AbiResult<()> {
    if expected != got {
        return Err(AbiError::LengthMismatch { expected, got });
    }
    Ok(())
}

fn mismatch(ty: &ParamType, value: &AbiValue) -> AbiError {
    AbiError::value_mismatch(ty.to_string(), value.kind())
}

fn out_of_range(ty: &ParamType, value: impl ToString) -> AbiError {
    AbiError::IntegerOutOfRange {
        ty: ty.to_string(),
        value: value.to_string(),
    }
}

/// Encoder for an ordered list of arguments, built once from the type list
/// and reused for every call.
#[derive(Debug, Clone)]
pub struct ArgumentEncoder {
    types: Vec<ParamType>,
    translator: Arc<dyn AddressTranslator>,
}

impl ArgumentEncoder {
    /// Build with the process-wide default address translator.
    pub fn new(types: Vec<ParamType>) -> Self {
        Self::with_translator(types, default_translator())
    }

    pub fn with_translator(types: Vec<ParamType>, translator: Arc<dyn AddressTranslator>) -> Self {
        Self { types, translator }
    }

    /// Parse every type string; the first failure aborts construction.
    pub fn parse(types: &[&str]) -> AbiResult<Self> {
        let types = types
            .iter()
            .map(|t| ParamType::parse(t))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(Self::new(types))
    }

    pub fn types(&self) -> &[ParamType] {
        &self.types
    }

    /// Encode all arguments as one top-level tuple.
    pub fn encode_all(&self, values: &[AbiValue]) -> AbiResult<Vec<u8>> {
        if values.len() != self.types.len() {
            return Err(AbiError::ArgumentCount {
                expected: self.types.len(),
                got: values.len(),
            });
        }
        let mut ctx = EncodeContext::new();
        for (ty, value) in self.types.iter().zip(values) {
            encode_value(ty, &mut ctx, value, self.translator.as_ref())?;
        }
        Ok(ctx.finish())
    }

    /// Encode a single argument; the encoder must hold exactly one type.
    pub fn encode_single(&self, value: &AbiValue) -> AbiResult<Vec<u8>> {
        self.encode_all(std::slice::from_ref(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tronabi_core::HexAddressTranslator;

    fn enc(types: &[&str], values: &[AbiValue]) -> AbiResult<Vec<u8>> {
        let types = types.iter().map(|t| ParamType::parse(t).unwrap()).collect();
        ArgumentEncoder::with_translator(types, Arc::new(HexAddressTranslator)).encode_all(values)
    }

    fn words(hex_words: &[&str]) -> Vec<u8> {
        hex_words
            .iter()
            .flat_map(|w| {
                let mut word = [0u8; 32];
                let bytes = hex::decode(w).unwrap();
                word[32 - bytes.len()..].copy_from_slice(&bytes);
                word
            })
            .collect()
    }

    #[test]
    fn uint256_million() {
        let out = enc(&["uint256"], &[1_000_000u64.into()]).unwrap();
        assert_eq!(out, words(&["0f4240"]));
    }

    #[test]
    fn int256_minus_one_is_all_ff() {
        let out = enc(&["int256"], &[(-1i64).into()]).unwrap();
        assert_eq!(out, vec![0xff; 32]);
    }

    #[test]
    fn string_abc_layout() {
        let out = enc(&["string"], &["abc".into()]).unwrap();
        assert_eq!(out.len(), 96);
        assert_eq!(&out[..32], &words(&["20"])[..]);
        assert_eq!(&out[32..64], &words(&["03"])[..]);
        assert_eq!(&out[64..67], b"abc");
        assert!(out[67..].iter().all(|b| *b == 0));
    }

    #[test]
    fn offsets_account_for_full_head() {
        // (uint256, bytes, uint256): the bytes offset skips all three head words
        let out = enc(
            &["uint256", "bytes", "uint256"],
            &[7u8.into(), vec![0xaau8, 0xbb].into(), 9u8.into()],
        )
        .unwrap();
        assert_eq!(out.len(), 5 * 32);
        assert_eq!(&out[32..64], &words(&["60"])[..]);
        assert_eq!(&out[96..128], &words(&["02"])[..]);
        assert_eq!(&out[128..130], &[0xaa, 0xbb]);
    }

    #[test]
    fn dynamic_array_of_strings() {
        let value = AbiValue::array(["a", "bc"]);
        let out = enc(&["string[]"], &[value]).unwrap();
        let expected = words(&[
            "20", // offset of the array
            "02", // length
            "40", // element 0 offset, relative to the element area
            "80", // element 1 offset
            "01", // len("a")
            "00",
            "02", // len("bc")
            "00",
        ]);
        assert_eq!(out.len(), expected.len());
        assert_eq!(&out[..4 * 32], &expected[..4 * 32]);
        assert_eq!(&out[4 * 32..5 * 32], &expected[4 * 32..5 * 32]);
        assert_eq!(out[5 * 32], b'a');
        assert_eq!(&out[7 * 32..7 * 32 + 2], b"bc");
    }

    #[test]
    fn static_tuple_is_inlined() {
        let value = AbiValue::tuple([AbiValue::from(1u8), AbiValue::from(true)]);
        let out = enc(&["(uint256,bool)", "uint8"], &[value, 3u8.into()]).unwrap();
        assert_eq!(out, words(&["01", "01", "03"]));
    }

    #[test]
    fn dynamic_tuple_has_no_length_word() {
        let value = AbiValue::tuple([AbiValue::from(5u8), AbiValue::from("hi")]);
        let out = enc(&["(uint256,string)"], &[value]).unwrap();
        let expected = words(&["20", "05", "40", "02"]);
        assert_eq!(&out[..128], &expected[..]);
        assert_eq!(&out[128..130], b"hi");
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn fixed_bytes_are_right_padded() {
        let out = enc(&["bytes4"], &[AbiValue::FixedBytes(vec![0xde, 0xad, 0xbe, 0xef])]).unwrap();
        assert_eq!(&out[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(out[4..].iter().all(|b| *b == 0));

        let err = enc(&["bytes4"], &[AbiValue::FixedBytes(vec![1, 2, 3])]).unwrap_err();
        assert!(matches!(err, AbiError::BytesSizeMismatch { expected: 4, got: 3 }));
    }

    #[test]
    fn address_is_left_padded() {
        let raw = [0x11u8; 20];
        let out = enc(&["address"], &[AbiValue::Address(raw.to_vec())]).unwrap();
        assert!(out[..12].iter().all(|b| *b == 0));
        assert_eq!(&out[12..], &raw);
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let err = enc(&["bool"], &[1u8.into()]).unwrap_err();
        assert!(matches!(err, AbiError::ValueTypeNotSupported { .. }));
        let err = enc(&["string"], &[vec![1u8].into()]).unwrap_err();
        assert!(matches!(err, AbiError::ValueTypeNotSupported { .. }));
    }

    #[test]
    fn argument_and_length_counts_are_checked() {
        let err = enc(&["uint256", "bool"], &[1u8.into()]).unwrap_err();
        assert!(matches!(err, AbiError::ArgumentCount { expected: 2, got: 1 }));
        let err = enc(&["uint8[3]"], &[AbiValue::array([1u8, 2])]).unwrap_err();
        assert!(matches!(err, AbiError::LengthMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn declared_width_is_enforced() {
        assert!(enc(&["uint8"], &[255u16.into()]).is_ok());
        let err = enc(&["uint8"], &[256u16.into()]).unwrap_err();
        assert!(matches!(err, AbiError::IntegerOutOfRange { .. }));
        let err = enc(&["uint256"], &[(-1i8).into()]).unwrap_err();
        assert!(matches!(err, AbiError::IntegerOutOfRange { .. }));
        assert!(enc(&["int8"], &[(-128i16).into()]).is_ok());
        let err = enc(&["int8"], &[128i16.into()]).unwrap_err();
        assert!(matches!(err, AbiError::IntegerOutOfRange { .. }));
    }

    #[test]
    fn encode_single_requires_one_type() {
        let encoder = ArgumentEncoder::parse(&["uint256"]).unwrap();
        assert_eq!(encoder.encode_single(&1u8.into()).unwrap(), words(&["01"]));
        let pair = ArgumentEncoder::parse(&["uint256", "uint256"]).unwrap();
        assert!(matches!(
            pair.encode_single(&1u8.into()),
            Err(AbiError::ArgumentCount { .. })
        ));
    }
}
