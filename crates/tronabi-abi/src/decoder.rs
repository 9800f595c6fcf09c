//! ABI decoder.
//!
//! A [`DecodeContext`] is a view over one encoding plus a cursor. Dynamic
//! values are reached through an offset word, which spawns a new context
//! rooted at that offset within the current encoding. Array elements are
//! rooted just after the length word.
//!
//! Every read is bounds-checked: malformed or hostile input fails with
//! `TruncatedInput` / `OffsetOverflow` instead of panicking, and claimed
//! array lengths are capped by the bytes actually remaining.
//!
//! Offsets may alias, so per-array caps alone do not bound the output. All
//! contexts spawned from one input share a value budget proportional to the
//! input length; exceeding it fails with `DecodeBudgetExceeded`.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tronabi_core::address::default_translator;
use tronabi_core::types::padded_len;
use tronabi_core::word::{word_to_int, word_to_uint, word_to_usize, Word, WORD_SIZE};
use tronabi_core::{AbiError, AbiResult, AbiValue, AddressTranslator, ParamType};

/// Leaf values allowed per input word.
const VALUES_PER_WORD: usize = 4;
/// Allowance for values that occupy no bytes, such as empty tuples.
const VALUE_BUDGET_FLOOR: usize = 64;

#[derive(Debug, Clone)]
struct ValueBudget {
    limit: usize,
    left: Rc<Cell<usize>>,
}

impl ValueBudget {
    fn for_input(len: usize) -> Self {
        let limit = (len / WORD_SIZE)
            .saturating_mul(VALUES_PER_WORD)
            .saturating_add(VALUE_BUDGET_FLOOR);
        Self {
            limit,
            left: Rc::new(Cell::new(limit)),
        }
    }

    fn charge(&self) -> AbiResult<()> {
        let left = self.left.get();
        if left == 0 {
            return Err(AbiError::DecodeBudgetExceeded { limit: self.limit });
        }
        self.left.set(left - 1);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DecodeContext<'a> {
    data: &'a [u8],
    cursor: usize,
    budget: ValueBudget,
}

impl<'a> DecodeContext<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            budget: ValueBudget::for_input(data.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.cursor)
    }

    /// Take the next `len` bytes.
    pub fn read(&mut self, len: usize) -> AbiResult<&'a [u8]> {
        let end = self
            .cursor
            .checked_add(len)
            .ok_or(AbiError::OffsetOverflow)?;
        if end > self.data.len() {
            return Err(AbiError::TruncatedInput {
                needed: end,
                available: self.data.len(),
            });
        }
        let out = &self.data[self.cursor..end];
        self.cursor = end;
        Ok(out)
    }

    pub fn read_word(&mut self) -> AbiResult<Word> {
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(self.read(WORD_SIZE)?);
        Ok(word)
    }

    /// Read a length or offset word as a `usize`.
    pub fn read_usize(&mut self) -> AbiResult<usize> {
        word_to_usize(&self.read_word()?)
    }

    /// Read an offset word and return a context rooted at that offset.
    pub fn follow_offset(&mut self) -> AbiResult<DecodeContext<'a>> {
        let offset = self.read_usize()?;
        self.at(offset)
    }

    /// Context rooted at `offset` bytes into this encoding.
    fn at(&self, offset: usize) -> AbiResult<DecodeContext<'a>> {
        if offset > self.data.len() {
            return Err(AbiError::TruncatedInput {
                needed: offset,
                available: self.data.len(),
            });
        }
        Ok(DecodeContext {
            data: &self.data[offset..],
            cursor: 0,
            budget: self.budget.clone(),
        })
    }

    /// Context rooted at the cursor.
    fn rest(&self) -> AbiResult<DecodeContext<'a>> {
        self.at(self.cursor)
    }
}

/// Decode one value of type `ty` from `ctx`.
pub fn decode_value(
    ty: &ParamType,
    ctx: &mut DecodeContext<'_>,
    translator: &dyn AddressTranslator,
) -> AbiResult<AbiValue> {
    // leaves and composites with no elements spend the budget
    let holds_leaves = match ty {
        ParamType::FixedArray(_, len) => *len > 0,
        ParamType::Tuple(types) => !types.is_empty(),
        ParamType::Array(_) => true,
        _ => false,
    };
    if !holds_leaves {
        ctx.budget.charge()?;
    }

    match ty {
        ParamType::Bool => {
            let word = ctx.read_word()?;
            Ok(AbiValue::Bool(word[WORD_SIZE - 1] != 0))
        }
        ParamType::Uint(_) => Ok(AbiValue::Uint(word_to_uint(&ctx.read_word()?))),
        ParamType::Int(_) => Ok(AbiValue::Int(word_to_int(&ctx.read_word()?))),
        ParamType::Address => {
            let word = ctx.read_word()?;
            let mut raw = [0u8; 20];
            raw.copy_from_slice(&word[WORD_SIZE - 20..]);
            translator.from_chain_address(&raw)
        }
        ParamType::FixedBytes(size) => {
            let region = ctx.read(padded_len(*size))?;
            Ok(AbiValue::FixedBytes(region[..*size].to_vec()))
        }
        ParamType::Bytes => {
            let mut sub = ctx.follow_offset()?;
            Ok(AbiValue::Bytes(read_length_prefixed(&mut sub)?.to_vec()))
        }
        ParamType::String => {
            let mut sub = ctx.follow_offset()?;
            let bytes = read_length_prefixed(&mut sub)?;
            String::from_utf8(bytes.to_vec())
                .map(AbiValue::String)
                .map_err(|_| AbiError::InvalidUtf8)
        }
        ParamType::FixedArray(inner, len) => {
            let items = if ty.is_dynamic() {
                let mut sub = ctx.follow_offset()?;
                decode_sequence(std::iter::repeat(&**inner).take(*len), &mut sub, translator)?
            } else {
                decode_sequence(std::iter::repeat(&**inner).take(*len), ctx, translator)?
            };
            Ok(AbiValue::Array(items))
        }
        ParamType::Array(inner) => {
            let mut sub = ctx.follow_offset()?;
            let len = sub.read_usize()?;
            if len == 0 {
                sub.budget.charge()?;
            }
            let mut elements = sub.rest()?;
            let needed = inner
                .head_size()
                .and_then(|size| len.checked_mul(size.max(1)))
                .ok_or(AbiError::OffsetOverflow)?;
            if needed > elements.remaining() {
                return Err(AbiError::TruncatedInput {
                    needed,
                    available: elements.remaining(),
                });
            }
            let items =
                decode_sequence(std::iter::repeat(&**inner).take(len), &mut elements, translator)?;
            Ok(AbiValue::Array(items))
        }
        ParamType::Tuple(types) => {
            let items = if ty.is_dynamic() {
                let mut sub = ctx.follow_offset()?;
                decode_sequence(types.iter(), &mut sub, translator)?
            } else {
                decode_sequence(types.iter(), ctx, translator)?
            };
            Ok(AbiValue::Tuple(items))
        }
    }
}

fn read_length_prefixed<'a>(ctx: &mut DecodeContext<'a>) -> AbiResult<&'a [u8]> {
    let len = ctx.read_usize()?;
    ctx.read(len)
}

fn decode_sequence<'t>(
    types: impl Iterator<Item = &'t ParamType>,
    ctx: &mut DecodeContext<'_>,
    translator: &dyn AddressTranslator,
) -> AbiResult<Vec<AbiValue>> {
    types.map(|ty| decode_value(ty, ctx, translator)).collect()
}

/// Decoder for an ordered list of values, built once from the type list and
/// reused for every call.
#[derive(Debug, Clone)]
pub struct ArgumentDecoder {
    types: Vec<ParamType>,
    translator: Arc<dyn AddressTranslator>,
}

impl ArgumentDecoder {
    /// Build with the process-wide default address translator.
    pub fn new(types: Vec<ParamType>) -> Self {
        Self::with_translator(types, default_translator())
    }

    pub fn with_translator(types: Vec<ParamType>, translator: Arc<dyn AddressTranslator>) -> Self {
        Self { types, translator }
    }

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

    /// Decode all values as one top-level tuple. Trailing bytes are ignored.
    pub fn decode_all(&self, data: &[u8]) -> AbiResult<Vec<AbiValue>> {
        let mut ctx = DecodeContext::new(data);
        decode_sequence(self.types.iter(), &mut ctx, self.translator.as_ref())
    }

    /// Decode a single value; the decoder must hold exactly one type.
    pub fn decode_single(&self, data: &[u8]) -> AbiResult<AbiValue> {
        if self.types.len() != 1 {
            return Err(AbiError::ArgumentCount {
                expected: 1,
                got: self.types.len(),
            });
        }
        let mut values = self.decode_all(data)?;
        values.pop().ok_or(AbiError::ArgumentCount {
            expected: 1,
            got: 0,
        })
    }
}
