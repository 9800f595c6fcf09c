//! 32-byte word primitives.
//!
//! Everything in the ABI layout is built from big-endian 32-byte words.
//! Signed integers are stored in two's complement across the whole word.

use crate::error::{AbiError, AbiResult};
use crate::types::padded_len;
use alloy_primitives::{I256, U256};

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// A single ABI word.
pub type Word = [u8; WORD_SIZE];

/// Invert every byte and add one, in place.
pub fn negate_word(word: &mut Word) {
    for b in word.iter_mut() {
        *b = !*b;
    }
    for b in word.iter_mut().rev() {
        let (sum, carry) = b.overflowing_add(1);
        *b = sum;
        if !carry {
            break;
        }
    }
}

/// Unsigned integer, big-endian, right-aligned.
pub fn uint_to_word(value: U256) -> Word {
    value.to_be_bytes::<WORD_SIZE>()
}

/// Signed integer in two's complement. Zero and positives are plain magnitudes.
pub fn int_to_word(value: I256) -> Word {
    let mut word = uint_to_word(value.unsigned_abs());
    if value.is_negative() {
        negate_word(&mut word);
    }
    word
}

pub fn word_to_uint(word: &Word) -> U256 {
    U256::from_be_bytes(*word)
}

/// Interpret a word as a signed integer: when the sign bit is set the
/// magnitude is recovered by inverting and adding one, then negated.
pub fn word_to_int(word: &Word) -> I256 {
    if word[0] & 0x80 == 0 {
        return I256::from_raw(word_to_uint(word));
    }
    let mut magnitude = *word;
    negate_word(&mut magnitude);
    I256::from_raw(word_to_uint(&magnitude)).wrapping_neg()
}

pub fn usize_to_word(value: usize) -> Word {
    uint_to_word(U256::from(value as u64))
}

/// Read an offset or length word. Values that cannot address memory fail
/// with `OffsetOverflow`.
pub fn word_to_usize(word: &Word) -> AbiResult<usize> {
    if word[..WORD_SIZE - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::OffsetOverflow);
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD_SIZE - 8..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| AbiError::OffsetOverflow)
}

pub fn bool_to_word(value: bool) -> Word {
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - 1] = u8::from(value);
    word
}

/// Right-align `bytes` in a word, zero-filling the high-order bytes.
pub fn left_pad(bytes: &[u8]) -> AbiResult<Word> {
    if bytes.len() > WORD_SIZE {
        return Err(AbiError::BytesSizeMismatch {
            expected: WORD_SIZE,
            got: bytes.len(),
        });
    }
    let mut word = [0u8; WORD_SIZE];
    word[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
    Ok(word)
}

/// Copy `bytes` and zero-fill up to the next word boundary.
pub fn right_pad(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(padded_len(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(padded_len(bytes.len()), 0);
    out
}

/// Effective width used for range checks.
fn effective_bits(bits: usize) -> usize {
    bits.clamp(1, 256)
}

/// Whether `value` fits in an unsigned integer of `bits` width.
pub fn uint_fits(value: U256, bits: usize) -> bool {
    value.bit_len() <= effective_bits(bits)
}

/// Whether `value` fits in a two's-complement integer of `bits` width.
pub fn int_fits(value: I256, bits: usize) -> bool {
    let bits = effective_bits(bits);
    if bits == 256 {
        return true;
    }
    let limit = U256::from(1u8) << (bits - 1);
    let magnitude = value.unsigned_abs();
    if value.is_negative() {
        magnitude <= limit
    } else {
        magnitude < limit
    }
}
