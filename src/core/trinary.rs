//! Trinary primitives - trytes, balanced ternary integers, hash-to-tryte mapping
//!
//! A tryte is one of 27 symbols encoding a balanced-ternary digit in `-13..=13`:
//!
//! | Symbol | Value |
//! |--------|-------|
//! | `9` | 0 |
//! | `A`..`M` | 1..13 |
//! | `N`..`Z` | -13..-1 |
//!
//! Integers are little-endian: the first tryte is the least significant.

use sha2::{Digest, Sha512};
use thiserror::Error;

/// Tryte alphabet, indexed by unsigned tryte value.
pub const TRYTE_ALPHABET: &str = "9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A string of trytes.
pub type Trytes = String;

/// An 81-tryte hash (address, bundle hash, seed). 90 trytes when checksummed.
pub type Hash = String;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrinaryError {
    #[error("invalid tryte '{ch}' at position {pos}")]
    InvalidTryte { ch: char, pos: usize },

    #[error("invalid length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("value {value} does not fit in {len} trytes")]
    Overflow { value: i128, len: usize },
}

/// Balanced value of a tryte symbol.
pub fn tryte_value(ch: char) -> Option<i8> {
    let idx = TRYTE_ALPHABET.find(ch)? as i8;
    Some(if idx > 13 { idx - 27 } else { idx })
}

fn tryte_char(value: i8) -> char {
    let idx = if value < 0 { value + 27 } else { value };
    TRYTE_ALPHABET.as_bytes()[idx as usize] as char
}

pub fn validate_trytes(trytes: &str) -> Result<(), TrinaryError> {
    match trytes.chars().enumerate().find(|(_, c)| tryte_value(*c).is_none()) {
        Some((pos, ch)) => Err(TrinaryError::InvalidTryte { ch, pos }),
        None => Ok(()),
    }
}

/// Valid tryte string of exactly `len` symbols.
pub fn validate_trytes_len(trytes: &str, len: usize) -> Result<(), TrinaryError> {
    validate_trytes(trytes)?;
    let got = trytes.chars().count();
    if got != len {
        return Err(TrinaryError::InvalidLength { expected: len, got });
    }
    Ok(())
}

/// True for an 81-tryte hash, or a 90-tryte hash with checksum.
pub fn is_hash(trytes: &str) -> bool {
    let len = trytes.len();
    (len == super::consts::HASH_TRYTES_SIZE || len == super::consts::ADDRESS_WITH_CHECKSUM_TRYTES_SIZE)
        && validate_trytes(trytes).is_ok()
}

/// Encode `value` as exactly `len` balanced-ternary trytes.
pub fn int_to_trytes(value: i64, len: usize) -> Result<Trytes, TrinaryError> {
    let mut rest = value as i128;
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        let mut rem = rest.rem_euclid(27);
        if rem > 13 {
            rem -= 27;
        }
        out.push(tryte_char(rem as i8));
        rest = (rest - rem) / 27;
    }
    if rest != 0 {
        return Err(TrinaryError::Overflow { value: value as i128, len });
    }
    Ok(out)
}

pub fn trytes_to_int(trytes: &str) -> Result<i64, TrinaryError> {
    let mut acc: i128 = 0;
    for (pos, b) in trytes.bytes().enumerate().rev() {
        let ch = b as char;
        let v = tryte_value(ch).ok_or(TrinaryError::InvalidTryte { ch, pos })?;
        acc = acc * 27 + v as i128;
        if acc.abs() > i64::MAX as i128 {
            return Err(TrinaryError::Overflow { value: acc, len: trytes.len() });
        }
    }
    Ok(acc as i64)
}

/// Right-pad with `9` up to `len`. Longer input is returned unchanged.
pub fn pad_trytes(trytes: &str, len: usize) -> Trytes {
    let mut out = trytes.to_string();
    while out.len() < len {
        out.push('9');
    }
    out
}

/// Map arbitrary bytes to `len` uniformly distributed trytes.
///
/// SHA-512 in counter mode; bytes >= 243 are rejected so `b % 27` stays uniform.
pub fn hash_to_trytes(input: &[u8], len: usize) -> Trytes {
    let mut out = String::with_capacity(len);
    let mut counter: u32 = 0;
    while out.len() < len {
        let mut hasher = Sha512::new();
        hasher.update(input);
        hasher.update(counter.to_be_bytes());
        for b in hasher.finalize() {
            if out.len() == len {
                break;
            }
            if b < 243 {
                out.push(TRYTE_ALPHABET.as_bytes()[(b % 27) as usize] as char);
            }
        }
        counter += 1;
    }
    out
}
