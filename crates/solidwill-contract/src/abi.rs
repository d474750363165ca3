//! Minimal ABI word encoding/decoding.
//!
//! The SolidWill surface only needs static words (uint256, address, bool)
//! plus one dynamic string, so this is hand-rolled rather than pulling in a
//! full ABI codec. Selectors are computed from the canonical signature.

use alloy_primitives::{keccak256, Address, U256};
use thiserror::Error;

/// Size of one ABI head word.
pub const WORD: usize = 32;

/// Errors from decoding contract return data.
#[derive(Debug, Error)]
pub enum AbiError {
    /// Return data shorter than the decoded layout requires.
    #[error("return data too short: need {need} bytes, got {got}")]
    ShortData { need: usize, got: usize },

    /// A uint256 word does not fit the client-side integer type.
    #[error("value at word {0} does not fit in u64")]
    Overflow(usize),

    /// A dynamic offset points outside the return data.
    #[error("invalid dynamic offset at word {0}")]
    BadOffset(usize),

    /// A bool word holds something other than 0 or 1.
    #[error("invalid bool at word {0}")]
    BadBool(usize),

    /// A string payload is not valid UTF-8.
    #[error("string at word {0} is not valid UTF-8")]
    BadUtf8(usize),
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a u64 as a left-padded 32-byte word.
pub fn u64_word(value: u64) -> [u8; WORD] {
    U256::from(value).to_be_bytes()
}

/// Encode an address as a left-padded 32-byte word.
pub fn address_word(addr: Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(addr.as_slice());
    word
}

/// Encode a bool as a 32-byte word.
pub fn bool_word(value: bool) -> [u8; WORD] {
    u64_word(u64::from(value))
}

/// Borrow head word `index` from return data.
fn word(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    let start = index * WORD;
    let end = start + WORD;
    if data.len() < end {
        return Err(AbiError::ShortData { need: end, got: data.len() });
    }
    Ok(&data[start..end])
}

/// Decode head word `index` as a u64.
pub fn decode_u64(data: &[u8], index: usize) -> Result<u64, AbiError> {
    let value = U256::from_be_slice(word(data, index)?);
    u64::try_from(value).map_err(|_| AbiError::Overflow(index))
}

/// Decode head word `index` as an address.
pub fn decode_address(data: &[u8], index: usize) -> Result<Address, AbiError> {
    Ok(Address::from_slice(&word(data, index)?[12..]))
}

/// Decode head word `index` as a bool. Strict: only 0 and 1 are accepted.
pub fn decode_bool(data: &[u8], index: usize) -> Result<bool, AbiError> {
    let value = U256::from_be_slice(word(data, index)?);
    if value == U256::ZERO {
        Ok(false)
    } else if value == U256::from(1u8) {
        Ok(true)
    } else {
        Err(AbiError::BadBool(index))
    }
}

/// Decode a dynamic string whose offset word sits at head word `index`.
///
/// Offset and length words come from provider-supplied return data, so the
/// bounds arithmetic saturates instead of trusting them not to overflow.
pub fn decode_string(data: &[u8], index: usize) -> Result<String, AbiError> {
    let offset = U256::from_be_slice(word(data, index)?);
    let offset = usize::try_from(offset).map_err(|_| AbiError::BadOffset(index))?;
    if offset.saturating_add(WORD) > data.len() {
        return Err(AbiError::BadOffset(index));
    }
    let start = offset + WORD;

    let len = U256::from_be_slice(&data[offset..start]);
    let len = usize::try_from(len).map_err(|_| AbiError::BadOffset(index))?;
    let end = start.saturating_add(len);
    if end > data.len() {
        return Err(AbiError::ShortData { need: end, got: data.len() });
    }

    String::from_utf8(data[start..end].to_vec()).map_err(|_| AbiError::BadUtf8(index))
}
