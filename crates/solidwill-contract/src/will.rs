//! The on-chain will record and its return-data decoding.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::abi::{self, AbiError};

/// Snapshot of one registered will, as returned by `getWillDetails(uint256)`.
///
/// Records are created and mutated only on-chain; the client replaces a
/// snapshot wholesale on every watch emission and never merges fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillRecord {
    /// Beneficiary-side owner of the will.
    pub owner: Address,
    /// Number of blocks allowed between confirmations (the cadence).
    pub frequency_blocks: u64,
    /// Block at which the owner last confirmed life.
    pub last_confirmation_block: u64,
    /// Off-chain document reference.
    pub file_url: String,
    /// False once the will has been deactivated; ids are never reused.
    pub is_active: bool,
}

impl WillRecord {
    /// Decode `getWillDetails` return data:
    /// `(address owner, uint256 frequency, uint256 lastConfirmationBlock,
    ///   string fileUrl, bool isActive)`.
    pub fn abi_decode(data: &[u8]) -> Result<Self, AbiError> {
        Ok(Self {
            owner: abi::decode_address(data, 0)?,
            frequency_blocks: abi::decode_u64(data, 1)?,
            last_confirmation_block: abi::decode_u64(data, 2)?,
            file_url: abi::decode_string(data, 3)?,
            is_active: abi::decode_bool(data, 4)?,
        })
    }

    /// Encode this record as `getWillDetails` return data. The inverse of
    /// [`WillRecord::abi_decode`]; used by fake providers in tests.
    pub fn abi_encode(&self) -> Vec<u8> {
        // Five head words, then the string tail padded to a word boundary.
        let mut data = Vec::with_capacity(7 * abi::WORD);
        data.extend_from_slice(&abi::address_word(self.owner));
        data.extend_from_slice(&abi::u64_word(self.frequency_blocks));
        data.extend_from_slice(&abi::u64_word(self.last_confirmation_block));
        data.extend_from_slice(&abi::u64_word(5 * abi::WORD as u64));
        data.extend_from_slice(&abi::bool_word(self.is_active));

        let bytes = self.file_url.as_bytes();
        data.extend_from_slice(&abi::u64_word(bytes.len() as u64));
        data.extend_from_slice(bytes);
        let pad = (abi::WORD - bytes.len() % abi::WORD) % abi::WORD;
        data.extend_from_slice(&vec![0u8; pad]);
        data
    }

    /// Blocks left before the will is presumed triggered, relative to the
    /// given chain head. Negative once the cadence has already elapsed.
    pub fn blocks_remaining(&self, chain_head: u64) -> i64 {
        self.last_confirmation_block as i64 + self.frequency_blocks as i64 - chain_head as i64
    }
}
