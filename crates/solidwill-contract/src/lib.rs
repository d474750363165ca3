//! Contract surface for the SolidWill dead-man's-switch contract.
//!
//! This crate provides the pure (no IO) half of the dashboard client:
//! - 32-byte ABI word encoding and decoding
//! - Calldata builders for the contract's read and write operations
//! - [`WillRecord`] decoding from `getWillDetails` return data
//!
//! The ABI surface is deliberately small:
//! - read `counter()`: exclusive upper bound of valid will ids
//! - read `getWillDetails(uint256)`: one will's snapshot
//! - write `createWill(address,uint256)`: register a new will
//! - write `confirmLife(uint256)`: heartbeat resetting the confirmation block

pub mod abi;
mod calls;
mod will;

#[cfg(test)]
mod tests;

pub use abi::AbiError;
pub use calls::{
    confirm_life_call, counter_call, create_will_call, decode_counter, will_details_call,
};
pub use will::WillRecord;

/// Chain id of the single target network (Sepolia).
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
