//! Calldata builders and return decoders for the SolidWill ABI surface.

use alloy_primitives::{Address, Bytes};

use crate::abi::{self, AbiError};

/// Calldata for `counter()`.
pub fn counter_call() -> Bytes {
    Bytes::from(abi::selector("counter()").to_vec())
}

/// Decode the `counter()` return value.
pub fn decode_counter(data: &[u8]) -> Result<u64, AbiError> {
    abi::decode_u64(data, 0)
}

/// Calldata for `getWillDetails(uint256)`.
pub fn will_details_call(id: u64) -> Bytes {
    let mut data = abi::selector("getWillDetails(uint256)").to_vec();
    data.extend_from_slice(&abi::u64_word(id));
    Bytes::from(data)
}

/// Calldata for `createWill(address,uint256)`.
pub fn create_will_call(owner: Address, frequency_blocks: u64) -> Bytes {
    let mut data = abi::selector("createWill(address,uint256)").to_vec();
    data.extend_from_slice(&abi::address_word(owner));
    data.extend_from_slice(&abi::u64_word(frequency_blocks));
    Bytes::from(data)
}

/// Calldata for `confirmLife(uint256)`: the heartbeat.
pub fn confirm_life_call(id: u64) -> Bytes {
    let mut data = abi::selector("confirmLife(uint256)").to_vec();
    data.extend_from_slice(&abi::u64_word(id));
    Bytes::from(data)
}
