//! Tests for the contract surface.

use alloy_primitives::{address, U256};

use crate::abi::{self, AbiError};
use crate::calls::{
    confirm_life_call, counter_call, create_will_call, decode_counter, will_details_call,
};
use crate::will::WillRecord;

fn sample_record() -> WillRecord {
    WillRecord {
        owner: address!("00000000000000000000000000000000000000aa"),
        frequency_blocks: 100,
        last_confirmation_block: 50,
        file_url: "ipfs://bafy.../will.pdf".to_string(),
        is_active: true,
    }
}

// =============================================================================
// ABI word tests
// =============================================================================

#[test]
fn test_selector_is_four_bytes_and_signature_sensitive() {
    let counter = abi::selector("counter()");
    let details = abi::selector("getWillDetails(uint256)");
    assert_ne!(counter, details);
    assert_eq!(counter, abi::selector("counter()"));
}

#[test]
fn test_u64_word_layout() {
    let word = abi::u64_word(0x1234);
    assert_eq!(&word[..30], &[0u8; 30]);
    assert_eq!(word[30], 0x12);
    assert_eq!(word[31], 0x34);
}

#[test]
fn test_address_word_is_left_padded() {
    let addr = address!("00000000000000000000000000000000000000aa");
    let word = abi::address_word(addr);
    assert_eq!(&word[..12], &[0u8; 12]);
    assert_eq!(&word[12..], addr.as_slice());
    assert_eq!(abi::decode_address(&word, 0).unwrap(), addr);
}

#[test]
fn test_decode_u64_rejects_oversized_value() {
    let word = U256::MAX.to_be_bytes::<32>();
    assert!(matches!(abi::decode_u64(&word, 0), Err(AbiError::Overflow(0))));
}

#[test]
fn test_decode_bool_is_strict() {
    assert!(!abi::decode_bool(&abi::u64_word(0), 0).unwrap());
    assert!(abi::decode_bool(&abi::u64_word(1), 0).unwrap());
    assert!(matches!(abi::decode_bool(&abi::u64_word(2), 0), Err(AbiError::BadBool(0))));
}

#[test]
fn test_decode_short_data() {
    let data = [0u8; 16];
    assert!(matches!(abi::decode_u64(&data, 0), Err(AbiError::ShortData { need: 32, got: 16 })));
}

#[test]
fn test_decode_string_rejects_bad_offset() {
    // Offset word points past the end of the data.
    let data = abi::u64_word(4096);
    assert!(matches!(abi::decode_string(&data, 0), Err(AbiError::BadOffset(0))));
}

#[test]
fn test_decode_string_rejects_huge_offset_word() {
    // An offset of u64::MAX must not overflow the bounds arithmetic.
    let data = abi::u64_word(u64::MAX);
    assert!(matches!(abi::decode_string(&data, 0), Err(AbiError::BadOffset(0))));
}

#[test]
fn test_decode_string_rejects_huge_length_word() {
    // A length of u64::MAX must not overflow the bounds arithmetic.
    let mut data = abi::u64_word(32).to_vec();
    data.extend_from_slice(&abi::u64_word(u64::MAX));
    assert!(matches!(abi::decode_string(&data, 0), Err(AbiError::ShortData { .. })));
}

// =============================================================================
// Call builder tests
// =============================================================================

#[test]
fn test_counter_call_is_bare_selector() {
    assert_eq!(counter_call().len(), 4);
    assert_eq!(&counter_call()[..], &abi::selector("counter()"));
}

#[test]
fn test_will_details_call_carries_id_word() {
    let data = will_details_call(7);
    assert_eq!(data.len(), 4 + 32);
    assert_eq!(&data[4..], &abi::u64_word(7));
}

#[test]
fn test_create_will_call_layout() {
    let owner = address!("00000000000000000000000000000000000000aa");
    let data = create_will_call(owner, 100);
    assert_eq!(data.len(), 4 + 64);
    assert_eq!(&data[..4], &abi::selector("createWill(address,uint256)"));
    assert_eq!(&data[4..36], &abi::address_word(owner));
    assert_eq!(&data[36..], &abi::u64_word(100));
}

#[test]
fn test_confirm_life_call_layout() {
    let data = confirm_life_call(3);
    assert_eq!(&data[..4], &abi::selector("confirmLife(uint256)"));
    assert_eq!(&data[4..], &abi::u64_word(3));
}

#[test]
fn test_decode_counter() {
    assert_eq!(decode_counter(&abi::u64_word(42)).unwrap(), 42);
    assert!(decode_counter(&[]).is_err());
}

// =============================================================================
// WillRecord tests
// =============================================================================

#[test]
fn test_will_record_decode_from_hand_built_words() {
    let owner = address!("00000000000000000000000000000000000000aa");
    let mut data = Vec::new();
    data.extend_from_slice(&abi::address_word(owner));
    data.extend_from_slice(&abi::u64_word(100)); // frequency
    data.extend_from_slice(&abi::u64_word(50)); // lastConfirmationBlock
    data.extend_from_slice(&abi::u64_word(160)); // fileUrl offset
    data.extend_from_slice(&abi::bool_word(true));
    data.extend_from_slice(&abi::u64_word(5)); // string length
    let mut padded = [0u8; 32];
    padded[..5].copy_from_slice(b"hello");
    data.extend_from_slice(&padded);

    let record = WillRecord::abi_decode(&data).unwrap();
    assert_eq!(record.owner, owner);
    assert_eq!(record.frequency_blocks, 100);
    assert_eq!(record.last_confirmation_block, 50);
    assert_eq!(record.file_url, "hello");
    assert!(record.is_active);
}

#[test]
fn test_will_record_encode_decode() {
    let record = sample_record();
    assert_eq!(WillRecord::abi_decode(&record.abi_encode()).unwrap(), record);

    // Empty file URL still pads cleanly.
    let record = WillRecord { file_url: String::new(), ..sample_record() };
    assert_eq!(WillRecord::abi_decode(&record.abi_encode()).unwrap(), record);
}

#[test]
fn test_will_record_decode_rejects_truncated_data() {
    let mut data = sample_record().abi_encode();
    data.truncate(3 * 32);
    assert!(WillRecord::abi_decode(&data).is_err());
}

#[test]
fn test_blocks_remaining_arithmetic() {
    let record = sample_record(); // last=50, frequency=100

    // Chain head 120 leaves 30 blocks on the cadence.
    assert_eq!(record.blocks_remaining(120), 30);

    // Exact expiry boundary and past-expiry are signed.
    assert_eq!(record.blocks_remaining(150), 0);
    assert_eq!(record.blocks_remaining(200), -50);
}

#[test]
fn test_record_serializes_camel_case() {
    let json = serde_json::to_value(sample_record()).unwrap();
    assert!(json.get("lastConfirmationBlock").is_some());
    assert!(json.get("frequencyBlocks").is_some());
    assert!(json.get("isActive").is_some());
}
