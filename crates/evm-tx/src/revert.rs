//! Revert data decoding

use alloy::sol_types::decode_revert_reason;

/// Decode raw revert data (`Error(string)`, `Panic(uint256)`, custom errors).
pub fn decode_revert_data(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    decode_revert_reason(data)
}
