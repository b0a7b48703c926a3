//! Helpers for converting values to and from hex strings

use crate::raw_err_str;

/// Convert a byte array to a hex string
pub fn bytes_to_hex_string(bytes: &[u8]) -> String {
    let encoded = hex::encode(bytes);
    format!("0x{encoded}")
}

/// Convert a hex string to a byte array
pub fn bytes_from_hex_string(hex: &str) -> Result<Vec<u8>, String> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    hex::decode(hex).map_err(raw_err_str!("error deserializing bytes from hex string: {}"))
}

/// Left-pad a big-endian byte string with zeros to the given width
///
/// Returns `None` if the input is wider than the requested width
pub fn left_pad_bytes(bytes: &[u8], width: usize) -> Option<Vec<u8>> {
    if bytes.len() > width {
        return None;
    }

    let mut padded = vec![0u8; width - bytes.len()];
    padded.extend_from_slice(bytes);
    Some(padded)
}
