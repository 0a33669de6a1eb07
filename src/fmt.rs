use crate::parse::character_set::is_white_space;
use crate::Byte;
use crate::MAX_DEBUG_BYTES;

/// Render bytes for error messages: printable ASCII and white space are kept
/// as they are, everything else is shown as `\xNN`.
pub(crate) fn debug_bytes(bytes: &[Byte]) -> String {
    let mut result = String::with_capacity(bytes.len().min(MAX_DEBUG_BYTES));
    for &byte in bytes.iter().take(MAX_DEBUG_BYTES) {
        if byte.is_ascii_graphic() || is_white_space(byte) {
            result.push(char::from(byte));
        } else {
            result.push_str(&format!("\\x{:02X}", byte));
        }
    }
    if MAX_DEBUG_BYTES < bytes.len() {
        result.push_str("...");
    }
    result
}

/// Same as [`debug_bytes`] for text in the hex domain. Invalid hex is shown
/// verbatim.
pub(crate) fn debug_hex(hex: &str) -> String {
    match ::hex::decode(hex) {
        Ok(bytes) => debug_bytes(&bytes),
        Err(_) => hex.chars().take(2 * MAX_DEBUG_BYTES).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_bytes_valid() {
        assert_eq!(debug_bytes(b"1 0 obj\r\n"), "1 0 obj\r\n");
        assert_eq!(debug_bytes(b"\xE2\xE3%"), "\\xE2\\xE3%");
        let long = [b'a'; MAX_DEBUG_BYTES + 1];
        assert!(debug_bytes(&long).ends_with("a..."));
    }

    #[test]
    fn debug_hex_valid() {
        assert_eq!(debug_hex("747261696c6572"), "trailer");
        assert_eq!(debug_hex("7g"), "7g");
    }
}
