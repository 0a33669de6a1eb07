//! Windowed access to the in-memory buffer and pattern matching over the
//! hexadecimal rendering of those windows.
//!
//! Matching never looks at raw bytes: every window is first rendered as
//! lowercase hex so that binary stream data cannot be mistaken for a
//! keyword, and every match must start on an even (byte-aligned) position.

pub(crate) mod hex;
pub(crate) mod reader;

/// Decoders that consume text in the hex domain.
pub(crate) trait FromHex: Sized {
    type Error;

    fn from_hex(hex: &str) -> Result<Self, Self::Error>;
}

pub(crate) mod error {
    use ::hex::FromHexError;
    use ::thiserror::Error;

    pub(crate) type ScanResult<T> = Result<T, ScanErr>;

    #[derive(Debug, Error, PartialEq, Clone)]
    pub enum ScanErr {
        #[error("Hex decode. Error: {0}")]
        Hex(#[from] FromHexError),
        #[error("Not ASCII text: {0}")]
        NotAscii(String),
        #[error("Not a decimal number: {0}")]
        NotDecimal(String),
    }
}
