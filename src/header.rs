use ::once_cell::sync::Lazy;
use ::regex::Regex;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use self::error::HeaderErr;
use crate::fmt::debug_hex;
use crate::parse::MARKER_PDF;
use crate::scan::hex::captures_aligned;
use crate::scan::hex::hex_to_decimal;
use crate::scan::hex::to_hex;
use crate::scan::FromHex;

/// `%PDF-` followed by a single digit, a period and a single digit.
static VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{}(3[0-9])2e(3[0-9])",
        to_hex(MARKER_PDF.as_bytes())
    ))
    .expect("valid version pattern")
});

/// REFERENCE: [7.5.2 File header, p54-55]
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromHex for Version {
    type Error = HeaderErr;

    fn from_hex(hex: &str) -> Result<Self, Self::Error> {
        let captures = captures_aligned(&VERSION, hex, 0)
            .ok_or_else(|| HeaderErr::NotFound(debug_hex(hex)))?;
        // The pattern only captures single ASCII digits
        let digit = |index| {
            captures
                .get(index)
                .and_then(|digit| hex_to_decimal(digit.as_str()).ok())
                .and_then(|digit| u8::try_from(digit).ok())
                .ok_or_else(|| HeaderErr::NotFound(debug_hex(hex)))
        };
        Ok(Self {
            major: digit(1)?,
            minor: digit(2)?,
        })
    }
}

mod convert {
    use super::*;

    impl Version {
        pub fn new(major: u8, minor: u8) -> Self {
            Self { major, minor }
        }

        pub fn major(&self) -> u8 {
            self.major
        }

        pub fn minor(&self) -> u8 {
            self.minor
        }
    }
}

pub(crate) mod error {
    use ::thiserror::Error;

    #[derive(Debug, Error, PartialEq, Clone)]
    pub enum HeaderErr {
        #[error("Version marker not found. Header: {0}")]
        NotFound(String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_err_eq;
    use crate::scan::hex::to_hex;

    #[test]
    fn version_valid() {
        let hex = to_hex(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        assert_eq!(Version::from_hex(&hex), Ok(Version::new(1, 4)));

        let hex = to_hex(b"%PDF-2.0\r\n");
        assert_eq!(Version::from_hex(&hex).unwrap().to_string(), "2.0");

        // Garbage before the header is tolerated within the window
        let hex = to_hex(b"\xEF\xBB\xBF%PDF-1.7");
        assert_eq!(Version::from_hex(&hex), Ok(Version::new(1, 7)));
    }

    #[test]
    fn version_invalid() {
        let hex = to_hex(b"%PDF-x.y\n");
        assert_err_eq!(
            Version::from_hex(&hex),
            HeaderErr::NotFound("%PDF-x.y\n".to_string())
        );

        let hex = to_hex(b"%!PS-Adobe-3.0");
        assert!(Version::from_hex(&hex).is_err());
    }
}
