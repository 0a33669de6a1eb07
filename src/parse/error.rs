use ::nom::error::ErrorKind;
use ::thiserror::Error;

use crate::fmt::debug_bytes;
use crate::Byte;
use crate::ObjectNumber;

pub(crate) type ParseResult<T> = Result<T, ParseErr>;
/// Recoverable parsing error
/// The parser could not recognise the value type, and the buffer may be
/// handed to another parser
pub(crate) type ParseRecoverable = ParseError<true>;
/// Unrecoverable parsing error
/// The parser recognised the value type but failed to parse it completely
pub(crate) type ParseFailure = ParseError<false>;

// The decoders run over temporary buffers decoded from the hex domain, so the
// offending bytes are kept as their debug rendering rather than borrowed.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseErr {
    #[error("Parse Recoverable: {0}")]
    Recoverable(ParseRecoverable),
    #[error("Parse Failure: {0}")]
    Failure(ParseFailure),
}

#[derive(Debug, Error, PartialEq, Clone)]
#[error("{object}. Error: {code}. Buffer: {buffer}")]
pub struct ParseError<const RECOVERABLE: bool> {
    buffer: String,
    object: &'static str,
    code: ParseErrorCode,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseErrorCode {
    #[error("Not found. Nom: {}", .0.description())]
    NotFound(ErrorKind),
    #[error("Missing closing. Nom: {}", .0.description())]
    MissingClosing(ErrorKind),
    #[error("Stream data. Nom: {}", .0.description())]
    StreamData(ErrorKind),
    #[error("Missing value. Key: {0}. Parse: {1}")]
    RecMissingValue(String, Box<ParseErrorCode>),
    #[error("Missing closing. Parse: {0}")]
    RecMissingClosing(Box<ParseErrorCode>),
    #[error(
        "Entry number {} in subsection {} {}. Parse: {}",
        index,
        first_object_number,
        entry_count,
        code
    )]
    SubsectionEntry {
        index: usize,
        first_object_number: ObjectNumber,
        entry_count: usize,
        code: Box<ParseErrorCode>,
    },
    #[error("Object number")]
    ObjectNumber,
    #[error("Generation number")]
    GenerationNumber,
    #[error("First object number")]
    FirstObjectNumber,
    #[error("Entry count")]
    EntryCount,
    #[error("Offset")]
    Offset,
    #[error("Parse as i64")]
    ParseIntError,
    #[error("Parse as f64")]
    ParseFloatError,
    #[error("Hexadecimal digit")]
    HexDigit,
    #[error("Nesting deeper than {0} levels")]
    NestingDepth(usize),
}

#[macro_export]
macro_rules! parse_failure {
    ($e:ident, $failure:expr) => {
        |err| match err {
            NomErr::Incomplete(_) => unreachable!(
                "::nom::complete functions do not return the Incomplete error variant."
            ),
            NomErr::Error($e) | NomErr::Failure($e) => ParseErr::Failure($failure),
        }
    };
}

#[macro_export]
macro_rules! parse_recoverable {
    ($e:ident, $error:expr) => {
        |err| match err {
            NomErr::Incomplete(_) => unreachable!(
                "::nom::complete functions do not return the Incomplete error variant."
            ),
            NomErr::Error($e) | NomErr::Failure($e) => ParseErr::Recoverable($error),
        }
    };
}

mod convert {
    use super::*;

    impl From<ParseFailure> for ParseErr {
        fn from(value: ParseFailure) -> Self {
            Self::Failure(value)
        }
    }

    impl From<ParseRecoverable> for ParseErr {
        fn from(value: ParseRecoverable) -> Self {
            Self::Recoverable(value)
        }
    }

    impl<const RECOVERABLE: bool> ParseError<RECOVERABLE> {
        pub(crate) fn new(buffer: &[Byte], object: &'static str, code: ParseErrorCode) -> Self {
            Self {
                buffer: debug_bytes(buffer),
                object,
                code,
            }
        }
    }

    impl ParseErr {
        pub(crate) fn code(self) -> ParseErrorCode {
            match self {
                Self::Recoverable(err) => err.code,
                Self::Failure(err) => err.code,
            }
        }
    }
}
