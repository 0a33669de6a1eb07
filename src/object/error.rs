use ::thiserror::Error;

use super::reference::Reference;
use crate::parse::error::ParseErr;

pub(crate) type ObjectResult<T> = Result<T, ObjectErr>;

#[derive(Debug, Error, PartialEq, Clone)]
#[error("Object {reference}. Error: {code}")]
pub struct ObjectErr {
    pub(crate) reference: Reference,
    pub(crate) code: ObjectErrorCode,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ObjectErrorCode {
    #[error("Parse: {0}")]
    Parse(#[from] ParseErr),
    #[error("Not a dictionary")]
    NotDictionary,
    #[error("Wrong type. Expected {expected}. Found: {found}")]
    Type {
        expected: &'static str,
        found: String,
    },
    #[error("Missing stream data")]
    MissingStream,
    #[error("Unsupported filter. Found: {0}")]
    UnsupportedFilter(String),
    // flate2 errors do not implement PartialEq
    #[error("Inflate: {0}")]
    Inflate(String),
    #[error("Decoded data exceeds {0} bytes")]
    DecodedLimit(usize),
}

mod convert {
    use super::*;

    impl ObjectErr {
        pub(crate) fn new(reference: Reference, code: impl Into<ObjectErrorCode>) -> Self {
            Self {
                reference,
                code: code.into(),
            }
        }
    }
}
