use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::ops::Deref;
use ::thiserror::Error;

use crate::header::error::HeaderErr;
use crate::object::error::ObjectErr;
use crate::object::reference::Reference;
use crate::xref::error::XRefErr;
use crate::ObjectNumber;
use crate::Offset;

pub type PdfResult<T> = Result<T, PdfError>;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum PdfError {
    #[error("Version not found. Error: {0}")]
    VersionNotFound(#[from] HeaderErr),
    #[error("Cross-reference offset not found in the file trailer")]
    XrefOffsetNotFound,
    #[error("Invalid cross-reference offset: {0}")]
    InvalidXrefOffset(Offset),
    #[error("Cross-reference chain cycle. Offset {0} was already visited")]
    XrefChainCycle(Offset),
    #[error("Cross-reference chain longer than {0} sections")]
    XrefChainTooLong(usize),
    #[error("Object {0} not found in the cross-reference tables")]
    ObjectNotFound(ObjectNumber),
    #[error("Object {0}: Invalid offset {1}")]
    InvalidOffset(ObjectNumber, Offset),
    #[error("Object {object_number} at offset {offset}: {code}")]
    MalformedObject {
        object_number: ObjectNumber,
        offset: Offset,
        code: MalformedCode,
    },
    #[error("Object {0} exceeds {1} bytes")]
    ObjectTooLarge(ObjectNumber, usize),
    #[error("No trailer references a document catalog")]
    RootNotFound,
    #[error("No trailer references a document information dictionary")]
    InfoNotFound,
    #[error("Trailer at offset {0}. Error: {1}")]
    TrailerDecodeFailed(Offset, XRefErr),
    #[error("Cross-reference section at offset {0}. Error: {1}")]
    XrefSectionDecodeFailed(Offset, XRefErr),
    #[error("Metadata {0}. Error: {1}")]
    MetadataDecodeFailed(Reference, Box<PdfError>),
    // ::std::io::Error does not implement PartialEq or Clone
    #[error("Read. File: {0}. Error: {1}")]
    Io(String, String),
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum MalformedCode {
    #[error("Missing obj keyword")]
    MissingObj,
    #[error("Missing endobj keyword before the end of the buffer")]
    MissingEndObj,
    #[error("Decode: {0}")]
    Decode(ObjectErr),
}

/// Every non-fatal failure of a parse, in the order encountered.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Diagnostics(Vec<PdfError>);

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        writeln!(f, "Number of diagnostics: {}", self.0.len())?;
        for err in &self.0 {
            writeln!(f, "{}", err)?;
        }
        Ok(())
    }
}

mod convert {
    use super::*;

    impl Diagnostics {
        /// Records a non-fatal failure.
        pub(crate) fn push(&mut self, err: PdfError) {
            log::warn!("{}", err);
            self.0.push(err);
        }

        pub(crate) fn extend(&mut self, other: Diagnostics) {
            self.0.extend(other.0);
        }
    }

    impl Deref for Diagnostics {
        type Target = Vec<PdfError>;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl From<Vec<PdfError>> for Diagnostics {
        fn from(value: Vec<PdfError>) -> Self {
            Self(value)
        }
    }
}
