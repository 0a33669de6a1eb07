use ::thiserror::Error;

use crate::parse::error::ParseErr;
use crate::scan::error::ScanErr;
use crate::GenerationNumber;
use crate::Offset;

pub(crate) type XRefResult<T> = Result<T, XRefErr>;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum XRefErr {
    #[error("Scan: {0}")]
    Scan(#[from] ScanErr),
    #[error("Parse: {0}")]
    Parse(#[from] ParseErr),
    #[error("In-use object 0. Generation: {generation_number}. Offset: {offset}")]
    InUseObjectZero {
        generation_number: GenerationNumber,
        offset: Offset,
    },
    #[error("Unparsed data after the last subsection: {0}")]
    TrailingData(String),
    #[error("Trailer keyword not found")]
    TrailerNotFound,
    #[error("Trailer entry /{key}. Found: {value}")]
    TrailerEntry { key: &'static str, value: String },
}
