mod fmt;
mod header;
pub mod object;
mod parse;
pub mod pdf;
mod scan;
pub mod xref;

pub use self::header::Version;
pub use self::object::catalog::InfoObject;
pub use self::object::catalog::Metadata;
pub use self::object::catalog::RootObject;
pub use self::pdf::error::Diagnostics;
pub use self::pdf::error::PdfError;
pub use self::pdf::error::PdfResult;
pub use self::pdf::parse;
pub use self::pdf::DocumentInfo;
pub use self::pdf::Limits;
pub use self::pdf::ParseReport;
pub use self::pdf::PdfBuilder;
pub use self::xref::trailer::TrailerSection;
pub use self::xref::XrefEntry;
pub use self::xref::XrefTable;

const MAX_DEBUG_BYTES: usize = 100;

/// The header line `%PDF-x.y` fits in the first 15 bytes, leaving room for a
/// byte-order mark or stray whitespace.
const VERSION_WINDOW: usize = 15;
const PAGE_COUNT_WINDOW: usize = 300;
/// Long enough for `/Type /Page` plus the byte that must follow it.
const PAGE_COUNT_OVERLAP: usize = 16;
/// REFERENCE: [7.5.5 File trailer, p58]
/// Conforming readers look for `%%EOF` within the last 1024 bytes.
const STARTXREF_WINDOW: usize = 1024;
const TRAILER_WINDOW: usize = 600;
/// The terminal trailer is searched for starting this many bytes before the
/// end of the buffer.
const TRAILER_TAIL_DISTANCE: usize = 300;
const XREF_WINDOW: usize = 100;
const OBJECT_WINDOW: usize = 100;

const MAX_OBJECT_SIZE: usize = 16 << 20;
const MAX_SECTION_SIZE: usize = 64 << 20;
const MAX_DECODED_SIZE: usize = 64 << 20;
const MAX_CHAIN_LENGTH: usize = 4096;
/// Arrays and dictionaries nested deeper than this are rejected.
const MAX_NESTING_DEPTH: usize = 128;

/// [7.5.4 Cross-reference table, p56] restricts bytes offsets to 10 digits,
/// allowing for ~9.3 GiB files. We need to index the buffer, so `usize` it
/// is.
pub type Offset = usize;
/// REFERENCE: [3.33 indirect object, p10]
/// Object numbers are positive integers, 0 is reserved for the head of the
/// free list and is used here to mean "absent".
pub type ObjectNumber = u64;
/// REFERENCE: [7.5.4 Cross-reference table, p56-57]
/// Generation numbers are restricted to 5 digits with a maximum of 65,535.
pub type GenerationNumber = u16;
/// REFERENCE: [4.7 byte, p7]
type Byte = u8;
