pub mod error;

use ::once_cell::sync::Lazy;
use ::regex::Regex;
use ::std::collections::BTreeSet;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;
use ::std::fs::File;
use ::std::io::BufReader;
use ::std::path::Path;

use self::error::Diagnostics;
use self::error::MalformedCode;
use self::error::PdfError;
use self::error::PdfResult;
use crate::header::Version;
use crate::object::catalog::InfoObject;
use crate::object::catalog::Metadata;
use crate::object::catalog::RootObject;
use crate::object::error::ObjectErr;
use crate::object::error::ObjectResult;
use crate::object::indirect::IndirectObject;
use crate::object::reference::Reference;
use crate::object::resolver::lookup;
use crate::object::resolver::resolve;
use crate::scan::hex::byte_at;
use crate::scan::hex::find_marker;
use crate::scan::hex::to_hex;
use crate::scan::reader::BoundedReader;
use crate::scan::FromHex;
use crate::xref::chain;
use crate::xref::startxref::find_xref_offset;
use crate::xref::trailer;
use crate::xref::trailer::TrailerSection;
use crate::xref::XrefTable;
use crate::Byte;
use crate::Offset;
use crate::MAX_CHAIN_LENGTH;
use crate::MAX_DECODED_SIZE;
use crate::MAX_OBJECT_SIZE;
use crate::MAX_SECTION_SIZE;
use crate::PAGE_COUNT_OVERLAP;
use crate::PAGE_COUNT_WINDOW;
use crate::VERSION_WINDOW;

/// `/Type /Page`, with or without the space before the second name.
static PAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"2f54797065(?:20)?2f50616765").expect("valid page pattern"));

/// Upper bounds on the work done for a single buffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Limits {
    /// Bytes read for one object before giving up with `ObjectTooLarge`.
    pub max_object_size: usize,
    /// Bytes scanned for one cross-reference section.
    pub max_section_size: usize,
    /// Sections followed through `/Prev` from a single start.
    pub max_chain_length: usize,
    /// Bytes a stream may decode to, after its filters are applied.
    pub max_decoded_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_object_size: MAX_OBJECT_SIZE,
            max_section_size: MAX_SECTION_SIZE,
            max_chain_length: MAX_CHAIN_LENGTH,
            max_decoded_size: MAX_DECODED_SIZE,
        }
    }
}

/// REFERENCE: [7.5 File structure, p53-66]
/// The structural metadata of a document. `xref_tables` and `trailers` are
/// paired: index `i` of both comes from the same section, newest first.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct DocumentInfo {
    pub version: Option<Version>,
    pub pages: usize,
    pub original_xref_offset: Offset,
    /// The trailer found in the tail of the buffer.
    pub original_trailer: TrailerSection,
    pub xref_tables: Vec<XrefTable>,
    pub trailers: Vec<TrailerSection>,
    pub root: Option<RootObject>,
    pub info: Option<InfoObject>,
    pub metadata: Option<Metadata>,
}

impl Display for DocumentInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.version {
            Some(version) => write!(f, "Version: {}", version)?,
            None => write!(f, "Version: -")?,
        }
        write!(
            f,
            " Pages: {} XRef tables: {} Root: {} Info: {}",
            self.pages,
            self.xref_tables.len(),
            self.root.is_some(),
            self.info.is_some()
        )?;
        match &self.metadata {
            Some(metadata) => write!(f, " Metadata: {} bytes", metadata.xmp.len()),
            None => write!(f, " Metadata: -"),
        }
    }
}

/// Outcome of a parse. `info` holds whatever was assembled before `error`
/// stopped the parse.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct ParseReport {
    pub info: DocumentInfo,
    pub diagnostics: Diagnostics,
    pub error: Option<PdfError>,
}

impl ParseReport {
    pub fn status(&self) -> Result<&DocumentInfo, &PdfError> {
        match &self.error {
            Some(err) => Err(err),
            None => Ok(&self.info),
        }
    }
}

/// Extracts the structural metadata of `buffer`. Fatal failures end the
/// parse early and are reported next to the partial result.
pub fn parse(buffer: &[Byte], limits: &Limits) -> ParseReport {
    let mut report = ParseReport::default();
    if let Err(err) = assemble(buffer, limits, &mut report) {
        report.error = Some(err);
    }
    report
}

fn assemble(buffer: &[Byte], limits: &Limits, report: &mut ParseReport) -> PdfResult<()> {
    let reader = BoundedReader::new(buffer);
    let ParseReport {
        info, diagnostics, ..
    } = report;

    let header = reader.read(0, VERSION_WINDOW);
    info.version = Some(Version::from_hex(&to_hex(header.bytes))?);
    info.pages = count_pages(&reader);

    let startxref = find_xref_offset(&reader)?;
    info.original_xref_offset = startxref;
    log::debug!(
        "Document: Version {:?}. Pages: {}. Cross-reference offset: {}",
        info.version,
        info.pages,
        startxref
    );

    let (offset, terminal, err) = trailer::locate_terminal(&reader);
    if let Some(err) = err {
        diagnostics.push(PdfError::TrailerDecodeFailed(offset, err));
    }
    info.original_trailer = terminal;

    let (link, link_diagnostics) = chain::walk(&reader, startxref, true, limits)?;
    diagnostics.extend(link_diagnostics);
    let prev = link.trailer.prev;
    info.xref_tables.push(link.table);
    info.trailers.push(link.trailer);

    let mut walked = BTreeSet::from([startxref]);
    for start in [terminal.prev, prev] {
        let chain = chain::follow(&reader, start, startxref, &mut walked, limits);
        diagnostics.extend(chain.diagnostics);
        for link in chain.links {
            info.xref_tables.push(link.table);
            info.trailers.push(link.trailer);
        }
        if let Some(err) = chain.error {
            return Err(err);
        }
    }
    log::debug!(
        "Document: {} cross-reference sections",
        info.xref_tables.len()
    );

    let root = first_present(info, |trailer| trailer.root).ok_or(PdfError::RootNotFound)?;
    let narrow = |object: &IndirectObject| RootObject::try_from(object);
    let root = decode(&reader, root, &info.xref_tables, limits, narrow)?;
    let metadata = root.metadata;
    info.root = Some(root);

    let info_reference =
        first_present(info, |trailer| trailer.info).ok_or(PdfError::InfoNotFound)?;
    let narrow = |object: &IndirectObject| InfoObject::try_from(object);
    info.info = Some(decode(&reader, info_reference, &info.xref_tables, limits, narrow)?);

    if metadata.is_present() {
        let narrow = |object: &IndirectObject| Metadata::decode(object, limits.max_decoded_size);
        match decode(&reader, metadata, &info.xref_tables, limits, narrow) {
            Ok(metadata) => info.metadata = Some(metadata),
            Err(err) => {
                diagnostics.push(PdfError::MetadataDecodeFailed(metadata, Box::new(err)));
            }
        }
    }
    Ok(())
}

/// The first reference `select` finds in the chain trailers, newest first,
/// then in the terminal trailer.
fn first_present(
    info: &DocumentInfo,
    select: impl Fn(&TrailerSection) -> Reference,
) -> Option<Reference> {
    info.trailers
        .iter()
        .chain(::std::iter::once(&info.original_trailer))
        .map(select)
        .find(Reference::is_present)
}

/// Resolves `reference` and narrows the object with `narrow`.
fn decode<T>(
    reader: &BoundedReader,
    reference: Reference,
    tables: &[XrefTable],
    limits: &Limits,
    narrow: impl FnOnce(&IndirectObject) -> ObjectResult<T>,
) -> PdfResult<T> {
    let object_number = reference.object_number();
    let offset = lookup(object_number, tables)?.offset;
    let malformed = |err: ObjectErr| PdfError::MalformedObject {
        object_number,
        offset,
        code: MalformedCode::Decode(err),
    };
    let raw = resolve(reader, object_number, tables, limits)?;
    let object =
        IndirectObject::try_from(raw).map_err(|err| malformed(ObjectErr::new(reference, err)))?;
    if object.reference() != reference {
        log::debug!(
            "Document: Expected object {}, found {}",
            reference,
            object.reference()
        );
    }
    narrow(&object).map_err(malformed)
}

/// Occurrences of `/Type /Page`, excluding `/Type /Pages`. Consecutive
/// windows overlap, and a match is counted in the window it starts in,
/// unless it starts in the overlap, which the next window covers.
fn count_pages(reader: &BoundedReader) -> usize {
    let step = PAGE_COUNT_WINDOW - PAGE_COUNT_OVERLAP;
    let mut pages = 0;
    for window in reader.overlapping_windows(0, PAGE_COUNT_WINDOW, step) {
        let hex = to_hex(window.bytes);
        pages += find_marker(&PAGE, &hex)
            .into_iter()
            .filter(|(start, _)| window.end_of_buffer || start / 2 < step)
            .filter(|(_, end)| matches!(byte_at(&hex, *end), Some(next) if next != b's'))
            .count();
    }
    log::debug!("Document: Counted {} pages", pages);
    pages
}

/// Holds a document buffer and the limits its parse runs with.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    buffer: Vec<Byte>,
    limits: Limits,
}

impl PdfBuilder {
    pub fn parse(&self) -> ParseReport {
        parse(&self.buffer, &self.limits)
    }

    pub fn buffer(&self) -> &[Byte] {
        &self.buffer
    }
}

mod convert {
    use ::std::io::Read;

    use super::*;

    impl PdfBuilder {
        pub fn new(path: &Path) -> PdfResult<Self> {
            let io_error =
                |err: ::std::io::Error| PdfError::Io(path.display().to_string(), err.to_string());
            let file = File::open(path).map_err(io_error)?;
            let mut reader = BufReader::new(file);
            let mut buffer = Vec::default();
            reader.read_to_end(&mut buffer).map_err(io_error)?;
            Ok(Self::from_bytes(buffer))
        }

        pub fn from_bytes(buffer: Vec<Byte>) -> Self {
            Self {
                buffer,
                limits: Limits::default(),
            }
        }

        pub fn with_limits(mut self, limits: Limits) -> Self {
            self.limits = limits;
            self
        }
    }
}
