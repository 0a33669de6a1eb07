use ::std::collections::BTreeSet;

use super::error::XRefErr;
use super::trailer;
use super::trailer::TrailerSection;
use super::XrefTable;
use crate::pdf::error::Diagnostics;
use crate::pdf::error::PdfError;
use crate::pdf::error::PdfResult;
use crate::pdf::Limits;
use crate::scan::hex::is_trailer_boundary;
use crate::scan::hex::is_xref_trailer_shape;
use crate::scan::hex::split_at_trailer_boundary;
use crate::scan::hex::to_hex;
use crate::scan::hex::BOUNDARY_OVERLAP;
use crate::scan::reader::BoundedReader;
use crate::scan::FromHex;
use crate::Offset;
use crate::XREF_WINDOW;

/// One cross-reference section and the trailer that follows it.
#[derive(Debug, Default, PartialEq, Clone)]
pub(crate) struct Link {
    pub(crate) table: XrefTable,
    pub(crate) trailer: TrailerSection,
}

/// The links reached by following `/Prev` from one start offset.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Chain {
    pub(crate) links: Vec<Link>,
    pub(crate) diagnostics: Diagnostics,
    /// Set when the chain loops back on itself.
    pub(crate) error: Option<PdfError>,
}

/// Scans the section at `start` up to its trailer boundary and decodes it.
/// The trailer is decoded only when `want_trailer` is set, otherwise it is
/// left empty. Its keyword must open the boundary.
pub(crate) fn walk(
    reader: &BoundedReader,
    start: Offset,
    want_trailer: bool,
    limits: &Limits,
) -> PdfResult<(Link, Diagnostics)> {
    if start == 0 || start >= reader.len() {
        return Err(PdfError::InvalidXrefOffset(start));
    }
    let mut diagnostics = Diagnostics::default();
    let mut hex = String::default();
    for window in reader.windows(start, XREF_WINDOW) {
        // Patterns may straddle the previous window
        let from = hex.len().saturating_sub(BOUNDARY_OVERLAP);
        hex.push_str(&to_hex(window.bytes));
        let recent = &hex[from..];
        if is_trailer_boundary(recent) || is_xref_trailer_shape(recent) {
            break;
        }
        if hex.len() / 2 >= limits.max_section_size {
            log::debug!(
                "XRef: Section at {} exceeds {} bytes without a trailer",
                start,
                limits.max_section_size
            );
            break;
        }
    }
    let (xref_text, trailer_text) = split_at_trailer_boundary(&hex);
    let boundary = (!trailer_text.is_empty()).then_some(xref_text.len());
    log::debug!(
        "XRef: Scanned {} bytes at {}. Trailer boundary: {:?}",
        hex.len() / 2,
        start,
        boundary.map(|boundary| start + boundary / 2)
    );

    let table = match XrefTable::from_hex(xref_text) {
        Ok(table) => table.with_section_start(start),
        Err(err) => {
            diagnostics.push(PdfError::XrefSectionDecodeFailed(start, err));
            XrefTable::new(start)
        }
    };

    let trailer = match (want_trailer, boundary) {
        (false, _) => TrailerSection::default(),
        (true, Some(boundary)) => {
            let offset = start + boundary / 2;
            let (trailer, err) = trailer::locate(reader, offset);
            if let Some(err) = err {
                diagnostics.push(PdfError::TrailerDecodeFailed(offset, err));
            }
            trailer
        }
        (true, None) => {
            diagnostics.push(PdfError::TrailerDecodeFailed(start, XRefErr::TrailerNotFound));
            TrailerSection::default()
        }
    };
    Ok((Link { table, trailer }, diagnostics))
}

/// Follows `/Prev` from `start` until a section without one.
///
/// `anchor` is the section the chain hangs from, which the chain must not
/// return to. `walked` holds the offsets walked by earlier chains of the
/// same document: reaching one of them means this chain joined an earlier
/// one and ends there.
pub(crate) fn follow(
    reader: &BoundedReader,
    start: Offset,
    anchor: Offset,
    walked: &mut BTreeSet<Offset>,
    limits: &Limits,
) -> Chain {
    let mut chain = Chain::default();
    let mut visited = BTreeSet::from([anchor]);
    let mut next = start;
    while next != 0 {
        if visited.contains(&next) {
            chain.error = Some(PdfError::XrefChainCycle(next));
            break;
        }
        if walked.contains(&next) {
            log::debug!("XRef: Section at {} was already walked", next);
            break;
        }
        if chain.links.len() >= limits.max_chain_length {
            chain
                .diagnostics
                .push(PdfError::XrefChainTooLong(limits.max_chain_length));
            break;
        }
        visited.insert(next);
        walked.insert(next);

        match walk(reader, next, true, limits) {
            Ok((link, diagnostics)) => {
                chain.diagnostics.extend(diagnostics);
                // An undecodable trailer is empty and ends the chain
                next = link.trailer.prev;
                chain.links.push(link);
            }
            Err(err) => {
                chain.diagnostics.push(err);
                break;
            }
        }
    }
    chain
}
