use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use super::error::XRefErr;
use super::error::XRefResult;
use crate::object::reference::Reference;
use crate::object::value::skip_white_space_or_comment;
use crate::object::value::Dictionary;
use crate::object::value::Value;
use crate::parse::Parser;
use crate::parse::KW_TRAILER;
use crate::scan::hex::find_literal;
use crate::scan::hex::hex_to_bytes;
use crate::scan::hex::to_hex;
use crate::scan::hex::HEX_TRAILER;
use crate::scan::reader::BoundedReader;
use crate::scan::FromHex;
use crate::Offset;
use crate::TRAILER_TAIL_DISTANCE;
use crate::TRAILER_WINDOW;

const KEY_SIZE: &str = "Size";
const KEY_PREV: &str = "Prev";
const KEY_ROOT: &str = "Root";
const KEY_INFO: &str = "Info";
const KEY_ENCRYPT: &str = "Encrypt";

/// The entries of a trailer dictionary this crate cares about. Zero values
/// stand for absent entries.
/// REFERENCE: [7.5.5 File trailer, p58-59]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct TrailerSection {
    pub size: u64,
    pub prev: Offset,
    pub root: Reference,
    pub info: Reference,
    pub encrypt: bool,
}

impl Display for TrailerSection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} << /Size {}", KW_TRAILER, self.size)?;
        if self.prev != 0 {
            write!(f, " /Prev {}", self.prev)?;
        }
        if self.root.is_present() {
            write!(f, " /Root {}", self.root)?;
        }
        if self.info.is_present() {
            write!(f, " /Info {}", self.info)?;
        }
        if self.encrypt {
            write!(f, " /Encrypt ...")?;
        }
        write!(f, " >>")
    }
}

impl TrailerSection {
    /// Nothing was found: no document catalog and no earlier section.
    pub fn is_empty(&self) -> bool {
        !self.root.is_present() && self.prev == 0
    }
}

/// The hex text must start with the `trailer` keyword. A keyword further
/// in may belong to a later revision.
impl FromHex for TrailerSection {
    type Error = XRefErr;

    fn from_hex(hex: &str) -> Result<Self, Self::Error> {
        if !hex.starts_with(HEX_TRAILER.as_str()) {
            return Err(XRefErr::TrailerNotFound);
        }
        decode_after_keyword(hex, 0)
    }
}

/// Decodes the dictionary that follows the `trailer` keyword found at hex
/// position `keyword`.
fn decode_after_keyword(hex: &str, keyword: usize) -> XRefResult<TrailerSection> {
    let bytes = hex_to_bytes(&hex[keyword + HEX_TRAILER.len()..])?;
    let (_, dictionary) = Dictionary::parse(skip_white_space_or_comment(&bytes))?;

    let number = |key: &'static str| -> XRefResult<u64> {
        match dictionary.get(key) {
            None => Ok(0),
            Some(value) => value.as_u64().ok_or_else(|| entry_error(key, value)),
        }
    };
    let reference = |key: &'static str| -> XRefResult<Reference> {
        match dictionary.get(key) {
            None => Ok(Reference::default()),
            Some(value) => value.as_reference().ok_or_else(|| entry_error(key, value)),
        }
    };
    let prev = number(KEY_PREV)?;
    Ok(TrailerSection {
        size: number(KEY_SIZE)?,
        prev: Offset::try_from(prev).map_err(|_| XRefErr::TrailerEntry {
            key: KEY_PREV,
            value: prev.to_string(),
        })?,
        root: reference(KEY_ROOT)?,
        info: reference(KEY_INFO)?,
        encrypt: dictionary.contains_key(KEY_ENCRYPT),
    })
}

fn entry_error(key: &'static str, value: &Value) -> XRefErr {
    XRefErr::TrailerEntry {
        key,
        value: value.to_string(),
    }
}

/// Decodes the trailer whose keyword opens the window at `offset`, once
/// white space and comments are skipped. Failures are handed back next to
/// an empty trailer rather than propagated.
pub(crate) fn locate(reader: &BoundedReader, offset: Offset) -> (TrailerSection, Option<XRefErr>) {
    let window = reader.read(offset, TRAILER_WINDOW);
    log::debug!(
        "Trailer: Reading {} bytes at {}. End of buffer: {}",
        window.bytes.len(),
        offset,
        window.end_of_buffer
    );
    let bytes = skip_white_space_or_comment(window.bytes);
    match TrailerSection::from_hex(&to_hex(bytes)) {
        Ok(trailer) => (trailer, None),
        Err(err) => (TrailerSection::default(), Some(err)),
    }
}

/// The last trailer of the document, searched for in the tail of the
/// buffer. Returns the offset of its `trailer` keyword, or the offset of
/// the tail window when none was found.
pub(crate) fn locate_terminal(reader: &BoundedReader) -> (Offset, TrailerSection, Option<XRefErr>) {
    let offset = reader.len().saturating_sub(TRAILER_TAIL_DISTANCE);
    let window = reader.read(offset, TRAILER_WINDOW);
    let hex = to_hex(window.bytes);
    let mut last = None;
    let mut from = 0;
    while let Some(position) = find_literal(&hex, &HEX_TRAILER, from) {
        last = Some(position);
        from = position + HEX_TRAILER.len();
    }
    match last {
        Some(position) => {
            let offset = offset + position / 2;
            log::debug!("Trailer: Terminal trailer at {}", offset);
            match decode_after_keyword(&hex, position) {
                Ok(trailer) => (offset, trailer, None),
                Err(err) => (offset, TrailerSection::default(), Some(err)),
            }
        }
        None => (offset, TrailerSection::default(), Some(XRefErr::TrailerNotFound)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::error::ParseErr;

    #[test]
    fn trailer_valid() {
        let hex = to_hex(
            b"trailer\r\n<< /Size 22 /Root 2 0 R /Info 1 0 R /ID [<81b14aafa313db63dbd6f981e49f94f4> <81b14aafa313db63dbd6f981e49f94f4>] /Prev 408 >>\r\nstartxref\r\n18799\r\n%%EOF",
        );
        let trailer = TrailerSection::from_hex(&hex).unwrap();
        assert_eq!(
            trailer,
            TrailerSection {
                size: 22,
                prev: 408,
                root: Reference::new(2, 0),
                info: Reference::new(1, 0),
                encrypt: false,
            }
        );
        assert!(!trailer.is_empty());

        let hex = to_hex(b"trailer<</Size 3/Encrypt 9 0 R>>");
        let trailer = TrailerSection::from_hex(&hex).unwrap();
        assert!(trailer.encrypt);
        assert!(trailer.is_empty());
    }

    #[test]
    fn trailer_invalid() {
        assert_eq!(
            TrailerSection::from_hex(&to_hex(b"startxref\n0\n%%EOF")),
            Err(XRefErr::TrailerNotFound)
        );
        // The keyword must come first
        assert_eq!(
            TrailerSection::from_hex(&to_hex(b"0000000015 00000 n \ntrailer<</Size 3>>")),
            Err(XRefErr::TrailerNotFound)
        );
        assert_eq!(
            TrailerSection::from_hex(&to_hex(b"trailer << /Size 3 /Root (1 0 R) >>")),
            Err(XRefErr::TrailerEntry {
                key: KEY_ROOT,
                value: "(1 0 R)".to_string()
            })
        );
        assert_eq!(
            TrailerSection::from_hex(&to_hex(b"trailer << /Size 3 /Prev -5 >>")),
            Err(XRefErr::TrailerEntry {
                key: KEY_PREV,
                value: "-5".to_string()
            })
        );
        assert!(matches!(
            TrailerSection::from_hex(&to_hex(b"trailer << /Size 3 /Root 1 0 R")),
            Err(XRefErr::Parse(ParseErr::Failure(_)))
        ));
    }

    #[test]
    fn locate_valid() {
        let buffer = b"%PDF-1.4\nxref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 /Root 1 0 R >>\nstartxref\n9\n%%EOF\n";
        let reader = BoundedReader::new(buffer);
        let (trailer, err) = locate(&reader, 38);
        assert_eq!(err, None);
        assert_eq!(trailer.root, Reference::new(1, 0));

        // Leading white space is skipped, anything else is not
        let (trailer, err) = locate(&reader, 36);
        assert_eq!(err, None);
        assert_eq!(trailer.root, Reference::new(1, 0));
        let (trailer, err) = locate(&reader, 18);
        assert_eq!(trailer, TrailerSection::default());
        assert_eq!(err, Some(XRefErr::TrailerNotFound));

        let (trailer, err) = locate(&reader, buffer.len() + 10);
        assert_eq!(trailer, TrailerSection::default());
        assert_eq!(err, Some(XRefErr::TrailerNotFound));
    }

    #[test]
    fn locate_terminal_valid() {
        // Two revisions: the last trailer wins
        let buffer = b"%PDF-1.4\ntrailer\n<< /Size 1 >>\nstartxref\n9\n%%EOF\ntrailer\n<< /Size 2 /Prev 9 >>\nstartxref\n48\n%%EOF\n";
        let reader = BoundedReader::new(buffer);
        let (offset, trailer, err) = locate_terminal(&reader);
        assert_eq!(err, None);
        assert_eq!(&buffer[offset..offset + 7], b"trailer");
        assert_eq!(trailer.size, 2);
        assert_eq!(trailer.prev, 9);
    }
}
