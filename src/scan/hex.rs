use ::once_cell::sync::Lazy;
use ::regex::Captures;
use ::regex::Regex;

use super::error::ScanErr;
use super::error::ScanResult;
use crate::parse::character_set::is_white_space;
use crate::parse::num::hex_val;
use crate::parse::KW_TRAILER;
use crate::Byte;

/// Hex rendering of the `trailer` keyword.
pub(crate) static HEX_TRAILER: Lazy<String> = Lazy::new(|| to_hex(KW_TRAILER.as_bytes()));

/// A cross-reference entry: 10 digits, a space, 5 digits, a space, the entry
/// type and a two-byte end of line.
/// REFERENCE: [7.5.4 Cross-reference table, p56-57]
static XREF_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:3[0-9]){10}20(?:3[0-9]){5}20(?:66|6e)(?:200d|200a|0d0a)")
        .expect("valid cross-reference entry pattern")
});

/// Longest pattern the boundary predicates look for, in hex characters: a
/// cross-reference entry plus the byte that follows it.
pub(crate) const BOUNDARY_OVERLAP: usize = 2 * 21;

pub(crate) fn to_hex(bytes: &[Byte]) -> String {
    ::hex::encode(bytes)
}

pub(crate) fn hex_to_bytes(hex: &str) -> ScanResult<Vec<Byte>> {
    Ok(::hex::decode(hex)?)
}

pub(crate) fn hex_to_text(hex: &str) -> ScanResult<String> {
    let bytes = hex_to_bytes(hex)?;
    if !bytes.is_ascii() {
        return Err(ScanErr::NotAscii(hex.to_string()));
    }
    // ASCII is valid UTF-8
    Ok(bytes.into_iter().map(char::from).collect())
}

/// Decodes a hex span holding ASCII decimal digits into a number.
pub(crate) fn hex_to_decimal(hex: &str) -> ScanResult<u64> {
    let text = hex_to_text(hex)?;
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ScanErr::NotDecimal(text));
    }
    text.parse().map_err(|_| ScanErr::NotDecimal(text))
}

/// The byte at hex position `index`, when the text holds a full byte there.
pub(crate) fn byte_at(hex: &str, index: usize) -> Option<Byte> {
    let pair = hex.as_bytes().get(index..index + 2)?;
    Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?)
}

/// Leftmost byte-aligned match of `pattern` at or after `from`.
pub(crate) fn find_aligned(pattern: &Regex, hex: &str, from: usize) -> Option<(usize, usize)> {
    let mut start = from;
    while start <= hex.len() {
        let found = pattern.find_at(hex, start)?;
        if found.start() % 2 == 0 {
            return Some((found.start(), found.end()));
        }
        start = found.start() + 1;
    }
    None
}

/// Same as [`find_aligned`] keeping the capture groups.
pub(crate) fn captures_aligned<'hex>(
    pattern: &Regex,
    hex: &'hex str,
    from: usize,
) -> Option<Captures<'hex>> {
    let mut start = from;
    while start <= hex.len() {
        let captures = pattern.captures_at(hex, start)?;
        let found = captures.get(0)?;
        if found.start() % 2 == 0 {
            return Some(captures);
        }
        start = found.start() + 1;
    }
    None
}

/// All non-overlapping byte-aligned matches of `pattern`.
pub(crate) fn find_marker(pattern: &Regex, hex: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::default();
    let mut from = 0;
    while let Some((start, end)) = find_aligned(pattern, hex, from) {
        spans.push((start, end));
        // Empty matches must still move forward
        from = if end > start { end } else { start + 2 };
    }
    spans
}

/// Byte-aligned position of a literal marker, given in the hex domain.
pub(crate) fn find_literal(hex: &str, marker: &str, from: usize) -> Option<usize> {
    let mut start = from;
    while let Some(found) = hex.get(start..)?.find(marker) {
        let position = start + found;
        if position % 2 == 0 {
            return Some(position);
        }
        start = position + 1;
    }
    None
}

/// The window holds the `trailer` keyword.
pub(crate) fn is_trailer_boundary(hex: &str) -> bool {
    find_literal(hex, &HEX_TRAILER, 0).is_some()
}

/// Position right after the last cross-reference entry of a run of entries
/// that is followed by something other than another subsection: the end of
/// the entry data even when no `trailer` keyword follows.
pub(crate) fn xref_trailer_shape(hex: &str, from: usize) -> Option<usize> {
    let mut from = from;
    while let Some((_, end)) = find_aligned(&XREF_ENTRY, hex, from) {
        match byte_at(hex, end) {
            Some(next) if !next.is_ascii_digit() && !is_white_space(next) => return Some(end),
            _ => from = end,
        }
    }
    None
}

pub(crate) fn is_xref_trailer_shape(hex: &str) -> bool {
    xref_trailer_shape(hex, 0).is_some()
}

/// Hex position where the cross-reference data ends and the trailer
/// begins, searching at or after `from`.
pub(crate) fn trailer_boundary(hex: &str, from: usize) -> Option<usize> {
    let from = from - from % 2;
    let keyword = find_literal(hex, &HEX_TRAILER, from);
    let shape = xref_trailer_shape(hex, from);
    match (keyword, shape) {
        (Some(keyword), Some(shape)) => Some(keyword.min(shape)),
        (keyword, shape) => keyword.or(shape),
    }
}

/// Splits accumulated hex text into cross-reference text and trailer text.
/// Without a boundary, everything is cross-reference text.
pub(crate) fn split_at_trailer_boundary(hex: &str) -> (&str, &str) {
    match trailer_boundary(hex, 0) {
        Some(boundary) => hex.split_at(boundary),
        None => (hex, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_hex_valid() {
        assert_eq!(to_hex(b"trailer"), "747261696c6572");
        assert_eq!(to_hex(&[0x00, 0x0A, 0xFF]), "000aff");
        assert_eq!(*HEX_TRAILER, "747261696c6572");
    }

    #[test]
    fn hex_to_text_invalid() {
        assert_eq!(hex_to_text("3132"), Ok("12".to_string()));
        assert_eq!(
            hex_to_text("313"),
            Err(ScanErr::Hex(::hex::FromHexError::OddLength))
        );
        assert_eq!(hex_to_text("ff"), Err(ScanErr::NotAscii("ff".to_string())));
    }

    #[test]
    fn hex_to_decimal_valid() {
        assert_eq!(hex_to_decimal("313233"), Ok(123));
        assert_eq!(
            hex_to_decimal("3161"),
            Err(ScanErr::NotDecimal("1a".to_string()))
        );
        assert_eq!(hex_to_decimal(""), Err(ScanErr::NotDecimal(String::new())));
    }

    #[test]
    fn find_literal_aligned_only() {
        // The keyword shifted by one nibble sits at an odd position
        let hex = to_hex(&[0x07, 0x47, 0x26, 0x16, 0x96, 0xC6, 0x57, 0x20]);
        assert!(hex.contains(HEX_TRAILER.as_str()));
        assert!(!is_trailer_boundary(&hex));

        let hex = to_hex(b"0000000015 00000 n \r\ntrailer");
        assert_eq!(find_literal(&hex, &HEX_TRAILER, 0), Some(2 * 21));
    }

    #[test]
    fn find_marker_valid() {
        let pattern = Regex::new("6f626a").unwrap();
        let hex = to_hex(b"1 0 obj endobj obj");
        assert_eq!(
            find_marker(&pattern, &hex),
            vec![(8, 14), (22, 28), (30, 36)]
        );
    }

    #[test]
    fn xref_trailer_shape_valid() {
        // No `trailer` keyword, the entries are directly followed by
        // `startxref`
        let text = b"xref\n0 2\n0000000000 65535 f \n0000000015 00000 n \nstartxref";
        let hex = to_hex(text);
        let boundary = xref_trailer_shape(&hex, 0).unwrap();
        assert_eq!(&text[boundary / 2..], b"startxref");
        assert!(is_xref_trailer_shape(&hex));

        // A following subsection is not a boundary
        let hex = to_hex(b"0000000000 65535 f \n1 1\n");
        assert!(!is_xref_trailer_shape(&hex));
        // Neither is an unfinished window
        let hex = to_hex(b"0000000000 65535 f \n");
        assert!(!is_xref_trailer_shape(&hex));
    }

    #[test]
    fn split_at_trailer_boundary_valid() {
        let hex = to_hex(b"xref\n0 1\n0000000000 65535 f \ntrailer\n<< /Size 1 >>");
        let (xref, trailer) = split_at_trailer_boundary(&hex);
        assert_eq!(hex_to_text(xref).unwrap(), "xref\n0 1\n0000000000 65535 f \n");
        assert_eq!(hex_to_text(trailer).unwrap(), "trailer\n<< /Size 1 >>");

        let hex = to_hex(b"xref\n0 1\n");
        assert_eq!(split_at_trailer_boundary(&hex), (hex.as_str(), ""));
    }
}
