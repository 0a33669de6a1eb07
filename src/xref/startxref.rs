use ::once_cell::sync::Lazy;
use ::regex::Regex;

use crate::parse::EOF;
use crate::parse::KW_STARTXREF;
use crate::pdf::error::PdfError;
use crate::pdf::error::PdfResult;
use crate::scan::hex::captures_aligned;
use crate::scan::hex::hex_to_decimal;
use crate::scan::hex::to_hex;
use crate::scan::reader::BoundedReader;
use crate::Offset;
use crate::STARTXREF_WINDOW;

/// REFERENCE: [7.5.5 File trailer, p58]
/// `startxref`, an EOL, the offset digits, then one of the accepted EOL
/// markers before `%%EOF`. The offset is restricted to decimal digits, so
/// the three layouts cannot match the same text.
static STARTXREF: Lazy<[(&str, Regex); 3]> = Lazy::new(|| {
    let layout = |eol: &str| {
        Regex::new(&format!(
            r"{}(?:0d0a|0a|0d)((?:3[0-9])+){}{}",
            to_hex(KW_STARTXREF.as_bytes()),
            eol,
            to_hex(EOF.as_bytes())
        ))
        .expect("valid startxref pattern")
    };
    [("LF", layout("0a")), ("CR", layout("0d")), ("CRLF", layout("0d0a"))]
});

/// Offset of the cross-reference section the file trailer points to.
/// Incremental updates append their own `startxref`, and an update may use
/// a different EOL than the revision before it, so the match ending
/// furthest into the tail window wins across all layouts.
pub(crate) fn find_xref_offset(reader: &BoundedReader) -> PdfResult<Offset> {
    let window = reader.read(reader.len().saturating_sub(STARTXREF_WINDOW), STARTXREF_WINDOW);
    let hex = to_hex(window.bytes);
    let (layout, _, digits) = STARTXREF
        .iter()
        .filter_map(|(layout, pattern)| {
            last_match(pattern, &hex).map(|(end, digits)| (layout, end, digits))
        })
        .max_by_key(|(_, end, _)| *end)
        .ok_or(PdfError::XrefOffsetNotFound)?;
    log::debug!("StartXRef: Matched the {} layout", layout);
    hex_to_decimal(digits)
        .ok()
        .and_then(|offset| Offset::try_from(offset).ok())
        .ok_or(PdfError::XrefOffsetNotFound)
}

/// End of the last aligned match of `pattern` and its offset digits.
fn last_match<'hex>(pattern: &Regex, hex: &'hex str) -> Option<(usize, &'hex str)> {
    let mut last = None;
    let mut from = 0;
    while let Some(captures) = captures_aligned(pattern, hex, from) {
        // The pattern always has a whole match and one group
        let (Some(whole), Some(group)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        from = whole.end();
        last = Some((whole.end(), group.as_str()));
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_err_eq;

    #[test]
    fn find_xref_offset_layouts() {
        let buffer = b"%PDF-1.4\ntrailer\n<< >>\nstartxref\n1234\n%%EOF\n";
        assert_eq!(find_xref_offset(&BoundedReader::new(buffer)), Ok(1234));

        let buffer = b"%PDF-1.4\rtrailer\r<< >>\rstartxref\r5678\r%%EOF\r";
        assert_eq!(find_xref_offset(&BoundedReader::new(buffer)), Ok(5678));

        let buffer = b"%PDF-1.4\r\ntrailer\r\n<< >>\r\nstartxref\r\n91011\r\n%%EOF";
        assert_eq!(find_xref_offset(&BoundedReader::new(buffer)), Ok(91011));
    }

    #[test]
    fn find_xref_offset_last_wins() {
        let mut buffer = b"%PDF-1.4\nstartxref\n9\n%%EOF\n".to_vec();
        buffer.extend_from_slice(b"xref\ntrailer\n<< /Prev 9 >>\nstartxref\n27\n%%EOF\n");
        assert_eq!(find_xref_offset(&BoundedReader::new(&buffer)), Ok(27));

        // Only the tail window is searched
        let mut buffer = b"%PDF-1.4\nstartxref\n9\n%%EOF\n".to_vec();
        buffer.extend_from_slice(&[b' '; STARTXREF_WINDOW]);
        assert_err_eq!(
            find_xref_offset(&BoundedReader::new(&buffer)),
            PdfError::XrefOffsetNotFound
        );
    }

    #[test]
    fn find_xref_offset_mixed_layouts() {
        // An LF original followed by a CRLF update
        let mut buffer = b"%PDF-1.4\nstartxref\n9\n%%EOF\n".to_vec();
        buffer.extend_from_slice(b"xref\r\ntrailer\r\n<< /Prev 9 >>\r\nstartxref\r\n27\r\n%%EOF\r\n");
        assert_eq!(find_xref_offset(&BoundedReader::new(&buffer)), Ok(27));

        // A CRLF original followed by a CR update
        let mut buffer = b"%PDF-1.4\r\nstartxref\r\n9\r\n%%EOF\r\n".to_vec();
        buffer.extend_from_slice(b"xref\rtrailer\r<< /Prev 9 >>\rstartxref\r31\r%%EOF");
        assert_eq!(find_xref_offset(&BoundedReader::new(&buffer)), Ok(31));

        // A CR update followed by an LF update
        let mut buffer = b"%PDF-1.4\rstartxref\r9\r%%EOF\r".to_vec();
        buffer.extend_from_slice(b"xref\ntrailer\n<< /Prev 9 >>\nstartxref\n42\n%%EOF\n");
        assert_eq!(find_xref_offset(&BoundedReader::new(&buffer)), Ok(42));
    }

    #[test]
    fn find_xref_offset_invalid() {
        for buffer in [
            b"%PDF-1.4\nstartxref\n%%EOF\n".as_slice(),
            b"%PDF-1.4\nstartxref\n12a\n%%EOF\n",
            b"%PDF-1.4\nstartxref 12\n%%EOF\n",
            b"",
            // Does not fit in 64 bits
            b"startxref\n99999999999999999999999\n%%EOF",
        ] {
            assert_err_eq!(
                find_xref_offset(&BoundedReader::new(buffer)),
                PdfError::XrefOffsetNotFound
            );
        }
    }
}
