use ::nom::bytes::complete::take_till;
use ::nom::character::complete::char;
use ::nom::error::Error as NomError;
use ::nom::sequence::preceded;
use ::nom::Err as NomErr;

use crate::parse::character_set::is_white_space;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseFailure;
use crate::parse::error::ParseRecoverable;
use crate::parse::error::ParseResult;
use crate::parse::num::hex_val;
use crate::parse_recoverable;
use crate::Byte;

/// REFERENCE: [7.3.4.2 Literal strings, p25-28]
/// Returns the unescaped bytes of a literal string.
pub(crate) fn literal(buffer: &[Byte]) -> ParseResult<(&[Byte], Vec<Byte>)> {
    let (remains, _) = char::<_, NomError<_>>('(')(buffer).map_err(parse_recoverable!(
        e,
        ParseRecoverable::new(e.input, "Literal", ParseErrorCode::NotFound(e.code))
    ))?;
    // Here, we know that the buffer starts with a literal string, and the
    // following errors should be propagated as failures
    let mut value = Vec::with_capacity(remains.len().min(64));
    let mut depth = 0usize;
    let mut index = 0;
    while let Some(&byte) = remains.get(index) {
        index += 1;
        match byte {
            b'(' => {
                depth += 1;
                value.push(byte);
            }
            b')' if depth == 0 => return Ok((&remains[index..], value)),
            b')' => {
                depth -= 1;
                value.push(byte);
            }
            b'\\' => index += unescape(&remains[index..], &mut value),
            // REFERENCE: [7.3.4.2 Literal strings, p26]
            // An end-of-line marker within a literal string is read as a line feed
            b'\r' => {
                if remains.get(index) == Some(&b'\n') {
                    index += 1;
                }
                value.push(b'\n');
            }
            _ => value.push(byte),
        }
    }
    Err(ParseFailure::new(
        buffer,
        "Literal",
        ParseErrorCode::MissingClosing(::nom::error::ErrorKind::Char),
    )
    .into())
}

/// Pushes the byte denoted by the escape sequence following a backslash and
/// returns how many bytes of `escaped` it used.
fn unescape(escaped: &[Byte], value: &mut Vec<Byte>) -> usize {
    let Some(&first) = escaped.first() else {
        return 0;
    };
    let simple = match first {
        b'n' => Some(b'\n'),
        b'r' => Some(b'\r'),
        b't' => Some(b'\t'),
        b'b' => Some(b'\x08'),
        b'f' => Some(b'\x0C'),
        b'(' | b')' | b'\\' => Some(first),
        _ => None,
    };
    if let Some(byte) = simple {
        value.push(byte);
        return 1;
    }
    match first {
        // Line continuation
        b'\r' if escaped.get(1) == Some(&b'\n') => 2,
        b'\r' | b'\n' => 1,
        b'0'..=b'7' => {
            let digits = escaped
                .iter()
                .take(3)
                .take_while(|byte| (b'0'..=b'7').contains(*byte))
                .count();
            // High-order overflow is ignored
            let code = escaped[..digits]
                .iter()
                .fold(0u16, |code, digit| code * 8 + u16::from(digit - b'0'));
            value.push(code as u8);
            digits
        }
        // The backslash is ignored for any other character
        _ => 0,
    }
}

/// REFERENCE: [7.3.4.3 Hexadecimal strings, p27]
pub(crate) fn hexadecimal(buffer: &[Byte]) -> ParseResult<(&[Byte], Vec<Byte>)> {
    let (remains, digits) = preceded(
        char::<_, NomError<_>>('<'),
        take_till(|byte| byte == b'>' || byte == b'<'),
    )(buffer)
    .map_err(parse_recoverable!(
        e,
        ParseRecoverable::new(e.input, "Hexadecimal", ParseErrorCode::NotFound(e.code))
    ))?;
    // `<<` opens a dictionary, not a string
    let (remains, _) = char::<_, NomError<_>>('>')(remains).map_err(parse_recoverable!(
        e,
        ParseRecoverable::new(e.input, "Hexadecimal", ParseErrorCode::MissingClosing(e.code))
    ))?;
    let nibbles = digits
        .iter()
        .filter(|&&byte| !is_white_space(byte))
        .map(|&byte| {
            hex_val(byte).ok_or_else(|| {
                ParseErr::from(ParseFailure::new(
                    digits,
                    "Hexadecimal",
                    ParseErrorCode::HexDigit,
                ))
            })
        })
        .collect::<ParseResult<Vec<Byte>>>()?;
    // A missing final digit is assumed to be 0
    let value = nibbles
        .chunks(2)
        .map(|pair| pair[0] << 4 | pair.get(1).copied().unwrap_or(0))
        .collect();
    Ok((remains, value))
}

/// REFERENCE: [7.9.2.2 Text string type, p95]
/// Text strings are either UTF-16BE with a byte order mark, UTF-8 with a byte
/// order mark (PDF 2.0), or PDFDocEncoding.
pub(crate) fn decode_text(bytes: &[Byte]) -> String {
    if let Some(utf16) = bytes.strip_prefix(b"\xFE\xFF") {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        char::decode_utf16(units)
            .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    } else if let Some(utf8) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        String::from_utf8_lossy(utf8).into_owned()
    } else {
        // PDFDocEncoding agrees with Latin-1 on the printable ASCII range,
        // which is what producers write in practice
        bytes.iter().map(|&byte| char::from(byte)).collect()
    }
}
