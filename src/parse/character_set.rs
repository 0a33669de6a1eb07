use ::nom::branch::alt;
use ::nom::bytes::complete::tag;
use ::nom::bytes::complete::take_till;
use ::nom::bytes::complete::take_while;
use ::nom::bytes::complete::take_while1;
use ::nom::character::complete::char;
use ::nom::combinator::opt;
use ::nom::combinator::recognize;
use ::nom::multi::many1;
use ::nom::sequence::delimited;
use ::nom::sequence::preceded;
use ::nom::IResult;

use crate::Byte;

/// REFERENCE: [3.68 white-space character, p14] and ["Table 1 — White-space
/// characters" in 7.2.3, "Character set", p22]
pub(crate) const fn is_white_space(byte: Byte) -> bool {
    byte == b'\x09' // HORIZONTAL TABULATION
        || byte == b'\x0A' // LINE FEED
        || byte == b'\x0C' // FORM FEED
        || byte == b'\x0D' // CARRIAGE RETURN
        || byte == b'\x20' // SPACE
        || byte == b'\x00' // NULL
}

/// REFERENCE: [7.2.3 Character set, p22]
pub(crate) fn white_space(buffer: &[Byte]) -> IResult<&[Byte], &[Byte]> {
    take_while1(is_white_space)(buffer)
}

/// REFERENCE: [7.2.4 Comments, p23]
pub(crate) fn comment(buffer: &[Byte]) -> IResult<&[Byte], &[Byte]> {
    preceded(char('%'), take_till(|byte| byte == b'\n' || byte == b'\r'))(buffer)
}

/// REFERENCE: [7.2.4 Comments, p23]
pub(crate) fn white_space_or_comment(buffer: &[Byte]) -> IResult<&[Byte], &[Byte]> {
    // A comment is treated as a single white-space character.
    recognize(many1(alt((white_space, comment))))(buffer)
}

/// REFERENCE: [7.2.3 Character set, p22]
pub(crate) fn eol(buffer: &[Byte]) -> IResult<&[Byte], &[Byte]> {
    // HACK Producers pad the EOL marker with spaces more often than the
    // standard admits
    delimited(
        take_while(|byte| byte == b'\x09' || byte == b'\x0C' || byte == b'\x20' || byte == b'\x00'),
        alt((tag(b"\r\n"), tag(b"\n"), tag(b"\r"))),
        opt(white_space),
    )(buffer)
}

/// REFERENCE: [7.2.3 Character set, p22]
pub(crate) const fn is_delimiter(byte: Byte) -> bool {
    byte == b'('
        || byte == b')'
        || byte == b'<'
        || byte == b'>'
        || byte == b'['
        || byte == b']'
        || byte == b'{'
        || byte == b'}'
        || byte == b'/'
        || byte == b'%'
}

/// REFERENCE: [7.2.3 Character set, p23] indicates that regular characters are
/// not restricted to the ASCII range.
pub(crate) const fn is_regular(byte: Byte) -> bool {
    !is_white_space(byte) && !is_delimiter(byte)
}

pub(crate) fn regular_token(buffer: &[Byte]) -> IResult<&[Byte], &[Byte]> {
    take_while1(is_regular)(buffer)
}
