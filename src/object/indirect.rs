use ::nom::bytes::complete::tag;
use ::nom::character::complete::char;
use ::nom::character::complete::digit1;
use ::nom::combinator::opt;
use ::nom::error::Error as NomError;
use ::nom::error::ErrorKind;
use ::nom::sequence::delimited;
use ::nom::sequence::preceded;
use ::nom::sequence::terminated;
use ::nom::sequence::tuple;
use ::nom::Err as NomErr;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use super::reference::Reference;
use super::value::skip_white_space_or_comment;
use super::value::Dictionary;
use super::value::Value;
use crate::parse::character_set::eol;
use crate::parse::character_set::white_space_or_comment;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseFailure;
use crate::parse::error::ParseRecoverable;
use crate::parse::error::ParseResult;
use crate::parse::num::ascii_to_u16;
use crate::parse::num::ascii_to_u64;
use crate::parse::Parser;
use crate::parse::KW_ENDOBJ;
use crate::parse::KW_ENDSTREAM;
use crate::parse::KW_OBJ;
use crate::parse::KW_STREAM;
use crate::parse_failure;
use crate::parse_recoverable;
use crate::Byte;

pub(crate) const KEY_LENGTH: &str = "Length";

/// REFERENCE: [7.3.10 Indirect objects, p33] and [7.3.8 Stream objects, p31]
/// The stream data, when present, is kept encoded.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct IndirectObject {
    reference: Reference,
    value: Value,
    stream: Option<Vec<Byte>>,
}

impl Display for IndirectObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} {} {}\n{}",
            self.reference.object_number(),
            self.reference.generation_number(),
            KW_OBJ,
            self.value
        )?;
        if let Some(stream) = &self.stream {
            write!(f, "\n{}\n<{} bytes>\n{}", KW_STREAM, stream.len(), KW_ENDSTREAM)?;
        }
        write!(f, "\n{}", KW_ENDOBJ)
    }
}

impl Parser<'_> for IndirectObject {
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        // Producers sometimes leave white space at the offset the
        // cross-reference entry points to
        let remains = skip_white_space_or_comment(buffer);
        let (remains, (object_number, generation_number)) = tuple((
            terminated(digit1, white_space_or_comment),
            terminated(
                digit1,
                tuple((
                    opt(white_space_or_comment),
                    tag::<_, _, NomError<_>>(KW_OBJ.as_bytes()),
                )),
            ),
        ))(remains)
        .map_err(parse_recoverable!(
            e,
            ParseRecoverable::new(
                e.input,
                stringify!(IndirectObject),
                ParseErrorCode::NotFound(e.code)
            )
        ))?;
        // Here, we know that the buffer starts with an indirect object, and
        // the following errors should be propagated as failures
        let object_number = ascii_to_u64(object_number).ok_or_else(|| {
            ParseFailure::new(object_number, stringify!(IndirectObject), ParseErrorCode::ObjectNumber)
        })?;
        let generation_number = ascii_to_u16(generation_number).ok_or_else(|| {
            ParseFailure::new(
                generation_number,
                stringify!(IndirectObject),
                ParseErrorCode::GenerationNumber,
            )
        })?;
        let reference = Reference::new(object_number, generation_number);

        let remains = skip_white_space_or_comment(remains);
        let (remains, value) = Value::parse(remains).map_err(|err| {
            ParseFailure::new(
                remains,
                stringify!(IndirectObject),
                ParseErrorCode::RecMissingClosing(Box::new(err.code())),
            )
        })?;
        let remains = skip_white_space_or_comment(remains);

        let (remains, stream) = match stream_start(remains) {
            Some(data) => {
                let dictionary = value.as_dictionary().ok_or_else(|| {
                    ParseFailure::new(
                        remains,
                        stringify!(IndirectObject),
                        ParseErrorCode::StreamData(ErrorKind::Verify),
                    )
                })?;
                let (remains, stream) = stream_data(data, dictionary)?;
                (remains, Some(stream))
            }
            None => (remains, None),
        };

        let (remains, _) = preceded(
            opt(white_space_or_comment),
            tag::<_, _, NomError<_>>(KW_ENDOBJ.as_bytes()),
        )(remains)
        .map_err(parse_failure!(
            e,
            ParseFailure::new(
                e.input,
                stringify!(IndirectObject),
                ParseErrorCode::MissingClosing(e.code)
            )
        ))?;

        Ok((
            remains,
            Self {
                reference,
                value,
                stream,
            },
        ))
    }
}

/// REFERENCE: [7.3.8.1 General, p31]
/// The `stream` keyword is followed by CRLF or LF, not CR alone.
fn stream_start(buffer: &[Byte]) -> Option<&[Byte]> {
    preceded(
        tag::<_, _, NomError<_>>(KW_STREAM.as_bytes()),
        preceded(opt(char('\r')), char('\n')),
    )(buffer)
    .ok()
    .map(|(data, _)| data)
}

/// Reads `/Length` bytes of stream data when the length is a direct integer
/// that lands on `endstream`, otherwise falls back to searching for the
/// keyword.
fn stream_data<'buffer>(
    buffer: &'buffer [Byte],
    dictionary: &Dictionary,
) -> ParseResult<(&'buffer [Byte], Vec<Byte>)> {
    let end_of_stream = |remains: &'buffer [Byte]| {
        delimited(
            opt(eol),
            tag::<_, _, NomError<_>>(KW_ENDSTREAM.as_bytes()),
            opt(white_space_or_comment),
        )(remains)
        .ok()
        .map(|(remains, _)| remains)
    };

    let declared = dictionary
        .get_u64(KEY_LENGTH)
        .and_then(|length| usize::try_from(length).ok())
        .filter(|&length| length <= buffer.len());
    if let Some(length) = declared {
        if let Some(remains) = end_of_stream(&buffer[length..]) {
            return Ok((remains, buffer[..length].to_vec()));
        }
    }

    // HACK `/Length` is often an indirect reference, or plainly wrong
    let keyword = KW_ENDSTREAM.as_bytes();
    let position = buffer
        .windows(keyword.len())
        .position(|window| window == keyword)
        .ok_or_else(|| {
            ParseFailure::new(
                buffer,
                stringify!(IndirectObject),
                ParseErrorCode::StreamData(ErrorKind::TakeUntil),
            )
        })?;
    log::debug!(
        "IndirectObject: Stream length {:?} does not match, found {} at {}",
        dictionary.get(KEY_LENGTH).map(ToString::to_string),
        KW_ENDSTREAM,
        position
    );
    let mut data = &buffer[..position];
    if let Some(stripped) = data.strip_suffix(b"\r\n") {
        data = stripped;
    } else if let Some(stripped) = data
        .strip_suffix(b"\n")
        .or_else(|| data.strip_suffix(b"\r"))
    {
        data = stripped;
    }
    let remains = skip_white_space_or_comment(&buffer[position + keyword.len()..]);
    Ok((remains, data.to_vec()))
}

mod convert {
    use super::*;

    impl IndirectObject {
        pub(crate) fn reference(&self) -> Reference {
            self.reference
        }

        pub(crate) fn dictionary(&self) -> Option<&Dictionary> {
            self.value.as_dictionary()
        }

        pub(crate) fn stream(&self) -> Option<&[Byte]> {
            self.stream.as_deref()
        }
    }

    impl TryFrom<&[Byte]> for IndirectObject {
        type Error = ParseErr;

        fn try_from(value: &[Byte]) -> Result<Self, Self::Error> {
            IndirectObject::parse(value).map(|(_, object)| object)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indirect_object_valid() {
        let buffer = b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n";
        let (remains, object) = IndirectObject::parse(buffer).unwrap();
        assert_eq!(remains, b"\n");
        assert_eq!(object.reference(), Reference::new(1, 0));
        assert_eq!(
            object.dictionary().and_then(|d| d.get_name("Type")),
            Some("Catalog")
        );
        assert_eq!(object.stream(), None);

        // Leading white space and a direct integer
        let (_, object) = IndirectObject::parse(b"\r\n12 3 obj 42 endobj").unwrap();
        assert_eq!(object.reference(), Reference::new(12, 3));
        assert_eq!(object.value, Value::Integer(42));
    }

    #[test]
    fn indirect_object_stream() {
        let buffer = b"5 0 obj\n<< /Length 5 >>\nstream\r\nhello\r\nendstream\nendobj";
        let (remains, object) = IndirectObject::parse(buffer).unwrap();
        assert_eq!(remains, b"");
        assert_eq!(object.stream(), Some(b"hello".as_slice()));

        // Wrong length: the data runs up to `endstream`
        let buffer = b"5 0 obj\n<< /Length 99 >>\nstream\nhello world\nendstream\nendobj";
        let (_, object) = IndirectObject::parse(buffer).unwrap();
        assert_eq!(object.stream(), Some(b"hello world".as_slice()));

        // Indirect length
        let buffer = b"5 0 obj\n<< /Length 6 0 R >>\nstream\nabc\nendstream endobj";
        let (_, object) = IndirectObject::parse(buffer).unwrap();
        assert_eq!(object.stream(), Some(b"abc".as_slice()));
    }

    #[test]
    fn indirect_object_invalid() {
        assert!(matches!(
            IndirectObject::parse(b"xref\n0 1\n"),
            Err(ParseErr::Recoverable(_))
        ));
        assert!(matches!(
            IndirectObject::parse(b"1 0 obj\n<< /Type /Catalog >>\n"),
            Err(ParseErr::Failure(_))
        ));
        assert!(matches!(
            IndirectObject::parse(b"1 0 obj\n<< /Length 3 >>\nstream\nabc"),
            Err(ParseErr::Failure(_))
        ));
        assert!(matches!(
            IndirectObject::parse(b"1 0 obj\n[1 2] stream\nabc\nendstream\nendobj"),
            Err(ParseErr::Failure(_))
        ));
    }
}
