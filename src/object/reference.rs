use ::nom::bytes::complete::tag;
use ::nom::character::complete::digit1;
use ::nom::error::Error as NomError;
use ::nom::error::ErrorKind;
use ::nom::sequence::pair;
use ::nom::sequence::terminated;
use ::nom::Err as NomErr;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use crate::parse::character_set::is_regular;
use crate::parse::character_set::white_space_or_comment;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseRecoverable;
use crate::parse::error::ParseResult;
use crate::parse::num::ascii_to_u16;
use crate::parse::num::ascii_to_u64;
use crate::parse::Parser;
use crate::parse::KW_R;
use crate::parse_recoverable;
use crate::Byte;
use crate::GenerationNumber;
use crate::ObjectNumber;

/// An indirect reference `n g R`.
/// The default value, object number 0, stands for "no reference".
/// REFERENCE: [7.3.10 Indirect Objects, p33]
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct Reference {
    object_number: ObjectNumber,
    generation_number: GenerationNumber,
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "{} {} {}",
            self.object_number, self.generation_number, KW_R
        )
    }
}

impl Parser<'_> for Reference {
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        let (remains, (object_number, generation_number)) = terminated(
            pair(
                terminated(digit1, white_space_or_comment),
                terminated(digit1, white_space_or_comment),
            ),
            tag::<_, _, NomError<_>>(KW_R.as_bytes()),
        )(buffer)
        .map_err(parse_recoverable!(
            e,
            ParseRecoverable::new(
                e.input,
                stringify!(Reference),
                ParseErrorCode::NotFound(e.code)
            )
        ))?;
        // `12 0 Rx` is not a reference but the integers 12 and 0 followed by
        // the token `Rx`
        if matches!(remains.first(), Some(&byte) if is_regular(byte)) {
            return Err(ParseRecoverable::new(
                buffer,
                stringify!(Reference),
                ParseErrorCode::NotFound(ErrorKind::Tag),
            )
            .into());
        }
        // Digits that do not fit are not a reference either, let the
        // numeric parser report them
        let object_number = ascii_to_u64(object_number).ok_or_else(|| {
            ParseRecoverable::new(object_number, stringify!(Reference), ParseErrorCode::ObjectNumber)
        })?;
        let generation_number = ascii_to_u16(generation_number).ok_or_else(|| {
            ParseRecoverable::new(
                generation_number,
                stringify!(Reference),
                ParseErrorCode::GenerationNumber,
            )
        })?;
        Ok((
            remains,
            Self {
                object_number,
                generation_number,
            },
        ))
    }
}

mod convert {
    use super::*;

    impl Reference {
        pub fn new(object_number: ObjectNumber, generation_number: GenerationNumber) -> Self {
            Self {
                object_number,
                generation_number,
            }
        }

        pub fn object_number(&self) -> ObjectNumber {
            self.object_number
        }

        pub fn generation_number(&self) -> GenerationNumber {
            self.generation_number
        }

        pub fn is_present(&self) -> bool {
            self.object_number != 0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_err_eq;
    use crate::parse_assert_eq;

    #[test]
    fn reference_valid() {
        parse_assert_eq!(b"1 0 R", Reference::new(1, 0), b"".as_slice());
        parse_assert_eq!(
            b"12345 65535 R>>",
            Reference::new(12345, 65535),
            b">>".as_slice()
        );
        parse_assert_eq!(
            b"3 0\r\nR /Info",
            Reference::new(3, 0),
            b" /Info".as_slice()
        );
    }

    #[test]
    fn reference_invalid() {
        let parse_result = Reference::parse(b"1 0 ");
        let expected_error =
            ParseRecoverable::new(b"", stringify!(Reference), ParseErrorCode::NotFound(ErrorKind::Tag));
        assert_err_eq!(parse_result, expected_error);

        let parse_result = Reference::parse(b"/Name");
        let expected_error = ParseRecoverable::new(
            b"/Name",
            stringify!(Reference),
            ParseErrorCode::NotFound(ErrorKind::Digit),
        );
        assert_err_eq!(parse_result, expected_error);

        // Not a reference: the token is `RG`
        assert!(Reference::parse(b"1 0 RG").is_err());
        // Generation numbers are restricted to 5 digits
        assert!(Reference::parse(b"1 65536 R").is_err());
    }
}
