use ::nom::branch::alt;
use ::nom::bytes::complete::tag;
use ::nom::bytes::complete::take_while_m_n;
use ::nom::character::complete::char;
use ::nom::character::complete::digit1;
use ::nom::error::Error as NomError;
use ::nom::sequence::separated_pair;
use ::nom::sequence::terminated;
use ::nom::AsChar;
use ::nom::Err as NomErr;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use crate::parse::character_set::eol;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseFailure;
use crate::parse::error::ParseRecoverable;
use crate::parse::error::ParseResult;
use crate::parse::num::ascii_to_u16;
use crate::parse::num::ascii_to_u64;
use crate::parse::num::ascii_to_usize;
use crate::parse::Parser;
use crate::parse_recoverable;
use crate::Byte;
use crate::GenerationNumber;
use crate::ObjectNumber;
use crate::Offset;

/// REFERENCE: [7.5.4 Cross-reference table, p56-57]
const BIG_LEN: usize = 10;
/// REFERENCE: [7.5.4 Cross-reference table, p56-57]
const SMALL_LEN: usize = 5;

#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum Entry {
    Free(ObjectNumber, GenerationNumber),
    InUse(Offset, GenerationNumber),
}

/// REFERENCE: [7.5.4 Cross-reference table, p56]
#[derive(Debug, PartialEq, Default)]
pub(crate) struct Subsection {
    pub(crate) first_object_number: ObjectNumber,
    pub(crate) entries: Vec<Entry>,
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        // The trailing space keeps the entry at 20 bytes with a line feed
        match self {
            Self::InUse(offset, generation_number) => writeln!(
                f,
                "{:0BIG_LEN$} {:0SMALL_LEN$} n ",
                offset, generation_number
            ),
            Self::Free(next_free, generation_number) => writeln!(
                f,
                "{:0BIG_LEN$} {:0SMALL_LEN$} f ",
                next_free, generation_number
            ),
        }
    }
}

impl Display for Subsection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{} {}", self.first_object_number, self.entries.len())?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl Parser<'_> for Entry {
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        // HACK Entries are supposed to be exactly 20 bytes long, but
        // producers also end them with a bare EOL or pad them with extra
        // spaces, which `eol` tolerates
        let (remains, ((num_64, num_16), entry_type)) = terminated(
            separated_pair(
                separated_pair(
                    take_while_m_n(BIG_LEN, BIG_LEN, AsChar::is_dec_digit),
                    char::<_, NomError<_>>(' '),
                    take_while_m_n(SMALL_LEN, SMALL_LEN, AsChar::is_dec_digit),
                ),
                char(' '),
                alt((tag(b"f"), tag(b"n"))),
            ),
            eol,
        )(buffer)
        .map_err(parse_recoverable!(
            e,
            ParseRecoverable::new(e.input, stringify!(Entry), ParseErrorCode::NotFound(e.code))
        ))?;

        let generation_number = ascii_to_u16(num_16).ok_or_else(|| {
            ParseFailure::new(num_16, stringify!(Entry), ParseErrorCode::GenerationNumber)
        })?;
        let entry = match entry_type {
            b"n" => {
                let offset = ascii_to_usize(num_64).ok_or_else(|| {
                    ParseFailure::new(num_64, stringify!(Entry), ParseErrorCode::Offset)
                })?;
                Self::InUse(offset, generation_number)
            }
            _ => {
                let next_free = ascii_to_u64(num_64).ok_or_else(|| {
                    ParseFailure::new(num_64, stringify!(Entry), ParseErrorCode::ObjectNumber)
                })?;
                Self::Free(next_free, generation_number)
            }
        };
        Ok((remains, entry))
    }
}

impl Parser<'_> for Subsection {
    // REFERENCE: [7.5.4 Cross-reference table, p56-57]
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        let (mut buffer, (first_object_number, entry_count)) =
            terminated(separated_pair(digit1, char(' '), digit1), eol)(buffer).map_err(
                parse_recoverable!(
                    e,
                    ParseRecoverable::new(
                        e.input,
                        stringify!(Subsection),
                        ParseErrorCode::NotFound(e.code)
                    )
                ),
            )?;
        // Here, we know that the buffer starts with a cross-reference
        // subsection, and the following errors should be propagated as
        // failures

        let first_object_number = ascii_to_u64(first_object_number).ok_or_else(|| {
            ParseFailure::new(
                first_object_number,
                stringify!(Subsection),
                ParseErrorCode::FirstObjectNumber,
            )
        })?;
        let entry_count = ascii_to_usize(entry_count).ok_or_else(|| {
            ParseFailure::new(entry_count, stringify!(Subsection), ParseErrorCode::EntryCount)
        })?;

        // The count comes from the file, so it does not size the allocation
        let mut entries = Vec::default();
        for index in 0..entry_count {
            let (remains, entry) = Entry::parse(buffer).map_err(|err| {
                ParseFailure::new(
                    buffer,
                    stringify!(Subsection),
                    ParseErrorCode::SubsectionEntry {
                        index,
                        first_object_number,
                        entry_count,
                        code: Box::new(err.code()),
                    },
                )
            })?;
            buffer = remains;
            entries.push(entry);
        }
        Ok((
            buffer,
            Self {
                first_object_number,
                entries,
            },
        ))
    }
}

#[cfg(test)]
mod convert {
    use super::*;

    impl Subsection {
        pub(crate) fn new(first_object_number: ObjectNumber, entries: impl Into<Vec<Entry>>) -> Self {
            Self {
                first_object_number,
                entries: entries.into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ::nom::error::ErrorKind;

    use super::*;
    use crate::assert_err_eq;
    use crate::parse_assert_eq;

    #[test]
    fn entry_valid() {
        parse_assert_eq!(
            b"0000000015 00000 n \r\n0000000079",
            Entry::InUse(15, 0),
            b"0000000079".as_slice()
        );
        parse_assert_eq!(
            b"0000000000 65535 f\r\n",
            Entry::Free(0, 65535),
            b"".as_slice()
        );
        // Bare line feed
        parse_assert_eq!(
            b"0000000003 00001 f\ntrailer",
            Entry::Free(3, 1),
            b"trailer".as_slice()
        );
    }

    #[test]
    fn subsection_valid() {
        let buffer = b"0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000079 00000 n \ntrailer";
        parse_assert_eq!(
            buffer,
            Subsection::new(
                0,
                [Entry::Free(0, 65535), Entry::InUse(15, 0), Entry::InUse(79, 0)]
            ),
            b"trailer".as_slice()
        );
        let subsection = Subsection::parse(buffer).unwrap().1;
        assert_eq!(
            subsection.to_string(),
            "0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000079 00000 n \n"
        );
    }

    #[test]
    fn subsection_invalid() {
        // Subsection: Not found
        let parse_result = Subsection::parse(b"0 1 R\r\n");
        let expected_error = ParseRecoverable::new(
            b"R\r\n",
            stringify!(Subsection),
            ParseErrorCode::NotFound(ErrorKind::Tag),
        );
        assert_err_eq!(parse_result, expected_error);

        let parse_result = Subsection::parse(b"trailer");
        let expected_error = ParseRecoverable::new(
            b"trailer",
            stringify!(Subsection),
            ParseErrorCode::NotFound(ErrorKind::Digit),
        );
        assert_err_eq!(parse_result, expected_error);

        // Subsection: Incomplete buffer
        let buffer = b"0 3\r\n0000000000 65535 f\r\n0000000100 00000 n\r\n";
        let parse_result = Subsection::parse(buffer);
        let expected_error = ParseFailure::new(
            b"",
            stringify!(Subsection),
            ParseErrorCode::SubsectionEntry {
                index: 2,
                first_object_number: 0,
                entry_count: 3,
                code: Box::new(ParseErrorCode::NotFound(ErrorKind::TakeWhileMN)),
            },
        );
        assert_err_eq!(parse_result, expected_error);

        // Subsection: Invalid entry type
        let buffer = b"0 1\r\n0000000000 65535 r\r\n";
        let parse_result = Subsection::parse(buffer);
        let expected_error = ParseFailure::new(
            b"0000000000 65535 r\r\n",
            stringify!(Subsection),
            ParseErrorCode::SubsectionEntry {
                index: 0,
                first_object_number: 0,
                entry_count: 1,
                code: Box::new(ParseErrorCode::NotFound(ErrorKind::Tag)),
            },
        );
        assert_err_eq!(parse_result, expected_error);
    }
}
