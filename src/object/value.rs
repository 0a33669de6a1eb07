use ::nom::bytes::complete::tag;
use ::nom::character::complete::char;
use ::nom::combinator::opt;
use ::nom::error::Error as NomError;
use ::nom::sequence::preceded;
use ::nom::sequence::terminated;
use ::nom::Err as NomErr;
use ::std::collections::BTreeMap;
use ::std::fmt::Display;
use ::std::fmt::Formatter;
use ::std::fmt::Result as FmtResult;

use super::reference::Reference;
use super::string::decode_text;
use super::string::hexadecimal;
use super::string::literal;
use crate::fmt::debug_bytes;
use crate::parse::character_set::regular_token;
use crate::parse::character_set::white_space_or_comment;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseFailure;
use crate::parse::error::ParseRecoverable;
use crate::parse::error::ParseResult;
use crate::parse::num::ascii_to_f64;
use crate::parse::num::ascii_to_i64;
use crate::parse::num::hex_val;
use crate::parse::Parser;
use crate::parse::KW_FALSE;
use crate::parse::KW_NULL;
use crate::parse::KW_TRUE;
use crate::parse_recoverable;
use crate::Byte;
use crate::MAX_NESTING_DEPTH;

/// REFERENCE: [7.3 Objects, p24]
/// Streams are always indirect objects and are handled by `IndirectObject`.
/// References are not objects, but can stand in for one wherever a value is
/// expected.
#[derive(Debug, PartialEq, Clone)]
pub(crate) enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(String),
    String(Vec<Byte>),
    Array(Vec<Value>),
    Dictionary(Dictionary),
    Reference(Reference),
}

/// REFERENCE: [7.3.7 Dictionary objects, p30-31]
#[derive(Debug, Default, PartialEq, Clone)]
pub(crate) struct Dictionary(BTreeMap<String, Value>);

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Null => write!(f, "{}", KW_NULL),
            Self::Boolean(boolean) => write!(f, "{}", boolean),
            Self::Integer(integer) => write!(f, "{}", integer),
            Self::Real(real) => write!(f, "{}", real),
            Self::Name(name) => write!(f, "/{}", name),
            Self::String(string) => write!(f, "({})", debug_bytes(string)),
            Self::Array(array) => {
                write!(f, "[")?;
                for (i, value) in array.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "]")
            }
            Self::Dictionary(dictionary) => write!(f, "{}", dictionary),
            Self::Reference(reference) => write!(f, "{}", reference),
        }
    }
}

impl Display for Dictionary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "<<")?;
        for (key, value) in self.0.iter() {
            write!(f, " /{} {}", key, value)?;
        }
        write!(f, " >>")
    }
}

impl Parser<'_> for Value {
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        parse_value(buffer, 0)
    }
}

impl Parser<'_> for Dictionary {
    fn parse(buffer: &[Byte]) -> ParseResult<(&[Byte], Self)> {
        parse_dictionary(buffer, 0)
    }
}

/// `depth` counts the arrays and dictionaries enclosing `buffer`.
fn parse_value(buffer: &[Byte], depth: usize) -> ParseResult<(&[Byte], Value)> {
    // References first: `1 0 R` would otherwise be read as two integers
    Reference::parse_suppress_recoverable(buffer)
        .or_else(|| {
            suppress_recoverable(parse_dictionary(buffer, depth)).map(|result| {
                result.map(|(remains, dictionary)| (remains, Value::Dictionary(dictionary)))
            })
        })
        .or_else(|| suppress_recoverable(parse_array(buffer, depth)))
        .or_else(|| suppress_recoverable(parse_name(buffer)))
        .or_else(|| suppress_recoverable(literal(buffer)).map(map_string))
        .or_else(|| suppress_recoverable(hexadecimal(buffer)).map(map_string))
        .or_else(|| suppress_recoverable(parse_token(buffer)))
        .unwrap_or_else(|| {
            Err(ParseRecoverable::new(
                buffer,
                stringify!(Value),
                ParseErrorCode::NotFound(::nom::error::ErrorKind::Alt),
            )
            .into())
        })
}

/// Opening delimiter of a container nested `depth` levels deep. Past
/// `MAX_NESTING_DEPTH` the container is reported as a failure rather than
/// parsed.
fn open<'buffer>(
    buffer: &'buffer [Byte],
    delimiter: &'static [Byte],
    depth: usize,
    context: &'static str,
) -> ParseResult<&'buffer [Byte]> {
    let (remains, _) = terminated(tag(delimiter), opt(white_space_or_comment))(buffer).map_err(
        parse_recoverable!(
            e,
            ParseRecoverable::new(e.input, context, ParseErrorCode::NotFound(e.code))
        ),
    )?;
    if depth >= MAX_NESTING_DEPTH {
        return Err(
            ParseFailure::new(buffer, context, ParseErrorCode::NestingDepth(MAX_NESTING_DEPTH))
                .into(),
        );
    }
    Ok(remains)
}

/// REFERENCE: [7.3.7 Dictionary objects, p30-31]
fn parse_dictionary(buffer: &[Byte], depth: usize) -> ParseResult<(&[Byte], Dictionary)> {
    let mut dictionary = BTreeMap::default();
    let mut buffer = open(buffer, b"<<", depth, stringify!(Dictionary))?;
    // Here, we know that the buffer starts with a dictionary, and the
    // following errors should be propagated as failures
    loop {
        if let Ok((remains, _)) = tag::<_, _, NomError<_>>(b">>")(buffer) {
            buffer = remains;
            break;
        }
        let (remains, key) = name(buffer).map_err(|err| {
            ParseFailure::new(
                buffer,
                stringify!(Dictionary),
                ParseErrorCode::RecMissingClosing(Box::new(err.code())),
            )
        })?;
        let remains = skip_white_space_or_comment(remains);
        let (remains, value) = parse_value(remains, depth + 1).map_err(|err| {
            ParseFailure::new(
                remains,
                stringify!(Dictionary),
                ParseErrorCode::RecMissingValue(key.clone(), Box::new(err.code())),
            )
        })?;
        buffer = skip_white_space_or_comment(remains);
        // REFERENCE: [7.3.7 Dictionary objects, p30]
        // Keys should be unique, the last one wins
        if let Some(old_value) = dictionary.insert(key.clone(), value) {
            log::debug!("Dictionary: Overwriting value for key /{}: {}", key, old_value);
        }
    }
    Ok((buffer, Dictionary(dictionary)))
}

fn suppress_recoverable<T>(result: ParseResult<T>) -> Option<ParseResult<T>> {
    match result {
        Err(ParseErr::Recoverable(_)) => None,
        result => Some(result),
    }
}

fn map_string(
    result: ParseResult<(&[Byte], Vec<Byte>)>,
) -> ParseResult<(&[Byte], Value)> {
    result.map(|(remains, string)| (remains, Value::String(string)))
}

pub(crate) fn skip_white_space_or_comment(buffer: &[Byte]) -> &[Byte] {
    white_space_or_comment(buffer)
        .map(|(remains, _)| remains)
        .unwrap_or(buffer)
}

/// REFERENCE: [7.3.6 Array objects, p29]
fn parse_array(buffer: &[Byte], depth: usize) -> ParseResult<(&[Byte], Value)> {
    let mut buffer = open(buffer, b"[", depth, "Array")?;
    let mut array = Vec::default();
    loop {
        if let Ok((remains, _)) = char::<_, NomError<_>>(']')(buffer) {
            return Ok((remains, Value::Array(array)));
        }
        let (remains, value) = parse_value(buffer, depth + 1).map_err(|err| {
            ParseFailure::new(
                buffer,
                "Array",
                ParseErrorCode::RecMissingClosing(Box::new(err.code())),
            )
        })?;
        array.push(value);
        buffer = skip_white_space_or_comment(remains);
    }
}

/// REFERENCE: [7.3.5 Name objects, p27-28]
/// `#xx` sequences are replaced by the byte they denote.
fn name(buffer: &[Byte]) -> ParseResult<(&[Byte], String)> {
    let (remains, token) = preceded(
        char::<_, NomError<_>>('/'),
        opt(regular_token),
    )(buffer)
    .map_err(parse_recoverable!(
        e,
        ParseRecoverable::new(e.input, "Name", ParseErrorCode::NotFound(e.code))
    ))?;
    let token = token.unwrap_or_default();
    let mut name = Vec::with_capacity(token.len());
    let mut index = 0;
    while let Some(&byte) = token.get(index) {
        let escaped = token
            .get(index + 1..index + 3)
            .filter(|_| byte == b'#')
            .and_then(|pair| Some(hex_val(pair[0])? << 4 | hex_val(pair[1])?));
        match escaped {
            Some(byte) => {
                name.push(byte);
                index += 3;
            }
            None => {
                name.push(byte);
                index += 1;
            }
        }
    }
    Ok((remains, String::from_utf8_lossy(&name).into_owned()))
}

fn parse_name(buffer: &[Byte]) -> ParseResult<(&[Byte], Value)> {
    name(buffer).map(|(remains, name)| (remains, Value::Name(name)))
}

/// Numbers, booleans and null: the remaining regular-character tokens.
fn parse_token(buffer: &[Byte]) -> ParseResult<(&[Byte], Value)> {
    let (remains, token) = regular_token(buffer).map_err(parse_recoverable!(
        e,
        ParseRecoverable::new(e.input, "Token", ParseErrorCode::NotFound(e.code))
    ))?;
    let value = match token {
        _ if token == KW_NULL.as_bytes() => Value::Null,
        _ if token == KW_TRUE.as_bytes() => Value::Boolean(true),
        _ if token == KW_FALSE.as_bytes() => Value::Boolean(false),
        _ if token.contains(&b'.') => Value::Real(ascii_to_f64(token).ok_or_else(|| {
            ParseRecoverable::new(token, "Real", ParseErrorCode::ParseFloatError)
        })?),
        _ => Value::Integer(ascii_to_i64(token).ok_or_else(|| {
            ParseRecoverable::new(token, "Integer", ParseErrorCode::ParseIntError)
        })?),
    };
    Ok((remains, value))
}

mod convert {
    use super::*;
    use crate::GenerationNumber;
    use crate::ObjectNumber;

    impl Value {
        pub(crate) fn as_i64(&self) -> Option<i64> {
            match self {
                Self::Integer(integer) => Some(*integer),
                _ => None,
            }
        }

        pub(crate) fn as_u64(&self) -> Option<u64> {
            self.as_i64().and_then(|integer| u64::try_from(integer).ok())
        }

        pub(crate) fn as_name(&self) -> Option<&str> {
            match self {
                Self::Name(name) => Some(name),
                _ => None,
            }
        }

        pub(crate) fn as_reference(&self) -> Option<Reference> {
            match self {
                Self::Reference(reference) => Some(*reference),
                _ => None,
            }
        }

        pub(crate) fn as_dictionary(&self) -> Option<&Dictionary> {
            match self {
                Self::Dictionary(dictionary) => Some(dictionary),
                _ => None,
            }
        }

        pub(crate) fn as_text(&self) -> Option<String> {
            match self {
                Self::String(string) => Some(decode_text(string)),
                _ => None,
            }
        }
    }

    impl Dictionary {
        pub(crate) fn get(&self, key: &str) -> Option<&Value> {
            self.0.get(key)
        }

        pub(crate) fn get_u64(&self, key: &str) -> Option<u64> {
            self.get(key).and_then(Value::as_u64)
        }

        pub(crate) fn get_name(&self, key: &str) -> Option<&str> {
            self.get(key).and_then(Value::as_name)
        }

        pub(crate) fn get_reference(&self, key: &str) -> Option<Reference> {
            self.get(key).and_then(Value::as_reference)
        }

        pub(crate) fn get_text(&self, key: &str) -> Option<String> {
            self.get(key).and_then(Value::as_text)
        }

        /// Names of a `/Filter` entry, whether a single name or an array.
        pub(crate) fn get_names(&self, key: &str) -> Vec<&str> {
            match self.get(key) {
                Some(Value::Name(name)) => vec![name.as_str()],
                Some(Value::Array(array)) => array.iter().filter_map(Value::as_name).collect(),
                _ => Vec::default(),
            }
        }

        pub(crate) fn contains_key(&self, key: &str) -> bool {
            self.0.contains_key(key)
        }
    }

    impl<const N: usize> From<[(&str, Value); N]> for Dictionary {
        fn from(value: [(&str, Value); N]) -> Self {
            Self(
                value
                    .into_iter()
                    .map(|(key, value)| (key.to_string(), value))
                    .collect(),
            )
        }
    }

    impl From<Reference> for Value {
        fn from(value: Reference) -> Self {
            Self::Reference(value)
        }
    }

    impl From<Dictionary> for Value {
        fn from(value: Dictionary) -> Self {
            Self::Dictionary(value)
        }
    }

    impl From<(ObjectNumber, GenerationNumber)> for Value {
        fn from((object_number, generation_number): (ObjectNumber, GenerationNumber)) -> Self {
            Self::Reference(Reference::new(object_number, generation_number))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_assert_eq;

    #[test]
    fn value_valid() {
        parse_assert_eq!(b"12 0 R", Value::from((12, 0)), b"".as_slice());
        parse_assert_eq!(b"12 0 obj", Value::Integer(12), b" 0 obj".as_slice());
        parse_assert_eq!(b"-3.5]", Value::Real(-3.5), b"]".as_slice());
        parse_assert_eq!(b"true>>", Value::Boolean(true), b">>".as_slice());
        parse_assert_eq!(b"null", Value::Null, b"".as_slice());
        parse_assert_eq!(
            b"/Type#20Name/Next",
            Value::Name("Type Name".to_string()),
            b"/Next".as_slice()
        );
        parse_assert_eq!(
            b"[1 0 R /XYZ 0 792 null]",
            Value::Array(vec![
                Value::from((1, 0)),
                Value::Name("XYZ".to_string()),
                Value::Integer(0),
                Value::Integer(792),
                Value::Null,
            ]),
            b"".as_slice()
        );
    }

    #[test]
    fn value_invalid() {
        assert!(matches!(Value::parse(b">>"), Err(ParseErr::Recoverable(_))));
        assert!(matches!(Value::parse(b"[1 2"), Err(ParseErr::Failure(_))));
        assert!(matches!(Value::parse(b"1.2.3"), Err(ParseErr::Recoverable(_))));
    }

    #[test]
    fn value_nesting_depth() {
        let nested = |depth: usize| {
            format!("{}{}", "[".repeat(depth), "]".repeat(depth)).into_bytes()
        };
        let buffer = nested(MAX_NESTING_DEPTH);
        let (remains, _) = Value::parse(&buffer).unwrap();
        assert!(remains.is_empty());
        assert!(matches!(
            Value::parse(&nested(MAX_NESTING_DEPTH + 1)),
            Err(ParseErr::Failure(_))
        ));

        // Unterminated and far deeper than the cap
        let buffer = "[".repeat(200_000);
        assert!(matches!(
            Value::parse(buffer.as_bytes()),
            Err(ParseErr::Failure(_))
        ));
        let buffer = "<< /A ".repeat(200_000);
        assert!(matches!(
            Dictionary::parse(buffer.as_bytes()),
            Err(ParseErr::Failure(_))
        ));
    }

    #[test]
    fn dictionary_valid() {
        let buffer = b"<</Type/Catalog/Pages 2 0 R % comment\r\n/Names<</Dests 5 0 R>>/Lang(en-GB)>>rest";
        let (remains, dictionary) = Dictionary::parse(buffer).unwrap();
        assert_eq!(remains, b"rest");
        assert_eq!(dictionary.get_name("Type"), Some("Catalog"));
        assert_eq!(dictionary.get_reference("Pages"), Some(Reference::new(2, 0)));
        assert_eq!(dictionary.get_text("Lang"), Some("en-GB".to_string()));
        assert_eq!(
            dictionary.get("Names"),
            Some(&Value::Dictionary(Dictionary::from([(
                "Dests",
                Value::from((5, 0))
            )])))
        );
    }

    #[test]
    fn dictionary_invalid() {
        assert!(matches!(
            Dictionary::parse(b"<< /Size 3 /Root 1 0 R"),
            Err(ParseErr::Failure(_))
        ));
        assert!(matches!(
            Dictionary::parse(b"<< 12 /Value >>"),
            Err(ParseErr::Failure(_))
        ));
        assert!(matches!(
            Dictionary::parse(b"[ /Array ]"),
            Err(ParseErr::Recoverable(_))
        ));
    }
}
