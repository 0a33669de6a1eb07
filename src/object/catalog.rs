use ::flate2::read::ZlibDecoder;
use ::std::io::Read;

use super::error::ObjectErr;
use super::error::ObjectErrorCode;
use super::error::ObjectResult;
use super::indirect::IndirectObject;
use super::reference::Reference;
use super::value::Dictionary;
use crate::Byte;

const KEY_TYPE: &str = "Type";
const KEY_SUBTYPE: &str = "Subtype";
const KEY_FILTER: &str = "Filter";

const FILTER_FLATE: &str = "FlateDecode";
/// REFERENCE: [Table 6 — Abbreviations for standard filter names, p264]
const FILTER_FLATE_ABBREVIATION: &str = "Fl";

/// REFERENCE: [7.7.2 Document catalog dictionary, p73-77]
#[derive(Debug, Default, PartialEq, Clone)]
pub struct RootObject {
    pub reference: Reference,
    pub pages: Reference,
    pub metadata: Reference,
    pub version: Option<String>,
    pub lang: Option<String>,
    pub page_layout: Option<String>,
    pub page_mode: Option<String>,
}

/// REFERENCE: [14.3.3 Document information dictionary, p549-550]
#[derive(Debug, Default, PartialEq, Clone)]
pub struct InfoObject {
    pub reference: Reference,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub trapped: Option<String>,
}

/// REFERENCE: [14.3.2 Metadata streams, p548-549]
/// The XMP packet, decompressed.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Metadata {
    pub reference: Reference,
    pub subtype: Option<String>,
    pub xmp: String,
}

impl TryFrom<&IndirectObject> for RootObject {
    type Error = ObjectErr;

    fn try_from(object: &IndirectObject) -> Result<Self, Self::Error> {
        let reference = object.reference();
        let dictionary = dictionary_of(object)?;
        expect_type(reference, dictionary, "Catalog")?;
        Ok(Self {
            reference,
            pages: dictionary.get_reference("Pages").unwrap_or_default(),
            metadata: dictionary.get_reference("Metadata").unwrap_or_default(),
            version: dictionary.get_name("Version").map(str::to_string),
            lang: dictionary.get_text("Lang"),
            page_layout: dictionary.get_name("PageLayout").map(str::to_string),
            page_mode: dictionary.get_name("PageMode").map(str::to_string),
        })
    }
}

impl TryFrom<&IndirectObject> for InfoObject {
    type Error = ObjectErr;

    fn try_from(object: &IndirectObject) -> Result<Self, Self::Error> {
        let reference = object.reference();
        let dictionary = dictionary_of(object)?;
        Ok(Self {
            reference,
            title: dictionary.get_text("Title"),
            author: dictionary.get_text("Author"),
            subject: dictionary.get_text("Subject"),
            keywords: dictionary.get_text("Keywords"),
            creator: dictionary.get_text("Creator"),
            producer: dictionary.get_text("Producer"),
            creation_date: dictionary.get_text("CreationDate"),
            mod_date: dictionary.get_text("ModDate"),
            // A name, although some producers write a string
            trapped: dictionary
                .get_name("Trapped")
                .map(str::to_string)
                .or_else(|| dictionary.get_text("Trapped")),
        })
    }
}

impl Metadata {
    /// Decodes the metadata stream of `object`, failing once its filters
    /// produce more than `max_decoded_size` bytes.
    pub(crate) fn decode(object: &IndirectObject, max_decoded_size: usize) -> ObjectResult<Self> {
        let reference = object.reference();
        let dictionary = dictionary_of(object)?;
        expect_type(reference, dictionary, "Metadata")?;
        let data = object
            .stream()
            .ok_or_else(|| ObjectErr::new(reference, ObjectErrorCode::MissingStream))?;
        let data = decode_stream(dictionary, data, max_decoded_size)
            .map_err(|code| ObjectErr::new(reference, code))?;
        Ok(Self {
            reference,
            subtype: dictionary.get_name(KEY_SUBTYPE).map(str::to_string),
            xmp: String::from_utf8_lossy(&data).into_owned(),
        })
    }
}

fn dictionary_of(object: &IndirectObject) -> ObjectResult<&Dictionary> {
    object
        .dictionary()
        .ok_or_else(|| ObjectErr::new(object.reference(), ObjectErrorCode::NotDictionary))
}

/// A missing `/Type` is tolerated, a different one is not.
fn expect_type(
    reference: Reference,
    dictionary: &Dictionary,
    expected: &'static str,
) -> ObjectResult<()> {
    match dictionary.get(KEY_TYPE) {
        None => Ok(()),
        Some(value) if value.as_name() == Some(expected) => Ok(()),
        Some(value) => Err(ObjectErr::new(
            reference,
            ObjectErrorCode::Type {
                expected,
                found: value.to_string(),
            },
        )),
    }
}

/// Applies the stream's filters. Only FlateDecode is supported.
fn decode_stream(
    dictionary: &Dictionary,
    data: &[Byte],
    limit: usize,
) -> Result<Vec<Byte>, ObjectErrorCode> {
    let mut decoded = data.to_vec();
    for filter in dictionary.get_names(KEY_FILTER) {
        decoded = match filter {
            FILTER_FLATE | FILTER_FLATE_ABBREVIATION => inflate(&decoded, limit)?,
            other => return Err(ObjectErrorCode::UnsupportedFilter(other.to_string())),
        };
    }
    Ok(decoded)
}

fn inflate(data: &[Byte], limit: usize) -> Result<Vec<Byte>, ObjectErrorCode> {
    let mut inflated = Vec::default();
    // One byte over the limit tells a full read from a truncated one
    ZlibDecoder::new(data)
        .take(limit as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(|err| ObjectErrorCode::Inflate(err.to_string()))?;
    if inflated.len() > limit {
        return Err(ObjectErrorCode::DecodedLimit(limit));
    }
    Ok(inflated)
}
