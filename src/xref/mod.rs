pub(crate) mod chain;
pub mod error;
pub(crate) mod section;
pub(crate) mod startxref;
pub mod trailer;

use ::nom::bytes::complete::tag;
use ::nom::error::Error as NomError;
use ::nom::sequence::terminated;
use ::nom::Err as NomErr;
use ::std::collections::BTreeMap;
use ::std::collections::BTreeSet;

use self::error::XRefErr;
use self::section::Entry;
use self::section::Subsection;
use crate::fmt::debug_bytes;
use crate::object::value::skip_white_space_or_comment;
use crate::parse::character_set::eol;
use crate::parse::error::ParseErr;
use crate::parse::error::ParseErrorCode;
use crate::parse::error::ParseRecoverable;
use crate::parse::Parser;
use crate::parse::KW_XREF;
use crate::parse_recoverable;
use crate::scan::hex::hex_to_bytes;
use crate::scan::FromHex;
use crate::GenerationNumber;
use crate::ObjectNumber;
use crate::Offset;

/// Where an in-use object lives.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct XrefEntry {
    pub offset: Offset,
    pub generation: GenerationNumber,
}

/// The decoded content of one cross-reference section.
/// REFERENCE: [7.5.4 Cross-reference table, p55-58]
#[derive(Debug, Default, PartialEq, Clone)]
pub struct XrefTable {
    section_start: Offset,
    in_use: BTreeMap<ObjectNumber, XrefEntry>,
    free: BTreeSet<ObjectNumber>,
}

/// Outcome of looking an object number up in a single table.
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) enum Lookup {
    InUse(XrefEntry),
    Free,
    Absent,
}

impl XrefTable {
    pub fn new(section_start: Offset) -> Self {
        Self {
            section_start,
            ..Default::default()
        }
    }

    pub fn section_start(&self) -> Offset {
        self.section_start
    }

    pub fn get(&self, object_number: ObjectNumber) -> Option<&XrefEntry> {
        self.in_use.get(&object_number)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ObjectNumber, &XrefEntry)> {
        self.in_use.iter()
    }

    pub fn free(&self) -> impl Iterator<Item = &ObjectNumber> {
        self.free.iter()
    }

    pub fn len(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_use.is_empty() && self.free.is_empty()
    }

    pub(crate) fn lookup(&self, object_number: ObjectNumber) -> Lookup {
        if let Some(entry) = self.in_use.get(&object_number) {
            Lookup::InUse(*entry)
        } else if self.free.contains(&object_number) {
            Lookup::Free
        } else {
            Lookup::Absent
        }
    }

    pub(crate) fn with_section_start(mut self, section_start: Offset) -> Self {
        self.section_start = section_start;
        self
    }

    fn insert(&mut self, object_number: ObjectNumber, entry: Entry) -> Result<(), XRefErr> {
        let replaced = match entry {
            Entry::InUse(offset, generation_number) => {
                if object_number == 0 {
                    return Err(XRefErr::InUseObjectZero {
                        generation_number,
                        offset,
                    });
                }
                let replaced = self.free.remove(&object_number);
                self.in_use
                    .insert(
                        object_number,
                        XrefEntry {
                            offset,
                            generation: generation_number,
                        },
                    )
                    .is_some()
                    || replaced
            }
            Entry::Free(_, _) => {
                let replaced = self.in_use.remove(&object_number).is_some();
                !self.free.insert(object_number) || replaced
            }
        };
        if replaced {
            // REFERENCE: [7.5.4 Cross-reference table, p56]
            // Subsections should not overlap, the last entry wins
            log::debug!("XrefTable: Duplicate entry for object {}", object_number);
        }
        Ok(())
    }
}

impl FromHex for XrefTable {
    type Error = XRefErr;

    /// REFERENCE: [7.5.4 Cross-reference table, p56]
    /// `xref` followed by subsections, up to the trailer boundary.
    fn from_hex(hex: &str) -> Result<Self, Self::Error> {
        let bytes = hex_to_bytes(hex)?;
        let buffer = skip_white_space_or_comment(&bytes);
        let (mut buffer, _) = terminated(tag::<_, _, NomError<_>>(KW_XREF.as_bytes()), eol)(
            buffer,
        )
        .map_err(parse_recoverable!(
            e,
            ParseRecoverable::new(e.input, stringify!(XrefTable), ParseErrorCode::NotFound(e.code))
        ))?;

        let mut table = Self::default();
        while let Some(result) = Subsection::parse_suppress_recoverable::<Subsection>(buffer) {
            let (remains, subsection) = result?;
            buffer = remains;
            for (number, entry) in (subsection.first_object_number..).zip(subsection.entries) {
                table.insert(number, entry)?;
            }
        }
        let buffer = skip_white_space_or_comment(buffer);
        if !buffer.is_empty() {
            return Err(XRefErr::TrailingData(debug_bytes(buffer)));
        }
        Ok(table)
    }
}
