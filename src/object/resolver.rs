use ::once_cell::sync::Lazy;

use crate::parse::KW_ENDOBJ;
use crate::parse::KW_OBJ;
use crate::pdf::error::MalformedCode;
use crate::pdf::error::PdfError;
use crate::pdf::error::PdfResult;
use crate::pdf::Limits;
use crate::scan::hex::find_literal;
use crate::scan::hex::to_hex;
use crate::scan::reader::BoundedReader;
use crate::xref::Lookup;
use crate::xref::XrefEntry;
use crate::xref::XrefTable;
use crate::Byte;
use crate::ObjectNumber;
use crate::OBJECT_WINDOW;

static HEX_OBJ: Lazy<String> = Lazy::new(|| to_hex(KW_OBJ.as_bytes()));
static HEX_ENDOBJ: Lazy<String> = Lazy::new(|| to_hex(KW_ENDOBJ.as_bytes()));

/// Finds `object_number` in the tables, newest first. The first table that
/// mentions the object decides, even when it marks it as free.
pub(crate) fn lookup(object_number: ObjectNumber, tables: &[XrefTable]) -> PdfResult<XrefEntry> {
    for table in tables {
        match table.lookup(object_number) {
            Lookup::InUse(entry) => return Ok(entry),
            Lookup::Free => {
                log::debug!(
                    "Resolver: Object {} is free in the section at {}",
                    object_number,
                    table.section_start()
                );
                return Err(PdfError::ObjectNotFound(object_number));
            }
            Lookup::Absent => continue,
        }
    }
    Err(PdfError::ObjectNotFound(object_number))
}

/// Raw bytes of the object, from the cross-reference offset up to and
/// including `endobj`.
pub(crate) fn resolve<'buffer>(
    reader: &BoundedReader<'buffer>,
    object_number: ObjectNumber,
    tables: &[XrefTable],
    limits: &Limits,
) -> PdfResult<&'buffer [Byte]> {
    let XrefEntry { offset, .. } = lookup(object_number, tables)?;
    if offset == 0 || offset >= reader.len() {
        return Err(PdfError::InvalidOffset(object_number, offset));
    }
    let malformed = |code| PdfError::MalformedObject {
        object_number,
        offset,
        code,
    };

    let mut hex = String::default();
    for (index, window) in reader.windows(offset, OBJECT_WINDOW).enumerate() {
        // `endobj` may straddle the previous window
        let from = hex.len().saturating_sub(HEX_ENDOBJ.len());
        hex.push_str(&to_hex(window.bytes));
        if index == 0 && find_literal(&hex, &HEX_OBJ, 0).is_none() {
            return Err(malformed(MalformedCode::MissingObj));
        }
        if let Some(position) = find_literal(&hex, &HEX_ENDOBJ, from) {
            let size = (position + HEX_ENDOBJ.len()) / 2;
            if size > limits.max_object_size {
                break;
            }
            log::debug!(
                "Resolver: Object {} at {}: {} bytes",
                object_number,
                offset,
                size
            );
            return Ok(reader.read(offset, size).bytes);
        }
        if hex.len() / 2 > limits.max_object_size {
            break;
        }
    }
    if hex.len() / 2 > limits.max_object_size {
        return Err(PdfError::ObjectTooLarge(object_number, limits.max_object_size));
    }
    Err(malformed(MalformedCode::MissingEndObj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_err_eq;
    use crate::scan::FromHex;
    use crate::tests::DocBuilder;

    fn table(section: &str, section_start: usize) -> XrefTable {
        XrefTable::from_hex(&to_hex(section.as_bytes()))
            .unwrap()
            .with_section_start(section_start)
    }

    #[test]
    fn lookup_first_table_wins() {
        let newest = table("xref\n1 1\n0000000100 00000 n \n", 300);
        let oldest = table("xref\n1 2\n0000000010 00000 n \n0000000020 00000 n \n", 200);
        let tables = [newest, oldest];
        assert_eq!(
            lookup(1, &tables),
            Ok(XrefEntry {
                offset: 100,
                generation: 0
            })
        );
        assert_eq!(
            lookup(2, &tables),
            Ok(XrefEntry {
                offset: 20,
                generation: 0
            })
        );
        assert_err_eq!(lookup(3, &tables), PdfError::ObjectNotFound(3));

        // A free entry shadows older in-use entries
        let deleted = table("xref\n2 1\n0000000000 00001 f \n", 400);
        let tables = [deleted, tables[0].clone(), tables[1].clone()];
        assert_err_eq!(lookup(2, &tables), PdfError::ObjectNotFound(2));
    }

    #[test]
    fn resolve_valid() {
        let mut doc = DocBuilder::new("1.4");
        let body = format!("<< /Title ({}) >>", "x".repeat(250));
        let first = doc.object(1, &body);
        let second = doc.object(2, "<< /Type /Catalog >>");
        let buffer = doc.finish(0, "\n");
        let reader = BoundedReader::new(&buffer);
        let tables = [table(
            &format!("xref\n1 2\n{:010} 00000 n \n{:010} 00000 n \n", first, second),
            0,
        )];

        // Spans several windows and stops at its own `endobj`
        let raw = resolve(&reader, 1, &tables, &Limits::default()).unwrap();
        assert!(raw.starts_with(b"1 0 obj\n<< /Title (xxx"));
        assert!(raw.ends_with(b">>\nendobj"));
        assert_eq!(first + raw.len() + 1, second);

        let raw = resolve(&reader, 2, &tables, &Limits::default()).unwrap();
        assert_eq!(raw, b"2 0 obj\n<< /Type /Catalog >>\nendobj");
    }

    #[test]
    fn resolve_invalid() {
        let mut doc = DocBuilder::new("1.4");
        let object = doc.object(1, &format!("<< /Title ({}) >>", "x".repeat(250)));
        let unterminated = doc.push("3 0 obj\n<< /Type /Catalog >>\n");
        let buffer = doc.buffer.clone();
        let reader = BoundedReader::new(&buffer);
        // Object 2 points into the middle of object 1
        let tables = [table(
            &format!(
                "xref\n1 4\n{:010} 00000 n \n{:010} 00000 n \n{:010} 00000 n \n0000000000 00000 n \n",
                object,
                object + 20,
                unterminated
            ),
            0,
        )];

        assert_err_eq!(
            resolve(&reader, 7, &tables, &Limits::default()),
            PdfError::ObjectNotFound(7)
        );
        assert_err_eq!(
            resolve(&reader, 4, &tables, &Limits::default()),
            PdfError::InvalidOffset(4, 0)
        );
        assert_err_eq!(
            resolve(&reader, 2, &tables, &Limits::default()),
            PdfError::MalformedObject {
                object_number: 2,
                offset: object + 20,
                code: MalformedCode::MissingObj,
            }
        );
        assert_err_eq!(
            resolve(&reader, 3, &tables, &Limits::default()),
            PdfError::MalformedObject {
                object_number: 3,
                offset: unterminated,
                code: MalformedCode::MissingEndObj,
            }
        );
        let limits = Limits {
            max_object_size: 150,
            ..Limits::default()
        };
        assert_err_eq!(
            resolve(&reader, 1, &tables, &limits),
            PdfError::ObjectTooLarge(1, 150)
        );
    }
}
