//! Requested-font extraction from an OOXML word-processing package.
//!
//! The package is a ZIP archive; `word/fontTable.xml` lists every font the
//! document declares as `<w:font w:name="…">` elements in the
//! WordprocessingML namespace.

use crate::{FontExtractionError, FontSet};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::{Cursor, Read};

/// Archive member holding the document's font table.
pub const FONT_TABLE_MEMBER: &str = "word/fontTable.xml";

/// Namespace of `w:font` elements and their `w:name` attribute.
pub const WORDPROCESSINGML_NS: &[u8] =
    b"http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Largest font table inflated by default. Real tables are a few kilobytes.
pub const DEFAULT_FONT_TABLE_LIMIT: u64 = 8 * 1024 * 1024;

/// Open `package` as a ZIP archive and return the fonts declared in its font
/// table.
///
/// At most `limit` bytes of the member are inflated; a larger table is
/// rejected with [`FontExtractionError::MemberTooLarge`] whatever size the
/// archive header declares.
pub fn read_font_table(package: &[u8], limit: u64) -> Result<FontSet, FontExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package))?;
    let mut member = archive
        .by_name(FONT_TABLE_MEMBER)
        .map_err(|_| FontExtractionError::MissingMember(FONT_TABLE_MEMBER.into()))?;

    let capacity = usize::try_from(member.size().min(limit)).unwrap_or(0);
    let mut xml = Vec::with_capacity(capacity);
    member.by_ref().take(limit.saturating_add(1)).read_to_end(&mut xml)?;
    if xml.len() as u64 > limit {
        return Err(FontExtractionError::MemberTooLarge {
            member: FONT_TABLE_MEMBER.into(),
            limit,
        });
    }

    parse_font_table(&xml)
}

/// Parse font-table XML, collecting the `name` attribute of every `font`
/// element in the WordprocessingML namespace.
///
/// Prefixes are resolved from the `xmlns` declarations in scope, so the
/// conventional `w:` prefix is not required. Any parse error, including a
/// document that ends inside an open element, discards the whole result.
pub fn parse_font_table(xml: &[u8]) -> Result<FontSet, FontExtractionError> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();
    let mut fonts = FontSet::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if let Some(name) = font_name(&reader, e)? {
                    fonts.insert(name);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(name) = font_name(&reader, e)? {
                    fonts.insert(name);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) if depth > 0 => {
                return Err(FontExtractionError::Xml(format!(
                    "document ends inside {depth} open element(s)"
                )))
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FontExtractionError::Xml(format!(
                    "error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(fonts)
}

fn is_wordprocessingml(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == WORDPROCESSINGML_NS)
}

/// The unescaped WordprocessingML `name` attribute when `element` is a
/// WordprocessingML `font` element.
fn font_name<R>(
    reader: &NsReader<R>,
    element: &BytesStart<'_>,
) -> Result<Option<String>, FontExtractionError> {
    let (ns, local) = reader.resolve_element(element.name());
    if local.as_ref() != b"font" || !is_wordprocessingml(&ns) {
        return Ok(None);
    }

    for attr in element.attributes() {
        let attr = attr.map_err(|e| FontExtractionError::Xml(e.to_string()))?;
        // Unprefixed attributes are in no namespace and resolve as unbound.
        let (ns, local) = reader.resolve_attribute(attr.key);
        if local.as_ref() != b"name" || !is_wordprocessingml(&ns) {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| FontExtractionError::Xml(format!("font name: {e}")))?;
        return Ok(Some(value.into_owned()));
    }

    Ok(None)
}
