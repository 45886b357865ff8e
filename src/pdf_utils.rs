//! Shared lopdf navigation helpers.

use lopdf::{Dictionary, Document, Object};

/// Resolve a value that might be an inline dictionary or a reference to one.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    if let Ok(id) = value.as_reference() {
        document.get_object(id).ok().and_then(|o| o.as_dict().ok())
    } else {
        value.as_dict().ok()
    }
}

/// Look up `key` in `dict` and resolve it to a dictionary.
pub fn dict_entry<'a>(document: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    dict.get(key).ok().and_then(|v| resolve_dict(document, v))
}

/// Extract a name value (e.g. `/BaseFont`) from a PDF dictionary.
///
/// Returns `Some(String)` if the key exists and holds a non-empty name,
/// `None` otherwise.
pub fn name_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_name().ok())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .filter(|s| !s.is_empty())
}
