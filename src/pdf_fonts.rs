use crate::fonts::strip_subset_tag;
use crate::pdf_utils::{dict_entry, name_from_dict, resolve_dict};
use crate::{FontExtractionError, FontSet};
use lopdf::{Dictionary, Document, ObjectId};
use std::collections::HashSet;

/// Page-tree nodes followed upwards when looking for inherited resources.
const MAX_PARENT_DEPTH: usize = 32;

/// Form XObjects followed downwards when collecting their fonts.
const MAX_XOBJECT_DEPTH: usize = 8;

// ── PdfFontInventory ─────────────────────────────────────────────────────────

/// Lists the fonts a converted PDF actually uses.
///
/// For every page the `/Resources/Font` dictionary is read (inherited from
/// ancestor `/Pages` nodes when the page has no `/Resources` of its own),
/// together with the fonts of any form XObject the page draws. Each font's
/// `/BaseFont` is recorded with its subset tag removed.
pub struct PdfFontInventory {
    document: Document,
}

impl PdfFontInventory {
    /// Parse a PDF from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontExtractionError> {
        Ok(Self {
            document: Document::load_mem(data)?,
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Deduplicated family names of every font referenced by any page.
    pub fn font_names(&self) -> FontSet {
        let mut fonts = FontSet::new();
        for page_id in self.document.get_pages().values() {
            fonts.extend(self.page_font_names(*page_id));
        }
        fonts
    }

    /// Family names of the fonts referenced by a single page.
    pub fn page_font_names(&self, page_id: ObjectId) -> FontSet {
        let mut fonts = FontSet::new();
        let Some(resources) = self.page_resources(page_id) else {
            return fonts;
        };
        let mut visited = HashSet::new();
        self.collect_from_resources(resources, 0, &mut visited, &mut fonts);
        fonts
    }

    // ── Private: resource discovery ──────────────────────────────────────────

    /// The page's `/Resources`, walking `/Parent` links for inherited ones.
    fn page_resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let mut node = self.document.get_object(page_id).ok()?.as_dict().ok()?;

        for _ in 0..MAX_PARENT_DEPTH {
            if let Some(resources) = dict_entry(&self.document, node, b"Resources") {
                return Some(resources);
            }
            let parent_id = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.document.get_object(parent_id).ok()?.as_dict().ok()?;
        }

        None
    }

    fn collect_from_resources(
        &self,
        resources: &Dictionary,
        depth: usize,
        visited: &mut HashSet<ObjectId>,
        fonts: &mut FontSet,
    ) {
        if let Some(font_dict) = dict_entry(&self.document, resources, b"Font") {
            for (_, font_ref) in font_dict.iter() {
                let Some(font) = resolve_dict(&self.document, font_ref) else {
                    continue;
                };
                if let Some(base_font) = name_from_dict(font, b"BaseFont") {
                    let family = strip_subset_tag(&base_font);
                    if !family.is_empty() {
                        fonts.insert(family.to_string());
                    }
                }
            }
        }

        if depth >= MAX_XOBJECT_DEPTH {
            return;
        }

        let Some(xobjects) = dict_entry(&self.document, resources, b"XObject") else {
            return;
        };
        for (_, xobject_ref) in xobjects.iter() {
            // Only indirect streams can carry resources; guard against cycles.
            let Ok(id) = xobject_ref.as_reference() else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }
            let Some(stream) = self
                .document
                .get_object(id)
                .ok()
                .and_then(|o| o.as_stream().ok())
            else {
                continue;
            };
            let is_form = stream
                .dict
                .get(b"Subtype")
                .and_then(|v| v.as_name())
                .map(|n| n == b"Form")
                .unwrap_or(false);
            if !is_form {
                continue;
            }
            if let Some(inner) = dict_entry(&self.document, &stream.dict, b"Resources") {
                self.collect_from_resources(inner, depth + 1, visited, fonts);
            }
        }
    }
}
