// Shared fixtures for the integration tests.
//
// PDFs are generated with lopdf and DOCX packages with zip, so no binary
// fixtures need to be checked in.

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use printgate::{ConversionFailure, Converter};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

// ── PDF fixtures ─────────────────────────────────────────────────────────────

/// A PDF with one page per entry; each page references the given base fonts.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for fonts in pages {
        let font_dict = font_resources(&mut doc, fonts);
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => font_dict },
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    finish(doc, pages_id, kids, None)
}

/// A PDF with a single page.
pub fn pdf_with_fonts(fonts: &[&str]) -> Vec<u8> {
    pdf_with_pages(&[fonts])
}

/// A single-page PDF whose fonts live on the `/Pages` node and are inherited.
pub fn pdf_with_inherited_fonts(fonts: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_dict = font_resources(&mut doc, fonts);
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"BT ET".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });

    finish(doc, pages_id, vec![page_id.into()], Some(dictionary! { "Font" => font_dict }))
}

/// A single-page PDF whose only font is referenced from a form XObject.
pub fn pdf_with_form_xobject_font(font: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_dict = font_resources(&mut doc, &[font]);
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
            "Resources" => dictionary! { "Font" => font_dict },
        },
        b"BT ET".to_vec(),
    ));
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"/X1 Do".to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! { "XObject" => dictionary! { "X1" => form_id } },
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });

    finish(doc, pages_id, vec![page_id.into()], None)
}

fn font_resources(doc: &mut Document, fonts: &[&str]) -> Dictionary {
    let mut font_dict = Dictionary::new();
    for (i, base_font) in fonts.iter().enumerate() {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        });
        font_dict.set(format!("F{}", i + 1), font_id);
    }
    font_dict
}

fn finish(
    mut doc: Document,
    pages_id: lopdf::ObjectId,
    kids: Vec<Object>,
    resources: Option<Dictionary>,
) -> Vec<u8> {
    let count = kids.len() as i64;
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
    };
    if let Some(resources) = resources {
        pages.set("Resources", resources);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

// ── DOCX fixtures ────────────────────────────────────────────────────────────

/// A ZIP package containing exactly the given members.
pub fn package_with_members(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in members {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Font-table XML declaring `fonts`.
pub fn font_table_xml(fonts: &[&str]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:fonts xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:w="{W_NS}">"#
    );
    for font in fonts {
        xml.push_str(&format!(
            r#"<w:font w:name="{font}"><w:charset w:val="00"/><w:family w:val="swiss"/></w:font>"#
        ));
    }
    xml.push_str("</w:fonts>");
    xml
}

/// A minimal `.docx` package whose font table declares `fonts`.
pub fn docx_with_fonts(fonts: &[&str]) -> Vec<u8> {
    let document_xml = format!(
        r#"<w:document xmlns:w="{W_NS}"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#
    );
    let font_table = font_table_xml(fonts);
    let package = package_with_members(&[
        ("[Content_Types].xml", b"<Types/>".as_slice()),
        ("word/document.xml", document_xml.as_bytes()),
        ("word/fontTable.xml", font_table.as_bytes()),
    ]);
    package
}

// ── Test doubles ─────────────────────────────────────────────────────────────

/// Converter returning a canned result and counting its calls.
pub struct StaticConverter {
    result: Result<Bytes, ConversionFailure>,
    calls: AtomicUsize,
}

impl StaticConverter {
    pub fn returning(pdf: Vec<u8>) -> Self {
        Self {
            result: Ok(Bytes::from(pdf)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: ConversionFailure) -> Self {
        Self {
            result: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Converter for StaticConverter {
    async fn convert(&self, _document: &printgate::Document) -> Result<Bytes, ConversionFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
