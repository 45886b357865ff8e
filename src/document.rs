use bytes::Bytes;
use std::path::Path;

// ── Document ─────────────────────────────────────────────────────────────────

/// An uploaded source document travelling through the pipeline.
///
/// Created once at request ingress and never mutated. Cloning is cheap: the
/// content is a reference-counted [`Bytes`] buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    filename: String,
    data: Bytes,
}

impl Document {
    /// Wrap an uploaded file.
    ///
    /// ```
    /// # use printgate::Document;
    /// let doc = Document::new("report.docx", b"PK\x03\x04".to_vec());
    /// assert_eq!(doc.filename(), "report.docx");
    /// assert_eq!(doc.len(), 4);
    /// ```
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// The filename as supplied by the uploader.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The raw uploaded content.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the file extension as written in the filename, or `None` if the
    /// filename has no extension.
    ///
    /// ```
    /// # use printgate::Document;
    /// let doc = Document::new("Quarterly.DOCX", Vec::new());
    /// assert_eq!(doc.extension(), Some("DOCX"));
    /// ```
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
    }

    /// Returns `true` when the file's extension matches `ext`
    /// (case-insensitive comparison).
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
    }

    /// Returns `true` for OOXML word-processing packages, the only format whose
    /// font table is inspected.
    pub fn is_word_package(&self) -> bool {
        self.has_extension("docx")
    }
}
