use crate::font_table::{read_font_table, DEFAULT_FONT_TABLE_LIMIT};
use crate::fonts::{substitution_occurred, FontSet, SubstitutionRule, SUBSTITUTION_RULES};
use crate::pdf_fonts::PdfFontInventory;
use crate::{Document, FontExtractionError};
use serde::Serialize;
use std::fmt;

// ── FidelityReport ───────────────────────────────────────────────────────────

/// Outcome of comparing the fonts a source document asked for with the fonts
/// the converted PDF embeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FidelityReport {
    /// Fonts declared in the source package's font table. Empty for inputs
    /// that are not word-processing packages or that have no readable table.
    pub requested: FontSet,

    /// Family names of the fonts referenced by the PDF's pages, subset tags
    /// removed.
    pub actual: FontSet,

    /// `true` when `actual` contains a known metric-compatible substitute.
    pub substitution_occurred: bool,
}

impl FidelityReport {
    pub fn status(&self) -> FidelityStatus {
        if self.substitution_occurred {
            FidelityStatus::Substituted
        } else {
            FidelityStatus::Exact
        }
    }
}

/// Value of the `X-Fidelity-Status` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FidelityStatus {
    Exact,
    Substituted,
}

impl FidelityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FidelityStatus::Exact => "Exact",
            FidelityStatus::Substituted => "Substituted",
        }
    }
}

impl fmt::Display for FidelityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FontFidelityAnalyzer ─────────────────────────────────────────────────────

/// Measures whether the fonts requested by a document survived conversion.
///
/// Analysis never fails: any problem reading the source package or the PDF
/// yields an empty font set for that side and is logged at debug level.
///
/// ```no_run
/// use printgate::{Document, FontFidelityAnalyzer};
///
/// let source = Document::new("report.docx", std::fs::read("report.docx").unwrap());
/// let pdf = std::fs::read("report.pdf").unwrap();
///
/// let report = FontFidelityAnalyzer::new().analyze(&source, &pdf);
/// println!("{} -> {} ({})", report.requested.len(), report.actual.len(), report.status());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FontFidelityAnalyzer {
    rules: &'static [SubstitutionRule],
    font_table_limit: u64,
}

impl Default for FontFidelityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl FontFidelityAnalyzer {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Analyzer using the built-in [`SUBSTITUTION_RULES`].
    pub fn new() -> Self {
        Self::with_rules(SUBSTITUTION_RULES)
    }

    /// Analyzer classifying against a custom substitution table.
    pub fn with_rules(rules: &'static [SubstitutionRule]) -> Self {
        Self {
            rules,
            font_table_limit: DEFAULT_FONT_TABLE_LIMIT,
        }
    }

    /// Cap on the inflated size of a source package's font table. Larger
    /// tables are treated as unreadable.
    pub fn with_font_table_limit(mut self, limit: u64) -> Self {
        self.font_table_limit = limit;
        self
    }

    pub fn rules(&self) -> &'static [SubstitutionRule] {
        self.rules
    }

    pub fn font_table_limit(&self) -> u64 {
        self.font_table_limit
    }

    // ── Analysis ──────────────────────────────────────────────────────────────

    /// Build the full report for one converted document.
    pub fn analyze(&self, source: &Document, pdf: &[u8]) -> FidelityReport {
        let requested = self.requested_fonts(source);
        let actual = self.actual_fonts(source, pdf);
        let substitution_occurred = self.classify(&actual);

        FidelityReport {
            requested,
            actual,
            substitution_occurred,
        }
    }

    /// Fonts declared by the source document's font table.
    ///
    /// Only word-processing packages (`.docx`) are inspected; everything else
    /// yields an empty set.
    pub fn requested_fonts(&self, source: &Document) -> FontSet {
        if !source.is_word_package() {
            return FontSet::new();
        }
        degrade(
            source.filename(),
            "requested",
            read_font_table(source.data(), self.font_table_limit),
        )
    }

    /// Fonts referenced by the pages of `pdf`, the conversion of `source`.
    pub fn actual_fonts(&self, source: &Document, pdf: &[u8]) -> FontSet {
        let inventory = PdfFontInventory::from_bytes(pdf).map(|inv| inv.font_names());
        degrade(source.filename(), "actual", inventory)
    }

    /// `true` when `actual` contains any substitute from this analyzer's table.
    pub fn classify(&self, actual: &FontSet) -> bool {
        substitution_occurred(actual, self.rules)
    }
}

/// Absorb an extraction failure into an empty set.
fn degrade(filename: &str, side: &str, result: Result<FontSet, FontExtractionError>) -> FontSet {
    result.unwrap_or_else(|e| {
        tracing::debug!(filename, side, error = %e, "font extraction degraded");
        FontSet::new()
    })
}
