//! Font names, subset tags and the known substitution table.

use std::collections::BTreeSet;

/// A set of font family names. Ordered so that reports and log lines are
/// deterministic for identical inputs.
pub type FontSet = BTreeSet<String>;

// ── SubstitutionRule ─────────────────────────────────────────────────────────

/// One entry of the metric-compatible substitution table: the conversion
/// engine renders `requested` using `substitute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub requested: &'static str,
    pub substitute: &'static str,
}

impl SubstitutionRule {
    pub const fn new(requested: &'static str, substitute: &'static str) -> Self {
        Self {
            requested,
            substitute,
        }
    }

    /// Returns `true` when `base_font` is the name a PDF producer writes for
    /// this rule's substitute.
    ///
    /// PostScript base-font names carry no spaces, so `Liberation Sans` is
    /// embedded as `LiberationSans`. The comparison is otherwise exact.
    ///
    /// ```
    /// # use printgate::SubstitutionRule;
    /// let rule = SubstitutionRule::new("Arial", "Liberation Sans");
    /// assert!(rule.matches_base_font("LiberationSans"));
    /// assert!(!rule.matches_base_font("Liberation Sans"));
    /// assert!(!rule.matches_base_font("LiberationSans-Bold"));
    /// ```
    pub fn matches_base_font(&self, base_font: &str) -> bool {
        base_font
            .chars()
            .eq(self.substitute.chars().filter(|c| *c != ' '))
    }
}

/// The substitutions the conversion engine's font configuration applies.
///
/// Maintained in parallel with the engine's fontconfig rules; only used to
/// classify the fonts found in converted output.
pub static SUBSTITUTION_RULES: &[SubstitutionRule] = &[
    SubstitutionRule::new("Calibri", "Carlito"),
    SubstitutionRule::new("Cambria", "Caladea"),
    SubstitutionRule::new("Arial", "Liberation Sans"),
    SubstitutionRule::new("Times New Roman", "Liberation Serif"),
];

// ── Name helpers ─────────────────────────────────────────────────────────────

/// Strip a PDF subset tag (`ABCDEF+Carlito` → `Carlito`).
///
/// Everything up to and including the last `+` is dropped; names without a
/// `+` come back unchanged.
pub fn strip_subset_tag(base_font: &str) -> &str {
    match base_font.rfind('+') {
        Some(idx) => &base_font[idx + 1..],
        None => base_font,
    }
}

/// Returns `true` when any font in `actual` is a known substitute.
///
/// This is a presence test against the substitute side of `rules` only: it
/// does not check which requested font the substitute replaced.
pub fn substitution_occurred(actual: &FontSet, rules: &[SubstitutionRule]) -> bool {
    actual
        .iter()
        .any(|font| rules.iter().any(|rule| rule.matches_base_font(font)))
}
