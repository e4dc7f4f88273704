//! Diagnostics for the cmdlink toolkit.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Span`], and the sticky per-cycle
//! slot pair [`CycleDiagnostics`] used by the tokenizer and its numeric
//! accessors. Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error — the requested value could not be produced.
    Error,
    /// Warning — a value was produced, but coerced or clamped.
    Warn,
}

/// Byte span in the parsed line buffer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first byte (0-based).
    pub start: usize,
    /// Byte offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }
}

/// A diagnostic message produced during a parse cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"CMD1101"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Optional byte span in the line buffer that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    Some(match id {
        codes::MISSING_PARAM => {
            "The requested parameter index is greater than the number of \
             parameters found by the last parse. Parameter indices start at 1; \
             index 0 is the command word."
        }
        codes::EXPECTED_CLOSING_PAREN => {
            "An opening parenthesis was found while a previous group was still \
             open. Groups do not nest; close the first group before opening \
             another."
        }
        codes::EXPECTED_OPENING_PAREN => {
            "A closing parenthesis was found with no group open. The stray \
             byte was consumed as a token boundary."
        }
        codes::MISMATCHED_QUOTES => {
            "The line ended while a quoted section was still open. Everything \
             after the opening quote was kept as a single token."
        }
        codes::MISMATCHED_PARENS => {
            "The line ended while a parenthesis group was still open."
        }
        codes::EXPECTED_FLOAT => {
            "The token holds integer text but a floating point value was \
             requested. The integer was converted; append a decimal point to \
             silence this warning."
        }
        codes::NOT_A_FLOAT => {
            "The token is not a valid floating point number (optional sign, \
             digits, exactly one decimal point). 0.0 was returned."
        }
        codes::TRUNCATED_TO_INT => {
            "The token holds floating point text but an integer was requested. \
             The fractional part was discarded."
        }
        codes::NOT_AN_INT => {
            "The token is not a valid integer (optional sign then decimal \
             digits, or a 0x-prefixed hex value). 0 was returned."
        }
        codes::OUT_OF_RANGE => {
            "The converted value fell outside the caller-supplied range and \
             the range policy treats that as an error. 0 was returned."
        }
        codes::CLAMPED_TO_MIN => {
            "The converted value fell below the caller-supplied minimum and \
             was replaced by the minimum."
        }
        codes::CLAMPED_TO_MAX => {
            "The converted value rose above the caller-supplied maximum and \
             was replaced by the maximum."
        }
        _ => return None,
    })
}

// ── CycleDiagnostics ────────────────────────────────────────────────────

/// Two sticky diagnostic slots with first-wins semantics.
///
/// A parse cycle starts with both slots empty. The first error and the first
/// warning raised during the cycle — including from accessor calls made
/// after the parse itself — are retained; later raises of the same kind are
/// dropped. There is no exception mechanism anywhere in the core: fallible
/// operations return a sentinel/zero value and callers poll these slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleDiagnostics {
    error: Option<Diagnostic>,
    warning: Option<Diagnostic>,
}

impl CycleDiagnostics {
    /// Create an empty slot pair (the start-of-cycle state).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic into the slot for its severity.
    ///
    /// If that slot is already occupied the diagnostic is dropped.
    pub fn raise(&mut self, diag: Diagnostic) {
        let slot = match diag.severity {
            Severity::Error => &mut self.error,
            Severity::Warn => &mut self.warning,
        };
        if slot.is_none() {
            *slot = Some(diag);
        }
    }

    /// The first error raised this cycle, if any.
    pub fn error(&self) -> Option<&Diagnostic> {
        self.error.as_ref()
    }

    /// The first warning raised this cycle, if any.
    pub fn warning(&self) -> Option<&Diagnostic> {
        self.warning.as_ref()
    }

    /// Whether an error has been raised this cycle.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Whether a warning has been raised this cycle.
    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    /// Whether both slots are empty.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.warning.is_none()
    }

    /// Reset both slots to empty.
    pub fn clear(&mut self) {
        self.error = None;
        self.warning = None;
    }

    /// Iterate over the retained diagnostics (error first, then warning).
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.error.iter().chain(self.warning.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Span ────────────────────────────────────────────────────────────

    #[test]
    fn span_new_valid() {
        let s = Span::new(5, 10);
        assert_eq!(s.start, 5);
        assert_eq!(s.end, 10);
    }

    #[test]
    fn span_empty() {
        let s = Span::empty(7);
        assert_eq!(s.start, 7);
        assert_eq!(s.end, 7);
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    // ── Severity / Diagnostic Display ───────────────────────────────────

    #[test]
    fn severity_display() {
        assert_eq!(format!("{}", Severity::Error), "error");
        assert_eq!(format!("{}", Severity::Warn), "warn");
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::MISSING_PARAM, "missing parameter", None);
        assert_eq!(format!("{d}"), "error[CMD1101]: missing parameter");
    }

    // ── Constructors / explain ──────────────────────────────────────────

    #[test]
    fn diagnostic_error_constructor() {
        let d = Diagnostic::error(codes::MISSING_PARAM, "missing parameter", None);
        assert_eq!(d.id, "CMD1101");
        assert_eq!(d.severity, Severity::Error);
        assert!(d.span.is_none());
    }

    #[test]
    fn diagnostic_warn_constructor() {
        let d = Diagnostic::warn(codes::MISMATCHED_QUOTES, "mismatched quotes", Some(Span::new(0, 5)));
        assert_eq!(d.severity, Severity::Warn);
        assert_eq!(d.span, Some(Span::new(0, 5)));
    }

    #[test]
    fn explain_known_codes() {
        let all = [
            codes::MISSING_PARAM,
            codes::EXPECTED_CLOSING_PAREN,
            codes::EXPECTED_OPENING_PAREN,
            codes::MISMATCHED_QUOTES,
            codes::MISMATCHED_PARENS,
            codes::EXPECTED_FLOAT,
            codes::NOT_A_FLOAT,
            codes::TRUNCATED_TO_INT,
            codes::NOT_AN_INT,
            codes::OUT_OF_RANGE,
            codes::CLAMPED_TO_MIN,
            codes::CLAMPED_TO_MAX,
        ];
        for code in &all {
            assert!(
                explain(code).is_some(),
                "diagnostic code {code} has no explain() entry"
            );
        }
    }

    #[test]
    fn explain_unknown_code() {
        assert!(explain("CMD9999").is_none());
    }

    // ── Serde ───────────────────────────────────────────────────────────

    #[test]
    fn diagnostic_serde_roundtrip() {
        let d = Diagnostic::error(codes::NOT_AN_INT, "not a valid integer", Some(Span::new(3, 8)));
        let json = serde_json::to_string(&d).unwrap();
        let d2: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, d2);
    }

    #[test]
    fn diagnostic_serde_omits_none_span() {
        let d = Diagnostic::error(codes::NOT_AN_INT, "test", None);
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("span"), "None span should be omitted: {json}");
    }

    // ── CycleDiagnostics ────────────────────────────────────────────────

    #[test]
    fn cycle_starts_empty() {
        let c = CycleDiagnostics::new();
        assert!(c.is_empty());
        assert!(!c.has_error());
        assert!(!c.has_warning());
    }

    #[test]
    fn first_error_wins() {
        let mut c = CycleDiagnostics::new();
        c.raise(Diagnostic::error(codes::MISSING_PARAM, "first", None));
        c.raise(Diagnostic::error(codes::NOT_AN_INT, "second", None));
        assert_eq!(c.error().unwrap().message, "first");
    }

    #[test]
    fn first_warning_wins() {
        let mut c = CycleDiagnostics::new();
        c.raise(Diagnostic::warn(codes::MISMATCHED_QUOTES, "first", None));
        c.raise(Diagnostic::warn(codes::TRUNCATED_TO_INT, "second", None));
        assert_eq!(c.warning().unwrap().message, "first");
    }

    #[test]
    fn error_and_warning_slots_are_independent() {
        let mut c = CycleDiagnostics::new();
        c.raise(Diagnostic::warn(codes::EXPECTED_FLOAT, "warn", None));
        c.raise(Diagnostic::error(codes::MISSING_PARAM, "err", None));
        assert!(c.has_error());
        assert!(c.has_warning());
        assert_eq!(c.iter().count(), 2);
    }

    #[test]
    fn iter_orders_error_first() {
        let mut c = CycleDiagnostics::new();
        c.raise(Diagnostic::warn(codes::EXPECTED_FLOAT, "warn", None));
        c.raise(Diagnostic::error(codes::MISSING_PARAM, "err", None));
        let kinds: Vec<_> = c.iter().map(|d| d.severity.clone()).collect();
        assert_eq!(kinds, vec![Severity::Error, Severity::Warn]);
    }

    #[test]
    fn clear_resets_both_slots() {
        let mut c = CycleDiagnostics::new();
        c.raise(Diagnostic::error(codes::MISSING_PARAM, "err", None));
        c.raise(Diagnostic::warn(codes::EXPECTED_FLOAT, "warn", None));
        c.clear();
        assert!(c.is_empty());
    }
}
