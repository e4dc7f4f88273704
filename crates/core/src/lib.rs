//! cmdlink core library.
//!
//! Provides the in-place command tokenizer and numeric classification used
//! to turn an accumulated command line into a command word, parameters, and
//! typed values. The main entry point is [`Tokenizer::parse_cmd`]; the
//! returned [`ParsedCmd`] exposes indexed, keyed, and numeric accessors.

#![warn(missing_docs)]

/// Numeric classification and conversion over token bytes.
pub mod numeric;
/// The in-place tokenizer, parse results, and accessors.
pub mod tokenizer;

// ── Convenience re-exports ──────────────────────────────────────────────
// Flat imports for the common entry points. The full module paths remain
// available.

pub use tokenizer::{
    CHAR_EQ, CHAR_QUOTE, CHAR_SPACE, KeySource, ParseError, ParseSummary, ParsedCmd, RangePolicy,
    StaticKey, Tokenizer, TokenizerConfig,
};

pub use numeric::{is_float, is_hex, is_int};

// Diagnostics (re-exported from the diagnostics crate)
pub use cmdlink_diagnostics::{CycleDiagnostics, Diagnostic, Severity, Span, codes};
