//! Diagnostic ID constants.
//!
//! Use these instead of string literals to get compile-time typo detection
//! and IDE autocomplete. The `CMD11xx` family covers tokenizer-cycle
//! diagnostics; `CMD12xx` covers numeric conversion diagnostics.

/// Requested parameter index is past the last parsed parameter.
pub const MISSING_PARAM: &str = "CMD1101";
/// An open parenthesis appeared while a group was already open.
pub const EXPECTED_CLOSING_PAREN: &str = "CMD1102";
/// A close parenthesis appeared with no group open.
pub const EXPECTED_OPENING_PAREN: &str = "CMD1103";
/// Quoted mode was still active at the end of the line.
pub const MISMATCHED_QUOTES: &str = "CMD1104";
/// A parenthesis group was still open at the end of the line.
pub const MISMATCHED_PARENS: &str = "CMD1105";

/// Integer text supplied where a float was requested (value coerced).
pub const EXPECTED_FLOAT: &str = "CMD1201";
/// Token text is not a valid floating point number.
pub const NOT_A_FLOAT: &str = "CMD1202";
/// Float text supplied where an integer was requested (value truncated).
pub const TRUNCATED_TO_INT: &str = "CMD1203";
/// Token text is not a valid integer number.
pub const NOT_AN_INT: &str = "CMD1204";
/// Value fell outside the caller-supplied range under the error policy.
pub const OUT_OF_RANGE: &str = "CMD1205";
/// Value fell below the range and was clamped to the minimum.
pub const CLAMPED_TO_MIN: &str = "CMD1206";
/// Value rose above the range and was clamped to the maximum.
pub const CLAMPED_TO_MAX: &str = "CMD1207";
