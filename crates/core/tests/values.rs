//! Tests for the typed numeric parameter accessors.
//!
//! Covers the coercion policy (int→float and float→int with warnings),
//! hex parsing, range-checked variants under both policies, and the
//! first-wins sticky diagnostic slots across accessor calls.

use cmdlink_core::tokenizer::{RangePolicy, Tokenizer};
use cmdlink_core::codes;

fn buf(line: &str) -> Vec<u8> {
    line.as_bytes().to_vec()
}

// ─── Integer access ─────────────────────────────────────────────────────────

#[test]
fn int_text_parses_base_10() {
    let mut b = buf("CFG -42");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int(1), -42);
    assert!(cmd.diagnostics().is_empty());
}

#[test]
fn hex_text_parses_base_16_without_diagnostic() {
    let mut b = buf("CFG 0x1A");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int(1), 26);
    assert!(cmd.diagnostics().is_empty());
}

#[test]
fn float_text_truncates_with_warning() {
    let mut b = buf("CFG 3.7");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int(1), 3);
    assert_eq!(cmd.warning().unwrap().id, codes::TRUNCATED_TO_INT);
    assert!(!cmd.diagnostics().has_error());
}

#[test]
fn non_numeric_int_errors_and_returns_zero() {
    let mut b = buf("CFG abc");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int(1), 0);
    assert_eq!(cmd.error().unwrap().id, codes::NOT_AN_INT);
}

#[test]
fn missing_int_param_errors() {
    let mut b = buf("CFG");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int(1), 0);
    assert_eq!(cmd.error().unwrap().id, codes::MISSING_PARAM);
}

// ─── Float access ───────────────────────────────────────────────────────────

#[test]
fn float_text_parses() {
    let mut b = buf("CFG 3.5");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_float(1), 3.5);
    assert!(cmd.diagnostics().is_empty());
}

#[test]
fn int_text_coerces_to_float_with_warning() {
    let mut b = buf("CFG 42");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_float(1), 42.0);
    assert_eq!(cmd.warning().unwrap().id, codes::EXPECTED_FLOAT);
}

#[test]
fn non_numeric_float_errors_and_returns_zero() {
    let mut b = buf("CFG abc");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_float(1), 0.0);
    assert_eq!(cmd.error().unwrap().id, codes::NOT_A_FLOAT);
}

// ─── Range-checked variants ─────────────────────────────────────────────────

#[test]
fn in_range_value_passes_without_diagnostic() {
    let mut b = buf("CFG 5.0");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(
        cmd.param_as_float_bounded(1, 0.0, 10.0, RangePolicy::Warn),
        5.0
    );
    assert!(cmd.diagnostics().is_empty());
}

#[test]
fn above_max_clamps_under_warn_policy() {
    let mut b = buf("CFG 15.0");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(
        cmd.param_as_float_bounded(1, 0.0, 10.0, RangePolicy::Warn),
        10.0
    );
    assert_eq!(cmd.warning().unwrap().id, codes::CLAMPED_TO_MAX);
    assert!(!cmd.diagnostics().has_error());
}

#[test]
fn above_max_zeroes_under_error_policy() {
    let mut b = buf("CFG 15.0");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(
        cmd.param_as_float_bounded(1, 0.0, 10.0, RangePolicy::Error),
        0.0
    );
    assert_eq!(cmd.error().unwrap().id, codes::OUT_OF_RANGE);
}

#[test]
fn below_min_clamps_under_warn_policy() {
    let mut b = buf("CFG -3.5");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(
        cmd.param_as_float_bounded(1, 0.0, 10.0, RangePolicy::Warn),
        0.0
    );
    assert_eq!(cmd.warning().unwrap().id, codes::CLAMPED_TO_MIN);
}

#[test]
fn int_bounds_mirror_float_bounds() {
    let mut b = buf("CFG 100");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();
    assert_eq!(cmd.param_as_int_bounded(1, 0, 50, RangePolicy::Warn), 50);
    assert_eq!(cmd.warning().unwrap().id, codes::CLAMPED_TO_MAX);

    let mut b2 = buf("CFG 100");
    let mut cmd2 = Tokenizer::new().parse_cmd(&mut b2).unwrap();
    assert_eq!(cmd2.param_as_int_bounded(1, 0, 50, RangePolicy::Error), 0);
    assert_eq!(cmd2.error().unwrap().id, codes::OUT_OF_RANGE);
}

// ─── Sticky slots across accessor calls ─────────────────────────────────────

#[test]
fn first_error_and_first_warning_survive_later_raises() {
    let mut b = buf("A abc 3.7 xyz");
    let mut cmd = Tokenizer::new().parse_cmd(&mut b).unwrap();

    assert_eq!(cmd.param_as_int(1), 0); // error: not an int
    assert_eq!(cmd.param_as_int(2), 3); // warning: truncated
    assert_eq!(cmd.param_as_int(3), 0); // second error is dropped

    assert_eq!(cmd.error().unwrap().id, codes::NOT_AN_INT);
    assert_eq!(cmd.warning().unwrap().id, codes::TRUNCATED_TO_INT);
}

#[test]
fn each_parse_call_starts_a_fresh_cycle() {
    let tok = Tokenizer::new();

    let mut b1 = buf("A abc");
    let mut cmd1 = tok.parse_cmd(&mut b1).unwrap();
    assert_eq!(cmd1.param_as_int(1), 0);
    assert!(cmd1.diagnostics().has_error());

    let mut b2 = buf("A 7");
    let mut cmd2 = tok.parse_cmd(&mut b2).unwrap();
    assert_eq!(cmd2.param_as_int(1), 7);
    assert!(cmd2.diagnostics().is_empty());
}
