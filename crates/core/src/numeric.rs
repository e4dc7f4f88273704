//! Numeric classification over token bytes.
//!
//! Stateless predicates deciding whether a token holds integer, floating
//! point, or hexadecimal text, plus the conversion helpers behind the
//! typed parameter accessors. Classification is strict: every byte of the
//! token must participate, so `"12abc"` is neither an integer nor a float.

/// Whether `text` is a valid integer: optional single leading sign, then
/// one or more decimal digits, nothing else.
pub fn is_int(text: &[u8]) -> bool {
    let mut digits = 0usize;
    for (i, &b) in text.iter().enumerate() {
        if i == 0 && (b == b'+' || b == b'-') {
            continue;
        }
        if b.is_ascii_digit() {
            digits += 1;
            continue;
        }
        return false;
    }
    digits > 0
}

/// Whether `text` is a valid float: optional single leading sign, then
/// digits and exactly one decimal point (at least one digit, exactly one
/// point), nothing else.
pub fn is_float(text: &[u8]) -> bool {
    let body = match text.split_first() {
        Some((&b'+' | &b'-', rest)) => rest,
        _ => text,
    };
    let mut digits = 0usize;
    let mut points = 0usize;
    for &b in body {
        if b.is_ascii_digit() {
            digits += 1;
        } else if b == b'.' {
            points += 1;
        } else {
            return false;
        }
    }
    digits > 0 && points == 1
}

/// Whether `text` is a valid hex value: optional leading sign, mandatory
/// `0x` prefix, then one or more hex digits (upper or lower case).
pub fn is_hex(text: &[u8]) -> bool {
    let body = match text.split_first() {
        Some((&b'+' | &b'-', rest)) => rest,
        _ => text,
    };
    let Some(digits) = body.strip_prefix(b"0x") else {
        return false;
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_hexdigit)
}

// ── Conversion helpers ──────────────────────────────────────────────────

/// Parse decimal integer text, saturating at the `i64` bounds on overflow.
///
/// Callers must have established `is_int(text)` first.
pub(crate) fn int_value(text: &[u8]) -> i64 {
    let s = str_of(text);
    s.parse::<i64>().unwrap_or_else(|_| {
        if s.starts_with('-') { i64::MIN } else { i64::MAX }
    })
}

/// Parse `0x`-prefixed hex text with an optional leading sign, saturating
/// on overflow. Callers must have established `is_hex(text)` first.
pub(crate) fn hex_value(text: &[u8]) -> i64 {
    let (negative, body) = match text.split_first() {
        Some((&b'-', rest)) => (true, rest),
        Some((&b'+', rest)) => (false, rest),
        _ => (false, text),
    };
    let digits = body.strip_prefix(b"0x").unwrap_or(body);
    let magnitude = i64::from_str_radix(str_of(digits), 16).unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}

/// Parse float text keeping only the integral part (truncation toward
/// zero). Callers must have established `is_float(text)` first.
pub(crate) fn truncated_int_value(text: &[u8]) -> i64 {
    let integral = match text.iter().position(|&b| b == b'.') {
        Some(p) => &text[..p],
        None => text,
    };
    // A float like ".5" or "-.5" has an empty integral part: value 0.
    str_of(integral).parse::<i64>().unwrap_or(0)
}

/// Parse float text. Callers must have established `is_float(text)` or
/// `is_int(text)` first.
pub(crate) fn float_value(text: &[u8]) -> f64 {
    str_of(text).parse::<f64>().unwrap_or(0.0)
}

/// Classified text is all-ASCII, so the UTF-8 check cannot fail; the
/// fallback keeps the helpers total for unclassified input.
fn str_of(text: &[u8]) -> &str {
    std::str::from_utf8(text).unwrap_or("")
}
