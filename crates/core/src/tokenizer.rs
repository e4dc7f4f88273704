//! In-place command line tokenizer.
//!
//! [`Tokenizer::parse_cmd`] makes a single forward pass over a line buffer,
//! overwriting separators, quotes, and parenthesis bytes with NUL so the
//! buffer becomes a sequence of NUL-delimited tokens. Token index 0 is the
//! command word; indices 1..N are parameters. The returned [`ParsedCmd`]
//! borrows the buffer and re-derives every token from it on each accessor
//! call — nothing is cached, so two calls with no intervening mutation
//! always agree.

use cmdlink_diagnostics::{CycleDiagnostics, Diagnostic, Span, codes};
use serde::Serialize;

use crate::numeric;

/// Default token separator (space).
pub const CHAR_SPACE: u8 = 0x20;
/// Quote byte toggling quoted mode (`"`).
pub const CHAR_QUOTE: u8 = 0x22;
/// Key-value separator inside a `KEY=value` token (`=`).
pub const CHAR_EQ: u8 = 0x3D;

// ── Configuration ───────────────────────────────────────────────────────

/// Tokenizer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Byte that separates tokens outside quotes and parens. Default space.
    pub separator: u8,
    /// Disable quote handling entirely. Default `false` (quoting active).
    pub ignore_quote: bool,
    /// Optional `(open, close)` parenthesis pair. `None` disables grouping.
    pub parens: Option<(u8, u8)>,
    /// Documentary flag: the command mixes `KEY=value` pairs with plain
    /// parameters. Each pair still counts as one token; this flag changes
    /// no parsing behavior.
    pub key_value: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            separator: CHAR_SPACE,
            ignore_quote: false,
            parens: None,
            key_value: false,
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Call-rejecting tokenizer failures.
///
/// These reject the `parse_cmd` call itself and touch no diagnostic state,
/// unlike the sticky per-cycle diagnostics raised during a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer was empty.
    EmptyBuffer,
    /// The first byte of the buffer was already a NUL terminator.
    LeadingTerminator,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyBuffer => write!(f, "parse buffer is empty"),
            ParseError::LeadingTerminator => {
                write!(f, "parse buffer starts with a terminator byte")
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ── Key sources ─────────────────────────────────────────────────────────

/// A comparable key for `KEY=value` lookup.
///
/// Constrained platforms keep command keys in read-only storage that is
/// compared through a different code path than ordinary strings; both
/// backings present the same capability: a length and a case-insensitive
/// prefix comparison against token bytes.
pub trait KeySource {
    /// Length of the key in bytes.
    fn key_len(&self) -> usize;

    /// Case-insensitive comparison of this key against the first
    /// `key_len()` bytes of `token`. Must return `false` when `token` is
    /// shorter than the key.
    fn matches_prefix(&self, token: &[u8]) -> bool;
}

impl KeySource for str {
    fn key_len(&self) -> usize {
        self.len()
    }

    fn matches_prefix(&self, token: &[u8]) -> bool {
        token.len() >= self.len() && token[..self.len()].eq_ignore_ascii_case(self.as_bytes())
    }
}

/// A key held in read-only static storage.
///
/// The second backing of the [`KeySource`] capability: behaves exactly like
/// a primary string key but advertises that the bytes live in immutable
/// storage for the lifetime of the program.
#[derive(Debug, Clone, Copy)]
pub struct StaticKey(pub &'static [u8]);

impl KeySource for StaticKey {
    fn key_len(&self) -> usize {
        self.0.len()
    }

    fn matches_prefix(&self, token: &[u8]) -> bool {
        token.len() >= self.0.len() && token[..self.0.len()].eq_ignore_ascii_case(self.0)
    }
}

// ── Range policy ────────────────────────────────────────────────────────

/// How the bounded numeric accessors treat an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangePolicy {
    /// Clamp to the violated bound and raise a warning.
    #[default]
    Warn,
    /// Return zero and raise an error.
    Error,
}

// ── Tokenizer ───────────────────────────────────────────────────────────

/// Splits a line buffer into NUL-delimited tokens in place.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    /// Tokenizer with default options (space separator, quoting active,
    /// parens disabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizer with explicit options.
    pub fn with_config(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize `buffer` in place.
    ///
    /// The scan ends at the first pre-existing NUL (the sentinel a line
    /// accumulator writes when a line completes) or at the end of the
    /// slice. Separators outside quotes and parens, quote bytes, and
    /// paren bytes are all overwritten with NUL; the bytes in between
    /// become tokens.
    ///
    /// An empty buffer or one whose first byte is already NUL rejects the
    /// call with `Err` and touches no diagnostic state. Everything else
    /// produces a [`ParsedCmd`] whose sticky diagnostic slots start empty
    /// and collect the first warning raised during the scan (mismatched
    /// quotes or parens) and the first error/warning of any later accessor
    /// call.
    pub fn parse_cmd<'b>(&self, buffer: &'b mut [u8]) -> Result<ParsedCmd<'b>, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyBuffer);
        }
        if buffer[0] == 0x00 {
            return Err(ParseError::LeadingTerminator);
        }

        let mut cycle = CycleDiagnostics::new();
        let mut quoted = false;
        let mut nested = false;
        let mut count: u16 = 0;
        let mut content_len = buffer.len();

        for i in 0..buffer.len() {
            let b = buffer[i];

            // Pre-existing NUL: the line sentinel. Bytes past it are stale
            // (backspace leaves them behind) and must not be tokenized.
            if b == 0x00 {
                content_len = i;
                break;
            }

            if !self.config.ignore_quote && b == CHAR_QUOTE {
                buffer[i] = 0x00;
                quoted = !quoted;
            } else if !quoted && !nested && b == self.config.separator {
                buffer[i] = 0x00;
            } else if let Some((open, _)) = self.config.parens
                && b == open
            {
                if nested {
                    cycle.raise(Diagnostic::warn(
                        codes::EXPECTED_CLOSING_PAREN,
                        "expected closing parenthesis",
                        Some(Span::new(i, i + 1)),
                    ));
                } else {
                    nested = true;
                }
                buffer[i] = 0x00;
            } else if let Some((_, close)) = self.config.parens
                && b == close
            {
                if nested {
                    nested = false;
                } else {
                    cycle.raise(Diagnostic::warn(
                        codes::EXPECTED_OPENING_PAREN,
                        "expected opening parenthesis",
                        Some(Span::new(i, i + 1)),
                    ));
                }
                buffer[i] = 0x00;
            }

            // A non-NUL byte at the buffer start or right after a NUL opens
            // a new token.
            if buffer[i] != 0x00 && (i == 0 || buffer[i - 1] == 0x00) {
                count = count.saturating_add(1);
            }
        }

        if quoted {
            cycle.raise(Diagnostic::warn(
                codes::MISMATCHED_QUOTES,
                "mismatched quotes",
                Some(Span::empty(content_len)),
            ));
        }
        if nested {
            cycle.raise(Diagnostic::warn(
                codes::MISMATCHED_PARENS,
                "mismatched parentheses",
                Some(Span::empty(content_len)),
            ));
        }

        Ok(ParsedCmd {
            buf: &buffer[..content_len],
            // The command word is not counted as a parameter.
            param_count: count.saturating_sub(1),
            cycle,
        })
    }
}

// ── Parse result ────────────────────────────────────────────────────────

/// The result of one tokenize cycle: a view over the mutated buffer, the
/// parameter count, and the cycle's sticky diagnostic slots.
///
/// Accessors walk the buffer on every call. Token slices share the
/// buffer's lifetime, so the borrow checker enforces the contract that a
/// token view does not outlive the next mutation of the buffer.
#[derive(Debug)]
pub struct ParsedCmd<'b> {
    buf: &'b [u8],
    param_count: u16,
    cycle: CycleDiagnostics,
}

impl<'b> ParsedCmd<'b> {
    /// Number of parameters, excluding the command word.
    pub fn param_count(&self) -> u16 {
        self.param_count
    }

    /// The command word (token 0).
    pub fn command(&mut self) -> Option<&'b [u8]> {
        self.param(0)
    }

    /// Token `idx` (0 = command word, 1..N = parameters).
    ///
    /// Raises a sticky `missing parameter` error and returns `None` when
    /// `idx` is past the last parameter.
    pub fn param(&mut self, idx: u16) -> Option<&'b [u8]> {
        self.locate(idx).map(|(_, tok)| tok)
    }

    /// Token `idx` as UTF-8 text, when it is valid UTF-8.
    pub fn param_str(&mut self, idx: u16) -> Option<&'b str> {
        self.param(idx).and_then(|tok| std::str::from_utf8(tok).ok())
    }

    /// The sticky diagnostic slots of this parse cycle.
    pub fn diagnostics(&self) -> &CycleDiagnostics {
        &self.cycle
    }

    /// The first error raised this cycle, if any.
    pub fn error(&self) -> Option<&Diagnostic> {
        self.cycle.error()
    }

    /// The first warning raised this cycle, if any.
    pub fn warning(&self) -> Option<&Diagnostic> {
        self.cycle.warning()
    }

    // ── Token walk ──────────────────────────────────────────────────────

    /// Find token `idx` by scanning NUL-delimited runs. No diagnostics.
    fn token_at(&self, idx: u16) -> Option<(usize, &'b [u8])> {
        let mut count = 0usize;
        let mut i = 0usize;
        while i < self.buf.len() {
            if self.buf[i] == 0x00 {
                i += 1;
                continue;
            }
            let run = self.buf[i..]
                .iter()
                .position(|&b| b == 0x00)
                .unwrap_or(self.buf.len() - i);
            if count == idx as usize {
                return Some((i, &self.buf[i..i + run]));
            }
            count += 1;
            i += run;
        }
        None
    }

    /// Token `idx` with its byte offset, raising on a miss.
    fn locate(&mut self, idx: u16) -> Option<(usize, &'b [u8])> {
        if idx > self.param_count {
            self.cycle.raise(Diagnostic::error(
                codes::MISSING_PARAM,
                "missing parameter",
                None,
            ));
            return None;
        }
        match self.token_at(idx) {
            Some(found) => Some(found),
            None => {
                // Count promised a token the walk could not find; happens
                // only when the line held separators and no token at all.
                self.cycle.raise(Diagnostic::error(
                    codes::MISSING_PARAM,
                    "parsing error",
                    None,
                ));
                None
            }
        }
    }

    // ── Key-value lookup ────────────────────────────────────────────────

    /// The value of the first `KEY=value` parameter whose key matches
    /// case-insensitively.
    ///
    /// The key and the `=` must sit inside the same token; the returned
    /// slice is the remainder of that token after the `=` (possibly
    /// empty). The command word is never matched. Returns `None` without
    /// raising a diagnostic when no parameter matches.
    pub fn value_of_key(&mut self, key: &str) -> Option<&'b [u8]> {
        self.value_of_key_in(key)
    }

    /// [`value_of_key`](Self::value_of_key) over any [`KeySource`] backing.
    pub fn value_of_key_in<S: KeySource + ?Sized>(&mut self, key: &S) -> Option<&'b [u8]> {
        let klen = key.key_len();
        if klen == 0 {
            return None;
        }
        let mut idx: u16 = 1;
        while let Some((_, tok)) = self.token_at(idx) {
            // The separator probe is bounds-checked: key and `=` must both
            // fit inside the token.
            if tok.len() > klen && tok[klen] == CHAR_EQ && key.matches_prefix(tok) {
                return Some(&tok[klen + 1..]);
            }
            idx = idx.checked_add(1)?;
        }
        None
    }

    // ── Equality helpers ────────────────────────────────────────────────

    /// Whether token `idx` equals `value`, ASCII case-insensitively.
    pub fn param_equals(&mut self, idx: u16, value: &str) -> bool {
        self.param(idx)
            .is_some_and(|tok| tok.eq_ignore_ascii_case(value.as_bytes()))
    }

    /// Whether the command word equals `value`, ASCII case-insensitively.
    pub fn command_equals(&mut self, value: &str) -> bool {
        self.param_equals(0, value)
    }

    /// Whether the value of `key` equals `value`, ASCII case-insensitively.
    pub fn key_value_equals(&mut self, key: &str, value: &str) -> bool {
        self.value_of_key(key)
            .is_some_and(|v| v.eq_ignore_ascii_case(value.as_bytes()))
    }

    // ── Numeric accessors ───────────────────────────────────────────────

    /// Parameter `idx` as a float.
    ///
    /// Float text converts directly. Integer text converts with an
    /// `expecting float` warning. Anything else raises an error and
    /// returns `0.0`.
    pub fn param_as_float(&mut self, idx: u16) -> f64 {
        let Some((start, tok)) = self.locate(idx) else {
            return 0.0;
        };
        let span = Span::new(start, start + tok.len());
        if numeric::is_float(tok) {
            return numeric::float_value(tok);
        }
        if numeric::is_int(tok) {
            self.cycle.raise(Diagnostic::warn(
                codes::EXPECTED_FLOAT,
                "expecting float",
                Some(span),
            ));
            return numeric::float_value(tok);
        }
        self.cycle.raise(Diagnostic::error(
            codes::NOT_A_FLOAT,
            "not a valid floating point number",
            Some(span),
        ));
        0.0
    }

    /// Parameter `idx` as an integer.
    ///
    /// Decimal text parses base-10, `0x`-prefixed text base-16. Float text
    /// truncates toward zero with a `truncated to integer` warning.
    /// Anything else raises an error and returns `0`.
    pub fn param_as_int(&mut self, idx: u16) -> i64 {
        let Some((start, tok)) = self.locate(idx) else {
            return 0;
        };
        let span = Span::new(start, start + tok.len());
        if numeric::is_int(tok) {
            return numeric::int_value(tok);
        }
        if numeric::is_hex(tok) {
            return numeric::hex_value(tok);
        }
        if numeric::is_float(tok) {
            self.cycle.raise(Diagnostic::warn(
                codes::TRUNCATED_TO_INT,
                "truncated to integer",
                Some(span),
            ));
            return numeric::truncated_int_value(tok);
        }
        self.cycle.raise(Diagnostic::error(
            codes::NOT_AN_INT,
            "not a valid integer number",
            Some(span),
        ));
        0
    }

    /// [`param_as_float`](Self::param_as_float) with range checking.
    ///
    /// Below `min`: error policy raises an error and returns `0.0`; warn
    /// policy raises a warning and returns `min`. Above `max` is
    /// symmetric. In-range values pass through with no diagnostic.
    pub fn param_as_float_bounded(
        &mut self,
        idx: u16,
        min: f64,
        max: f64,
        policy: RangePolicy,
    ) -> f64 {
        let value = self.param_as_float(idx);
        if value < min {
            match policy {
                RangePolicy::Error => {
                    self.raise_out_of_range();
                    0.0
                }
                RangePolicy::Warn => {
                    self.raise_clamped(codes::CLAMPED_TO_MIN, "using min value");
                    min
                }
            }
        } else if value > max {
            match policy {
                RangePolicy::Error => {
                    self.raise_out_of_range();
                    0.0
                }
                RangePolicy::Warn => {
                    self.raise_clamped(codes::CLAMPED_TO_MAX, "using max value");
                    max
                }
            }
        } else {
            value
        }
    }

    /// [`param_as_int`](Self::param_as_int) with range checking.
    pub fn param_as_int_bounded(
        &mut self,
        idx: u16,
        min: i64,
        max: i64,
        policy: RangePolicy,
    ) -> i64 {
        let value = self.param_as_int(idx);
        if value < min {
            match policy {
                RangePolicy::Error => {
                    self.raise_out_of_range();
                    0
                }
                RangePolicy::Warn => {
                    self.raise_clamped(codes::CLAMPED_TO_MIN, "using min value");
                    min
                }
            }
        } else if value > max {
            match policy {
                RangePolicy::Error => {
                    self.raise_out_of_range();
                    0
                }
                RangePolicy::Warn => {
                    self.raise_clamped(codes::CLAMPED_TO_MAX, "using max value");
                    max
                }
            }
        } else {
            value
        }
    }

    fn raise_out_of_range(&mut self) {
        self.cycle.raise(Diagnostic::error(
            codes::OUT_OF_RANGE,
            "value out of range",
            None,
        ));
    }

    fn raise_clamped(&mut self, code: &'static str, message: &'static str) {
        self.cycle.raise(Diagnostic::warn(code, message, None));
    }

    // ── Serializable summary ────────────────────────────────────────────

    /// An owned, serializable snapshot of this parse cycle.
    ///
    /// Token bytes are converted lossily to UTF-8. Reading the snapshot
    /// raises no diagnostics.
    pub fn summary(&self) -> ParseSummary {
        let mut tokens = Vec::new();
        let mut idx: u16 = 0;
        while let Some((_, tok)) = self.token_at(idx) {
            tokens.push(String::from_utf8_lossy(tok).into_owned());
            match idx.checked_add(1) {
                Some(next) => idx = next,
                None => break,
            }
        }
        let mut it = tokens.into_iter();
        ParseSummary {
            command: it.next(),
            params: it.collect(),
            param_count: self.param_count,
            diagnostics: self.cycle.iter().cloned().collect(),
        }
    }
}

/// Owned snapshot of a parse cycle for serialization and display.
#[derive(Debug, Clone, Serialize)]
pub struct ParseSummary {
    /// The command word, when the line held at least one token.
    pub command: Option<String>,
    /// The parameter tokens after the command word.
    pub params: Vec<String>,
    /// Reported parameter count (excludes the command word).
    pub param_count: u16,
    /// Diagnostics retained by the cycle slots (error first).
    pub diagnostics: Vec<Diagnostic>,
}
