//! Configuration types for the line accumulator.

/// Highest byte value treated as non-printable. Bytes at or below this
/// threshold are control bytes: recognized markers act, the rest are
/// silently dropped.
pub const CHAR_PRINTABLE: u8 = 0x1F;
/// Line feed — the default end-of-line marker.
pub const CHAR_LF: u8 = 0x0A;
/// Carriage return — an alternative end-of-line marker.
pub const CHAR_CR: u8 = 0x0D;
/// Backspace — the default destructive-erase marker.
pub const CHAR_BS: u8 = 0x08;
/// Delete — an alternative destructive-erase marker.
pub const CHAR_DEL: u8 = 0x7F;

/// A required run of consecutive start-marker bytes before collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSequence {
    /// The start marker byte.
    pub marker: u8,
    /// How many consecutive occurrences are required.
    pub count: u8,
}

impl StartSequence {
    /// A single occurrence of `marker`.
    pub fn once(marker: u8) -> Self {
        Self { marker, count: 1 }
    }
}

/// Line accumulator options.
///
/// Defaults match an interactive terminal session: lines end with LF,
/// backspace erases, no start sequence, no device-ID filter, echo off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccumulatorConfig {
    /// Byte that completes a line. Default LF.
    pub end_char: u8,
    /// Byte that erases the previously collected byte. Default BS.
    pub backspace_char: u8,
    /// Optional start sequence required before collection begins.
    pub start: Option<StartSequence>,
    /// Optional device-ID byte required immediately after the start
    /// sequence, for several devices sharing one link.
    pub id_filter: Option<u8>,
    /// Echo every consumed raw byte back to the link. Backspace
    /// additionally echoes a destructive erase sequence.
    pub echo: bool,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            end_char: CHAR_LF,
            backspace_char: CHAR_BS,
            start: None,
            id_filter: None,
            echo: false,
        }
    }
}
