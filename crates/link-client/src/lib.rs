//! cmdlink byte link client — accumulate command lines from a byte stream.
//!
//! A [`LineAccumulator`] consumes bytes one at a time from any [`ByteLink`],
//! filters the framing markers (start sequence, device-ID filter,
//! end-of-line, backspace), and deposits the clean line into a bounded
//! owned buffer ready for the tokenizer. The API is synchronous with no
//! async runtime; the only blocking operation is
//! [`LineAccumulator::read_line`], a cooperative poll loop with an
//! optional deadline.

#![warn(missing_docs)]

mod accumulator;
mod config;
mod error;
mod mem;
#[cfg(feature = "serial")]
mod serial;

pub use accumulator::{Feed, LineAccumulator};
pub use config::{
    AccumulatorConfig, CHAR_BS, CHAR_CR, CHAR_DEL, CHAR_LF, CHAR_PRINTABLE, StartSequence,
};
pub use error::LinkError;
pub use mem::MemLink;
#[cfg(feature = "serial")]
pub use serial::SerialLink;

// ── Traits ──────────────────────────────────────────────────────────────

/// A raw byte source/sink capability. All transports implement this.
///
/// The contract is cooperative: [`available`](Self::available) is a cheap
/// readiness probe, [`read_byte`](Self::read_byte) consumes at most one
/// byte without blocking, and [`write_byte`](Self::write_byte) is a
/// best-effort write used only for echo.
pub trait ByteLink {
    /// Whether at least one byte can be read without blocking.
    fn available(&mut self) -> bool;

    /// Consume one byte, or `None` when nothing is ready.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write one byte back to the link. Best-effort; failures are
    /// swallowed by implementations.
    fn write_byte(&mut self, byte: u8);
}
