//! Line accumulation — byte-level state machine over a command link.
//!
//! Consumes bytes one at a time, filters the framing markers (start
//! sequence, device-ID filter, end-of-line, backspace) out of the raw
//! stream, and deposits the clean line into a bounded owned buffer. The
//! buffer is then handed to the tokenizer via [`LineAccumulator::buffer_mut`].
//!
//! Bytes can arrive in arbitrary fragments from a slow link, so the
//! machine is re-entrant per byte and keeps all progress in the
//! accumulator itself.

use std::time::{Duration, Instant};

use crate::config::{AccumulatorConfig, CHAR_PRINTABLE};
use crate::{ByteLink, LinkError};

/// Outcome of feeding one byte to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// The byte was consumed; the line is not complete yet.
    Pending,
    /// The end marker arrived: the buffer holds a terminated line.
    LineReady,
    /// The buffer overflowed; the partial line was discarded and the
    /// machine reset to its initial state.
    Discarded,
}

/// Uninhabited link type backing [`LineAccumulator::feed_byte`], which has
/// no echo sink.
enum NoEcho {}

impl ByteLink for NoEcho {
    fn available(&mut self) -> bool {
        match *self {}
    }

    fn read_byte(&mut self) -> Option<u8> {
        match *self {}
    }

    fn write_byte(&mut self, _byte: u8) {
        match *self {}
    }
}

/// Accumulates one command line from a byte stream into an owned bounded
/// buffer.
///
/// The buffer persists across accumulation sessions: a completed line
/// stays readable (via [`line`](Self::line) / [`buffer_mut`](Self::buffer_mut))
/// until the next feed overwrites it or [`clear`](Self::clear) zeroes it.
pub struct LineAccumulator {
    /// `capacity + 1` bytes; the extra slot always fits the NUL sentinel.
    buf: Box<[u8]>,
    capacity: usize,
    /// Write offset, `0 ..= capacity`.
    offset: usize,
    /// Consecutive start/ID marker bytes matched so far.
    matched: u16,
    config: AccumulatorConfig,
}

impl LineAccumulator {
    /// Accumulator with default framing (LF end, BS backspace, no start
    /// sequence) and room for `capacity` line bytes.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(capacity, AccumulatorConfig::default())
    }

    /// Accumulator with explicit framing options.
    pub fn with_config(capacity: usize, config: AccumulatorConfig) -> Self {
        Self {
            buf: vec![0u8; capacity + 1].into_boxed_slice(),
            capacity,
            offset: 0,
            matched: 0,
            config,
        }
    }

    /// Line byte capacity (excludes the sentinel slot).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The active configuration.
    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// The collected line: buffer content up to the NUL sentinel.
    ///
    /// After `LineReady` this is the completed line. Mid-collection it is
    /// the partial line collected so far, possibly including a stale byte
    /// a backspace stepped over.
    pub fn line(&self) -> &[u8] {
        let end = self
            .buf
            .iter()
            .position(|&b| b == 0x00)
            .unwrap_or(self.buf.len());
        &self.buf[..end]
    }

    /// The full owned buffer, for handing to the tokenizer.
    ///
    /// Mutating the buffer invalidates the current line; the accumulator
    /// itself keeps only its write offset.
    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    /// Zero the buffer and reset the machine to its initial state.
    pub fn clear(&mut self) {
        self.buf.fill(0x00);
        self.offset = 0;
        self.matched = 0;
    }

    /// Feed one byte with no echo sink.
    pub fn feed_byte(&mut self, byte: u8) -> Feed {
        self.accept::<NoEcho>(byte, None)
    }

    /// Feed one byte read from `link`.
    ///
    /// When echo is enabled every consumed byte is written back to the
    /// link, and an accepted backspace additionally writes the destructive
    /// erase sequence (space, then the backspace byte again).
    pub fn feed<L: ByteLink + ?Sized>(&mut self, byte: u8, link: &mut L) -> Feed {
        self.accept(byte, Some(link))
    }

    /// Consume at most one available byte from `link`.
    ///
    /// Returns `Pending` without blocking when the link has nothing to
    /// read.
    pub fn poll<L: ByteLink + ?Sized>(&mut self, link: &mut L) -> Feed {
        if !link.available() {
            return Feed::Pending;
        }
        match link.read_byte() {
            Some(byte) => self.feed(byte, link),
            None => Feed::Pending,
        }
    }

    /// Block until a complete line arrives or `timeout` elapses.
    ///
    /// `None` waits unboundedly. The loop drains available bytes, then
    /// checks the deadline and sleeps briefly; no other work happens while
    /// waiting. The deadline is computed with `Instant::checked_add`,
    /// clamping to a far-future point when `timeout` exceeds the clock's
    /// representable range.
    pub fn read_line<L: ByteLink + ?Sized>(
        &mut self,
        link: &mut L,
        timeout: Option<Duration>,
    ) -> Result<(), LinkError> {
        let deadline = timeout.map(|t| {
            let now = Instant::now();
            let at = now
                .checked_add(t)
                .unwrap_or_else(|| now + Duration::from_secs(86400));
            (at, t)
        });

        loop {
            while link.available() {
                let Some(byte) = link.read_byte() else { break };
                if let Feed::LineReady = self.feed(byte, link) {
                    return Ok(());
                }
            }

            if let Some((at, t)) = deadline
                && Instant::now() >= at
            {
                return Err(LinkError::ReadTimeout { timeout: t });
            }

            std::thread::sleep(Duration::from_millis(1));
        }
    }

    // ── State machine ───────────────────────────────────────────────────

    fn accept<L: ByteLink + ?Sized>(&mut self, byte: u8, mut link: Option<&mut L>) -> Feed {
        if self.config.echo
            && let Some(l) = link.as_deref_mut()
        {
            l.write_byte(byte);
        }

        // Start sequence: the required markers must arrive consecutively;
        // any mismatch discards the progress.
        if let Some(start) = self.config.start
            && self.matched < u16::from(start.count)
        {
            if byte == start.marker {
                self.matched += 1;
            } else {
                self.matched = 0;
            }
            return Feed::Pending;
        }

        // Device-ID filter: must arrive immediately after the completed
        // start sequence. A mismatch means the message addresses another
        // device; restart the whole match.
        let start_goal = self.config.start.map_or(0, |s| u16::from(s.count));
        if let Some(id) = self.config.id_filter
            && self.matched == start_goal
        {
            if byte == id {
                self.matched += 1;
            } else {
                self.matched = 0;
            }
            return Feed::Pending;
        }

        if byte == self.config.end_char {
            self.buf[self.offset] = 0x00;
            self.offset = 0;
            self.matched = 0;
            return Feed::LineReady;
        }

        if byte == self.config.backspace_char && self.offset > 0 {
            // Only the offset moves back; the stale byte stays and is
            // overwritten by the next write.
            self.offset -= 1;
            if self.config.echo
                && let Some(l) = link.as_deref_mut()
            {
                l.write_byte(b' ');
                l.write_byte(byte);
            }
            return Feed::Pending;
        }

        if byte > CHAR_PRINTABLE {
            if self.offset < self.capacity {
                self.buf[self.offset] = byte;
                self.offset += 1;
                return Feed::Pending;
            }
            self.offset = 0;
            self.matched = 0;
            return Feed::Discarded;
        }

        // Unrecognized control byte: dropped without affecting state.
        Feed::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CHAR_BS, CHAR_LF, StartSequence};

    fn feed_all(acc: &mut LineAccumulator, bytes: &[u8]) -> Vec<Feed> {
        bytes.iter().map(|&b| acc.feed_byte(b)).collect()
    }

    #[test]
    fn plain_line_completes_on_lf() {
        let mut acc = LineAccumulator::new(32);
        let outcomes = feed_all(&mut acc, b"hello\n");
        assert_eq!(outcomes.last(), Some(&Feed::LineReady));
        assert_eq!(acc.line(), b"hello");
    }

    #[test]
    fn control_bytes_are_dropped() {
        let mut acc = LineAccumulator::new(32);
        feed_all(&mut acc, b"a\x01\x02b\n");
        assert_eq!(acc.line(), b"ab");
    }

    #[test]
    fn backspace_moves_offset_without_erasing() {
        let mut acc = LineAccumulator::new(32);
        feed_all(&mut acc, b"helo");
        assert_eq!(acc.feed_byte(CHAR_BS), Feed::Pending);
        // The stale byte is still visible mid-collection.
        assert_eq!(acc.line(), b"helo");
        feed_all(&mut acc, b"lo\n");
        assert_eq!(acc.line(), b"hello");
    }

    #[test]
    fn backspace_at_offset_zero_is_ignored() {
        let mut acc = LineAccumulator::new(32);
        assert_eq!(acc.feed_byte(CHAR_BS), Feed::Pending);
        feed_all(&mut acc, b"ok\n");
        assert_eq!(acc.line(), b"ok");
    }

    #[test]
    fn overflow_discards_and_resets() {
        let mut acc = LineAccumulator::new(4);
        assert_eq!(feed_all(&mut acc, b"abcd"), vec![Feed::Pending; 4]);
        assert_eq!(acc.feed_byte(b'e'), Feed::Discarded);
        // Collection restarts cleanly after the discard.
        let outcomes = feed_all(&mut acc, b"ok\n");
        assert_eq!(outcomes.last(), Some(&Feed::LineReady));
        assert_eq!(acc.line(), b"ok");
    }

    #[test]
    fn end_char_when_full_still_completes() {
        let mut acc = LineAccumulator::new(4);
        feed_all(&mut acc, b"abcd");
        assert_eq!(acc.feed_byte(CHAR_LF), Feed::LineReady);
        assert_eq!(acc.line(), b"abcd");
    }

    #[test]
    fn start_sequence_gates_collection() {
        let mut acc = LineAccumulator::with_config(
            32,
            AccumulatorConfig {
                start: Some(StartSequence { marker: b'!', count: 2 }),
                ..AccumulatorConfig::default()
            },
        );
        // Ignored: the start sequence has not arrived yet.
        feed_all(&mut acc, b"noise");
        // One marker, then a mismatch, resets the run.
        feed_all(&mut acc, b"!x");
        feed_all(&mut acc, b"!!go\n");
        assert_eq!(acc.line(), b"go");
    }

    #[test]
    fn id_filter_must_follow_start_sequence() {
        let mut acc = LineAccumulator::with_config(
            32,
            AccumulatorConfig {
                start: Some(StartSequence::once(b'S')),
                id_filter: Some(b'I'),
                ..AccumulatorConfig::default()
            },
        );
        // Wrong ID: the whole match restarts, and the rest of this
        // message is consumed while hunting for a new start marker.
        feed_all(&mut acc, b"SXab\n");
        assert_eq!(acc.line(), b"");
        feed_all(&mut acc, b"SIhello\n");
        assert_eq!(acc.line(), b"hello");
    }

    #[test]
    fn id_filter_without_start_sequence() {
        let mut acc = LineAccumulator::with_config(
            32,
            AccumulatorConfig {
                id_filter: Some(b'I'),
                ..AccumulatorConfig::default()
            },
        );
        feed_all(&mut acc, b"Iok\n");
        assert_eq!(acc.line(), b"ok");
    }

    #[test]
    fn match_state_resets_after_each_line() {
        let mut acc = LineAccumulator::with_config(
            32,
            AccumulatorConfig {
                start: Some(StartSequence::once(b'!')),
                ..AccumulatorConfig::default()
            },
        );
        feed_all(&mut acc, b"!one\n");
        assert_eq!(acc.line(), b"one");
        // The next line needs the start marker again; unframed bytes are
        // consumed without disturbing the completed line.
        feed_all(&mut acc, b"junk");
        assert_eq!(acc.line(), b"one");
        feed_all(&mut acc, b"!two\n");
        assert_eq!(acc.line(), b"two");
    }

    #[test]
    fn clear_zeroes_the_buffer() {
        let mut acc = LineAccumulator::new(8);
        feed_all(&mut acc, b"abc\n");
        acc.clear();
        assert_eq!(acc.line(), b"");
        assert!(acc.buffer_mut().iter().all(|&b| b == 0));
    }
}
