//! In-memory byte link for tests and scripted sessions.

use std::collections::VecDeque;

use crate::ByteLink;

/// A byte link backed by in-memory queues.
///
/// Bytes pushed with [`push`](Self::push) become readable in order; bytes
/// written by the consumer (echo) are recorded and inspectable via
/// [`written`](Self::written).
#[derive(Debug, Default)]
pub struct MemLink {
    incoming: VecDeque<u8>,
    outgoing: Vec<u8>,
}

impl MemLink {
    /// An empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// A link pre-loaded with `bytes`.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut link = Self::new();
        link.push(bytes);
        link
    }

    /// Queue more incoming bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes);
    }

    /// Everything the consumer has written back (echo output).
    pub fn written(&self) -> &[u8] {
        &self.outgoing
    }

    /// Forget recorded writes.
    pub fn clear_written(&mut self) {
        self.outgoing.clear();
    }
}

impl ByteLink for MemLink {
    fn available(&mut self) -> bool {
        !self.incoming.is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.incoming.pop_front()
    }

    fn write_byte(&mut self, byte: u8) {
        self.outgoing.push(byte);
    }
}
