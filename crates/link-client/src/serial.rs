//! Serial port byte link using the `serialport` crate.
//!
//! Feature-gated behind the `serial` Cargo feature (enabled by default in
//! the CLI).

use std::io::{Read, Write};
use std::time::Duration;

use crate::{ByteLink, LinkError};

/// Default baud rate for device command links (9600 8N1).
const DEFAULT_BAUD: u32 = 9600;

/// Short per-read timeout; line-level deadlines are handled by the
/// accumulator's poll loop, not by the port.
const PORT_TIMEOUT: Duration = Duration::from_millis(10);

/// A command link over a serial port (RS-232, USB-serial, or Bluetooth SPP).
pub struct SerialLink {
    /// The underlying serial port handle.
    port: Box<dyn serialport::SerialPort>,
}

impl SerialLink {
    /// Open a serial port at the given path and baud rate.
    ///
    /// # Arguments
    ///
    /// * `path` — Serial port path, e.g. `/dev/ttyUSB0` or `COM3`.
    /// * `baud` — Baud rate; devices commonly run 9600, 38400, or 115200.
    ///
    /// # Errors
    ///
    /// Returns `LinkError::SerialError` if the port cannot be opened.
    pub fn open(path: &str, baud: u32) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud)
            .timeout(PORT_TIMEOUT)
            .open()
            .map_err(|e| LinkError::SerialError(e.to_string()))?;

        Ok(Self { port })
    }

    /// Open a serial port at the default baud rate (9600 8N1).
    ///
    /// # Errors
    ///
    /// Returns `LinkError::SerialError` if the port cannot be opened.
    pub fn open_default(path: &str) -> Result<Self, LinkError> {
        Self::open(path, DEFAULT_BAUD)
    }

    /// List available serial port names on the system.
    ///
    /// **Note:** On Linux this crate is built with `serialport`'s default
    /// features disabled (no `libudev`). Port enumeration still works via a
    /// sysfs fallback but may return fewer details than the libudev
    /// backend.
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.port_name)
            .collect()
    }
}

impl ByteLink for SerialLink {
    fn available(&mut self) -> bool {
        self.port.bytes_to_read().map(|n| n > 0).unwrap_or(false)
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_byte(&mut self, byte: u8) {
        // Echo is best-effort; a failed echo must not break accumulation.
        let _ = self.port.write_all(&[byte]);
    }
}
