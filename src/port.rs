//! Capabilities consumed by the driver.
//!
//! The printer is reached through a plain byte sink with no flow control of
//! its own. The optional byte source carries status replies, and the optional
//! busy line is the printer's hardware handshake signal. All three are
//! injected at construction so the driver never touches a UART register
//! directly.

use std::io;
use std::time::Instant;

/// Byte-oriented serial link to the printer.
///
/// `send` is assumed to always eventually accept the byte; an `Err` means a
/// transport-level fault (broken device file, closed port), not backpressure.
pub trait SerialPort {
    /// Transmit a single byte.
    fn send(&mut self, byte: u8) -> io::Result<()>;

    /// Non-blocking read of one buffered reply byte, if any.
    ///
    /// Only used by status queries. Ports without a receive side can rely on
    /// the default, which reports no data.
    fn poll(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

/// Capture port: bytes are collected instead of transmitted.
///
/// Handy for tests and for previewing the exact wire traffic of a job.
impl SerialPort for Vec<u8> {
    fn send(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

/// Digital read of the printer's busy handshake line.
///
/// The line is high while the printer's receive buffer cannot take more data.
/// Not all printers expose this signal; supplying one switches the driver to
/// hardware flow control during [`Printer::begin`](crate::Printer::begin).
pub trait BusyLine {
    fn is_busy(&self) -> bool;
}

/// Monotonic microsecond clock used for timing estimates.
pub trait Clock {
    fn now_us(&self) -> u64;
}

/// [`Clock`] backed by [`std::time::Instant`].
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
