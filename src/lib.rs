//! Mini Thermal Printer Driver
//!
//! This crate drives TTL-serial mini thermal receipt printers (the ubiquitous
//! 58 mm, 384-dot cash-register mechanisms) over any byte sink.
//!
//! These printers offer no hardware flow control of their own, yet their
//! print and feed mechanics are orders of magnitude slower than the serial
//! link. The driver therefore paces itself: every operation carries a timing
//! estimate derived from per-dot print and feed times, and the next operation
//! waits the estimate out before sending. Printers wired with a busy line can
//! hand that job to the hardware instead; see
//! [`Printer::with_busy_line`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mini_thermal::{Config, Firmware, Printer};
//!
//! fn main() -> Result<(), mini_thermal::Error> {
//!     // Any `SerialPort` works; a `Vec<u8>` captures the wire traffic.
//!     let mut printer = Printer::new(Vec::new(), Config::new(Firmware::Modern));
//!     printer.begin()?;
//!     printer.bold_on()?;
//!     printer.println("Hello, world!")?;
//!     printer.feed(2)?;
//!     Ok(())
//! }
//! ```
//!
//! # Blocking behavior
//!
//! The driver is single-threaded and synchronous. Its only suspension point
//! is the internal readiness gate, which busy-polls the clock or the busy
//! line; while a wait is in progress the calling thread monopolizes the
//! processor. Schedulers embedding the driver should interleave other work
//! between driver calls, not expect the driver to yield.

mod barcode;
mod bitmap;
mod command;
mod error;
mod port;
mod printer;
mod state;
#[cfg(test)]
mod testutil;
mod timing;

pub use crate::{
    barcode::Barcode,
    bitmap::{MAX_ROW_BYTES, PRINT_WIDTH_DOTS},
    command::{Firmware, Justify, Size},
    error::Error,
    port::{BusyLine, Clock, SerialPort, SystemClock},
    printer::{Config, Printer},
    state::PrintMode,
    timing::Handshake,
};
