//! Error types for driver operations.

use thiserror::Error;

/// Error type for printer operations.
///
/// Printing is fire-and-forget against an always-accepting serial link, so
/// the only failures surfaced here are transport faults and caller buffers
/// that cannot possibly describe the image they claim to. Out-of-range
/// parameter values are clamped, never rejected.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level I/O fault from the injected serial port.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The raster buffer is shorter than `width x height` requires.
    #[error("bitmap data too short: need {expected} bytes, got {actual}")]
    BitmapTooShort { expected: usize, actual: usize },
}
