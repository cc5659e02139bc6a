//! Barcode symbologies.

use crate::command::Firmware;

/// Symbologies supported by both firmware generations.
///
/// The GS `k` type byte changed meaning in firmware 2.64: older firmware
/// numbers the symbologies from 0, newer firmware from 65.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Barcode {
    UpcA,
    UpcE,
    Ean13,
    Ean8,
    Code39,
    Itf,
    Codabar,
    Code93,
    Code128,
}

impl Barcode {
    /// Wire code for the GS `k` command under the given firmware.
    pub fn code(self, firmware: Firmware) -> u8 {
        let index = match self {
            Barcode::UpcA => 0,
            Barcode::UpcE => 1,
            Barcode::Ean13 => 2,
            Barcode::Ean8 => 3,
            Barcode::Code39 => 4,
            Barcode::Itf => 5,
            Barcode::Codabar => 6,
            Barcode::Code93 => 7,
            Barcode::Code128 => 8,
        };
        match firmware {
            Firmware::Modern => 65 + index,
            Firmware::Legacy => index,
        }
    }
}
