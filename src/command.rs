//! Wire-level command builders.
//!
//! Each function returns the exact byte sequence understood by the printer.
//! The values baked in here (heating dots, density, break time, tab stops)
//! are hardware defaults and must not drift.
//!
//! Firmware 2.64 reshaped several commands; the split is carried at runtime
//! by [`Firmware`] so both generations can be driven (and tested) from one
//! build.

/// ESC - prefix of most control sequences.
pub const ESC: u8 = 0x1B;
/// GS - prefix of the extended command group.
pub const GS: u8 = 0x1D;
/// DC2 - prefix of density and bitmap commands.
pub const DC2: u8 = 0x12;
/// Line feed: prints the line buffer and advances the paper.
pub const LF: u8 = 0x0A;
/// Form feed.
pub const FF: u8 = 0x0C;
/// Horizontal tab.
pub const HT: u8 = 0x09;
/// Carriage return; stripped by the text path, never transmitted.
pub const CR: u8 = 0x0D;

/// Max heating dots, in units of 8 dots minus one. 11 fires 96 of the 384
/// head elements at once, a quarter of the width.
const MAX_HEATING_DOTS: u8 = 11;
/// Heating interval in 10 us units; throttled for a 2 A supply.
const HEATING_INTERVAL: u8 = 40;
/// Print density: 50% + 5% * n.
const PRINT_DENSITY: u8 = 10;
/// Print break time in 250 us units.
const PRINT_BREAK_TIME: u8 = 2;

/// Firmware generation, selected at configuration time.
///
/// The cutover is firmware 2.64, which added native line feeds, tab stops,
/// the two-byte sleep timeout, length-prefixed barcode data and the GS `B`
/// inverse command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firmware {
    /// Pre-2.64 firmware.
    Legacy,
    /// Firmware 2.64 and newer.
    Modern,
}

impl Firmware {
    /// Classify an integerized firmware version as shown on the printer's
    /// self-test page (e.g. 268 for 2.68).
    pub fn from_version(version: u16) -> Self {
        if version >= 264 {
            Firmware::Modern
        } else {
            Firmware::Legacy
        }
    }

    /// Paper status query. The reply byte's bit 2 is set when out of paper.
    pub(crate) fn status_query(self) -> [u8; 3] {
        match self {
            Firmware::Modern => [ESC, b'v', 0],
            Firmware::Legacy => [GS, b'r', 0],
        }
    }

    /// Low-power timeout in seconds; zero disables sleeping.
    pub(crate) fn sleep_after(self, seconds: u16) -> Vec<u8> {
        match self {
            Firmware::Modern => vec![ESC, b'8', seconds as u8, (seconds >> 8) as u8],
            Firmware::Legacy => vec![ESC, b'8', seconds as u8],
        }
    }
}

impl Default for Firmware {
    fn default() -> Self {
        Firmware::Modern
    }
}

/// Text alignment for subsequent lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    Left,
    Center,
    Right,
}

/// Character size presets. Medium doubles the height, Large doubles both
/// dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Small,
    Medium,
    Large,
}

impl Size {
    /// (wire code, character height in dots, columns per line)
    pub(crate) fn geometry(self) -> (u8, u8, u8) {
        match self {
            Size::Small => (0x00, 24, 32),
            Size::Medium => (0x01, 48, 32),
            Size::Large => (0x11, 48, 16),
        }
    }
}

/// ESC `@`: reset to the power-on state.
pub(crate) fn reset() -> [u8; 2] {
    [ESC, b'@']
}

/// ESC `7`: heating configuration.
///
/// More heating dots means more peak current but faster printing; a longer
/// heat time darkens the output at the cost of speed and possible paper
/// stiction.
pub(crate) fn heat_config(heat_time: u8) -> [u8; 5] {
    [ESC, b'7', MAX_HEATING_DOTS, heat_time, HEATING_INTERVAL]
}

/// DC2 `#`: print density and break time, packed into one byte.
pub(crate) fn density() -> [u8; 3] {
    [DC2, b'#', (PRINT_BREAK_TIME << 5) | PRINT_DENSITY]
}

/// GS `a`: have the printer drive its busy line.
pub(crate) fn handshake_enable() -> [u8; 3] {
    [GS, b'a', 1 << 5]
}

/// ESC `!`: write the whole print-mode register.
pub(crate) fn print_mode(bits: u8) -> [u8; 3] {
    [ESC, b'!', bits]
}

/// ESC `a`: line justification.
pub(crate) fn justify(justify: Justify) -> [u8; 3] {
    let pos = match justify {
        Justify::Left => 0,
        Justify::Center => 1,
        Justify::Right => 2,
    };
    [ESC, b'a', pos]
}

/// GS `!`: character size preset.
pub(crate) fn size(code: u8) -> [u8; 3] {
    [GS, b'!', code]
}

/// ESC `3`: line height in dots, character height included.
pub(crate) fn line_height(value: u8) -> [u8; 3] {
    [ESC, b'3', value]
}

/// ESC `D`: tab stops every four columns; 0 ends the list. Modern firmware
/// only.
pub(crate) fn tab_stops() -> [u8; 10] {
    [ESC, b'D', 4, 8, 12, 16, 20, 24, 28, 0]
}

/// ESC `d`: feed whole lines. Modern firmware only; older firmware feeds
/// excess lines and is driven with literal newlines instead.
pub(crate) fn feed_lines(n: u8) -> [u8; 3] {
    [ESC, b'd', n]
}

/// ESC `J`: feed individual pixel rows.
pub(crate) fn feed_rows(rows: u8) -> [u8; 3] {
    [ESC, b'J', rows]
}

/// ESC `R`: international character set, 0-15.
pub(crate) fn charset(value: u8) -> [u8; 3] {
    [ESC, b'R', value.min(15)]
}

/// ESC `t`: code page for the upper ASCII range, 0-47.
pub(crate) fn code_page(value: u8) -> [u8; 3] {
    [ESC, b't', value.min(47)]
}

/// ESC SP: extra spacing between characters. Modern firmware only.
pub(crate) fn char_spacing(spacing: u8) -> [u8; 3] {
    [ESC, b' ', spacing]
}

/// ESC `-`: underline weight 0 (off), 1 (normal) or 2 (thick).
pub(crate) fn underline(weight: u8) -> [u8; 3] {
    [ESC, b'-', weight.min(2)]
}

/// GS `B`: white-on-black printing. Modern firmware only; older firmware
/// toggles the inverse bit of the mode register.
pub(crate) fn inverse(on: bool) -> [u8; 3] {
    [GS, b'B', on as u8]
}

/// ESC `=`: device enable. Commands sent while offline are ignored.
pub(crate) fn online(on: bool) -> [u8; 3] {
    [ESC, b'=', on as u8]
}

/// GS `h`: barcode height in dots, label excluded.
pub(crate) fn barcode_height(value: u8) -> [u8; 3] {
    [GS, b'h', value]
}

/// GS `H`: print the human-readable label below the barcode.
pub(crate) fn barcode_label_below() -> [u8; 3] {
    [GS, b'H', 2]
}

/// GS `w`: module width 3 (0.375 mm thin / 1.0 mm thick bars).
pub(crate) fn barcode_width() -> [u8; 3] {
    [GS, b'w', 3]
}

/// GS `k`: select the barcode symbology.
pub(crate) fn barcode_type(code: u8) -> [u8; 3] {
    [GS, b'k', code]
}

/// DC2 `*`: header of one bitmap chunk of `height` rows, `row_bytes` bytes
/// each.
pub(crate) fn bitmap_chunk(height: u8, row_bytes: u8) -> [u8; 4] {
    [DC2, b'*', height, row_bytes]
}
