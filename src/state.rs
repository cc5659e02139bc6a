//! Host-side copy of the printer's print-mode and geometry state.
//!
//! The mode register decides character height and line width, which the text
//! path needs for wrap detection and feed-cost arithmetic, so the driver
//! mirrors it locally instead of querying the printer.

use bitflags::bitflags;

use crate::command::LF;

bitflags! {
    /// Bits of the ESC `!` print-mode register, sent to the printer verbatim.
    pub struct PrintMode: u8 {
        /// White-on-black. Older firmware only; newer firmware uses GS `B`.
        const INVERSE       = 1 << 1;
        const UPSIDE_DOWN   = 1 << 2;
        const BOLD          = 1 << 3;
        const DOUBLE_HEIGHT = 1 << 4;
        const DOUBLE_WIDTH  = 1 << 5;
        const STRIKE        = 1 << 6;
    }
}

/// Character cell height in dots for single-height text.
pub(crate) const CHAR_HEIGHT: u8 = 24;
/// Columns per line for single-width text on a 384-dot head.
pub(crate) const MAX_COLUMN: u8 = 32;

#[derive(Debug)]
pub(crate) struct PrintState {
    pub mode: PrintMode,
    /// Current horizontal position; output wraps when it reaches `max_column`.
    pub column: u8,
    pub max_column: u8,
    pub char_height: u8,
    /// Inter-line spacing in dots (line height minus character height).
    pub line_spacing: u8,
    pub barcode_height: u8,
    /// Ceiling on bitmap chunk height. Stored verbatim; only the bitmap
    /// planner clamps it.
    pub max_chunk_height: u8,
    /// Last logical byte issued to the text stream. A wrap is recorded as a
    /// newline so the next line-advance is costed as a blank feed.
    pub prev_byte: u8,
}

impl PrintState {
    pub(crate) fn new() -> Self {
        PrintState {
            mode: PrintMode::empty(),
            column: 0,
            max_column: MAX_COLUMN,
            char_height: CHAR_HEIGHT,
            line_spacing: 6,
            barcode_height: 50,
            max_chunk_height: 255,
            prev_byte: LF,
        }
    }

    /// Restore power-on defaults, as after ESC `@`.
    pub(crate) fn reset(&mut self) {
        let max_chunk_height = self.max_chunk_height;
        *self = PrintState::new();
        self.max_chunk_height = max_chunk_height;
    }

    /// Recompute the geometry derived from the mode register.
    ///
    /// `char_height` and `max_column` are pure functions of the double-height
    /// and double-width bits; no other bit or past toggle influences them.
    pub(crate) fn refresh_geometry(&mut self) {
        self.char_height = if self.mode.contains(PrintMode::DOUBLE_HEIGHT) {
            CHAR_HEIGHT * 2
        } else {
            CHAR_HEIGHT
        };
        self.max_column = if self.mode.contains(PrintMode::DOUBLE_WIDTH) {
            MAX_COLUMN / 2
        } else {
            MAX_COLUMN
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_follows_size_bits_only() {
        let mut state = PrintState::new();

        state.mode.insert(PrintMode::BOLD | PrintMode::STRIKE);
        state.refresh_geometry();
        assert_eq!((state.char_height, state.max_column), (24, 32));

        state.mode.insert(PrintMode::DOUBLE_HEIGHT);
        state.refresh_geometry();
        assert_eq!((state.char_height, state.max_column), (48, 32));

        state.mode.insert(PrintMode::DOUBLE_WIDTH);
        state.refresh_geometry();
        assert_eq!((state.char_height, state.max_column), (48, 16));

        state.mode.remove(PrintMode::DOUBLE_HEIGHT);
        state.refresh_geometry();
        assert_eq!((state.char_height, state.max_column), (24, 16));

        // Unrelated toggles do not disturb the derived values.
        state.mode.remove(PrintMode::BOLD | PrintMode::STRIKE);
        state.mode.insert(PrintMode::UPSIDE_DOWN);
        state.refresh_geometry();
        assert_eq!((state.char_height, state.max_column), (24, 16));
    }

    #[test]
    fn geometry_is_history_free() {
        let mut a = PrintState::new();
        for _ in 0..5 {
            a.mode.insert(PrintMode::DOUBLE_WIDTH);
            a.refresh_geometry();
            a.mode.remove(PrintMode::DOUBLE_WIDTH);
            a.refresh_geometry();
        }
        let b = PrintState::new();
        assert_eq!(a.char_height, b.char_height);
        assert_eq!(a.max_column, b.max_column);
    }

    #[test]
    fn reset_restores_defaults_but_keeps_chunk_ceiling() {
        let mut state = PrintState::new();
        state.mode.insert(PrintMode::DOUBLE_WIDTH);
        state.refresh_geometry();
        state.column = 7;
        state.line_spacing = 20;
        state.barcode_height = 90;
        state.max_chunk_height = 12;
        state.prev_byte = b'x';

        state.reset();
        assert_eq!(state.mode, PrintMode::empty());
        assert_eq!(state.column, 0);
        assert_eq!(state.max_column, 32);
        assert_eq!(state.char_height, 24);
        assert_eq!(state.line_spacing, 6);
        assert_eq!(state.barcode_height, 50);
        assert_eq!(state.prev_byte, LF);
        // The chunk ceiling is begin()-scoped, not reset()-scoped.
        assert_eq!(state.max_chunk_height, 12);
    }
}
