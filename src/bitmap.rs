//! Chunk planning for raster printing.
//!
//! A whole image cannot be issued as one command: without flow control the
//! printer's receive buffer (assumed 256 bytes) would overrun while the head
//! is still printing earlier rows. Images are therefore cut into bounded
//! chunks, each issued as its own DC2 `*` command.

use crate::timing::Handshake;

/// Print head width in dots.
pub const PRINT_WIDTH_DOTS: usize = 384;
/// Bytes per row at full head width.
pub const MAX_ROW_BYTES: usize = PRINT_WIDTH_DOTS / 8;

/// Row layout and chunk ceiling for one raster job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkPlan {
    /// Bytes per row in the source buffer.
    pub row_bytes: usize,
    /// Bytes per row actually transmitted; the head clips at 384 dots.
    pub clipped_row_bytes: usize,
    /// Rows per chunk.
    pub chunk_height_limit: u8,
}

impl ChunkPlan {
    pub(crate) fn new(width: usize, handshake: Handshake, max_chunk_height: u8) -> Self {
        let row_bytes = (width + 7) / 8;
        let clipped_row_bytes = row_bytes.min(MAX_ROW_BYTES);

        let chunk_height_limit = match handshake {
            // The busy line throttles for us; buffer size is irrelevant.
            Handshake::SignalPin => 255,
            Handshake::Timed => {
                let fit = 256 / clipped_row_bytes.max(1);
                fit.min(max_chunk_height as usize).max(1) as u8
            }
        };

        ChunkPlan {
            row_bytes,
            clipped_row_bytes,
            chunk_height_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_width_image_under_signal_pin() {
        let plan = ChunkPlan::new(384, Handshake::SignalPin, 255);
        assert_eq!(plan.row_bytes, 48);
        assert_eq!(plan.clipped_row_bytes, 48);
        assert_eq!(plan.chunk_height_limit, 255);
    }

    #[test]
    fn full_width_image_under_timed_mode() {
        let plan = ChunkPlan::new(384, Handshake::Timed, 255);
        // 256-byte buffer over 48-byte rows.
        assert_eq!(plan.chunk_height_limit, 5);
    }

    #[test]
    fn oversized_rows_clip_to_head_width() {
        let plan = ChunkPlan::new(500, Handshake::Timed, 255);
        assert_eq!(plan.row_bytes, 63);
        assert_eq!(plan.clipped_row_bytes, 48);
        assert_eq!(plan.chunk_height_limit, 5);
    }

    #[test]
    fn narrow_rows_respect_the_configured_ceiling() {
        // 8-byte rows would fit 32 to a buffer, but the ceiling caps them.
        let plan = ChunkPlan::new(64, Handshake::Timed, 12);
        assert_eq!(plan.chunk_height_limit, 12);
    }

    #[test]
    fn ceiling_floors_at_one_row() {
        let plan = ChunkPlan::new(384, Handshake::Timed, 0);
        assert_eq!(plan.chunk_height_limit, 1);
    }

    #[test]
    fn narrow_image_keeps_its_row_bytes() {
        let plan = ChunkPlan::new(13, Handshake::Timed, 255);
        assert_eq!(plan.row_bytes, 2);
        assert_eq!(plan.clipped_row_bytes, 2);
        assert_eq!(plan.chunk_height_limit, 128);
    }
}
