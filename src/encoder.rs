//! Differential run-length encoding of classified frames.
//!
//! The encoder owns the persistent 25x80 grid of currently displayed glyph
//! codes. Each frame is classified cell by cell in row-major order and only
//! cells that differ from the grid are emitted, as `skip, glyph` pairs
//! relative to a cursor that starts one position before the first cell.
//! The skip field is a single byte, so gaps longer than 255 are bridged by
//! filler pairs that re-assert the glyph already committed at the
//! intermediate position.

use anyhow::Result;
use std::io::Write;

use crate::frame::Frame;
use crate::palette::Palette;
use crate::sampler::cell_quarters;
use crate::{ACTIVE_COLS, BLANK_CODE, COL_MARGIN, FRAME_PREFIX, GRID_COLS, GRID_ROWS, MAX_SKIP};

/// Counters for one encoded frame-record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Cells whose glyph changed since the previous frame.
    pub changed_cells: usize,
    /// Total `skip, glyph` pairs written, fillers included.
    pub pairs: usize,
    /// Pairs written only to bridge a skip distance beyond 255.
    pub fillers: usize,
}

/// Encodes a sequence of frames into a differential instruction stream.
///
/// State persists across frames and is never reset mid-stream; a decoder
/// replaying the output from an all-blank grid reconstructs exactly the
/// grid held here after each frame-record.
pub struct StreamEncoder {
    palette: Palette,
    screen: [[u8; GRID_COLS]; GRID_ROWS],
}

impl StreamEncoder {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            screen: [[BLANK_CODE; GRID_COLS]; GRID_ROWS],
        }
    }

    /// The currently displayed glyph grid, as committed by all frame-records
    /// written so far.
    pub fn screen(&self) -> &[[u8; GRID_COLS]; GRID_ROWS] {
        &self.screen
    }

    /// Classify every cell of the active region and write one frame-record:
    /// the `db ` prefix, pairs for changed cells, then the `0` terminator.
    pub fn encode_frame<W: Write>(&mut self, frame: &Frame, out: &mut W) -> Result<FrameStats> {
        frame.check_dimensions()?;
        let mut stats = FrameStats::default();
        write!(out, "{}", FRAME_PREFIX)?;
        let mut cursor: i64 = -1;
        for y in 0..GRID_ROWS {
            for x in 0..ACTIVE_COLS {
                let col = x + COL_MARGIN;
                let code = self.palette.classify(&cell_quarters(frame, x, y));
                if self.screen[y][col] == code {
                    continue;
                }
                let target = (y * GRID_COLS + col) as i64;
                while cursor + MAX_SKIP < target {
                    cursor += MAX_SKIP;
                    let held = self.screen[cursor as usize / GRID_COLS][cursor as usize % GRID_COLS];
                    write!(out, "{}, {}, ", MAX_SKIP, held)?;
                    stats.pairs += 1;
                    stats.fillers += 1;
                }
                write!(out, "{}, {}, ", target - cursor, code)?;
                cursor = target;
                self.screen[y][col] = code;
                stats.pairs += 1;
                stats.changed_cells += 1;
            }
        }
        writeln!(out, "0")?;
        Ok(stats)
    }
}
