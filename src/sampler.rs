//! Area-weighted downsampling of a frame into quarter-cell intensities.
//!
//! Each character cell covers 8 source pixels horizontally and 14.4
//! vertically, so a quadrant is 4 x 7.2 pixels. The fractional height means
//! a quadrant's vertical window usually starts and ends mid-row; those
//! boundary rows contribute proportionally to their overlap. Rounding them
//! to whole rows instead accumulates visible drift across the grid.

use crate::frame::Frame;
use crate::{QUARTER_AREA, QUARTER_PX_H, QUARTER_PX_W};

/// Average intensity of each quadrant of the cell at local grid position
/// (x, y), in the order top-left, top-right, bottom-left, bottom-right.
///
/// Callers must hand in a dimension-checked frame; sub-row indices run to
/// 2 * 25 - 1 and would read out of bounds on a shorter frame.
pub fn cell_quarters(frame: &Frame, x: usize, y: usize) -> [f64; 4] {
    let mut quarters = [0.0; 4];
    let mut i = 0;
    for yi in [2 * y, 2 * y + 1] {
        let low = QUARTER_PX_H * yi as f64;
        let high = low + QUARTER_PX_H;
        for xi in [2 * x, 2 * x + 1] {
            let col = QUARTER_PX_W * xi;
            // Partial coverage of the row the window starts in. When `low`
            // lands on a whole row this weight is zero and the row is picked
            // up in full by the loop below instead.
            let mut sum = frame.span_sum(low.floor() as usize, col) * (low.ceil() - low);
            for row in low.ceil() as usize..high.floor() as usize {
                sum += frame.span_sum(row, col);
            }
            // Partial coverage of the row the window ends in, unless the
            // window ends on or past the last row.
            if high < frame.height() as f64 {
                sum += frame.span_sum(high.floor() as usize, col) * (high - high.floor());
            }
            quarters[i] = sum / QUARTER_AREA;
            i += 1;
        }
    }
    quarters
}
