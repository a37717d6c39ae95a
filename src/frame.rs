use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::Path;

use crate::{FRAME_HEIGHT, FRAME_WIDTH, QUARTER_PX_W};

/// A single video frame reduced to one intensity channel.
///
/// Samples are stored row-major, one byte per pixel. Frames are read-only
/// once constructed; the encoder only ever borrows them for the duration of
/// one encoding step.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl Frame {
    /// Create a frame from a raw row-major sample buffer.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(anyhow!(
                "frame buffer holds {} samples, expected {} for {}x{}",
                samples.len(),
                expected,
                width,
                height
            ));
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Load an image file and reduce it to its luminance channel.
    pub fn open(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("opening {}", path.display()))?
            .to_luma8();
        Ok(Self::from(img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The sampling geometry is fixed; a frame of any other size is a fatal
    /// input error, never something to guess around.
    pub fn check_dimensions(&self) -> Result<()> {
        if self.width != FRAME_WIDTH || self.height != FRAME_HEIGHT {
            return Err(anyhow!(
                "frame is {}x{}, expected {}x{} (rescale the source before encoding)",
                self.width,
                self.height,
                FRAME_WIDTH,
                FRAME_HEIGHT
            ));
        }
        Ok(())
    }

    /// Sum of the 4-pixel horizontal span starting at `col` on `row`.
    pub(crate) fn span_sum(&self, row: usize, col: usize) -> f64 {
        let start = row * self.width as usize + col;
        self.samples[start..start + QUARTER_PX_W]
            .iter()
            .map(|&v| v as f64)
            .sum()
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            samples: img.into_raw(),
        }
    }
}
