//! # blockcast - Text-Mode Video Stream Encoder
//!
//! `blockcast` converts a video into a compact run-length-encoded stream of
//! block-glyph instructions for a fixed 80x25 character display, suitable
//! for retro text-mode playback.
//!
//! ## Pipeline
//!
//! - Area-weighted downsampling of each frame's luminance into 4x7.2-pixel
//!   quarter-cell intensities
//! - Nearest-pattern classification against a fixed palette of block glyphs
//! - Differential run-length encoding that emits instructions only for
//!   cells that changed since the previous frame
//!
//! ## Example
//!
//! ```no_run
//! use blockcast::{BlockEncoder, VideoOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encoder = BlockEncoder::new();
//! let opts = VideoOptions::default();
//! let stats = encoder.encode_video(
//!     Path::new("input.mp4"),
//!     Path::new("output.asm"),
//!     &opts,
//!     false,
//!     None::<fn(blockcast::Progress)>,
//! )?;
//! println!("{} frames, {} pairs", stats.frames, stats.pairs);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stream format
//!
//! One frame-record per video frame: the literal prefix `db `, zero or more
//! comma-separated `skip, glyphCode` pairs, and a terminating `0` followed
//! by a newline. A decoder replays a record by advancing a cursor (starting
//! at -1) by each skip and writing the glyph at the resulting linear
//! position of the 80-wide grid.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command as ProcCommand;
use walkdir::WalkDir;

pub mod encoder;
pub mod frame;
pub mod palette;
pub mod sampler;

pub use encoder::{FrameStats, StreamEncoder};
pub use frame::Frame;
pub use palette::{Palette, PaletteEntry};

/// Character rows of the display grid.
pub const GRID_ROWS: usize = 25;
/// Character columns of the full display grid.
pub const GRID_COLS: usize = 80;
/// Columns actually sampled from the video; the rest stay blank.
pub const ACTIVE_COLS: usize = 60;
/// Blank columns to the left of the active region.
pub const COL_MARGIN: usize = 10;

/// Source pixels per quarter-cell horizontally.
pub const QUARTER_PX_W: usize = 4;
/// Source pixels per quarter-cell vertically. Fractional: the frame height
/// does not divide evenly into the grid's row count.
pub const QUARTER_PX_H: f64 = 7.2;
/// Exact area of one quarter-cell in source pixels.
pub const QUARTER_AREA: f64 = 28.8;

/// Required source frame width: 60 cells x 8 pixels.
pub const FRAME_WIDTH: u32 = 480;
/// Required source frame height: 25 cells x 14.4 pixels.
pub const FRAME_HEIGHT: u32 = 360;

/// Largest skip distance a single pair can encode (one byte).
pub const MAX_SKIP: i64 = 255;
/// Literal token opening every frame-record.
pub const FRAME_PREFIX: &str = "db ";
/// Glyph code the persistent grid starts out filled with.
pub const BLANK_CODE: u8 = 0;

/// Represents the current phase of an encoding operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    /// Extracting frames from video using ffmpeg
    ExtractingFrames,
    /// Encoding extracted frames into the instruction stream
    EncodingFrames,
    /// Encoding completed successfully
    Complete,
}

/// Progress information for encoding operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    /// Current phase of the encoding run
    pub phase: ProgressPhase,
    /// Number of frames completed in the current phase
    pub completed: usize,
    /// Total number of frames (0 if unknown/indeterminate)
    pub total: usize,
    /// Percentage complete (0.0 to 100.0)
    pub percentage: f64,
    /// Human-readable message describing current status
    pub message: String,
}

impl Progress {
    /// Create a new progress update for extracting frames
    pub fn extracting_frames() -> Self {
        Self {
            phase: ProgressPhase::ExtractingFrames,
            completed: 0,
            total: 0,
            percentage: 0.0,
            message: "Extracting frames from video...".to_string(),
        }
    }

    /// Create a new progress update for frame encoding
    pub fn encoding_frames(completed: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            (completed as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            phase: ProgressPhase::EncodingFrames,
            completed,
            total,
            percentage,
            message: format!("Encoding frame {} of {}", completed, total),
        }
    }

    /// Create a completion progress update
    pub fn complete(total_frames: usize) -> Self {
        Self {
            phase: ProgressPhase::Complete,
            completed: total_frames,
            total: total_frames,
            percentage: 100.0,
            message: format!("Encoding complete: {} frames", total_frames),
        }
    }
}

/// Application configuration: extraction rate and the glyph palette
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    pub palette: Vec<PaletteEntry>,
}

fn default_fps() -> u32 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        // CP437 block glyphs: blank, full, lower half, left half, right
        // half, upper half. Entry order doubles as classifier tie-break
        // order.
        let default_json = r#"{
            "fps": 30,
            "palette": [
                {"code": 0,   "pattern": [0,   0,   0,   0  ]},
                {"code": 219, "pattern": [255, 255, 255, 255]},
                {"code": 220, "pattern": [0,   0,   255, 255]},
                {"code": 221, "pattern": [255, 0,   255, 0  ]},
                {"code": 222, "pattern": [0,   255, 0,   255]},
                {"code": 223, "pattern": [255, 255, 0,   0  ]}
            ]
        }"#;
        serde_json::from_str(default_json).unwrap()
    }
}

/// Accumulated statistics for a whole encoding run
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeStats {
    /// Frame-records written
    pub frames: usize,
    /// Cells whose glyph changed across all frames
    pub changed_cells: usize,
    /// Total `skip, glyph` pairs written, fillers included
    pub pairs: usize,
    /// Pairs written only to bridge skip distances beyond 255
    pub fillers: usize,
}

impl EncodeStats {
    fn absorb(&mut self, frame: FrameStats) {
        self.frames += 1;
        self.changed_cells += frame.changed_cells;
        self.pairs += frame.pairs;
        self.fillers += frame.fillers;
    }
}

/// Options for video frame extraction
#[derive(Debug, Clone)]
pub struct VideoOptions {
    /// Frames per second to extract
    pub fps: u32,
    /// Start time (e.g., "00:01:23.456" or "83.456")
    pub start: Option<String>,
    /// End time (e.g., "00:01:23.456" or "83.456")
    pub end: Option<String>,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            fps: 30,
            start: None,
            end: None,
        }
    }
}

/// Main entry point for stream encoding
pub struct BlockEncoder {
    config: AppConfig,
}

impl BlockEncoder {
    /// Create an encoder with the built-in default palette
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Create an encoder with custom configuration
    pub fn with_config(config: AppConfig) -> Result<Self> {
        // Fail on a malformed palette before any frame is touched.
        Palette::new(config.palette.clone())?;
        Ok(Self { config })
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&text).context("parsing config json")?;
        Self::with_config(config)
    }

    /// Get the current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn palette(&self) -> Result<Palette> {
        Palette::new(self.config.palette.clone())
    }

    /// Encode a lazy sequence of frames into `out`.
    ///
    /// Frames are consumed strictly in order; each record depends on the
    /// grid state committed by the previous one. Any frame error aborts the
    /// run; records already written stay valid.
    pub fn encode_frames<I, W>(&self, frames: I, out: &mut W) -> Result<EncodeStats>
    where
        I: IntoIterator<Item = Result<Frame>>,
        W: Write,
    {
        let mut encoder = StreamEncoder::new(self.palette()?);
        let mut stats = EncodeStats::default();
        for frame in frames {
            let frame = frame?;
            stats.absorb(encoder.encode_frame(&frame, out)?);
        }
        Ok(stats)
    }

    /// Encode a directory of frame images (sorted by file name) into a
    /// stream file.
    ///
    /// # Arguments
    ///
    /// * `input_dir` - Directory containing PNG frames (e.g. `frame_00001.png`)
    /// * `out_path` - Path of the stream file to write
    /// * `progress_callback` - Optional callback called per encoded frame
    pub fn encode_frames_dir<F>(
        &self,
        input_dir: &Path,
        out_path: &Path,
        progress_callback: Option<&F>,
    ) -> Result<EncodeStats>
    where
        F: Fn(Progress),
    {
        let images = list_frame_images(input_dir);
        if images.is_empty() {
            return Err(anyhow!("No frame images found in {}", input_dir.display()));
        }
        let total = images.len();

        let file = fs::File::create(out_path)
            .with_context(|| format!("creating {}", out_path.display()))?;
        let mut out = BufWriter::new(file);

        let mut encoder = StreamEncoder::new(self.palette()?);
        let mut stats = EncodeStats::default();

        if let Some(callback) = progress_callback {
            callback(Progress::encoding_frames(0, total));
        }
        for (i, img_path) in images.iter().enumerate() {
            let frame = Frame::open(img_path)?;
            stats.absorb(encoder.encode_frame(&frame, &mut out)?);
            if let Some(callback) = progress_callback {
                callback(Progress::encoding_frames(i + 1, total));
            }
        }
        out.flush().context("flushing output stream")?;

        Ok(stats)
    }

    /// Extract frames from a video with ffmpeg and encode them into a
    /// stream file.
    ///
    /// Frames are extracted as PNGs into a working directory next to the
    /// output file, rescaled to the fixed 480x360 sampling geometry, and
    /// removed afterwards unless `keep_images` is set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use blockcast::{BlockEncoder, Progress, VideoOptions};
    /// use std::path::Path;
    ///
    /// let encoder = BlockEncoder::new();
    /// let opts = VideoOptions { fps: 30, start: None, end: Some("10".into()) };
    /// encoder.encode_video(
    ///     Path::new("video.mp4"),
    ///     Path::new("video.asm"),
    ///     &opts,
    ///     false,
    ///     Some(|p: Progress| println!("{}", p.message)),
    /// ).unwrap();
    /// ```
    pub fn encode_video<F>(
        &self,
        input: &Path,
        out_path: &Path,
        video_opts: &VideoOptions,
        keep_images: bool,
        progress_callback: Option<F>,
    ) -> Result<EncodeStats>
    where
        F: Fn(Progress),
    {
        let frames_dir = out_path.with_extension("frames");
        fs::create_dir_all(&frames_dir).context("creating frames directory")?;

        if let Some(callback) = &progress_callback {
            callback(Progress::extracting_frames());
        }
        extract_video_frames(
            input,
            &frames_dir,
            video_opts.fps,
            video_opts.start.as_deref(),
            video_opts.end.as_deref(),
        )?;

        let stats = self.encode_frames_dir(&frames_dir, out_path, progress_callback.as_ref())?;

        if !keep_images {
            for img_path in list_frame_images(&frames_dir) {
                fs::remove_file(img_path)?;
            }
            let _ = fs::remove_dir(&frames_dir);
        }

        if let Some(callback) = &progress_callback {
            callback(Progress::complete(stats.frames));
        }

        Ok(stats)
    }
}

impl Default for BlockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn list_frame_images(dir: &Path) -> Vec<PathBuf> {
    let mut images: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|e| e == "png" || e == "jpg" || e == "jpeg")
                .unwrap_or(false)
        })
        .collect();
    images.sort();
    images
}

fn build_extraction_filter(fps: u32) -> String {
    format!("scale={}:{},fps={}", FRAME_WIDTH, FRAME_HEIGHT, fps)
}

fn extract_video_frames(
    input: &Path,
    out_dir: &Path,
    fps: u32,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let out_pattern = out_dir.join("frame_%05d.png");
    let mut ffmpeg_args: Vec<String> = vec!["-loglevel".into(), "error".into()];

    if let Some(s) = start {
        if !s.is_empty() && s != "0" {
            ffmpeg_args.push("-ss".into());
            ffmpeg_args.push(s.to_string());
        }
    }

    ffmpeg_args.push("-i".into());
    ffmpeg_args.push(input.display().to_string());

    if let Some(e) = end {
        if !e.is_empty() {
            if let Some(s) = start {
                if !s.is_empty() && s != "0" {
                    let start_secs = parse_timestamp(s);
                    let end_secs = parse_timestamp(e);
                    let duration = end_secs - start_secs;
                    if duration > 0.0 {
                        ffmpeg_args.push("-t".into());
                        ffmpeg_args.push(duration.to_string());
                    }
                } else {
                    ffmpeg_args.push("-t".into());
                    ffmpeg_args.push(e.to_string());
                }
            } else {
                ffmpeg_args.push("-t".into());
                ffmpeg_args.push(e.to_string());
            }
        }
    }

    ffmpeg_args.push("-vf".into());
    ffmpeg_args.push(build_extraction_filter(fps));
    ffmpeg_args.push(out_pattern.display().to_string());

    let status = ProcCommand::new("ffmpeg")
        .args(&ffmpeg_args)
        .status()
        .context("running ffmpeg")?;

    if !status.success() {
        return Err(anyhow!("ffmpeg failed"));
    }
    Ok(())
}

fn parse_timestamp(s: &str) -> f64 {
    s.split(':').rev().enumerate().fold(0.0, |acc, (i, v)| {
        acc + v.parse::<f64>().unwrap_or(0.0) * 60f64.powi(i as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_palette_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.palette.len(), 6);
        assert!(BlockEncoder::with_config(config).is_ok());
    }

    #[test]
    fn empty_palette_config_is_rejected() {
        let config = AppConfig {
            fps: 30,
            palette: Vec::new(),
        };
        assert!(BlockEncoder::with_config(config).is_err());
    }

    #[test]
    fn config_parses_from_json() {
        let json = r#"{
            "fps": 24,
            "palette": [{"code": 0, "pattern": [0, 0, 0, 0]}]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.fps, 24);
        assert_eq!(config.palette[0].code, 0);
    }

    #[test]
    fn extraction_filter_pins_the_sampling_geometry() {
        assert_eq!(build_extraction_filter(30), "scale=480:360,fps=30");
    }

    #[test]
    fn timestamps_parse_in_both_forms() {
        assert_eq!(parse_timestamp("83.5"), 83.5);
        assert_eq!(parse_timestamp("00:01:23"), 83.0);
    }
}
