//! Example: Encode a video into a block-glyph stream using blockcast as a library
//!
//! Run with: cargo run --example encode_video

use blockcast::{BlockEncoder, Progress, VideoOptions};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let encoder = BlockEncoder::new();

    let video_opts = VideoOptions {
        fps: 30,
        start: Some("0".to_string()),
        end: Some("5".to_string()), // Encode the first 5 seconds
    };

    let input = Path::new("tests/video/input/test.mkv");
    let output = Path::new("example_output.asm");

    if input.exists() {
        println!("Encoding video to block-glyph stream...");
        println!("Input: {}", input.display());
        println!("Output: {}", output.display());

        let stats = encoder.encode_video(
            input,
            output,
            &video_opts,
            false, // Don't keep intermediate PNG files
            Some(|p: Progress| println!("{}", p.message)),
        )?;

        println!("Encoded {} frames ({} pairs)", stats.frames, stats.pairs);
    } else {
        println!("Note: {} not found.", input.display());
        println!("To use this example, provide a video file at that path.");
    }

    Ok(())
}
