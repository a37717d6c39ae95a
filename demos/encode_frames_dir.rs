//! Example: Encode a directory of pre-extracted frames
//!
//! Run with: cargo run --example encode_frames_dir

use blockcast::BlockEncoder;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let encoder = BlockEncoder::new();

    // Frames must already be rescaled to 480x360, e.g. with:
    //   ffmpeg -i input.mp4 -vf scale=480:360,fps=30 frames/frame_%05d.png
    let input_dir = Path::new("frames");
    let output = Path::new("frames.asm");

    if input_dir.is_dir() {
        let stats = encoder.encode_frames_dir(
            input_dir,
            output,
            None::<&fn(blockcast::Progress)>,
        )?;
        println!(
            "Encoded {} frames: {} changed cells, {} pairs",
            stats.frames, stats.changed_cells, stats.pairs
        );
    } else {
        println!("Note: {} not found.", input_dir.display());
    }

    Ok(())
}
