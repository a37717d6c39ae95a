use anyhow::{anyhow, Context, Result};
use blockcast::{AppConfig, BlockEncoder, Progress, ProgressPhase, VideoOptions};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn load_config(explicit: Option<&PathBuf>) -> Result<AppConfig> {
    // Look for blockcast.json in app support, current dir fallback, then
    // built-in default.
    let mut tried: Vec<PathBuf> = Vec::new();
    if let Some(p) = explicit {
        tried.push(p.clone());
    } else {
        if let Some(mut d) = dirs::data_dir() {
            d.push("blockcast");
            d.push("blockcast.json");
            tried.push(d);
        }
        tried.push(PathBuf::from("blockcast.json"));
    }

    for p in &tried {
        if p.exists() {
            let text =
                fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            let cfg: AppConfig = serde_json::from_str(&text).context("parsing config json")?;
            return Ok(cfg);
        }
    }

    if explicit.is_some() {
        return Err(anyhow!("Config file not found: {}", tried[0].display()));
    }

    // Built-in defaults
    Ok(AppConfig::default())
}

#[derive(Parser, Debug)]
#[command(version, about = "Video to text-mode block-glyph stream encoder.")]
struct Args {
    /// Input video file or directory of extracted frame images
    input: PathBuf,

    /// Output stream file (defaults to <input stem>.asm)
    out: Option<PathBuf>,

    /// Frames per second when extracting from video
    #[arg(long)]
    fps: Option<u32>,

    /// Start time for video conversion (e.g., 00:01:23.456 or 83.456)
    #[arg(long)]
    start: Option<String>,

    /// End time for video conversion (e.g., 00:01:23.456 or 83.456)
    #[arg(long)]
    end: Option<String>,

    /// Keep extracted frame images
    #[arg(long, default_value_t = false)]
    keep_images: bool,

    /// Path to a palette/config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log encoding details to standard output
    #[arg(long, default_value_t = false)]
    log_details: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cfg = load_config(args.config.as_ref())?;
    let encoder = BlockEncoder::with_config(cfg.clone())?;

    let fps = args.fps.unwrap_or(cfg.fps);
    let out_path = match &args.out {
        Some(p) => p.clone(),
        None => {
            let stem = args
                .input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("blockcast_output");
            PathBuf::from(format!("{}.asm", stem))
        }
    };

    // Progress bar, initialized once the frame count is known.
    let progress_bar: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    let pb_clone = Arc::clone(&progress_bar);
    let on_progress = move |progress: Progress| {
        match progress.phase {
            ProgressPhase::ExtractingFrames => {
                println!("Extracting video frames...");
            }
            ProgressPhase::EncodingFrames => {
                let mut pb_guard = pb_clone.lock().unwrap();
                if pb_guard.is_none() {
                    let pb = ProgressBar::new(progress.total as u64);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                            .unwrap()
                            .progress_chars("#>-"),
                    );
                    pb.set_message("Encoding frames");
                    *pb_guard = Some(pb);
                }
                if let Some(ref pb) = *pb_guard {
                    pb.set_position(progress.completed as u64);
                }
            }
            ProgressPhase::Complete => {}
        }
    };

    let is_video_input = args.input.is_file();
    let stats = if is_video_input {
        let video_opts = VideoOptions {
            fps,
            start: args.start.clone(),
            end: args.end.clone(),
        };
        encoder.encode_video(
            &args.input,
            &out_path,
            &video_opts,
            args.keep_images,
            Some(on_progress),
        )?
    } else if args.input.is_dir() {
        encoder.encode_frames_dir(&args.input, &out_path, Some(&on_progress))?
    } else {
        return Err(anyhow!("Input path does not exist"));
    };

    let pb_opt = progress_bar.lock().unwrap().take();
    if let Some(pb) = pb_opt {
        pb.finish_with_message("Done");
    }

    println!("\nStream written to {}", out_path.display());

    // --- Create details.md ---
    let stream_size = fs::metadata(&out_path).map(|m| m.len()).unwrap_or(0);
    let mut details = format!(
        "Version: {}\nFrames: {}\nChanged cells: {}\nPairs: {}\nFillers: {}\nStream size: {} bytes",
        env!("CARGO_PKG_VERSION"),
        stats.frames,
        stats.changed_cells,
        stats.pairs,
        stats.fillers,
        stream_size
    );

    if is_video_input {
        details.push_str(&format!("\nFPS: {}", fps));
    }

    let details_path = out_path.with_extension("md");
    fs::write(&details_path, &details).context("writing details file")?;

    if args.log_details {
        println!("\n--- Encoding Details ---");
        println!("{}", details);
    }

    Ok(())
}
