// Copyright (c) 2025 Steven Rosenthal smr@dt3.org
// See LICENSE file in root directory for license terms.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use env_logger;
use image::{DynamicImage, ImageBuffer, ImageReader, Luma};
use log::{info, warn};

use temporal_median::{subtract_temporal_median, FilterParams, ImageStack,
                      WindowAlignment};

/// Example program for running temporal median background subtraction on a
/// directory of frames. Frames are read in file name order.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about=None)]
struct Args {
    /// Directory of grayscale frames, one image file per frame.
    #[arg(short, long)]
    input: String,

    /// Directory where corrected frames are written as 16 bit PNG.
    #[arg(short, long)]
    output: String,

    /// Median window, in frames. Made odd and no longer than the series.
    #[arg(short, long, default_value_t = 501)]
    window: usize,

    /// Added to every pixel before the median is subtracted.
    #[arg(long, default_value_t = 100)]
    offset: u16,

    /// Worker threads. Defaults to one per CPU.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Use the window starting at each frame instead of the centered window.
    #[arg(long, default_value_t = false)]
    forward: std::primitive::bool,
}

struct Frame {
    path: PathBuf,
    width: u32,
    height: u32,
    bit_depth: u32,
    pixels: Vec<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let output_metadata = fs::metadata(&args.output).map_err(|e| {
        format!("Output dir '{}' does not exist? {:?}", args.output, e)
    })?;
    if !output_metadata.is_dir() {
        return Err(format!("Output '{}' must be a directory", args.output).into());
    }

    let load_start = Instant::now();
    let mut paths = Vec::<PathBuf>::new();
    for entry in fs::read_dir(&args.input)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    let mut frames = Vec::<Frame>::new();
    for path in paths {
        if let Some(frame) = load_frame(&path) {
            frames.push(frame);
        }
    }
    if frames.is_empty() {
        return Err(format!("No readable frames in '{}'", args.input).into());
    }
    let (width, height) = (frames[0].width, frames[0].height);
    for frame in &frames {
        if (frame.width, frame.height) != (width, height) {
            return Err(format!("Frame {:?} is {}x{}, expected {}x{}",
                               frame.path, frame.width, frame.height,
                               width, height).into());
        }
    }
    let bit_depth = frames.iter().map(|f| f.bit_depth).max().unwrap_or(16);
    let paths: Vec<PathBuf> = frames.iter().map(|f| f.path.clone()).collect();
    let pixels: Vec<Vec<u16>> = frames.into_iter().map(|f| f.pixels).collect();
    let mut stack = ImageStack::from_frames(
        width as usize, height as usize, bit_depth, &pixels)?;
    drop(pixels);
    info!("Loaded {} frames of {}x{} ({} bit) in {:?}",
          stack.frames(), width, height, bit_depth, load_start.elapsed());

    let mut params = FilterParams::default()
        .with_window(args.window)
        .with_offset(args.offset);
    if let Some(threads) = args.threads {
        params = params.with_num_workers(threads);
    }
    if args.forward {
        params = params.with_alignment(WindowAlignment::Forward);
    }
    let summary = subtract_temporal_median(&mut stack, &params)?;
    let megapixels = (width as f64 * height as f64) / 1000000.0;
    info!("Underflow {} ({:.2} per frame); saturated {}",
          summary.underflow, summary.underflow_per_frame(), summary.saturated);
    info!("{}ms per megapixel frame",
          summary.elapsed.as_secs_f64() * 1000.0 / (megapixels * summary.frames as f64));

    let save_start = Instant::now();
    for (path, corrected) in paths.iter().zip(stack.into_frames()) {
        let mut output_path = PathBuf::from(&args.output);
        output_path.push(path.file_name().ok_or("frame path has no file name")?);
        output_path.set_extension("png");
        let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(width, height, corrected)
            .ok_or("corrected frame does not match its dimensions")?;
        img.save(&output_path)?;
    }
    info!("Wrote {} frames to {} in {:?}", paths.len(), args.output, save_start.elapsed());
    Ok(())
}

// Returns None (after logging) if the file is not a decodable image.
fn load_frame(path: &Path) -> Option<Frame> {
    let img = match ImageReader::open(path).map_err(image::ImageError::from)
        .and_then(|reader| reader.decode()) {
        Ok(img) => img,
        Err(e) => {
            warn!("Skipping {:?} due to: {:?}", path, e);
            return None;
        },
    };
    let (width, height) = (img.width(), img.height());
    // 8 bit data keeps its values; everything else becomes 16 bit luma.
    let (bit_depth, pixels) = match img {
        DynamicImage::ImageLuma8(gray) =>
            (8, gray.into_raw().into_iter().map(u16::from).collect()),
        other => (16, other.to_luma16().into_raw()),
    };
    Some(Frame{path: path.to_path_buf(), width, height, bit_depth, pixels})
}
