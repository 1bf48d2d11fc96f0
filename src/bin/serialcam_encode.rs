//! serialcam_encode - wrap image files in the serial frame format.
//!
//! Produces the same byte stream the camera firmware sends (marker, u32 LE
//! length, payload) so the viewer can be exercised without hardware:
//!
//!   serialcam_encode shot1.jpg shot2.jpg --repeat 10 --out capture.bin
//!   serialcam --port capture.bin

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use serialcam::encode_frame;

#[derive(Parser, Debug)]
#[command(author, version, about = "Encode image files as a serialcam frame stream")]
struct Args {
    /// Image files to send, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file or device (defaults to stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of passes over the inputs.
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Delay between frames in milliseconds.
    #[arg(long, default_value_t = 0)]
    interval_ms: u64,

    /// Noise bytes inserted before every frame.
    #[arg(long, default_value_t = 0)]
    noise: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    if args.repeat == 0 {
        return Err(anyhow!("repeat must be >= 1"));
    }

    let mut frames = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let payload =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let wire = encode_frame(&payload)
            .ok_or_else(|| anyhow!("{} is too large for one frame", path.display()))?;
        frames.push(wire);
    }

    let mut out: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
                .with_context(|| format!("failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let noise = noise_bytes(args.noise);
    let mut written = 0u64;
    for _ in 0..args.repeat {
        for wire in &frames {
            out.write_all(&noise).context("write noise")?;
            out.write_all(wire).context("write frame")?;
            out.flush().context("flush frame")?;
            written += 1;
            if args.interval_ms > 0 {
                std::thread::sleep(Duration::from_millis(args.interval_ms));
            }
        }
    }
    log::info!("wrote {} frames", written);
    Ok(())
}

/// Deterministic filler that never contains the start marker.
fn noise_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31) | 0x80).collect()
}
