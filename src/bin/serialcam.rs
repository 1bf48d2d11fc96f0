//! serialcam - live viewer for a serial-attached camera
//!
//! This binary:
//! 1. Opens the serial device (or a recorded capture) at the configured speed
//! 2. Recovers length-prefixed frames from the byte stream
//! 3. Decodes each frame, draws the crosshair overlay and presents it
//! 4. Saves the current frame on `s`, exits on `q` or Ctrl-C

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use serialcam::config::ConfigOverrides;
use serialcam::ui::UiMode;
use serialcam::MarkerSearch;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "View JPEG frames streamed over a serial line; S saves, Q quits"
)]
struct Args {
    /// Serial device or capture file to read.
    #[arg(long)]
    port: Option<String>,

    /// Line speed in baud.
    #[arg(long)]
    baud: Option<u32>,

    /// Per-read transport timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Directory for saved snapshots (created if missing).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Title shown on the status line.
    #[arg(long)]
    title: Option<String>,

    /// Reject frames declaring more payload bytes than this.
    #[arg(long)]
    max_frame_bytes: Option<u32>,

    /// Marker search strategy: sliding or block.
    #[arg(long)]
    marker_search: Option<MarkerSearch>,

    /// Rewrite this JPEG with every presented frame.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Status output: auto, plain or pretty.
    #[arg(long, env = "SERIALCAM_UI", default_value = "auto")]
    ui: UiMode,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port.clone(),
            baud: self.baud,
            timeout_ms: self.timeout_ms,
            output_dir: self.output_dir.clone(),
            title: self.title.clone(),
            max_frame_bytes: self.max_frame_bytes,
            marker_search: self.marker_search,
            preview_path: self.preview.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    run(args)
}

#[cfg(target_os = "linux")]
fn run(args: Args) -> Result<()> {
    use anyhow::Context;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use serialcam::config::ViewerConfig;
    use serialcam::{
        CodecDecoder, FrameSynchronizer, SerialConfig, SerialPort, SnapshotDir, SyncConfig,
        SyncLimits, TerminalSurface, Viewer,
    };

    let cfg = ViewerConfig::load_with(args.overrides())?;

    let port = SerialPort::open(&SerialConfig {
        path: cfg.transport.path.clone(),
        baud: cfg.transport.baud,
        timeout: cfg.transport.timeout,
    })?;
    let sync = FrameSynchronizer::new(
        port,
        SyncConfig {
            limits: SyncLimits {
                max_frame_size: cfg.sync.max_frame_bytes,
                marker_search: cfg.sync.marker_search,
            },
            frame_timeout: cfg.frame_timeout(),
        },
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("install Ctrl-C handler")?;

    let surface = TerminalSurface::new(
        &cfg.window_title,
        args.ui,
        cfg.preview_path.clone(),
        shutdown,
    )
    .context("set up display surface")?;

    log::info!(
        "reading {} at {} baud (timeout {:?}, max frame {} bytes, {:?} marker search)",
        cfg.transport.path,
        cfg.transport.baud,
        cfg.transport.timeout,
        cfg.sync.max_frame_bytes,
        cfg.sync.marker_search
    );
    log::info!("snapshots go to {}", cfg.output_dir.display());

    let mut viewer = Viewer::new(
        sync,
        CodecDecoder,
        surface,
        SnapshotDir::new(cfg.output_dir.clone()),
    );
    let summary = viewer.run()?;
    log::info!(
        "viewer stopped ({:?}): {} frames shown, {} snapshots saved",
        summary.exit,
        summary.viewer.frames_shown,
        summary.viewer.snapshots_saved
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(args: Args) -> Result<()> {
    let _ = (args.overrides(), args.ui);
    Err(anyhow::anyhow!(
        "serialcam needs the Linux serial and terminal backends"
    ))
}
