//! Display loop.
//!
//! One iteration pulls a frame, decodes it, draws the overlay, presents it and
//! then polls the surface for an operator command. Every per-frame failure is
//! logged and counted; only a transport I/O error ends the loop with an error.
//! The surface and byte source are owned by the viewer and released when it
//! is dropped, whichever way `run` returns.

use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use crate::decode::{DecodedImage, ImageDecoder};
use crate::display::{DisplaySurface, OperatorCommand};
use crate::ingest::ByteSource;
use crate::overlay::Overlay;
use crate::persist::PersistenceSink;
use crate::sync::{FrameSynchronizer, SyncError, SyncStats};

#[derive(Clone, Copy, Debug)]
pub struct ViewerOptions {
    /// Bounded wait for a keyboard command after each iteration.
    pub command_poll: Duration,
    /// Interval between health log lines.
    pub health_interval: Duration,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            command_poll: Duration::from_millis(1),
            health_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewerStats {
    pub frames_shown: u64,
    pub decode_failures: u64,
    pub frame_timeouts: u64,
    pub present_failures: u64,
    pub snapshots_saved: u64,
    pub persist_failures: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// Operator quit (key or Ctrl-C).
    Quit,
    /// The byte source ran dry (end of a replayed capture).
    EndOfStream,
}

#[derive(Clone, Debug)]
pub struct ViewerSummary {
    pub exit: ExitReason,
    pub viewer: ViewerStats,
    pub sync: SyncStats,
}

/// Outcome of a single loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Iteration {
    Continue,
    Exit(ExitReason),
}

pub struct Viewer<S, D, V, P> {
    sync: FrameSynchronizer<S>,
    decoder: D,
    overlay: Overlay,
    surface: V,
    sink: P,
    options: ViewerOptions,
    stats: ViewerStats,
    last_health: Instant,
}

impl<S, D, V, P> Viewer<S, D, V, P>
where
    S: ByteSource,
    D: ImageDecoder,
    V: DisplaySurface,
    P: PersistenceSink,
{
    pub fn new(sync: FrameSynchronizer<S>, decoder: D, surface: V, sink: P) -> Self {
        Self {
            sync,
            decoder,
            overlay: Overlay::default(),
            surface,
            sink,
            options: ViewerOptions::default(),
            stats: ViewerStats::default(),
            last_health: Instant::now(),
        }
    }

    pub fn with_options(mut self, options: ViewerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn stats(&self) -> &ViewerStats {
        &self.stats
    }

    pub fn sync_stats(&self) -> &SyncStats {
        self.sync.stats()
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// Run until the operator quits or the source is exhausted.
    pub fn run(&mut self) -> Result<ViewerSummary> {
        let exit = loop {
            if let Iteration::Exit(reason) = self.iterate()? {
                break reason;
            }
            if self.last_health.elapsed() >= self.options.health_interval {
                self.log_health();
                self.last_health = Instant::now();
            }
        };
        self.log_health();
        Ok(ViewerSummary {
            exit,
            viewer: self.stats.clone(),
            sync: self.sync.stats().clone(),
        })
    }

    pub fn iterate(&mut self) -> Result<Iteration> {
        let shown = match self.sync.next_frame() {
            Ok(frame) => self.show(frame.payload()),
            Err(SyncError::EndOfStream) => {
                log::info!("byte source exhausted");
                return Ok(Iteration::Exit(ExitReason::EndOfStream));
            }
            Err(e) if e.is_recoverable() => {
                log::debug!("no frame this iteration: {}", e);
                self.stats.frame_timeouts += 1;
                None
            }
            Err(e) => return Err(e).context("frame synchronizer failed"),
        };

        let command = match self.surface.poll_command(self.options.command_poll) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("command poll failed: {:#}", e);
                None
            }
        };
        match command {
            Some(OperatorCommand::Quit) => {
                log::info!("quit requested");
                Ok(Iteration::Exit(ExitReason::Quit))
            }
            Some(OperatorCommand::Save) => {
                self.save(shown.as_ref());
                Ok(Iteration::Continue)
            }
            None => Ok(Iteration::Continue),
        }
    }

    fn show(&mut self, payload: &[u8]) -> Option<DecodedImage> {
        let image = match self.decoder.decode(payload) {
            Ok(image) => image,
            Err(e) => {
                log::debug!("dropping frame of {} bytes: {}", payload.len(), e);
                self.stats.decode_failures += 1;
                return None;
            }
        };
        let image = self.overlay.render(image);
        match self.surface.present(&image) {
            Ok(()) => self.stats.frames_shown += 1,
            Err(e) => {
                log::warn!("present failed: {:#}", e);
                self.stats.present_failures += 1;
            }
        }
        Some(image)
    }

    fn save(&mut self, image: Option<&DecodedImage>) {
        let Some(image) = image else {
            log::warn!("save requested but no frame is on screen");
            return;
        };
        match self.sink.save(image) {
            Ok(path) => {
                self.stats.snapshots_saved += 1;
                log::info!("saved: {}", path.display());
            }
            Err(e) => {
                self.stats.persist_failures += 1;
                log::error!("snapshot failed: {}", e);
            }
        }
    }

    fn log_health(&self) {
        let sync = self.sync.stats();
        log::info!(
            "frames shown={} decode_failures={} timeouts={} resyncs={} discarded_bytes={} saved={}",
            self.stats.frames_shown,
            self.stats.decode_failures,
            self.stats.frame_timeouts,
            sync.resyncs(),
            sync.bytes_discarded,
            self.stats.snapshots_saved
        );
    }
}
