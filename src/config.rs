use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::DEFAULT_MAX_FRAME_SIZE;
use crate::sync::MarkerSearch;

const DEFAULT_PORT: &str = "/dev/ttyUSB0";
const DEFAULT_BAUD: u32 = 2_000_000;
const DEFAULT_TIMEOUT_MS: u64 = 1_000;
const DEFAULT_TITLE: &str = "ESP32-CAM USB";
const DEFAULT_OUTPUT_SUBDIR: &str = "Documents/ESP32_CAM";
/// Upper bound for the transport and frame timeouts.
const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize, Default)]
struct ViewerConfigFile {
    transport: Option<TransportConfigFile>,
    sync: Option<SyncConfigFile>,
    output_dir: Option<PathBuf>,
    window_title: Option<String>,
    preview_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct TransportConfigFile {
    path: Option<String>,
    baud: Option<u32>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct SyncConfigFile {
    max_frame_bytes: Option<u32>,
    marker_search: Option<String>,
    frame_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub transport: TransportSettings,
    pub sync: SyncSettings,
    pub output_dir: PathBuf,
    pub window_title: String,
    pub preview_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub path: String,
    pub baud: u32,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub max_frame_bytes: u32,
    pub marker_search: MarkerSearch,
    /// `None` means one transport timeout.
    pub frame_timeout: Option<Duration>,
}

/// Command-line values; each one present overrides file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub output_dir: Option<PathBuf>,
    pub title: Option<String>,
    pub max_frame_bytes: Option<u32>,
    pub marker_search: Option<MarkerSearch>,
    pub preview_path: Option<PathBuf>,
}

impl ViewerConfig {
    /// Defaults, then `SERIALCAM_CONFIG` file, then environment, then validation.
    pub fn load() -> Result<Self> {
        Self::load_with(ConfigOverrides::default())
    }

    pub fn load_with(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = std::env::var("SERIALCAM_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Effective bound on a single `next_frame` call. Quit is polled between
    /// calls, so this is also the worst-case quit latency.
    pub fn frame_timeout(&self) -> Duration {
        self.sync.frame_timeout.unwrap_or(self.transport.timeout)
    }

    fn from_file(file: ViewerConfigFile) -> Result<Self> {
        let transport = file.transport.unwrap_or_default();
        let sync = file.sync.unwrap_or_default();
        let marker_search = match sync.marker_search.as_deref() {
            Some(value) => value.parse().map_err(|e: String| anyhow!(e))?,
            None => MarkerSearch::default(),
        };
        Ok(Self {
            transport: TransportSettings {
                path: transport.path.unwrap_or_else(|| DEFAULT_PORT.to_string()),
                baud: transport.baud.unwrap_or(DEFAULT_BAUD),
                timeout: Duration::from_millis(transport.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)),
            },
            sync: SyncSettings {
                max_frame_bytes: sync.max_frame_bytes.unwrap_or(DEFAULT_MAX_FRAME_SIZE),
                marker_search,
                frame_timeout: sync.frame_timeout_ms.map(Duration::from_millis),
            },
            output_dir: file.output_dir.unwrap_or_else(default_output_dir),
            window_title: file
                .window_title
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            preview_path: file.preview_path,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("SERIALCAM_PORT") {
            if !port.trim().is_empty() {
                self.transport.path = port;
            }
        }
        if let Ok(baud) = std::env::var("SERIALCAM_BAUD") {
            self.transport.baud = baud
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERIALCAM_BAUD must be a positive integer"))?;
        }
        if let Ok(timeout) = std::env::var("SERIALCAM_TIMEOUT_MS") {
            let ms: u64 = timeout.trim().parse().map_err(|_| {
                anyhow!("SERIALCAM_TIMEOUT_MS must be an integer number of milliseconds")
            })?;
            self.transport.timeout = Duration::from_millis(ms);
        }
        if let Ok(dir) = std::env::var("SERIALCAM_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(title) = std::env::var("SERIALCAM_TITLE") {
            if !title.trim().is_empty() {
                self.window_title = title;
            }
        }
        if let Ok(max) = std::env::var("SERIALCAM_MAX_FRAME_BYTES") {
            self.sync.max_frame_bytes = max
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERIALCAM_MAX_FRAME_BYTES must be an integer"))?;
        }
        if let Ok(search) = std::env::var("SERIALCAM_MARKER_SEARCH") {
            self.sync.marker_search = search.parse().map_err(|e: String| anyhow!(e))?;
        }
        if let Ok(preview) = std::env::var("SERIALCAM_PREVIEW") {
            if !preview.trim().is_empty() {
                self.preview_path = Some(PathBuf::from(preview));
            }
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.transport.path = port;
        }
        if let Some(baud) = overrides.baud {
            self.transport.baud = baud;
        }
        if let Some(ms) = overrides.timeout_ms {
            self.transport.timeout = Duration::from_millis(ms);
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(title) = overrides.title {
            self.window_title = title;
        }
        if let Some(max) = overrides.max_frame_bytes {
            self.sync.max_frame_bytes = max;
        }
        if let Some(search) = overrides.marker_search {
            self.sync.marker_search = search;
        }
        if let Some(preview) = overrides.preview_path {
            self.preview_path = Some(preview);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.transport.path.trim().is_empty() {
            return Err(anyhow!("transport path must not be empty"));
        }
        if self.transport.baud == 0 {
            return Err(anyhow!("transport baud must be greater than zero"));
        }
        if self.transport.timeout.is_zero() {
            return Err(anyhow!("transport timeout must be greater than zero"));
        }
        if self.transport.timeout > MAX_TIMEOUT {
            return Err(anyhow!(
                "transport timeout must not exceed {}s",
                MAX_TIMEOUT.as_secs()
            ));
        }
        if self.sync.max_frame_bytes == 0 {
            return Err(anyhow!("max frame size must be greater than zero"));
        }
        if self.frame_timeout().is_zero() {
            return Err(anyhow!("frame timeout must be greater than zero"));
        }
        if self.frame_timeout() > MAX_TIMEOUT {
            return Err(anyhow!(
                "frame timeout must not exceed {}s",
                MAX_TIMEOUT.as_secs()
            ));
        }
        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(DEFAULT_OUTPUT_SUBDIR),
        None => PathBuf::from("ESP32_CAM"),
    }
}

fn read_config_file(path: &Path) -> Result<ViewerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
        toml::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
