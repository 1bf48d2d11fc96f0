use std::sync::Mutex;
use std::time::Duration;

use tempfile::Builder;

use serialcam::config::{ConfigOverrides, ViewerConfig};
use serialcam::MarkerSearch;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "SERIALCAM_CONFIG",
        "SERIALCAM_PORT",
        "SERIALCAM_BAUD",
        "SERIALCAM_TIMEOUT_MS",
        "SERIALCAM_OUTPUT_DIR",
        "SERIALCAM_TITLE",
        "SERIALCAM_MAX_FRAME_BYTES",
        "SERIALCAM_MARKER_SEARCH",
        "SERIALCAM_PREVIEW",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_match_the_camera_firmware() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ViewerConfig::load().expect("load defaults");
    assert_eq!(cfg.transport.path, "/dev/ttyUSB0");
    assert_eq!(cfg.transport.baud, 2_000_000);
    assert_eq!(cfg.transport.timeout, Duration::from_secs(1));
    assert_eq!(cfg.window_title, "ESP32-CAM USB");
    assert_eq!(cfg.sync.marker_search, MarkerSearch::Sliding);
    assert_eq!(cfg.sync.max_frame_bytes, serialcam::DEFAULT_MAX_FRAME_SIZE);
    assert_eq!(cfg.frame_timeout(), cfg.transport.timeout);
    assert!(cfg.output_dir.ends_with("ESP32_CAM"));
    assert!(cfg.preview_path.is_none());
}

#[test]
fn loads_json_file_with_env_and_flag_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".json").tempfile().expect("temp config");
    let json = r#"{
        "transport": { "path": "/dev/ttyACM0", "baud": 921600, "timeout_ms": 250 },
        "sync": { "max_frame_bytes": 65536, "marker_search": "block", "frame_timeout_ms": 900 },
        "output_dir": "/tmp/snaps",
        "window_title": "bench cam"
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("SERIALCAM_CONFIG", file.path());
    std::env::set_var("SERIALCAM_BAUD", "115200");
    std::env::set_var("SERIALCAM_TITLE", "env title");

    let cfg = ViewerConfig::load_with(ConfigOverrides {
        title: Some("flag title".to_string()),
        ..ConfigOverrides::default()
    })
    .expect("load config");

    assert_eq!(cfg.transport.path, "/dev/ttyACM0");
    assert_eq!(cfg.transport.baud, 115_200);
    assert_eq!(cfg.transport.timeout, Duration::from_millis(250));
    assert_eq!(cfg.sync.max_frame_bytes, 65_536);
    assert_eq!(cfg.sync.marker_search, MarkerSearch::BlockAligned);
    assert_eq!(cfg.frame_timeout(), Duration::from_millis(900));
    assert_eq!(cfg.output_dir.to_str(), Some("/tmp/snaps"));
    assert_eq!(cfg.window_title, "flag title");

    clear_env();
}

#[test]
fn loads_toml_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".toml").tempfile().expect("temp config");
    let toml = r#"
        output_dir = "/var/lib/serialcam"
        preview_path = "/run/serialcam/live.jpg"

        [transport]
        path = "/dev/serial0"
        timeout_ms = 500
    "#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");
    std::env::set_var("SERIALCAM_CONFIG", file.path());

    let cfg = ViewerConfig::load().expect("load toml config");
    assert_eq!(cfg.transport.path, "/dev/serial0");
    assert_eq!(cfg.transport.baud, 2_000_000);
    assert_eq!(cfg.frame_timeout(), Duration::from_millis(500));
    assert_eq!(
        cfg.preview_path.as_deref().and_then(|p| p.to_str()),
        Some("/run/serialcam/live.jpg")
    );

    clear_env();
}

#[test]
fn rejects_invalid_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("SERIALCAM_BAUD", "fast");
    assert!(ViewerConfig::load().is_err());
    clear_env();

    std::env::set_var("SERIALCAM_TIMEOUT_MS", "0");
    assert!(ViewerConfig::load().is_err());
    clear_env();

    std::env::set_var("SERIALCAM_MARKER_SEARCH", "zigzag");
    assert!(ViewerConfig::load().is_err());
    clear_env();

    let err = ViewerConfig::load_with(ConfigOverrides {
        timeout_ms: Some(u64::MAX),
        ..ConfigOverrides::default()
    })
    .expect_err("huge timeout is rejected");
    assert!(err.to_string().contains("transport timeout"));
    clear_env();

    let err = ViewerConfig::load_with(ConfigOverrides {
        baud: Some(0),
        ..ConfigOverrides::default()
    });
    assert!(err.is_err());
    clear_env();
}
