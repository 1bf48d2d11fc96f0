//! Serial camera viewer.
//!
//! Receives length-prefixed image frames from a serial line, recovers frame
//! boundaries despite timeouts, partial reads and corruption, decodes each
//! frame, draws a fixed overlay and presents it to an operator who can save
//! snapshots.
//!
//! # Module Structure
//!
//! - `frame`: wire format constants and the validated `Frame` type
//! - `ingest`: `ByteSource` trait plus serial, reader and scripted sources
//! - `sync`: the frame synchronization state machine
//! - `decode`: payload to raster decoding
//! - `overlay`: crosshair and label rendering
//! - `display`: presentation surface and operator commands
//! - `persist`: timestamped JPEG snapshots
//! - `viewer`: the display loop tying everything together
//! - `config`: layered configuration (file, environment, flags)

pub mod config;
pub mod decode;
pub mod display;
pub mod frame;
pub mod ingest;
pub mod overlay;
pub mod persist;
pub mod sync;
pub mod ui;
pub mod viewer;

pub use decode::{CodecDecoder, DecodeError, DecodedImage, ImageDecoder};
pub use display::{DisplaySurface, OperatorCommand};
pub use frame::{encode_frame, Frame, DEFAULT_MAX_FRAME_SIZE, LENGTH_FIELD_BYTES, MARKER};
pub use ingest::{ByteSource, ChunkedSource, ReaderSource};
pub use overlay::Overlay;
pub use persist::{PersistError, PersistenceSink, SnapshotDir};
pub use sync::{
    FrameSynchronizer, MarkerSearch, SyncConfig, SyncError, SyncLimits, SyncState, SyncStats,
};
pub use viewer::{ExitReason, Viewer, ViewerOptions, ViewerStats, ViewerSummary};

#[cfg(target_os = "linux")]
pub use display::TerminalSurface;
#[cfg(target_os = "linux")]
pub use ingest::{SerialConfig, SerialPort};
