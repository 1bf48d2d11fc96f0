//! Wire framing.
//!
//! Each frame on the serial line is laid out as:
//!
//! | Field   | Size          | Encoding              |
//! |---------|---------------|-----------------------|
//! | Marker  | 5 bytes       | literal `FRAME`       |
//! | Length  | 4 bytes       | u32, little-endian    |
//! | Payload | Length bytes  | opaque image bytes    |
//!
//! `Frame` values are only built by the synchronizer, so a `Frame` always
//! carries exactly `declared_size` payload bytes.

/// Start-of-frame marker.
pub const MARKER: &[u8; 5] = b"FRAME";

/// Width of the little-endian length field following the marker.
pub const LENGTH_FIELD_BYTES: usize = 4;

/// Default cap on a declared payload length (4 MiB).
/// Anything larger is treated as a corrupted length field.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 4 * 1024 * 1024;

// ----------------------------------------------------------------------------
// Frame: one complete, length-validated payload
// ----------------------------------------------------------------------------

/// One complete frame recovered from the byte stream.
///
/// There is no public constructor: the only producer is the synchronizer,
/// which emits a frame once `payload.len() == declared_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    declared_size: u32,
    payload: Vec<u8>,
}

impl Frame {
    pub(crate) fn new(declared_size: u32, payload: Vec<u8>) -> Self {
        debug_assert_eq!(payload.len(), declared_size as usize);
        Self {
            declared_size,
            payload,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            declared_size: 0,
            payload: Vec::new(),
        }
    }

    /// Length announced by the sender.
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Encode a payload into its on-wire representation.
///
/// Fails if the payload does not fit the 32-bit length field.
pub fn encode_frame(payload: &[u8]) -> Option<Vec<u8>> {
    let len = u32::try_from(payload.len()).ok()?;
    let mut out = Vec::with_capacity(MARKER.len() + LENGTH_FIELD_BYTES + payload.len());
    out.extend_from_slice(MARKER);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    Some(out)
}
