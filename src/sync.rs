//! Frame synchronization.
//!
//! Locates frame boundaries in an unstructured byte stream and validates the
//! declared payload length against the bytes actually received.
//!
//! The state machine is an explicit value (`SyncState`) advanced by a pure
//! transition function, so it can be driven without any transport. The
//! `FrameSynchronizer` owns a `ByteSource`, performs exactly one bounded read
//! per step and feeds the result through `SyncState::advance`.
//!
//! Recovery rules:
//! - Any short read outside marker search abandons the frame.
//! - A declared length above the configured maximum is rejected before any
//!   payload buffer is allocated.
//! - Every anomaly returns to marker search; nothing partial is ever emitted.

use std::io;
use std::str::FromStr;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::frame::{Frame, DEFAULT_MAX_FRAME_SIZE, LENGTH_FIELD_BYTES, MARKER};
use crate::ingest::ByteSource;

/// Largest single payload read. Each chunk gets its own transport timeout.
pub const PAYLOAD_CHUNK: usize = 16 * 1024;

/// Default bound on how long `next_frame` waits for a complete frame.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport timeout: no complete read within the timeout window")]
    TransportTimeout,

    #[error("frame size mismatch: declared {declared} bytes, received {received}")]
    FrameSizeMismatch { declared: u32, received: usize },

    #[error("declared frame size {declared} exceeds limit of {max} bytes")]
    FrameTooLarge { declared: u32, max: u32 },

    #[error("byte source exhausted")]
    EndOfStream,

    #[error("transport i/o error: {0}")]
    Transport(#[from] io::Error),
}

impl SyncError {
    /// Per-frame anomalies that marker search recovers from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SyncError::TransportTimeout
                | SyncError::FrameSizeMismatch { .. }
                | SyncError::FrameTooLarge { .. }
        )
    }
}

/// How the synchronizer looks for the start-of-frame marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerSearch {
    /// Rolling match that shifts one byte on mismatch. Finds the marker
    /// regardless of where read boundaries fall.
    #[default]
    Sliding,
    /// Read marker-sized blocks and discard any block that is not the marker.
    /// A marker split across two reads is missed until the stream re-aligns.
    BlockAligned,
}

impl FromStr for MarkerSearch {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sliding" => Ok(MarkerSearch::Sliding),
            "block" | "block-aligned" | "block_aligned" => Ok(MarkerSearch::BlockAligned),
            other => Err(format!(
                "unknown marker search '{}'; expected 'sliding' or 'block'",
                other
            )),
        }
    }
}

/// Limits applied by the transition function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncLimits {
    pub max_frame_size: u32,
    pub marker_search: MarkerSearch,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            marker_search: MarkerSearch::default(),
        }
    }
}

// ----------------------------------------------------------------------------
// SyncState: the explicit state machine
// ----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Looking for `MARKER`. `matched` leading marker bytes have been seen
    /// (always 0 with block-aligned search).
    SeekingMarker { matched: usize },
    /// Marker seen; the 4-byte length comes next.
    ReadingLength,
    /// Collecting `declared_size` payload bytes.
    ReadingPayload { declared_size: u32, payload: Vec<u8> },
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState::SeekingMarker { matched: 0 }
    }
}

/// Something the caller must observe after a transition.
#[derive(Debug)]
pub enum SyncEvent {
    Frame(Frame),
    Resync(SyncError),
    /// Empty read while seeking; state is unchanged.
    Timeout,
}

/// Result of feeding one read into the state machine.
#[derive(Debug)]
pub struct Transition {
    pub state: SyncState,
    pub event: Option<SyncEvent>,
    /// Bytes thrown away by this transition.
    pub discarded: usize,
    /// Leading bytes of the chunk this transition used.
    pub consumed: usize,
}

impl Transition {
    fn to(state: SyncState) -> Self {
        Self {
            state,
            event: None,
            discarded: 0,
            consumed: 0,
        }
    }

    fn resync(error: SyncError, discarded: usize) -> Self {
        Self {
            state: SyncState::default(),
            event: Some(SyncEvent::Resync(error)),
            discarded,
            consumed: 0,
        }
    }

    /// A read that timed out with no data while seeking. The partial marker
    /// match is kept.
    fn idle(state: SyncState) -> Self {
        Self {
            state,
            event: Some(SyncEvent::Timeout),
            discarded: 0,
            consumed: 0,
        }
    }

    fn emit(frame: Frame) -> Self {
        Self {
            state: SyncState::default(),
            event: Some(SyncEvent::Frame(frame)),
            discarded: 0,
            consumed: 0,
        }
    }
}

impl SyncState {
    /// Number of bytes the next read should request.
    ///
    /// Marker search never requests more than the missing marker bytes, so no
    /// byte past the marker is consumed before the state changes.
    pub fn request_len(&self, limits: &SyncLimits) -> usize {
        match self {
            SyncState::SeekingMarker { matched } => match limits.marker_search {
                MarkerSearch::Sliding => MARKER.len() - matched,
                MarkerSearch::BlockAligned => MARKER.len(),
            },
            SyncState::ReadingLength => LENGTH_FIELD_BYTES,
            SyncState::ReadingPayload {
                declared_size,
                payload,
            } => (*declared_size as usize - payload.len()).min(PAYLOAD_CHUNK),
        }
    }

    /// Payload bytes collected for the in-flight frame.
    pub fn bytes_so_far(&self) -> usize {
        match self {
            SyncState::ReadingPayload { payload, .. } => payload.len(),
            _ => 0,
        }
    }

    /// True while no frame is in flight.
    pub fn is_seeking(&self) -> bool {
        matches!(self, SyncState::SeekingMarker { .. })
    }

    /// Feed the bytes returned by one read of `request_len` bytes.
    ///
    /// A chunk shorter than `request_len` means the read timed out. Bytes past
    /// `request_len` are left unconsumed (see `Transition::consumed`) and
    /// belong to the next state.
    pub fn advance(self, chunk: &[u8], limits: &SyncLimits) -> Transition {
        let requested = self.request_len(limits);
        let taken = chunk.len().min(requested);
        let mut transition = self.transition(&chunk[..taken], taken < requested, limits);
        transition.consumed = taken;
        transition
    }

    fn transition(self, chunk: &[u8], short: bool, limits: &SyncLimits) -> Transition {
        match self {
            SyncState::SeekingMarker { matched } => {
                if chunk.is_empty() {
                    return Transition::idle(SyncState::SeekingMarker { matched });
                }
                match limits.marker_search {
                    MarkerSearch::Sliding => {
                        let mut matched = matched;
                        let mut discarded = 0;
                        for &byte in chunk {
                            let next = rematch(matched, byte);
                            discarded += matched + 1 - next;
                            matched = next;
                            if matched == MARKER.len() {
                                break;
                            }
                        }
                        let mut next = Transition::to(if matched == MARKER.len() {
                            SyncState::ReadingLength
                        } else {
                            SyncState::SeekingMarker { matched }
                        });
                        next.discarded = discarded;
                        next
                    }
                    MarkerSearch::BlockAligned => {
                        if short {
                            return Transition::resync(SyncError::TransportTimeout, chunk.len());
                        }
                        if chunk == MARKER {
                            Transition::to(SyncState::ReadingLength)
                        } else {
                            let mut next = Transition::to(SyncState::default());
                            next.discarded = chunk.len();
                            next
                        }
                    }
                }
            }

            SyncState::ReadingLength => {
                let Ok(field) = <[u8; LENGTH_FIELD_BYTES]>::try_from(chunk) else {
                    return Transition::resync(SyncError::TransportTimeout, chunk.len());
                };
                let declared_size = u32::from_le_bytes(field);
                if declared_size > limits.max_frame_size {
                    return Transition::resync(
                        SyncError::FrameTooLarge {
                            declared: declared_size,
                            max: limits.max_frame_size,
                        },
                        0,
                    );
                }
                if declared_size == 0 {
                    return Transition::emit(Frame::empty());
                }
                Transition::to(SyncState::ReadingPayload {
                    declared_size,
                    payload: Vec::with_capacity(declared_size as usize),
                })
            }

            SyncState::ReadingPayload {
                declared_size,
                mut payload,
            } => {
                if short {
                    let received = payload.len() + chunk.len();
                    return Transition::resync(
                        SyncError::FrameSizeMismatch {
                            declared: declared_size,
                            received,
                        },
                        received,
                    );
                }
                payload.extend_from_slice(chunk);
                if payload.len() == declared_size as usize {
                    Transition::emit(Frame::new(declared_size, payload))
                } else {
                    Transition::to(SyncState::ReadingPayload {
                        declared_size,
                        payload,
                    })
                }
            }
        }
    }
}

/// Extend a partial marker match of `matched` bytes with `byte`, falling back
/// to the longest marker prefix that is a suffix of the bytes seen.
fn rematch(matched: usize, byte: u8) -> usize {
    let mut k = matched;
    loop {
        if MARKER[k] == byte {
            return k + 1;
        }
        if k == 0 {
            return 0;
        }
        k = border(k);
    }
}

/// Longest proper prefix of `MARKER[..k]` that is also its suffix.
fn border(k: usize) -> usize {
    (1..k)
        .rev()
        .find(|&len| MARKER[k - len..k] == MARKER[..len])
        .unwrap_or(0)
}

// ----------------------------------------------------------------------------
// FrameSynchronizer: drives SyncState from a ByteSource
// ----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct SyncConfig {
    pub limits: SyncLimits,
    /// How long `next_frame` waits for a complete frame before giving up.
    pub frame_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            limits: SyncLimits::default(),
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
        }
    }
}

/// Counters for a synchronizer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub frames: u64,
    pub bytes_received: u64,
    pub bytes_discarded: u64,
    pub timeouts: u64,
    pub size_mismatches: u64,
    pub oversized: u64,
}

impl SyncStats {
    fn record(&mut self, error: &SyncError) {
        match error {
            SyncError::TransportTimeout => self.timeouts += 1,
            SyncError::FrameSizeMismatch { .. } => self.size_mismatches += 1,
            SyncError::FrameTooLarge { .. } => self.oversized += 1,
            SyncError::EndOfStream | SyncError::Transport(_) => {}
        }
    }

    pub fn resyncs(&self) -> u64 {
        self.timeouts + self.size_mismatches + self.oversized
    }
}

pub struct FrameSynchronizer<S> {
    source: S,
    state: SyncState,
    config: SyncConfig,
    scratch: Vec<u8>,
    stats: SyncStats,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    pub fn new(source: S, config: SyncConfig) -> Self {
        Self {
            source,
            state: SyncState::default(),
            config,
            scratch: vec![0u8; PAYLOAD_CHUNK],
            stats: SyncStats::default(),
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Perform one bounded read and one state transition.
    ///
    /// Returns `Ok(Some(frame))` when a frame completes, `Ok(None)` when more
    /// input is needed, and `Err` with the anomaly that forced a resync.
    /// `SyncError::Transport` is the only error that is not recoverable.
    pub fn step(&mut self) -> Result<Option<Frame>, SyncError> {
        let requested = self.state.request_len(&self.config.limits);
        let received = self.source.read(&mut self.scratch[..requested])?;
        self.stats.bytes_received += received as u64;

        let state = std::mem::take(&mut self.state);
        let transition = state.advance(&self.scratch[..received], &self.config.limits);
        self.state = transition.state;
        self.stats.bytes_discarded += transition.discarded as u64;

        match transition.event {
            None => Ok(None),
            Some(SyncEvent::Frame(frame)) => {
                self.stats.frames += 1;
                Ok(Some(frame))
            }
            Some(SyncEvent::Resync(error)) => {
                self.stats.record(&error);
                Err(error)
            }
            Some(SyncEvent::Timeout) => {
                self.stats.timeouts += 1;
                Err(SyncError::TransportTimeout)
            }
        }
    }

    /// Block until the next complete frame.
    ///
    /// Fails with `TransportTimeout` when no frame completes within the
    /// configured frame timeout. State is kept, so a frame in flight at that
    /// point resumes on the next call.
    pub fn next_frame(&mut self) -> Result<Frame, SyncError> {
        let started = Instant::now();
        loop {
            match self.step() {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {}
                Err(e) if e.is_recoverable() => {
                    log::debug!("resync: {}", e);
                }
                Err(e) => return Err(e),
            }

            if self.state.is_seeking() && self.source.is_exhausted() {
                return Err(SyncError::EndOfStream);
            }
            if started.elapsed() >= self.config.frame_timeout {
                return Err(SyncError::TransportTimeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use crate::ingest::ChunkedSource;

    fn wire(payload: &[u8]) -> Vec<u8> {
        encode_frame(payload).unwrap()
    }

    fn synchronizer(bursts: Vec<Vec<u8>>, search: MarkerSearch) -> FrameSynchronizer<ChunkedSource> {
        let config = SyncConfig {
            limits: SyncLimits {
                max_frame_size: 64,
                marker_search: search,
            },
            ..SyncConfig::default()
        };
        FrameSynchronizer::new(ChunkedSource::new(bursts), config)
    }

    #[test]
    fn valid_frame_round_trips() {
        let mut sync = synchronizer(vec![wire(b"hello jpeg")], MarkerSearch::Sliding);
        let frame = sync.next_frame().expect("frame");
        assert_eq!(frame.declared_size(), 10);
        assert_eq!(frame.payload(), b"hello jpeg");
        assert!(sync.state().is_seeking());
    }

    #[test]
    fn zero_length_frame_is_valid() {
        let mut sync = synchronizer(vec![wire(&[])], MarkerSearch::Sliding);
        let frame = sync.next_frame().expect("empty frame");
        assert_eq!(frame.declared_size(), 0);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn marker_only_emits_nothing_then_recovers() {
        let mut sync = synchronizer(vec![MARKER.to_vec()], MarkerSearch::Sliding);
        assert!(matches!(sync.next_frame(), Err(SyncError::EndOfStream)));
        assert!(sync.state().is_seeking());

        sync.source_mut().push(wire(b"ok"));
        assert_eq!(sync.next_frame().expect("frame").payload(), b"ok");
    }

    #[test]
    fn partial_length_emits_nothing_then_recovers() {
        let mut truncated = MARKER.to_vec();
        truncated.extend_from_slice(&[3, 0]);
        let mut sync = synchronizer(vec![truncated], MarkerSearch::Sliding);
        assert!(matches!(sync.next_frame(), Err(SyncError::EndOfStream)));
        assert_eq!(sync.stats().timeouts, 1);

        sync.source_mut().push(wire(b"abc"));
        assert_eq!(sync.next_frame().expect("frame").payload(), b"abc");
    }

    #[test]
    fn partial_payload_is_dropped_not_emitted() {
        let mut truncated = wire(b"abcdef");
        truncated.truncate(truncated.len() - 2);
        let mut sync = synchronizer(vec![truncated], MarkerSearch::Sliding);
        assert!(matches!(sync.next_frame(), Err(SyncError::EndOfStream)));
        assert_eq!(sync.stats().size_mismatches, 1);
        assert_eq!(sync.stats().frames, 0);

        sync.source_mut().push(wire(b"next"));
        assert_eq!(sync.next_frame().expect("frame").payload(), b"next");
    }

    #[test]
    fn block_aligned_search_misses_split_marker() {
        let stream = wire(b"xyz");
        let bursts = vec![stream[..2].to_vec(), stream[2..].to_vec()];
        let mut sync = synchronizer(bursts, MarkerSearch::BlockAligned);
        assert!(matches!(sync.next_frame(), Err(SyncError::EndOfStream)));
        assert_eq!(sync.stats().frames, 0);
        assert!(sync.stats().bytes_discarded > 0);
    }

    #[test]
    fn sliding_search_finds_split_marker() {
        let stream = wire(b"xyz");
        let bursts = vec![stream[..2].to_vec(), stream[2..].to_vec()];
        let mut sync = synchronizer(bursts, MarkerSearch::Sliding);
        assert_eq!(sync.next_frame().expect("frame").payload(), b"xyz");
    }

    #[test]
    fn sliding_search_skips_garbage_and_false_starts() {
        let mut stream = b"\x00\xffFRAFRFRAME".to_vec();
        stream.truncate(stream.len() - MARKER.len());
        stream.extend_from_slice(&wire(b"payload"));
        let mut sync = synchronizer(vec![stream], MarkerSearch::Sliding);
        assert_eq!(sync.next_frame().expect("frame").payload(), b"payload");
        assert_eq!(sync.stats().bytes_discarded, 7);
    }

    #[test]
    fn oversized_length_is_rejected_then_resynchronizes() {
        let mut stream = MARKER.to_vec();
        stream.extend_from_slice(&1_000_000u32.to_le_bytes());
        stream.extend_from_slice(&wire(b"small"));
        let mut sync = synchronizer(vec![stream], MarkerSearch::Sliding);
        assert_eq!(sync.next_frame().expect("frame").payload(), b"small");
        assert_eq!(sync.stats().oversized, 1);
    }

    #[test]
    fn consecutive_frames_are_all_recovered() {
        let mut stream = wire(b"one");
        stream.extend_from_slice(&wire(b"two"));
        stream.extend_from_slice(&wire(b""));
        let mut sync = synchronizer(vec![stream], MarkerSearch::Sliding);
        assert_eq!(sync.next_frame().unwrap().payload(), b"one");
        assert_eq!(sync.next_frame().unwrap().payload(), b"two");
        assert!(sync.next_frame().unwrap().payload().is_empty());
        assert_eq!(sync.stats().frames, 3);
    }

    #[test]
    fn large_payload_is_read_in_chunks() {
        let payload: Vec<u8> = (0..(PAYLOAD_CHUNK * 2 + 17)).map(|i| i as u8).collect();
        let config = SyncConfig::default();
        let mut sync = FrameSynchronizer::new(ChunkedSource::new([wire(&payload)]), config);
        let frame = sync.next_frame().expect("frame");
        assert_eq!(frame.payload(), &payload[..]);
    }

    #[test]
    fn advance_is_usable_without_a_transport() {
        let limits = SyncLimits::default();
        let t = SyncState::default().advance(b"FRA", &limits);
        assert_eq!(t.state, SyncState::SeekingMarker { matched: 3 });
        assert!(t.event.is_none());
        assert_eq!(t.state.request_len(&limits), 2);

        let t = t.state.advance(b"ME", &limits);
        assert_eq!(t.state, SyncState::ReadingLength);

        let t = t.state.advance(&2u32.to_le_bytes(), &limits);
        assert_eq!(t.state.request_len(&limits), 2);
        assert_eq!(t.state.bytes_so_far(), 0);

        let t = t.state.advance(b"ok", &limits);
        assert!(t.state.is_seeking());
        match t.event {
            Some(SyncEvent::Frame(frame)) => assert_eq!(frame.payload(), b"ok"),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn short_length_read_reports_timeout() {
        let t = SyncState::ReadingLength.advance(&[1, 2], &SyncLimits::default());
        assert!(t.state.is_seeking());
        assert_eq!(t.consumed, 2);
        assert!(matches!(
            t.event,
            Some(SyncEvent::Resync(SyncError::TransportTimeout))
        ));
    }

    #[test]
    fn advance_consumes_no_more_than_the_state_requests() {
        let limits = SyncLimits::default();

        let t = SyncState::default().advance(b"FRAMEx", &limits);
        assert_eq!(t.state, SyncState::ReadingLength);
        assert_eq!(t.consumed, MARKER.len());

        let t = SyncState::SeekingMarker { matched: 3 }.advance(b"MEFRAME", &limits);
        assert_eq!(t.state, SyncState::ReadingLength);
        assert_eq!(t.consumed, 2);

        let t = SyncState::ReadingLength.advance(&[3, 0, 0, 0, 0xAA, 0xBB], &limits);
        assert_eq!(t.consumed, LENGTH_FIELD_BYTES);
        assert_eq!(t.state.request_len(&limits), 3);

        let t = t.state.advance(b"abcdef", &limits);
        assert_eq!(t.consumed, 3);
        match t.event {
            Some(SyncEvent::Frame(frame)) => assert_eq!(frame.payload(), b"abc"),
            other => panic!("expected frame, got {:?}", other),
        }

        let block = SyncLimits {
            marker_search: MarkerSearch::BlockAligned,
            ..limits
        };
        let t = SyncState::default().advance(b"FRAME\x01\x00", &block);
        assert_eq!(t.state, SyncState::ReadingLength);
        assert_eq!(t.consumed, MARKER.len());
    }

    #[test]
    fn odd_sized_chunks_never_panic() {
        let limits = SyncLimits {
            max_frame_size: 16,
            marker_search: MarkerSearch::Sliding,
        };
        let mut stream = b"xxFRA".to_vec();
        stream.extend_from_slice(&encode_frame(b"payload!").unwrap());
        stream.extend_from_slice(&[0xFF; 3]);

        for size in 0..=stream.len() + 1 {
            let mut state = SyncState::default();
            for chunk in stream.chunks(size.max(1)) {
                let mut rest = chunk;
                while !rest.is_empty() {
                    let t = state.advance(rest, &limits);
                    rest = &rest[t.consumed.max(1).min(rest.len())..];
                    state = t.state;
                }
            }
            let _ = SyncState::ReadingLength.advance(&stream[..size.min(3)], &limits);
        }
    }

    #[test]
    fn empty_read_while_seeking_counts_a_timeout_and_keeps_the_match() {
        let limits = SyncLimits::default();
        let t = SyncState::SeekingMarker { matched: 2 }.advance(&[], &limits);
        assert_eq!(t.state, SyncState::SeekingMarker { matched: 2 });
        assert!(matches!(t.event, Some(SyncEvent::Timeout)));

        for search in [MarkerSearch::Sliding, MarkerSearch::BlockAligned] {
            let mut sync = synchronizer(vec![Vec::new(), Vec::new()], search);
            assert!(matches!(sync.step(), Err(SyncError::TransportTimeout)));
            assert!(matches!(sync.step(), Err(SyncError::TransportTimeout)));
            assert_eq!(sync.stats().timeouts, 2);
        }
    }

    #[test]
    fn sliding_search_survives_an_empty_read_mid_marker() {
        let good = wire(b"gap");
        let bursts = vec![good[..2].to_vec(), Vec::new(), good[2..].to_vec()];
        let mut sync = synchronizer(bursts, MarkerSearch::Sliding);
        assert_eq!(sync.next_frame().expect("frame").payload(), b"gap");
        assert_eq!(sync.stats().timeouts, 1);
    }

    #[test]
    fn rematch_falls_back_one_byte_at_a_time() {
        assert_eq!(rematch(0, b'F'), 1);
        assert_eq!(rematch(3, b'F'), 1);
        assert_eq!(rematch(3, b'x'), 0);
        assert_eq!(rematch(4, b'E'), 5);
    }

    struct SilentSource;

    impl ByteSource for SilentSource {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(Duration::from_millis(1));
            Ok(0)
        }
    }

    #[test]
    fn next_frame_gives_up_after_frame_timeout() {
        let config = SyncConfig {
            frame_timeout: Duration::from_millis(20),
            ..SyncConfig::default()
        };
        let mut sync = FrameSynchronizer::new(SilentSource, config);
        assert!(matches!(
            sync.next_frame(),
            Err(SyncError::TransportTimeout)
        ));
    }

    #[test]
    fn marker_search_parses_from_config_strings() {
        assert_eq!("sliding".parse::<MarkerSearch>(), Ok(MarkerSearch::Sliding));
        assert_eq!("Block".parse::<MarkerSearch>(), Ok(MarkerSearch::BlockAligned));
        assert!("zigzag".parse::<MarkerSearch>().is_err());
    }
}
