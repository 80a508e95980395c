//! Frame source abstraction.
//!
//! The transport that delivers frames (network receiver, depacketiser,
//! capture hardware) lives outside this crate. It plugs in through the
//! [`FrameSource`] trait; a synthetic sensor is provided for testing.

use super::RawFrame;
use crate::decode::{FrameMetadata, TelemetryEncoder};
use crate::geometry::StreamGeometry;
use std::ops::Range;
use thiserror::Error;

/// Errors that can occur while reading from a frame source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open frame source: {0}")]
    OpenFailed(String),
    #[error("frame source I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame source not opened")]
    NotOpen,
}

/// Trait for transport frame sources.
///
/// Reads follow a pull model: each call blocks until a frame is available
/// or the source reports that it produced nothing this cycle.
pub trait FrameSource {
    /// Prepares the source to deliver frames of the given geometry.
    fn open(&mut self, geometry: &StreamGeometry) -> Result<(), SourceError>;

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the source produced no data this cycle.
    fn read(&mut self) -> Result<Option<RawFrame>, SourceError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Returns true if the source will never produce another frame.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Closes the source and releases resources.
    fn close(&mut self);
}

/// Synthetic sensor that emits correctly laid out frames.
///
/// Counters increase by one per frame. With `drop_every` set to `n`, a
/// successor counter divisible by `n` is skipped once to simulate a
/// transport drop. The start counter is always emitted, and `n == 1`
/// therefore advances the counter by two.
#[derive(Debug)]
pub struct MockSensor {
    encoder: Option<TelemetryEncoder>,
    next_counter: u32,
    drop_every: u32,
    recording: Option<Range<u32>>,
    arrivals: u64,
}

impl Default for MockSensor {
    fn default() -> Self {
        Self {
            encoder: None,
            next_counter: 1,
            drop_every: 0,
            recording: None,
            arrivals: 0,
        }
    }
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the counter of the first emitted frame.
    pub fn with_start_counter(mut self, counter: u32) -> Self {
        self.next_counter = counter;
        self
    }

    /// Skips successor counters divisible by `n` (0 disables drops).
    pub fn with_drop_every(mut self, n: u32) -> Self {
        self.drop_every = n;
        self
    }

    /// Raises the recording flag for counters in `window`.
    pub fn with_recording_window(mut self, window: Range<u32>) -> Self {
        self.recording = Some(window);
        self
    }

    /// Raises the recording flag on every frame.
    pub fn always_recording(self) -> Self {
        self.with_recording_window(0..u32::MAX)
    }

    fn advance(&mut self) -> u32 {
        let counter = self.next_counter;
        let mut next = counter.wrapping_add(1);
        if self.drop_every > 0 && next % self.drop_every == 0 {
            next = next.wrapping_add(1);
        }
        self.next_counter = next;
        counter
    }
}

impl FrameSource for MockSensor {
    fn open(&mut self, geometry: &StreamGeometry) -> Result<(), SourceError> {
        self.encoder = Some(TelemetryEncoder::new(*geometry));
        self.arrivals = 0;
        tracing::info!(
            frame_size_bytes = geometry.frame_size_bytes(),
            start_counter = self.next_counter,
            "MockSensor opened"
        );
        Ok(())
    }

    fn read(&mut self) -> Result<Option<RawFrame>, SourceError> {
        if self.encoder.is_none() {
            return Err(SourceError::NotOpen);
        }

        let counter = self.advance();
        let is_recording = self
            .recording
            .as_ref()
            .is_some_and(|window| window.contains(&counter));

        let encoder = self.encoder.as_ref().ok_or(SourceError::NotOpen)?;
        let g = encoder.geometry();
        // Deterministic 12-bit ramp shifted by the counter
        let pixels: Vec<u16> = (0..g.pixel_sample_count())
            .map(|i| ((i as u32 ^ counter) & 0x0FFF) as u16)
            .collect();

        let data = encoder.encode(FrameMetadata::new(counter, is_recording), &pixels);
        self.arrivals += 1;
        Ok(Some(RawFrame::new(data, self.arrivals)))
    }

    fn is_open(&self) -> bool {
        self.encoder.is_some()
    }

    fn close(&mut self) {
        self.encoder = None;
        tracing::info!("MockSensor closed");
    }
}
