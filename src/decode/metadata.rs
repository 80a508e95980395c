//! Per-frame telemetry decoded from the metadata row.

use serde::Serialize;

/// Telemetry carried in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameMetadata {
    /// Monotonically increasing hardware frame counter.
    pub counter: u32,
    /// True when the frame was captured during an active recording.
    pub is_recording: bool,
}

impl FrameMetadata {
    /// Creates metadata with the given counter and recording flag.
    pub fn new(counter: u32, is_recording: bool) -> Self {
        Self {
            counter,
            is_recording,
        }
    }
}

/// Reassembles the frame counter from four consecutive samples.
///
/// Each sample carries one counter byte in bits 4..12. Bits that would land
/// above bit 31 are discarded.
#[inline]
pub(crate) fn counter_from_samples(samples: [u16; 4]) -> u32 {
    let [s0, s1, s2, s3] = samples.map(|s| u32::from(s >> 4));
    s0 | (s1 << 8) | (s2 << 16) | (s3 << 24)
}

/// Splits a counter into the four samples the sensor would emit.
#[inline]
pub(crate) fn counter_to_samples(counter: u32) -> [u16; 4] {
    counter.to_le_bytes().map(|b| u16::from(b) << 4)
}
