//! Frame counter continuity tracking.

use crate::decode::FrameMetadata;
use serde::Serialize;

/// Continuity record for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameStatistics {
    /// Frame counter of this frame.
    pub seq_id: u32,
    /// Inclusive range of counters missing since the previous frame.
    pub missing_range: Option<(u32, u32)>,
    /// True when the frame was captured during an active recording.
    pub is_recording: bool,
}

impl FrameStatistics {
    /// Number of counters in `missing_range`.
    ///
    /// A reversed range (counter went backwards) counts as zero.
    pub fn missing_count(&self) -> u64 {
        match self.missing_range {
            Some((first, last)) if last >= first => u64::from(last - first) + 1,
            _ => 0,
        }
    }
}

/// Detects gaps in the frame counter sequence.
///
/// Frames must be observed in arrival order; each stream needs its own
/// tracker.
///
/// # Limitations
///
/// A previous counter of `0` is the "no previous frame" sentinel, so a gap
/// directly after a genuine counter value of zero is not reported. Counter
/// wraparound is not handled: a counter that goes backwards or wraps past
/// `u32::MAX` yields a literal, reversed `missing_range` such as
/// `(101, 98)` for the sequence `[100, 99]`.
#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    prev_seq_id: u32,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `meta` and returns its continuity statistics.
    pub fn observe(&mut self, meta: FrameMetadata) -> FrameStatistics {
        let prev = self.prev_seq_id;
        let expected = prev.wrapping_add(1);

        let missing_range = if prev == 0 || meta.counter == expected {
            None
        } else {
            Some((expected, meta.counter.wrapping_sub(1)))
        };

        if let Some((first, last)) = missing_range {
            tracing::debug!(first, last, seq_id = meta.counter, "Frame counter gap");
        }

        self.prev_seq_id = meta.counter;

        FrameStatistics {
            seq_id: meta.counter,
            missing_range,
            is_recording: meta.is_recording,
        }
    }

    /// Returns the last observed counter (`0` before any frame).
    pub fn prev_seq_id(&self) -> u32 {
        self.prev_seq_id
    }

    /// Forgets the previous counter.
    pub fn reset(&mut self) {
        self.prev_seq_id = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(counters: &[u32]) -> Vec<Option<(u32, u32)>> {
        let mut tracker = SequenceTracker::new();
        counters
            .iter()
            .map(|&c| tracker.observe(FrameMetadata::new(c, false)).missing_range)
            .collect()
    }

    #[test]
    fn test_first_frame_never_missing() {
        for first in [0, 1, 100, u32::MAX] {
            assert_eq!(observe_all(&[first]), vec![None]);
        }
    }

    #[test]
    fn test_consecutive_frames() {
        assert_eq!(observe_all(&[100, 101, 102]), vec![None, None, None]);
    }

    #[test]
    fn test_gap_reported() {
        assert_eq!(observe_all(&[100, 103]), vec![None, Some((101, 102))]);
    }

    #[test]
    fn test_backwards_counter_literal_range() {
        assert_eq!(observe_all(&[100, 99]), vec![None, Some((101, 98))]);
    }

    #[test]
    fn test_zero_counter_acts_as_sentinel() {
        // After a real zero, the jump to 5 goes unreported.
        assert_eq!(observe_all(&[0, 5]), vec![None, None]);
    }

    #[test]
    fn test_drop_to_zero_does_not_panic() {
        assert_eq!(observe_all(&[7, 0]), vec![None, Some((8, u32::MAX))]);
    }

    #[test]
    fn test_state_updates_every_frame() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(FrameMetadata::new(42, true));
        assert_eq!(tracker.prev_seq_id(), 42);

        let stats = tracker.observe(FrameMetadata::new(50, true));
        assert_eq!(stats.missing_count(), 7);
        assert!(stats.is_recording);
        assert_eq!(tracker.prev_seq_id(), 50);

        tracker.reset();
        assert_eq!(tracker.prev_seq_id(), 0);
    }

    #[test]
    fn test_missing_count_reversed_range() {
        let stats = FrameStatistics {
            seq_id: 99,
            missing_range: Some((101, 98)),
            is_recording: false,
        };
        assert_eq!(stats.missing_count(), 0);
    }
}
