//! Recording-synchronised delivery.

use super::FrameStatistics;
use serde::{Deserialize, Serialize};

/// Returns true if a frame should reach the consumer.
///
/// With sync disabled every frame is delivered; otherwise only frames
/// captured during an active recording are.
#[inline]
pub fn should_deliver(sync_enabled: bool, stats: &FrameStatistics) -> bool {
    !sync_enabled || stats.is_recording
}

/// Delivery policy for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGate {
    /// Only deliver frames captured while recording.
    pub sync_enabled: bool,
}

impl SyncGate {
    pub fn new(sync_enabled: bool) -> Self {
        Self { sync_enabled }
    }

    #[inline]
    pub fn should_deliver(&self, stats: &FrameStatistics) -> bool {
        should_deliver(self.sync_enabled, stats)
    }
}
