//! Frame continuity and delivery policy.
//!
//! Correlates telemetry across successive frames to report dropped frames,
//! and decides which frames reach the consumer when delivery is tied to an
//! externally driven recording.

mod gate;
mod sequence;

pub use gate::{should_deliver, SyncGate};
pub use sequence::{FrameStatistics, SequenceTracker};
