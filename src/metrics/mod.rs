//! Prometheus metrics for stream monitoring.
//!
//! # Metrics Exposed
//!
//! ## Frame Flow
//! - `miniscope_frames_received_total` - Transport buffers received
//! - `miniscope_frames_delivered_total` - Frames delivered to the consumer
//! - `miniscope_frames_suppressed_total` - Frames held back outside a recording
//! - `miniscope_frames_unusable_total` - Buffers that failed to decode
//!
//! ## Continuity
//! - `miniscope_frames_missing_total` - Frame counters missing from the sequence
//! - `miniscope_last_seq_id` - Counter of the latest decoded frame
//! - `miniscope_recording` - Recording flag of the latest frame
//!
//! # Example
//!
//! ```no_run
//! use miniscope_stream::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     received: 120,
//!     delivered: 118,
//!     suppressed: 0,
//!     unusable: 2,
//!     missing: 4,
//!     last_seq_id: 5012,
//!     recording: true,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
