//! Miniscope Stream Library
//!
//! Decodes the telemetry a miniature microscope sensor embeds in the
//! header rows of its raw video frames, and tracks frame continuity across
//! a live capture session.
//!
//! # Architecture
//!
//! Each incoming frame follows an explicit data flow:
//!
//! ```text
//! raw buffer → decode → tracking (sequence → sync gate) → consumer
//!                ↑                                           ↓
//!            geometry                                  storage (raw dump)
//! ```
//!
//! Acquisition from the transport is external: it plugs in through
//! [`capture::FrameSource`].
//!
//! # Design Principles
//!
//! - **Exact layout arithmetic**: all offsets come from integer floor
//!   division over fixed sensor constants
//! - **Per-frame errors**: a malformed frame is reported and skipped, it
//!   never ends the session
//! - **Explicit state**: the only mutable state is the sequence tracker,
//!   owned by the session
//!
//! # Example
//!
//! ```no_run
//! use miniscope_stream::{
//!     capture::{MockSensor, StreamConfig},
//!     session::{FrameOutcome, Session},
//! };
//!
//! let config = StreamConfig::default();
//! let mut session = Session::new(&config, MockSensor::new()).unwrap();
//!
//! for _ in 0..10 {
//!     match session.next_frame() {
//!         Ok(FrameOutcome::Delivered { frame, stats }) => {
//!             println!("frame {} ({} samples)", stats.seq_id, frame.pixels().len());
//!         }
//!         Ok(_) => {}
//!         Err(e) if !e.is_fatal() => continue,
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod decode;
pub mod geometry;
pub mod metrics;
pub mod session;
pub mod storage;
pub mod tracking;

// Re-export commonly used types at crate root
pub use capture::{FrameSource, MockSensor, RawFileSource, RawFrame, StreamConfig};
pub use decode::{DecodeError, DecodedFrame, FrameDecoder, FrameMetadata};
pub use geometry::{GeometryError, StreamGeometry};
pub use session::{FrameOutcome, Session, SessionError};
pub use tracking::{should_deliver, FrameStatistics, SequenceTracker, SyncGate};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
