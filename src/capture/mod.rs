//! Frame acquisition seam and session configuration.
//!
//! The transport layer is external to this crate. This module defines the
//! interface it plugs into, the raw frame it hands over, and the
//! configuration a session is started with.

mod config;
mod frame;
mod replay;
mod source;

pub use config::{ConfigError, FileConfig, MetricsConfig, OutputConfig, StreamConfig};
pub use frame::RawFrame;
pub use replay::RawFileSource;
pub use source::{FrameSource, MockSensor, SourceError};
