//! Frame decoding.
//!
//! Strips the telemetry rows from a transport frame, returning the pixel
//! region as 16-bit samples together with the frame counter and recording
//! flag carried in the metadata row.

mod decoder;
mod encoder;
mod metadata;

pub use decoder::{DecodeError, DecodedFrame, FrameDecoder};
pub use encoder::TelemetryEncoder;
pub use metadata::FrameMetadata;
