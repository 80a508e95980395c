//! Buffer geometry of the sensor stream.
//!
//! The sensor embeds telemetry in fixed header and footer lines. Once the
//! hub downsamples the image, those lines no longer align with the stream
//! width, so every dimension and field offset has to be derived from the
//! downsample factor and the fixed sensor constants.

mod layout;
pub mod sensor;

pub use layout::{GeometryError, StreamGeometry};
