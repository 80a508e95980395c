//! Fixed constants of the sensor and its telemetry layout.
//!
//! These describe the hardware and must not be changed. Every value in
//! [`StreamGeometry`](super::StreamGeometry) is derived from them and the
//! downsample factor.

/// Native sensor width in pixels.
pub const NATIVE_WIDTH: u32 = 1280;

/// Native sensor height in pixels.
pub const NATIVE_HEIGHT: u32 = 800;

/// Telemetry header length in native lines.
pub const HEADER_LINES: u32 = 2;

/// Telemetry footer length in native lines.
pub const FOOTER_LINES: u32 = 2;

/// Offset of the first frame-counter sample, counted against a native row.
pub const FRAME_COUNTER_OFFSET: u32 = 1258;

/// Offset of the recording-flag sample, counted against a native row.
pub const RECORD_FLAG_OFFSET: u32 = 1257;

/// Number of consecutive samples carrying the frame counter.
pub const FRAME_COUNTER_SAMPLES: u32 = 4;

/// Flag sample value meaning "captured during an active recording".
pub const RECORD_FLAG_SENTINEL: u16 = 0xAD0;

/// Bytes per 16-bit sample.
pub const SIZE16: u32 = 2;

/// Bytes per 32-bit packed pixel.
pub const SIZE32: u32 = 4;

/// Telemetry header size in bytes.
pub const HEADER_BYTES: u32 = HEADER_LINES * NATIVE_WIDTH * SIZE16;

/// Telemetry footer size in bytes.
pub const FOOTER_BYTES: u32 = FOOTER_LINES * NATIVE_WIDTH * SIZE16;

/// Total telemetry payload per frame, independent of downsampling.
pub const META_TOTAL_BYTES: u32 = HEADER_BYTES + FOOTER_BYTES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_payload_size() {
        assert_eq!(HEADER_BYTES, 5120);
        assert_eq!(META_TOTAL_BYTES, 10240);
    }
}
