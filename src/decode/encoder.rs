//! Synthetic frame construction.
//!
//! Writes telemetry and pixel data into transport buffers the same way the
//! sensor lays them out. Used by mock sources, replay fixtures and tests.

use super::metadata::{counter_to_samples, FrameMetadata};
use crate::geometry::StreamGeometry;

/// Builds transport frames for a fixed geometry.
#[derive(Debug, Clone)]
pub struct TelemetryEncoder {
    geometry: StreamGeometry,
}

impl TelemetryEncoder {
    pub fn new(geometry: StreamGeometry) -> Self {
        Self { geometry }
    }

    /// Returns the geometry frames are built for.
    pub fn geometry(&self) -> &StreamGeometry {
        &self.geometry
    }

    /// Returns a zeroed buffer of exactly `frame_size_bytes`.
    pub fn blank_frame(&self) -> Vec<u8> {
        vec![0u8; self.geometry.frame_size_bytes()]
    }

    /// Writes the counter and recording flag into the metadata row.
    ///
    /// Panics if `raw` is not `frame_size_bytes` long.
    pub fn write_metadata(&self, raw: &mut [u8], meta: FrameMetadata) {
        assert_eq!(raw.len(), self.geometry.frame_size_bytes());

        let g = &self.geometry;
        let row_base = g.meta_row_index() as usize * g.sample_row_width();
        let counter_at = row_base + g.counter_field_offset() as usize;

        for (i, sample) in counter_to_samples(meta.counter).into_iter().enumerate() {
            put_sample(raw, counter_at + i, sample);
        }

        let flag = if meta.is_recording {
            g.flag_sentinel()
        } else {
            0
        };
        put_sample(raw, row_base + g.flag_field_offset() as usize, flag);
    }

    /// Copies `pixels` into the pixel region, row-major.
    ///
    /// Writes at most `pixel_sample_count` samples.
    pub fn write_pixels(&self, raw: &mut [u8], pixels: &[u16]) {
        assert_eq!(raw.len(), self.geometry.frame_size_bytes());

        let g = &self.geometry;
        let start = g.header_offset() as usize * g.sample_row_width();
        for (i, &sample) in pixels.iter().take(g.pixel_sample_count()).enumerate() {
            put_sample(raw, start + i, sample);
        }
    }

    /// Builds a complete frame from telemetry and pixels.
    pub fn encode(&self, meta: FrameMetadata, pixels: &[u16]) -> Vec<u8> {
        let mut raw = self.blank_frame();
        self.write_pixels(&mut raw, pixels);
        self.write_metadata(&mut raw, meta);
        raw
    }
}

#[inline]
fn put_sample(raw: &mut [u8], index: usize, sample: u16) {
    raw[index * 2..index * 2 + 2].copy_from_slice(&sample.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_lands_in_meta_row() {
        let g = StreamGeometry::compute(2).unwrap();
        let encoder = TelemetryEncoder::new(g);
        let mut raw = encoder.blank_frame();
        encoder.write_metadata(&mut raw, FrameMetadata::new(1, true));

        // Row 1, column 618: counter low byte 0x01 << 4.
        let at = (640 + 618) * 2;
        assert_eq!(u16::from_le_bytes([raw[at], raw[at + 1]]), 0x010);
        // Row 1, column 617: flag sentinel.
        let at = (640 + 617) * 2;
        assert_eq!(u16::from_le_bytes([raw[at], raw[at + 1]]), 0xAD0);
    }

    #[test]
    fn test_encode_pixels_truncates_to_region() {
        let g = StreamGeometry::compute(80).unwrap();
        let encoder = TelemetryEncoder::new(g);
        let pixels = vec![7u16; g.pixel_sample_count() + 50];

        let raw = encoder.encode(FrameMetadata::new(5, false), &pixels);
        assert_eq!(raw.len(), g.frame_size_bytes());
    }
}
