//! Frame decoding: pixel region extraction and telemetry parsing.

use super::metadata::{counter_from_samples, FrameMetadata};
use crate::geometry::StreamGeometry;
use thiserror::Error;

/// Errors that can occur while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame buffer is {actual} bytes, expected {expected}")]
    ShortBuffer { expected: usize, actual: usize },
}

/// A decoded frame: the pixel region and its telemetry.
#[derive(Clone)]
pub struct DecodedFrame {
    pixels: Vec<u16>,
    width: u32,
    height: u32,
    metadata: FrameMetadata,
}

impl DecodedFrame {
    /// Returns the pixel samples, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Consumes the frame and returns its pixel samples.
    pub fn into_pixels(self) -> Vec<u16> {
        self.pixels
    }

    /// Pixel region width in samples.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel region height in rows.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Telemetry decoded from the metadata row.
    #[inline]
    pub fn metadata(&self) -> FrameMetadata {
        self.metadata
    }

    /// Returns a pixel row, or `None` past the last row.
    pub fn row(&self, index: u32) -> Option<&[u16]> {
        if index >= self.height {
            return None;
        }
        let width = self.width as usize;
        let start = index as usize * width;
        Some(&self.pixels[start..start + width])
    }

    /// Serializes the pixel region as little-endian samples.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

impl std::fmt::Debug for DecodedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("metadata", &self.metadata)
            .field("samples", &self.pixels.len())
            .finish()
    }
}

/// Decodes raw transport frames for a fixed geometry.
///
/// The 8-bit transport buffer is read as little-endian 16-bit samples in
/// rows of `stream_width` samples.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    geometry: StreamGeometry,
}

impl FrameDecoder {
    pub fn new(geometry: StreamGeometry) -> Self {
        Self { geometry }
    }

    /// Returns the geometry this decoder reads.
    pub fn geometry(&self) -> &StreamGeometry {
        &self.geometry
    }

    /// Decodes the pixel region and telemetry of `raw`.
    pub fn decode(&self, raw: &[u8]) -> Result<DecodedFrame, DecodeError> {
        self.check_len(raw)?;

        let g = &self.geometry;
        let row_width = g.sample_row_width();
        let start = g.header_offset() as usize * row_width;
        let end = g.footer_offset() as usize * row_width;

        let pixels = raw[start * 2..end * 2]
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();

        Ok(DecodedFrame {
            pixels,
            width: g.stream_width(),
            height: g.pixel_rows(),
            metadata: self.parse_metadata(raw),
        })
    }

    /// Decodes only the telemetry of `raw`.
    pub fn read_metadata(&self, raw: &[u8]) -> Result<FrameMetadata, DecodeError> {
        self.check_len(raw)?;
        Ok(self.parse_metadata(raw))
    }

    fn check_len(&self, raw: &[u8]) -> Result<(), DecodeError> {
        let expected = self.geometry.frame_size_bytes();
        if raw.len() != expected {
            return Err(DecodeError::ShortBuffer {
                expected,
                actual: raw.len(),
            });
        }
        Ok(())
    }

    /// Buffer length must already be checked.
    fn parse_metadata(&self, raw: &[u8]) -> FrameMetadata {
        let g = &self.geometry;
        let row_base = g.meta_row_index() as usize * g.sample_row_width();
        let sample = |column: usize| {
            let at = (row_base + column) * 2;
            u16::from_le_bytes([raw[at], raw[at + 1]])
        };

        let counter_at = g.counter_field_offset() as usize;
        let counter = counter_from_samples([
            sample(counter_at),
            sample(counter_at + 1),
            sample(counter_at + 2),
            sample(counter_at + 3),
        ]);
        let is_recording = sample(g.flag_field_offset() as usize) == g.flag_sentinel();

        FrameMetadata {
            counter,
            is_recording,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::TelemetryEncoder;

    fn decoder() -> FrameDecoder {
        FrameDecoder::new(StreamGeometry::compute(2).unwrap())
    }

    #[test]
    fn test_decode_recovers_telemetry() {
        let decoder = decoder();
        let encoder = TelemetryEncoder::new(*decoder.geometry());
        let mut raw = encoder.blank_frame();
        encoder.write_metadata(&mut raw, FrameMetadata::new(0x00C0_FFEE, true));

        let frame = decoder.decode(&raw).unwrap();
        assert_eq!(frame.metadata().counter, 0x00C0_FFEE);
        assert!(frame.metadata().is_recording);
    }

    #[test]
    fn test_flag_must_match_sentinel_exactly() {
        let decoder = decoder();
        let g = *decoder.geometry();
        let mut raw = vec![0u8; g.frame_size_bytes()];
        let at = (g.meta_row_index() as usize * g.sample_row_width()
            + g.flag_field_offset() as usize)
            * 2;
        raw[at..at + 2].copy_from_slice(&0xAD1u16.to_le_bytes());

        assert!(!decoder.read_metadata(&raw).unwrap().is_recording);

        raw[at..at + 2].copy_from_slice(&0xAD0u16.to_le_bytes());
        assert!(decoder.read_metadata(&raw).unwrap().is_recording);
    }

    #[test]
    fn test_pixel_region_dimensions() {
        let decoder = decoder();
        let raw = vec![0u8; decoder.geometry().frame_size_bytes()];
        let frame = decoder.decode(&raw).unwrap();

        assert_eq!(frame.width(), 640);
        assert_eq!(frame.height(), 400);
        assert_eq!(frame.pixels().len(), 640 * 400);
        assert!(frame.row(399).is_some());
        assert!(frame.row(400).is_none());
    }

    #[test]
    fn test_pixel_region_skips_header_rows() {
        let decoder = decoder();
        let g = *decoder.geometry();
        let mut raw = vec![0u8; g.frame_size_bytes()];
        // First sample of the first pixel row and last sample of the last one.
        let first = g.header_offset() as usize * g.sample_row_width() * 2;
        let last = g.footer_offset() as usize * g.sample_row_width() * 2 - 2;
        raw[first..first + 2].copy_from_slice(&0x1234u16.to_le_bytes());
        raw[last..last + 2].copy_from_slice(&0xBEEFu16.to_le_bytes());

        let frame = decoder.decode(&raw).unwrap();
        assert_eq!(frame.pixels()[0], 0x1234);
        assert_eq!(*frame.pixels().last().unwrap(), 0xBEEF);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let decoder = decoder();
        let raw = vec![0u8; 100];

        assert_eq!(
            decoder.decode(&raw).unwrap_err(),
            DecodeError::ShortBuffer {
                expected: 1_044_480,
                actual: 100
            }
        );
    }

    #[test]
    fn test_oversized_buffer_rejected() {
        let decoder = decoder();
        let raw = vec![0u8; decoder.geometry().frame_size_bytes() + 1];

        assert!(matches!(
            decoder.read_metadata(&raw),
            Err(DecodeError::ShortBuffer { .. })
        ));
    }
}
