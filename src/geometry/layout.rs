//! Stream and frame geometry derived from the downsample factor.

use super::sensor::{
    FRAME_COUNTER_OFFSET, FRAME_COUNTER_SAMPLES, HEADER_BYTES, META_TOTAL_BYTES, NATIVE_HEIGHT,
    NATIVE_WIDTH, RECORD_FLAG_OFFSET, RECORD_FLAG_SENTINEL, SIZE16, SIZE32,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while deriving stream geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("invalid downsample factor {factor}: {reason}")]
    InvalidFactor { factor: u32, reason: &'static str },
}

/// All buffer dimensions and telemetry offsets for one capture session.
///
/// The stream packs two 16-bit samples into each 32-bit pixel. The transport
/// hands over the same data as 8-bit samples, so the frame is twice as wide
/// and twice as tall as the logical stream. Row offsets (`header_offset`,
/// `footer_offset`, `meta_row_index`) index the 16-bit sample view of the
/// frame, whose rows are `stream_width` samples wide.
///
/// Computed once per session and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamGeometry {
    downsample_factor: u32,
    stream_width: u32,
    stream_height: u32,
    frame_width: u32,
    frame_height: u32,
    frame_size_bytes: usize,
    header_offset: u32,
    footer_offset: u32,
    meta_row_index: u32,
    counter_field_offset: u32,
    flag_field_offset: u32,
    flag_sentinel: u16,
}

impl StreamGeometry {
    /// Derives the geometry for `downsample_factor`.
    ///
    /// All arithmetic is integer floor division. Fails with
    /// [`GeometryError::InvalidFactor`] if the factor is zero, does not
    /// divide the native 1280x800 sensor evenly, or places a telemetry
    /// field outside the frame.
    pub fn compute(downsample_factor: u32) -> Result<Self, GeometryError> {
        let invalid = |reason| GeometryError::InvalidFactor {
            factor: downsample_factor,
            reason,
        };

        if downsample_factor == 0 {
            return Err(invalid("factor must be positive"));
        }
        if NATIVE_WIDTH % downsample_factor != 0 || NATIVE_HEIGHT % downsample_factor != 0 {
            return Err(invalid("factor must evenly divide the 1280x800 sensor"));
        }

        let stream_width = NATIVE_WIDTH / downsample_factor;
        let stream_height_base = NATIVE_HEIGHT / downsample_factor;
        if stream_width == 0 || stream_height_base == 0 {
            return Err(invalid("factor leaves no pixels"));
        }

        // Telemetry lines in 16-bit space, then the 32-bit rows they occupy.
        let header_footer_lines_16bit = META_TOTAL_BYTES / stream_width;
        let header_footer_lines_32bit = (header_footer_lines_16bit * SIZE16) / SIZE32;
        let stream_height = stream_height_base + header_footer_lines_32bit;

        let frame_width = stream_width * (SIZE32 / SIZE16);
        let frame_height = stream_height * (SIZE32 / SIZE16);
        let frame_size_bytes = frame_width as usize * frame_height as usize;

        let header_offset = HEADER_BYTES / (SIZE16 * stream_width);
        let footer_offset = stream_height_base + header_offset;

        let meta_row_index = FRAME_COUNTER_OFFSET / stream_width;
        let row_start = meta_row_index * stream_width;
        let counter_field_offset = FRAME_COUNTER_OFFSET - row_start;
        let flag_field_offset = RECORD_FLAG_OFFSET
            .checked_sub(row_start)
            .ok_or_else(|| invalid("recording flag falls before the telemetry row"))?;

        if counter_field_offset + FRAME_COUNTER_SAMPLES > stream_width {
            return Err(invalid("frame counter spans two sample rows"));
        }
        // Row offsets stay within [0, stream_height).
        if meta_row_index >= stream_height || footer_offset > stream_height {
            return Err(invalid("telemetry or pixel rows fall outside the frame"));
        }

        let geometry = Self {
            downsample_factor,
            stream_width,
            stream_height,
            frame_width,
            frame_height,
            frame_size_bytes,
            header_offset,
            footer_offset,
            meta_row_index,
            counter_field_offset,
            flag_field_offset,
            flag_sentinel: RECORD_FLAG_SENTINEL,
        };

        tracing::debug!(
            downsample_factor,
            width = stream_width,
            height = stream_height_base,
            frame_size_bytes,
            "Use frame dimensions"
        );

        Ok(geometry)
    }

    /// Returns the downsample factor this geometry was computed from.
    #[inline]
    pub fn downsample_factor(&self) -> u32 {
        self.downsample_factor
    }

    /// Logical stream width in 16-bit samples.
    #[inline]
    pub fn stream_width(&self) -> u32 {
        self.stream_width
    }

    /// Logical stream height, including the telemetry rows.
    #[inline]
    pub fn stream_height(&self) -> u32 {
        self.stream_height
    }

    /// Transport frame width in bytes.
    #[inline]
    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Transport frame height in rows.
    #[inline]
    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// Exact byte length of every transport frame.
    #[inline]
    pub fn frame_size_bytes(&self) -> usize {
        self.frame_size_bytes
    }

    /// First sample row of the pixel region.
    #[inline]
    pub fn header_offset(&self) -> u32 {
        self.header_offset
    }

    /// One past the last sample row of the pixel region.
    #[inline]
    pub fn footer_offset(&self) -> u32 {
        self.footer_offset
    }

    /// Sample row carrying the frame counter and recording flag.
    #[inline]
    pub fn meta_row_index(&self) -> u32 {
        self.meta_row_index
    }

    /// Column of the first of four frame-counter samples.
    #[inline]
    pub fn counter_field_offset(&self) -> u32 {
        self.counter_field_offset
    }

    /// Column of the recording-flag sample.
    #[inline]
    pub fn flag_field_offset(&self) -> u32 {
        self.flag_field_offset
    }

    /// Flag value marking a frame captured while recording.
    #[inline]
    pub fn flag_sentinel(&self) -> u16 {
        self.flag_sentinel
    }

    /// Width of a row in the 16-bit sample view (equals `stream_width`).
    #[inline]
    pub fn sample_row_width(&self) -> usize {
        (self.frame_width / 2) as usize
    }

    /// Number of rows in the 16-bit sample view.
    #[inline]
    pub fn sample_rows(&self) -> usize {
        self.frame_height as usize
    }

    /// Number of pixel rows between header and footer.
    #[inline]
    pub fn pixel_rows(&self) -> u32 {
        self.footer_offset - self.header_offset
    }

    /// Number of samples in a decoded pixel region.
    #[inline]
    pub fn pixel_sample_count(&self) -> usize {
        self.stream_width as usize * self.pixel_rows() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_two_layout() {
        let g = StreamGeometry::compute(2).unwrap();

        assert_eq!(g.stream_width(), 640);
        assert_eq!(g.stream_height(), 408);
        assert_eq!(g.frame_width(), 1280);
        assert_eq!(g.frame_height(), 816);
        assert_eq!(g.frame_size_bytes(), 1_044_480);
        assert_eq!(g.header_offset(), 4);
        assert_eq!(g.footer_offset(), 404);
        assert_eq!(g.meta_row_index(), 1);
        assert_eq!(g.counter_field_offset(), 618);
        assert_eq!(g.flag_field_offset(), 617);
        assert_eq!(g.flag_sentinel(), 0xAD0);
        assert_eq!(g.pixel_rows(), 400);
    }

    #[test]
    fn test_full_resolution_layout() {
        let g = StreamGeometry::compute(1).unwrap();

        assert_eq!(g.stream_width(), 1280);
        // 10240 / 1280 = 8 lines -> 4 packed rows
        assert_eq!(g.stream_height(), 804);
        assert_eq!(g.header_offset(), 2);
        assert_eq!(g.footer_offset(), 802);
        assert_eq!(g.meta_row_index(), 0);
        assert_eq!(g.counter_field_offset(), 1258);
        assert_eq!(g.flag_field_offset(), 1257);
    }

    #[test]
    fn test_factor_four_layout() {
        let g = StreamGeometry::compute(4).unwrap();

        assert_eq!(g.stream_width(), 320);
        // 10240 / 320 = 32 lines -> 16 packed rows
        assert_eq!(g.stream_height(), 216);
        assert_eq!(g.header_offset(), 8);
        assert_eq!(g.footer_offset(), 208);
        assert_eq!(g.meta_row_index(), 3);
        assert_eq!(g.counter_field_offset(), 298);
        assert_eq!(g.flag_field_offset(), 297);
    }

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(
            StreamGeometry::compute(2).unwrap(),
            StreamGeometry::compute(2).unwrap()
        );
    }

    #[test]
    fn test_zero_factor_invalid() {
        assert!(matches!(
            StreamGeometry::compute(0),
            Err(GeometryError::InvalidFactor { factor: 0, .. })
        ));
    }

    #[test]
    fn test_non_dividing_factor_invalid() {
        // 3 divides neither dimension, 64 divides 1280 but not 800.
        for factor in [3, 7, 64, 320, 1280] {
            assert!(
                matches!(
                    StreamGeometry::compute(factor),
                    Err(GeometryError::InvalidFactor { .. })
                ),
                "factor {factor} should be rejected"
            );
        }
    }
}
