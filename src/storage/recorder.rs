//! Raw dump of delivered pixel regions.

use crate::decode::DecodedFrame;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while storing frames.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create storage file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write frame: {0}")]
    Write(#[from] std::io::Error),
}

/// Appends pixel regions to a byte sink.
///
/// The format is a headerless concatenation of pixel regions, each
/// `stream_width * pixel_rows` little-endian 16-bit samples.
pub struct RawRecorder<W: Write> {
    sink: W,
    frames_written: u64,
    bytes_written: u64,
}

impl RawRecorder<BufWriter<File>> {
    /// Creates `miniscope_stream_<unix seconds>.raw` inside `dir`.
    pub fn create_in(dir: impl AsRef<Path>) -> Result<(Self, PathBuf), StorageError> {
        let name = format!("miniscope_stream_{}.raw", chrono::Utc::now().timestamp());
        let path = dir.as_ref().join(name);
        let file = File::create(&path).map_err(|source| StorageError::Create {
            path: path.clone(),
            source,
        })?;
        Ok((Self::new(BufWriter::new(file)), path))
    }
}

impl<W: Write> RawRecorder<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            frames_written: 0,
            bytes_written: 0,
        }
    }

    /// Appends the pixel region of `frame`.
    pub fn append(&mut self, frame: &DecodedFrame) -> Result<(), StorageError> {
        let bytes = frame.to_le_bytes();
        self.sink.write_all(&bytes)?;
        self.frames_written += 1;
        self.bytes_written += bytes.len() as u64;
        Ok(())
    }

    /// Number of frames appended so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Number of bytes appended so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes buffered data to the sink.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Erases the sink type, keeping the running totals.
    pub fn into_boxed(self) -> RawRecorder<Box<dyn Write + Send>>
    where
        W: Send + 'static,
    {
        RawRecorder {
            sink: Box::new(self.sink),
            frames_written: self.frames_written,
            bytes_written: self.bytes_written,
        }
    }

    /// Flushes and returns the sink.
    pub fn finish(mut self) -> Result<W, StorageError> {
        self.sink.flush()?;
        tracing::debug!(
            frames = self.frames_written,
            bytes = self.bytes_written,
            "Raw storage finished"
        );
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{FrameDecoder, FrameMetadata, TelemetryEncoder};
    use crate::geometry::StreamGeometry;

    #[test]
    fn test_append_concatenates_pixels() {
        let geometry = StreamGeometry::compute(80).unwrap();
        let encoder = TelemetryEncoder::new(geometry);
        let decoder = FrameDecoder::new(geometry);
        let pixels: Vec<u16> = (0..geometry.pixel_sample_count() as u16).collect();
        let frame = decoder
            .decode(&encoder.encode(FrameMetadata::new(1, false), &pixels))
            .unwrap();

        let mut recorder = RawRecorder::new(Vec::new());
        recorder.append(&frame).unwrap();
        recorder.append(&frame).unwrap();
        assert_eq!(recorder.frames_written(), 2);

        let out = recorder.finish().unwrap();
        let region = geometry.pixel_sample_count() * 2;
        assert_eq!(out.len(), region * 2);
        assert_eq!(&out[..4], &[0, 0, 1, 0]);
        assert_eq!(&out[..region], &out[region..]);
    }

    #[test]
    fn test_create_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (recorder, path) = RawRecorder::create_in(dir.path()).unwrap();

        assert!(path.exists());
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("miniscope_stream_") && n.ends_with(".raw")));
        recorder.finish().unwrap();
    }
}
