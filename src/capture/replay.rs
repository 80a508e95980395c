//! Replay of captured transport frames.
//!
//! Reads a stream of concatenated transport frames, `frame_size_bytes`
//! each, as they arrived from the transport. Useful for offline analysis
//! of recorded sessions.

use super::{FrameSource, RawFrame, SourceError};
use crate::geometry::StreamGeometry;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

/// Frame source over any byte reader.
///
/// A clean end of input reads as "no frame". A trailing partial frame is
/// returned as-is so the decoder can reject it. An I/O error leaves the
/// reader at an unknown frame boundary, so it is reported once and the
/// source is exhausted from then on.
pub struct RawFileSource<R> {
    reader: R,
    frame_size: Option<usize>,
    arrivals: u64,
    exhausted: bool,
}

impl RawFileSource<BufReader<File>> {
    /// Opens a replay file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref()).map_err(|e| {
            SourceError::OpenFailed(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> RawFileSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            frame_size: None,
            arrivals: 0,
            exhausted: false,
        }
    }

    /// Fills up to `frame_size` bytes, stopping early only at end of input.
    fn fill(&mut self, frame_size: usize) -> Result<Vec<u8>, SourceError> {
        let mut data = vec![0u8; frame_size];
        let mut filled = 0;
        while filled < frame_size {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => {
                    self.exhausted = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.exhausted = true;
                    tracing::warn!(
                        arrival = self.arrivals + 1,
                        discarded = filled,
                        error = %e,
                        "Replay read failed; stopping"
                    );
                    return Err(e.into());
                }
            }
        }
        data.truncate(filled);
        Ok(data)
    }
}

impl<R: Read> FrameSource for RawFileSource<R> {
    fn open(&mut self, geometry: &StreamGeometry) -> Result<(), SourceError> {
        self.frame_size = Some(geometry.frame_size_bytes());
        tracing::info!(
            frame_size_bytes = geometry.frame_size_bytes(),
            "Replay source opened"
        );
        Ok(())
    }

    fn read(&mut self) -> Result<Option<RawFrame>, SourceError> {
        let frame_size = self.frame_size.ok_or(SourceError::NotOpen)?;
        if self.exhausted {
            return Ok(None);
        }

        let data = self.fill(frame_size)?;
        if data.is_empty() {
            return Ok(None);
        }

        self.arrivals += 1;
        Ok(Some(RawFrame::new(data, self.arrivals)))
    }

    fn is_open(&self) -> bool {
        self.frame_size.is_some()
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn close(&mut self) {
        self.frame_size = None;
        tracing::info!(frames = self.arrivals, "Replay source closed");
    }
}
