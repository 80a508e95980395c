//! Streaming session.
//!
//! Ties a frame source to the decoder, sequence tracker and sync gate,
//! with optional raw storage of delivered frames. Each call to
//! [`Session::next_frame`] pulls exactly one buffer from the source.
//!
//! ```text
//! source → decoder → tracker → gate → (storage) → consumer
//! ```

use crate::capture::{FrameSource, SourceError, StreamConfig};
use crate::decode::{DecodeError, DecodedFrame, FrameDecoder};
use crate::geometry::{GeometryError, StreamGeometry};
use crate::storage::{RawRecorder, StorageError};
use crate::tracking::{FrameStatistics, SequenceTracker, SyncGate};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidFactor(#[from] GeometryError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("frame unusable: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Returns true if the session cannot continue.
    ///
    /// A single malformed frame is never fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidFactor(_)
                | Self::Source(SourceError::NotOpen | SourceError::OpenFailed(_))
                | Self::Storage(StorageError::Create { .. })
        )
    }
}

/// Result of one read from the session.
#[derive(Debug)]
pub enum FrameOutcome {
    /// Frame passed the gate.
    Delivered {
        frame: DecodedFrame,
        stats: FrameStatistics,
    },
    /// Frame was decoded and tracked but held back by the sync gate.
    Suppressed(FrameStatistics),
    /// The source produced no data this cycle.
    NoFrame,
}

impl FrameOutcome {
    /// Returns the statistics of a decoded frame, delivered or not.
    pub fn stats(&self) -> Option<&FrameStatistics> {
        match self {
            Self::Delivered { stats, .. } | Self::Suppressed(stats) => Some(stats),
            Self::NoFrame => None,
        }
    }

    /// Returns true if a frame was delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Buffers received from the source.
    pub received: u64,
    /// Frames delivered to the consumer.
    pub delivered: u64,
    /// Frames held back by the sync gate.
    pub suppressed: u64,
    /// Buffers that could not be decoded.
    pub unusable: u64,
    /// Reads on which the source produced nothing.
    pub empty_reads: u64,
    /// Counters reported missing across all gaps.
    pub missing: u64,
    /// Counter of the latest decoded frame.
    pub last_seq_id: u32,
    /// Recording flag of the latest decoded frame.
    pub recording: bool,
}

type Recorder = RawRecorder<Box<dyn Write + Send>>;

/// A live capture session over one frame source.
pub struct Session<S: FrameSource> {
    source: S,
    decoder: FrameDecoder,
    tracker: SequenceTracker,
    gate: SyncGate,
    recorder: Option<Recorder>,
    storage_path: Option<PathBuf>,
    counters: SessionCounters,
}

impl<S: FrameSource> Session<S> {
    /// Starts a session.
    ///
    /// Geometry is computed before anything else, so an invalid downsample
    /// factor prevents the source from being opened at all.
    pub fn new(config: &StreamConfig, mut source: S) -> Result<Self, SessionError> {
        let geometry = StreamGeometry::compute(config.downsample_factor)?;

        tracing::info!(
            downsample_factor = config.downsample_factor,
            frame_size_bytes = geometry.frame_size_bytes(),
            "Creating stream session"
        );

        if config.sync_with_recording {
            tracing::info!("Sync with recording enabled; start recording to receive frames");
        } else {
            tracing::info!("Sync with recording disabled");
        }

        source.open(&geometry)?;

        let (recorder, storage_path) = if config.file_storage {
            match RawRecorder::create_in(&config.storage_dir) {
                Ok((recorder, path)) => {
                    tracing::info!(path = %path.display(), "File storage enabled");
                    (Some(recorder.into_boxed()), Some(path))
                }
                Err(e) => {
                    source.close();
                    return Err(e.into());
                }
            }
        } else {
            tracing::info!("File storage disabled");
            (None, None)
        };

        Ok(Self {
            source,
            decoder: FrameDecoder::new(geometry),
            tracker: SequenceTracker::new(),
            gate: SyncGate::new(config.sync_with_recording),
            recorder,
            storage_path,
            counters: SessionCounters::default(),
        })
    }

    /// Stores delivered frames in `sink` instead of a file.
    ///
    /// A storage file created by [`Session::new`] is removed if nothing has
    /// been written to it yet; otherwise it is flushed and kept.
    pub fn with_recorder(mut self, sink: impl Write + Send + 'static) -> Self {
        if let Some(previous) = self.recorder.take() {
            let unused = previous.frames_written() == 0;
            if let Err(e) = previous.finish() {
                tracing::warn!(error = %e, "Failed to flush replaced storage");
            }
            if let (true, Some(path)) = (unused, self.storage_path.as_ref()) {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove unused storage file");
                }
            }
        }
        let sink: Box<dyn Write + Send> = Box::new(sink);
        self.recorder = Some(RawRecorder::new(sink));
        self.storage_path = None;
        self
    }

    /// Reads, decodes, tracks and gates the next frame.
    ///
    /// A buffer of the wrong size yields [`SessionError::Decode`]; the
    /// session stays usable and the next call reads the next buffer.
    pub fn next_frame(&mut self) -> Result<FrameOutcome, SessionError> {
        let Some(raw) = self.source.read()? else {
            self.counters.empty_reads += 1;
            tracing::debug!("Stream captured empty frame");
            return Ok(FrameOutcome::NoFrame);
        };
        self.counters.received += 1;

        let frame = match self.decoder.decode(raw.data()) {
            Ok(frame) => frame,
            Err(e) => {
                self.counters.unusable += 1;
                tracing::warn!(arrival = raw.arrival(), error = %e, "Dropping unusable frame");
                return Err(e.into());
            }
        };

        let stats = self.tracker.observe(frame.metadata());
        self.counters.missing += stats.missing_count();
        self.counters.last_seq_id = stats.seq_id;
        self.counters.recording = stats.is_recording;

        if !self.gate.should_deliver(&stats) {
            self.counters.suppressed += 1;
            tracing::trace!(seq_id = stats.seq_id, "Frame suppressed outside recording");
            return Ok(FrameOutcome::Suppressed(stats));
        }

        if let Some(recorder) = self.recorder.as_mut() {
            recorder.append(&frame)?;
        }

        self.counters.delivered += 1;
        tracing::trace!(
            seq_id = stats.seq_id,
            recording = stats.is_recording,
            missing = stats.missing_count(),
            "Frame delivered"
        );

        Ok(FrameOutcome::Delivered { frame, stats })
    }

    /// Returns the session geometry.
    pub fn geometry(&self) -> &StreamGeometry {
        self.decoder.geometry()
    }

    /// Returns the running totals.
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Returns the sequence tracker.
    pub fn tracker(&self) -> &SequenceTracker {
        &self.tracker
    }

    /// Returns the raw storage file, if storing to a file.
    pub fn storage_path(&self) -> Option<&PathBuf> {
        self.storage_path.as_ref()
    }

    /// Returns true if the underlying source is open.
    pub fn is_open(&self) -> bool {
        self.source.is_open()
    }

    /// Returns true if the source has no more frames to give.
    pub fn is_exhausted(&self) -> bool {
        self.source.is_exhausted()
    }

    /// Closes the source and flushes storage.
    pub fn close(mut self) -> Result<SessionCounters, SessionError> {
        self.source.close();
        if let Some(recorder) = self.recorder.take() {
            recorder.finish()?;
        }
        tracing::info!(
            received = self.counters.received,
            delivered = self.counters.delivered,
            missing = self.counters.missing,
            "Stream session closed"
        );
        Ok(self.counters)
    }
}
