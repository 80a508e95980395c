//! Metrics collection and registry.

use crate::session::SessionCounters;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of session state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Buffers received from the source.
    pub received: u64,
    /// Frames delivered to the consumer.
    pub delivered: u64,
    /// Frames suppressed by the sync gate.
    pub suppressed: u64,
    /// Buffers that failed to decode.
    pub unusable: u64,
    /// Frame counters reported missing.
    pub missing: u64,
    /// Counter of the latest decoded frame.
    pub last_seq_id: u32,
    /// Whether the latest frame was captured while recording.
    pub recording: bool,
}

impl MetricsSnapshot {
    /// Creates a snapshot from session counters.
    pub fn from_session(counters: &SessionCounters) -> Self {
        Self {
            received: counters.received,
            delivered: counters.delivered,
            suppressed: counters.suppressed,
            unusable: counters.unusable,
            missing: counters.missing,
            last_seq_id: counters.last_seq_id,
            recording: counters.recording,
        }
    }
}

/// Prometheus metrics registry for stream monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Frame flow
    received_total: IntCounter,
    delivered_total: IntCounter,
    suppressed_total: IntCounter,
    unusable_total: IntCounter,

    // Continuity
    missing_total: IntCounter,
    last_seq_id: IntGauge,
    recording: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all stream metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let received_total = IntCounter::new(
            "miniscope_frames_received_total",
            "Total transport buffers received",
        )?;
        let delivered_total = IntCounter::new(
            "miniscope_frames_delivered_total",
            "Total frames delivered to the consumer",
        )?;
        let suppressed_total = IntCounter::new(
            "miniscope_frames_suppressed_total",
            "Total frames suppressed outside a recording",
        )?;
        let unusable_total = IntCounter::new(
            "miniscope_frames_unusable_total",
            "Total buffers that could not be decoded",
        )?;
        let missing_total = IntCounter::new(
            "miniscope_frames_missing_total",
            "Total frame counters missing from the sequence",
        )?;
        let last_seq_id = IntGauge::new(
            "miniscope_last_seq_id",
            "Frame counter of the latest decoded frame",
        )?;
        let recording = IntGauge::new(
            "miniscope_recording",
            "Recording flag of the latest frame (1=recording, 0=idle)",
        )?;

        registry.register(Box::new(received_total.clone()))?;
        registry.register(Box::new(delivered_total.clone()))?;
        registry.register(Box::new(suppressed_total.clone()))?;
        registry.register(Box::new(unusable_total.clone()))?;
        registry.register(Box::new(missing_total.clone()))?;
        registry.register(Box::new(last_seq_id.clone()))?;
        registry.register(Box::new(recording.clone()))?;

        Ok(Self {
            registry,
            received_total,
            delivered_total,
            suppressed_total,
            unusable_total,
            missing_total,
            last_seq_id,
            recording,
        })
    }

    /// Updates all metrics from a snapshot of session state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference
        advance(&self.received_total, snapshot.received);
        advance(&self.delivered_total, snapshot.delivered);
        advance(&self.suppressed_total, snapshot.suppressed);
        advance(&self.unusable_total, snapshot.unusable);
        advance(&self.missing_total, snapshot.missing);

        self.last_seq_id.set(i64::from(snapshot.last_seq_id));
        self.recording.set(i64::from(snapshot.recording));
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}
