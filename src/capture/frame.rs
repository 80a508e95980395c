//! Raw transport frame as handed over by a frame source.

use std::time::Instant;

/// A single undecoded frame from the transport.
///
/// Holds the 8-bit buffer exactly as received. Its length is only
/// checked when it is decoded.
#[derive(Clone)]
pub struct RawFrame {
    /// Raw transport bytes.
    data: Vec<u8>,
    /// Arrival timestamp.
    timestamp: Instant,
    /// Number of buffers the source produced before this one, plus one.
    arrival: u64,
}

impl RawFrame {
    /// Creates a new frame stamped with the current time.
    pub fn new(data: Vec<u8>, arrival: u64) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            arrival,
        }
    }

    /// Returns the raw transport bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the arrival timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the arrival index (starts at 1).
    #[inline]
    pub fn arrival(&self) -> u64 {
        self.arrival
    }
}

impl std::fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawFrame")
            .field("arrival", &self.arrival)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_frame_creation() {
        let frame = RawFrame::new(vec![0u8; 64], 3);

        assert_eq!(frame.len(), 64);
        assert_eq!(frame.arrival(), 3);
        assert!(!frame.is_empty());
    }
}
