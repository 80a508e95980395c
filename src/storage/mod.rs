//! Optional persistence of delivered frames.

mod recorder;

pub use recorder::{RawRecorder, StorageError};
