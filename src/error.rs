//! Error handling for sndfilter

use crate::audio_io::AudioError;
use crate::filters::ApplyError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sndfilter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every way an invocation can fail. Each variant's message is the single
/// diagnostic line printed before exiting with status 1.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Bad filter \"{0}\"")]
    UnknownFilter(String),

    #[error("Bad arguments for {filter}")]
    BadArguments {
        filter: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to load WAV: {}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: AudioError,
    },

    #[error("Failed to apply filter")]
    Apply {
        filter: &'static str,
        #[source]
        source: ApplyError,
    },

    #[error("Failed to save WAV: {}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: AudioError,
    },
}

impl Error {
    /// Argument errors are reported after the usage text.
    pub fn shows_usage(&self) -> bool {
        matches!(self, Error::UnknownFilter(_) | Error::BadArguments { .. })
    }
}
