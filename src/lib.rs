//! sndfilter: apply one named audio filter to a whole WAV file.
//!
//! The command line is parsed into a filter from the [`filters::FILTERS`]
//! registry plus its numeric parameters, then [`pipeline::execute`] loads the
//! input, applies the filter and saves the result.

pub mod audio_io;
pub mod cli;
pub mod error;
pub mod filters;
pub mod pipeline;

pub use audio_io::{AudioData, AudioError};
pub use error::{Error, Result};
pub use filters::{resolve, ApplyError, FilterDescriptor, ParsedParameters};
pub use pipeline::{execute, SoundBackend, WavBackend};
