//! Load, filter and save a sound, releasing every buffer exactly once.

use crate::audio_io::{read_audio_file, write_audio_file, AudioData, AudioError};
use crate::error::{Error, Result};
use crate::filters::{ApplyError, FilterDescriptor, ParsedParameters};
use std::path::Path;

/// The collaborators the pipeline drives. A `Sound` is released by dropping it.
pub trait SoundBackend {
    type Sound;

    fn load(&mut self, path: &Path) -> std::result::Result<Self::Sound, AudioError>;

    /// Produce a new, independently owned sound. The caller keeps (and
    /// releases) the input.
    fn apply(
        &mut self,
        sound: &Self::Sound,
        filter: &FilterDescriptor,
        params: &ParsedParameters,
    ) -> std::result::Result<Self::Sound, ApplyError>;

    fn save(&mut self, sound: &Self::Sound, path: &Path) -> std::result::Result<(), AudioError>;
}

/// WAV files on disk, filters from the registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct WavBackend;

impl SoundBackend for WavBackend {
    type Sound = AudioData;

    fn load(&mut self, path: &Path) -> std::result::Result<AudioData, AudioError> {
        read_audio_file(path)
    }

    fn apply(
        &mut self,
        sound: &AudioData,
        filter: &FilterDescriptor,
        params: &ParsedParameters,
    ) -> std::result::Result<AudioData, ApplyError> {
        filter.apply(sound, params)
    }

    fn save(&mut self, sound: &AudioData, path: &Path) -> std::result::Result<(), AudioError> {
        write_audio_file(path, sound)
    }
}

/// Run load, apply and save in order, stopping at the first failure.
pub fn execute<B: SoundBackend>(
    backend: &mut B,
    input_path: &Path,
    output_path: &Path,
    filter: &FilterDescriptor,
    params: &ParsedParameters,
) -> Result<()> {
    let input = backend.load(input_path).map_err(|source| Error::Load {
        path: input_path.to_path_buf(),
        source,
    })?;
    log::info!("loaded {}", input_path.display());

    let filtered = backend.apply(&input, filter, params);
    drop(input);
    let filtered = filtered.map_err(|source| Error::Apply {
        filter: filter.name,
        source,
    })?;
    log::info!("applied {} {:?}", filter.name, params.as_slice());

    let saved = backend.save(&filtered, output_path);
    drop(filtered);
    saved.map_err(|source| Error::Save {
        path: output_path.to_path_buf(),
        source,
    })?;
    log::info!("saved {}", output_path.display());

    Ok(())
}
