use dasp::sample::{ToSample, I24};
use dasp::Sample;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: hound::Error,
    },
    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read samples from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: hound::Error,
    },
    #[error("cannot create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: hound::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: hound::Error,
    },
}

/// An in-memory sound: interleaved samples normalized to [-1.0, 1.0] plus the
/// format they were decoded from.
///
/// Each `AudioData` is owned by exactly one stage of the pipeline at a time;
/// dropping it releases the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub spec: WavSpec,
    pub num_channels: usize,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, spec: WavSpec) -> Self {
        Self {
            num_channels: spec.channels as usize,
            sample_rate: spec.sample_rate,
            samples,
            spec,
        }
    }

    /// Number of multi-channel frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.num_channels.max(1)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file and return its samples as f32 values normalized to [-1.0, 1.0].
///
/// Integer PCM at 8, 16, 24 and 32 bits and 32-bit float are accepted.
pub fn read_audio_file<P: AsRef<Path>>(path: P) -> Result<AudioData, AudioError> {
    let path_str = path.as_ref().to_string_lossy().to_string();

    let mut reader = WavReader::open(&path).map_err(|source| AudioError::Open {
        path: path_str.clone(),
        source,
    })?;

    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat("zero channels".to_string()));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => read_samples::<i8>(&mut reader),
        (SampleFormat::Int, 16) => read_samples::<i16>(&mut reader),
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| I24::new_unchecked(v).to_sample::<f32>()))
            .collect(),
        (SampleFormat::Int, 32) => read_samples::<i32>(&mut reader),
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect(),
        (format, bits) => {
            return Err(AudioError::UnsupportedFormat(format!(
                "{}-bit {:?}",
                bits, format
            )))
        }
    };

    let samples = samples.map_err(|source| AudioError::Read {
        path: path_str.clone(),
        source,
    })?;

    let audio = AudioData::new(samples, spec);
    log::debug!(
        "decoded {}: {} ch, {} Hz, {}-bit, {:.2}s",
        path_str,
        audio.num_channels,
        audio.sample_rate,
        spec.bits_per_sample,
        audio.duration_seconds()
    );

    Ok(audio)
}

fn read_samples<S>(reader: &mut WavReader<BufReader<File>>) -> Result<Vec<f32>, hound::Error>
where
    S: hound::Sample + ToSample<f32>,
{
    reader
        .samples::<S>()
        .map(|s| s.map(|v| v.to_sample_()))
        .collect()
}

/// Write a sound to a WAV file in the format recorded in its spec, clamping
/// samples to [-1.0, 1.0].
pub fn write_audio_file<P: AsRef<Path>>(path: P, audio: &AudioData) -> Result<(), AudioError> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let spec = audio.spec;

    let mut writer = WavWriter::create(&path, spec).map_err(|source| AudioError::Create {
        path: path_str.clone(),
        source,
    })?;

    let write_err = |source| AudioError::Write {
        path: path_str.clone(),
        source,
    };

    for &sample in &audio.samples {
        let sample = sample.clamp(-1.0, 1.0);
        let written = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 8) => writer.write_sample(sample.to_sample::<i8>()),
            (SampleFormat::Int, 16) => writer.write_sample(sample.to_sample::<i16>()),
            (SampleFormat::Int, 24) => writer.write_sample(sample.to_sample::<I24>().inner()),
            (SampleFormat::Int, 32) => writer.write_sample(sample.to_sample::<i32>()),
            (SampleFormat::Float, 32) => writer.write_sample(sample),
            (format, bits) => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{}-bit {:?}",
                    bits, format
                )))
            }
        };
        written.map_err(write_err)?;
    }

    writer.finalize().map_err(write_err)?;

    Ok(())
}

/// Create a 16-bit PCM WAV spec.
pub fn default_wav_spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}
