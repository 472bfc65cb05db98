//! Biquad frequency filters.
//!
//! Each channel gets its own Direct Form 1 state; coefficients are derived from
//! the sample rate of the input sound.

use crate::audio_io::AudioData;
use crate::filters::dsp::db_to_linear;
use crate::filters::ApplyError;
use biquad::{Biquad, Coefficients, DirectForm1, Hertz, Type};

pub fn lowpass(
    input: &AudioData,
    [cutoff, resonance]: [f32; 2],
) -> Result<AudioData, ApplyError> {
    run(input, Type::LowPass, cutoff, resonance_to_q(resonance))
}

pub fn highpass(
    input: &AudioData,
    [cutoff, resonance]: [f32; 2],
) -> Result<AudioData, ApplyError> {
    run(input, Type::HighPass, cutoff, resonance_to_q(resonance))
}

pub fn bandpass(input: &AudioData, [freq, q]: [f32; 2]) -> Result<AudioData, ApplyError> {
    run(input, Type::BandPass, freq, q)
}

pub fn notch(input: &AudioData, [freq, q]: [f32; 2]) -> Result<AudioData, ApplyError> {
    run(input, Type::Notch, freq, q)
}

pub fn allpass(input: &AudioData, [freq, q]: [f32; 2]) -> Result<AudioData, ApplyError> {
    run(input, Type::AllPass, freq, q)
}

pub fn peaking(input: &AudioData, [freq, q, gain]: [f32; 3]) -> Result<AudioData, ApplyError> {
    check_gain(gain)?;
    run(input, Type::PeakingEQ(gain), freq, q)
}

pub fn lowshelf(input: &AudioData, [freq, q, gain]: [f32; 3]) -> Result<AudioData, ApplyError> {
    check_gain(gain)?;
    run(input, Type::LowShelf(gain), freq, q)
}

pub fn highshelf(input: &AudioData, [freq, q, gain]: [f32; 3]) -> Result<AudioData, ApplyError> {
    check_gain(gain)?;
    run(input, Type::HighShelf(gain), freq, q)
}

/// Resonance is given in dB of boost at the cutoff.
fn resonance_to_q(resonance: f32) -> f32 {
    db_to_linear(resonance)
}

fn check_gain(gain: f32) -> Result<(), ApplyError> {
    if gain.is_finite() {
        Ok(())
    } else {
        Err(ApplyError::InvalidParameters(format!("gain {} dB", gain)))
    }
}

fn design(
    kind: Type<f32>,
    sample_rate: u32,
    freq: f32,
    q: f32,
) -> Result<Coefficients<f32>, ApplyError> {
    if !(q.is_finite() && q > 0.0) {
        return Err(ApplyError::InvalidParameters(format!("Q must be positive, got {}", q)));
    }
    if !(freq.is_finite() && freq > 0.0) {
        return Err(ApplyError::InvalidParameters(format!(
            "frequency must be positive, got {} Hz",
            freq
        )));
    }

    let fs = Hertz::<f32>::from_hz(sample_rate as f32).map_err(|e| {
        ApplyError::InvalidParameters(format!("sample rate {} Hz: {:?}", sample_rate, e))
    })?;
    let f0 = Hertz::<f32>::from_hz(freq).map_err(|e| {
        ApplyError::InvalidParameters(format!("frequency {} Hz: {:?}", freq, e))
    })?;

    Coefficients::<f32>::from_params(kind, fs, f0, q).map_err(|e| {
        ApplyError::InvalidParameters(format!(
            "frequency {} Hz at {} Hz sample rate: {:?}",
            freq, sample_rate, e
        ))
    })
}

fn run(input: &AudioData, kind: Type<f32>, freq: f32, q: f32) -> Result<AudioData, ApplyError> {
    if input.frames() == 0 {
        return Err(ApplyError::EmptyInput);
    }

    let channels = input.num_channels;
    let mut states = (0..channels)
        .map(|_| design(kind, input.sample_rate, freq, q).map(DirectForm1::<f32>::new))
        .collect::<Result<Vec<_>, _>>()?;

    let mut output_samples = Vec::with_capacity(input.samples.len());
    for frame in input.samples.chunks_exact(channels) {
        for (&sample, state) in frame.iter().zip(states.iter_mut()) {
            output_samples.push(state.run(sample));
        }
    }

    Ok(AudioData::new(output_samples, input.spec))
}
