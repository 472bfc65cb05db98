use crate::audio_io::AudioData;
use crate::filters::dsp::{db_to_linear, linear_to_db};
use crate::filters::ApplyError;

/// Floor for level detection, keeps `log10` finite on silence.
const MIN_LEVEL_DB: f32 = -200.0;

/// Compressor settings. Gains and levels are in dB, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorParameters {
    pub pregain: f32,
    pub threshold: f32,
    pub knee: f32,
    pub ratio: f32,
    pub attack: f32,
    pub release: f32,
}

impl Default for CompressorParameters {
    fn default() -> Self {
        Self {
            pregain: 0.0,
            threshold: -24.0,
            knee: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

impl CompressorParameters {
    /// Start from the defaults and replace fields positionally:
    /// pregain, threshold, knee, ratio, attack, release.
    pub fn with_overrides(values: &[f32]) -> Self {
        let mut params = Self::default();
        let fields = [
            &mut params.pregain,
            &mut params.threshold,
            &mut params.knee,
            &mut params.ratio,
            &mut params.attack,
            &mut params.release,
        ];
        for (field, &value) in fields.into_iter().zip(values) {
            *field = value;
        }
        params
    }

    pub fn validate(&self) -> Result<(), ApplyError> {
        check_range("pregain", self.pregain, 0.0, 40.0)?;
        check_range("threshold", self.threshold, -100.0, 0.0)?;
        check_range("knee", self.knee, 0.0, 40.0)?;
        check_range("ratio", self.ratio, 1.0, 20.0)?;
        check_range("attack", self.attack, 0.0, 1.0)?;
        check_range("release", self.release, 0.0, 1.0)
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), ApplyError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ApplyError::InvalidParameters(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )))
    }
}

/// Six-parameter entry point used by the filter registry.
pub fn compressor(input: &AudioData, values: [f32; 6]) -> Result<AudioData, ApplyError> {
    let params = CompressorParameters::with_overrides(&values);
    params.validate()?;
    if input.frames() == 0 {
        return Err(ApplyError::EmptyInput);
    }
    Ok(Compressor::new(params, input.sample_rate).process(input))
}

/// Feed-forward soft-knee compressor. All channels share one gain so the
/// stereo image does not shift.
pub struct Compressor {
    params: CompressorParameters,
    pregain: f32,
    attack_coeff: f32,
    release_coeff: f32,

    // Current gain reduction in dB, always >= 0
    reduction_db: f32,
}

impl Compressor {
    pub fn new(params: CompressorParameters, sample_rate: u32) -> Self {
        Self {
            params,
            pregain: db_to_linear(params.pregain),
            attack_coeff: smoothing_coeff(params.attack, sample_rate),
            release_coeff: smoothing_coeff(params.release, sample_rate),
            reduction_db: 0.0,
        }
    }

    /// Static curve: output level in dB for a given input level in dB.
    fn gain_computer(&self, level_db: f32) -> f32 {
        let CompressorParameters {
            threshold,
            knee,
            ratio,
            ..
        } = self.params;
        let over = level_db - threshold;

        if 2.0 * over < -knee {
            level_db
        } else if knee > 0.0 && 2.0 * over.abs() <= knee {
            let x = over + knee / 2.0;
            level_db + (1.0 / ratio - 1.0) * x * x / (2.0 * knee)
        } else {
            threshold + over / ratio
        }
    }

    fn process_frame(&mut self, frame: &[f32], out: &mut Vec<f32>) {
        let peak = frame.iter().fold(0.0_f32, |acc, s| acc.max(s.abs())) * self.pregain;
        let level_db = if peak > 0.0 {
            linear_to_db(peak).max(MIN_LEVEL_DB)
        } else {
            MIN_LEVEL_DB
        };
        let target = level_db - self.gain_computer(level_db);

        let coeff = if target > self.reduction_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.reduction_db = target + (self.reduction_db - target) * coeff;

        let gain = self.pregain * db_to_linear(-self.reduction_db);
        out.extend(frame.iter().map(|s| s * gain));
    }

    pub fn process(&mut self, input: &AudioData) -> AudioData {
        let mut output_samples = Vec::with_capacity(input.samples.len());
        for frame in input.samples.chunks_exact(input.num_channels) {
            self.process_frame(frame, &mut output_samples);
        }
        AudioData::new(output_samples, input.spec)
    }
}

/// One-pole smoothing coefficient for a time constant in seconds; zero means
/// the gain follows instantly.
fn smoothing_coeff(seconds: f32, sample_rate: u32) -> f32 {
    if seconds <= 0.0 {
        0.0
    } else {
        (-1.0 / (seconds * sample_rate as f32)).exp()
    }
}
