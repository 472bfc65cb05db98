use crate::audio_io::AudioData;
use thiserror::Error;

pub mod compression;
pub mod eq;

/// Largest number of positional parameters any filter takes.
pub const MAX_PARAMS: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum ApplyError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("expected {expected} parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },
    #[error("input has no audio frames")]
    EmptyInput,
}

pub type Filter2 = fn(&AudioData, [f32; 2]) -> Result<AudioData, ApplyError>;
pub type Filter3 = fn(&AudioData, [f32; 3]) -> Result<AudioData, ApplyError>;
pub type Filter6 = fn(&AudioData, [f32; 6]) -> Result<AudioData, ApplyError>;

/// A filter operation tagged with its arity.
#[derive(Clone, Copy)]
pub enum FilterOp {
    Two(Filter2),
    Three(Filter3),
    Six(Filter6),
}

impl FilterOp {
    pub fn arity(&self) -> usize {
        match self {
            FilterOp::Two(_) => 2,
            FilterOp::Three(_) => 3,
            FilterOp::Six(_) => 6,
        }
    }

    /// Run the operation. `params` must hold exactly `self.arity()` values.
    pub fn apply(
        &self,
        input: &AudioData,
        params: &ParsedParameters,
    ) -> Result<AudioData, ApplyError> {
        match *self {
            FilterOp::Two(f) => f(input, params.fixed()?),
            FilterOp::Three(f) => f(input, params.fixed()?),
            FilterOp::Six(f) => f(input, params.fixed()?),
        }
    }
}

impl std::fmt::Debug for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FilterOp({})", self.arity())
    }
}

/// Positional parameter metadata, used for help output.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
}

const fn param(name: &'static str, description: &'static str) -> ParamSpec {
    ParamSpec { name, description }
}

#[derive(Debug)]
pub struct FilterDescriptor {
    pub name: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
    pub op: FilterOp,
}

impl FilterDescriptor {
    pub fn arity(&self) -> usize {
        self.op.arity()
    }

    pub fn apply(
        &self,
        input: &AudioData,
        params: &ParsedParameters,
    ) -> Result<AudioData, ApplyError> {
        self.op.apply(input, params)
    }
}

const CUTOFF: ParamSpec = param("cutoff", "Frequency of the filter cutoff (Hz)");
const RESONANCE: ParamSpec = param("resonance", "Boost applied to overtones near cutoff (dB)");
const Q: ParamSpec = param("Q", "Inverse of the fractional bandwidth");

/// Every supported filter, in help order.
pub static FILTERS: &[FilterDescriptor] = &[
    FilterDescriptor {
        name: "lowpass",
        summary: "Passes low frequencies through and dampens high frequencies",
        params: &[CUTOFF, RESONANCE],
        op: FilterOp::Two(eq::lowpass),
    },
    FilterDescriptor {
        name: "highpass",
        summary: "Passes high frequencies through and dampens low frequencies",
        params: &[CUTOFF, RESONANCE],
        op: FilterOp::Two(eq::highpass),
    },
    FilterDescriptor {
        name: "bandpass",
        summary: "Passes a band of frequencies through and dampens outside them",
        params: &[
            param("freq", "Center frequency of the overtones passed through (Hz)"),
            Q,
        ],
        op: FilterOp::Two(eq::bandpass),
    },
    FilterDescriptor {
        name: "notch",
        summary: "Dampens the overtones surrounding a frequency",
        params: &[
            param("freq", "Center frequency of the attenuated overtones (Hz)"),
            Q,
        ],
        op: FilterOp::Two(eq::notch),
    },
    FilterDescriptor {
        name: "allpass",
        summary: "Phase shifts based on frequency (usually not audible)",
        params: &[
            param("freq", "Frequency where the phase shift crosses 90 degrees (Hz)"),
            Q,
        ],
        op: FilterOp::Two(eq::allpass),
    },
    FilterDescriptor {
        name: "peaking",
        summary: "Adds gain to the overtones surrounding a frequency",
        params: &[
            param("freq", "Center frequency where the gain occurs (Hz)"),
            Q,
            param("gain", "Amount of gain (dB)"),
        ],
        op: FilterOp::Three(eq::peaking),
    },
    FilterDescriptor {
        name: "lowshelf",
        summary: "Adds gain to lower frequencies",
        params: &[
            param("freq", "Frequency where the low shelf stops producing gain (Hz)"),
            Q,
            param("gain", "Amount of gain of the shelf (dB)"),
        ],
        op: FilterOp::Three(eq::lowshelf),
    },
    FilterDescriptor {
        name: "highshelf",
        summary: "Adds gain to higher frequencies",
        params: &[
            param("freq", "Frequency where the high shelf stops producing gain (Hz)"),
            Q,
            param("gain", "Amount of gain of the shelf (dB)"),
        ],
        op: FilterOp::Three(eq::highshelf),
    },
    FilterDescriptor {
        name: "compressor",
        summary: "Dynamic range compression, usually to make sounds louder",
        params: &[
            param("pregain", "Decibel amount to perform gain before compression (0 - 40)"),
            param("threshold", "Decibel level that triggers the compression (-100 to 0)"),
            param("knee", "Decibel width of the knee (0 - 40)"),
            param("ratio", "Ratio of compression after the threshold (1 - 20)"),
            param("attack", "Seconds for the compression to kick in (0 - 1)"),
            param("release", "Seconds for the compression to release (0 - 1)"),
        ],
        op: FilterOp::Six(compression::compressor),
    },
];

/// Look up a filter by exact, case-sensitive name.
pub fn resolve(name: &str) -> Option<&'static FilterDescriptor> {
    FILTERS.iter().find(|filter| filter.name == name)
}

/// Numeric arguments bound to a filter, exactly as many as its arity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedParameters {
    values: [f32; MAX_PARAMS],
    len: usize,
}

impl ParsedParameters {
    /// Returns `None` when more than [`MAX_PARAMS`] values are given.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        if values.len() > MAX_PARAMS {
            return None;
        }
        let mut fixed = [0.0; MAX_PARAMS];
        fixed[..values.len()].copy_from_slice(values);
        Some(Self {
            values: fixed,
            len: values.len(),
        })
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// View the parameters as an array of exactly `N` values.
    pub fn fixed<const N: usize>(&self) -> Result<[f32; N], ApplyError> {
        self.as_slice()
            .try_into()
            .map_err(|_| ApplyError::ParameterCount {
                expected: N,
                found: self.len,
            })
    }
}

/// Common DSP utilities
pub mod dsp {
    /// Convert decibels to linear gain
    pub fn db_to_linear(db: f32) -> f32 {
        10.0_f32.powf(db / 20.0)
    }

    /// Convert linear gain to decibels
    pub fn linear_to_db(linear: f32) -> f32 {
        20.0 * linear.log10()
    }

    /// Root mean square of a block of samples.
    pub fn rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }
}
