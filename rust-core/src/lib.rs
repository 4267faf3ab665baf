//! DSP Toolkit - Spectral Transforms and Filter Analysis
//!
//! STFT/ISTFT with weighted overlap-add, poles/zeros and frequency response of rational
//! transfer functions, and equal-tempered pitch mapping. Optional Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![allow(non_local_definitions)]

pub mod error;
pub mod filters;
pub mod pitch;
pub mod signal;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

/// Sample rate assumed by callers that do not carry their own (Hz)
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Frequency of A4 (Hz)
pub const DEFAULT_CONCERT_PITCH: f64 = 440.0;

pub use error::{DspError, DspResult};
pub use filters::{
    frequency_response, poles_zeros_gain, FrequencyBounds, TransferFunction, ZeroPoleGain,
};
pub use pitch::{NoteName, Pitch, PitchMapper};
pub use signal::Signal;
pub use spectrum::{istft, stft, SpectrumAnalyzer, StftConfig, StftMatrix, Window, WindowKind};
