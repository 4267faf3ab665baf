//! Magnitude/phase views and a single-shot spectrum analyzer
//!
//! The accessors are pure functions over complex coefficients; they are shared by
//! spectrum frames, STFT matrices and filter frequency responses.

use super::fft::{frequency_axis, BinLayout, FftEngine};
use super::window::{Normalization, Window, WindowKind};
use crate::error::{DspError, DspResult};
use crate::signal::Signal;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Magnitude floor for decibel conversion (-200 dB)
pub const MAGNITUDE_FLOOR: f64 = 1e-10;

/// How to express a magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MagnitudeScale {
    #[default]
    Linear,
    /// 20*log10(|X|), floored at MAGNITUDE_FLOOR
    Decibels,
}

/// How to express a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseMode {
    /// Angle in (-π, π]
    #[default]
    Wrapped,
    /// Continuous across bins (no jumps larger than π)
    Unwrapped,
}

/// Convert a linear magnitude to dB
#[inline]
pub fn to_db(magnitude: f64) -> f64 {
    20.0 * magnitude.max(MAGNITUDE_FLOOR).log10()
}

/// Modulus of each coefficient
pub fn abs(bins: &[Complex64], scale: MagnitudeScale) -> Vec<f64> {
    match scale {
        MagnitudeScale::Linear => bins.iter().map(|c| c.norm()).collect(),
        MagnitudeScale::Decibels => bins.iter().map(|c| to_db(c.norm())).collect(),
    }
}

/// Four-quadrant angle of each coefficient
pub fn arg(bins: &[Complex64], mode: PhaseMode) -> Vec<f64> {
    let wrapped: Vec<f64> = bins.iter().map(|c| wrap_phase(c.arg())).collect();

    match mode {
        PhaseMode::Wrapped => wrapped,
        PhaseMode::Unwrapped => unwrap_phase(&wrapped),
    }
}

/// Map an angle into (-π, π]
#[inline]
pub fn wrap_phase(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Remove 2π jumps between consecutive phase values
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(phase.len());
    let mut correction = 0.0;

    for (i, &p) in phase.iter().enumerate() {
        if i > 0 {
            let d = p - phase[i - 1];
            if d.abs() >= PI {
                let mut dmod = (d + PI).rem_euclid(2.0 * PI) - PI;
                if dmod == -PI && d > 0.0 {
                    dmod = PI;
                }
                correction += dmod - d;
            }
        }
        unwrapped.push(p + correction);
    }

    unwrapped
}

/// Spectrum analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT size (number of samples, any value > 0)
    pub fft_size: usize,

    /// Window type for spectral analysis
    pub window: WindowKind,

    /// Apply amplitude correction for windowing
    pub apply_correction: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            window: WindowKind::Hann,
            apply_correction: true,
        }
    }
}

/// One-sided spectrum of a signal
#[derive(Debug, Clone)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    bins: Vec<Complex64>,
}

impl Spectrum {
    /// Frequency of each bin in Hz
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn magnitude(&self, scale: MagnitudeScale) -> Vec<f64> {
        abs(&self.bins, scale)
    }

    pub fn phase(&self, mode: PhaseMode) -> Vec<f64> {
        arg(&self.bins, mode)
    }

    /// Frequency of the strongest non-DC bin
    pub fn peak_frequency(&self) -> Option<f64> {
        self.bins
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| (i, c.norm()))
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| self.frequencies[i])
    }
}

/// Windowed single-frame spectrum analyzer
pub struct SpectrumAnalyzer {
    config: AnalyzerConfig,
    fft_engine: FftEngine,
}

impl SpectrumAnalyzer {
    /// Create new spectrum analyzer
    pub fn new(config: AnalyzerConfig) -> DspResult<Self> {
        let fft_engine = FftEngine::new(config.fft_size)?;
        Ok(Self { config, fft_engine })
    }

    /// Analyze the first `fft_size` samples of a signal
    ///
    /// Shorter signals are windowed over their own length and zero-padded.
    ///
    /// # Returns
    /// One-sided spectrum with bins 0..=fft_size/2
    pub fn analyze(&self, signal: &Signal) -> DspResult<Spectrum> {
        if signal.is_empty() {
            return Err(DspError::invalid("cannot analyze an empty signal"));
        }

        let n = self.config.fft_size;
        let segment_len = signal.len().min(n);
        let window = Window::new(self.config.window, segment_len, Normalization::None)?;

        let mut buffer = window.apply(&signal.samples()[..segment_len])?;
        buffer.resize(n, 0.0);

        let mut bins = self.fft_engine.forward_real(&buffer, true)?.into_bins();

        if self.config.apply_correction {
            let correction = window.amplitude_correction();
            for c in bins.iter_mut() {
                *c *= correction;
            }
        }

        Ok(Spectrum {
            frequencies: frequency_axis(n, signal.sample_rate(), BinLayout::Half),
            bins,
        })
    }

    /// Get current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Get number of frequency bins
    pub fn num_bins(&self) -> usize {
        self.fft_engine.num_bins(BinLayout::Half)
    }
}
