//! FIR filter design using the windowing method
//!
//! The ideal (sinc) impulse response is truncated to M taps and multiplied by a
//! symmetric window. M is odd, giving a type-I linear phase filter.

use super::analysis::TransferFunction;
use crate::error::{DspError, DspResult};
use crate::signal::validate_sample_rate;
use crate::spectrum::window::{Normalization, Window, WindowKind};
use std::f64::consts::PI;
use tracing::debug;

/// Passband of the ideal filter, edges in Hz
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Band {
    Lowpass { cutoff: f64 },
    Highpass { cutoff: f64 },
    Bandpass { low: f64, high: f64 },
}

/// Filter specification for window-method FIR design
#[derive(Debug, Clone, PartialEq)]
pub struct FirSpec {
    /// Ideal cutoff frequencies (middle of each transition band)
    pub band: Band,

    /// Transition width in Hz
    pub transition_width: f64,

    /// Window type
    pub window: WindowKind,
}

impl FirSpec {
    /// Transition width in radians/sample
    pub fn delta_omega(&self, sample_rate: f64) -> f64 {
        2.0 * PI * self.transition_width / sample_rate
    }

    /// Number of taps the design will produce
    pub fn length(&self, sample_rate: f64) -> DspResult<usize> {
        self.validate(sample_rate)?;
        Ok(self.window.filter_length(self.delta_omega(sample_rate)))
    }

    fn validate(&self, sample_rate: f64) -> DspResult<()> {
        validate_sample_rate(sample_rate)?;
        let nyquist = sample_rate / 2.0;

        if !self.transition_width.is_finite()
            || self.transition_width <= 0.0
            || self.transition_width >= nyquist
        {
            return Err(DspError::invalid(format!(
                "transition width {} Hz must lie in (0, {}) Hz",
                self.transition_width, nyquist
            )));
        }

        let edges = match self.band {
            Band::Lowpass { cutoff } | Band::Highpass { cutoff } => vec![cutoff],
            Band::Bandpass { low, high } => {
                if low >= high {
                    return Err(DspError::invalid(format!(
                        "bandpass edges must satisfy low < high (got {} and {})",
                        low, high
                    )));
                }
                vec![low, high]
            }
        };

        for edge in edges {
            if !edge.is_finite() || edge <= 0.0 || edge >= nyquist {
                return Err(DspError::invalid(format!(
                    "cutoff {} Hz outside (0, {}) Hz",
                    edge, nyquist
                )));
            }
        }

        Ok(())
    }
}

/// Design an FIR filter using the windowing method
///
/// # Algorithm
/// 1. Calculate the filter length from the window's mainlobe width and transition width
/// 2. Calculate the ideal impulse response using sinc functions
/// 3. Multiply the ideal response by a symmetric window
///
/// # Arguments
/// * `spec` - Filter specification
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// Transfer function with h[n] as numerator and a unit denominator
pub fn design_fir(spec: &FirSpec, sample_rate: f64) -> DspResult<TransferFunction> {
    let m = spec.length(sample_rate)?;
    let window = Window::symmetric(spec.window, m, Normalization::None)?;

    let to_rad = |f: f64| 2.0 * PI * f / sample_rate;
    let center = (m - 1) as f64 / 2.0;

    let h: Vec<f64> = window
        .weights()
        .iter()
        .enumerate()
        .map(|(n, w)| {
            let n_shifted = n as f64 - center;
            let h_ideal = match spec.band {
                Band::Lowpass { cutoff } => ideal_lowpass(to_rad(cutoff), n_shifted),
                Band::Highpass { cutoff } => {
                    // Highpass = impulse - lowpass
                    let delta = if n_shifted == 0.0 { 1.0 } else { 0.0 };
                    delta - ideal_lowpass(to_rad(cutoff), n_shifted)
                }
                Band::Bandpass { low, high } => {
                    ideal_lowpass(to_rad(high), n_shifted) - ideal_lowpass(to_rad(low), n_shifted)
                }
            };
            h_ideal * w
        })
        .collect();

    debug!("FIR design: {:?}, {} taps, {} window", spec.band, m, spec.window);

    TransferFunction::from_delay_form(h, vec![1.0])
}

/// sin(wc·n)/(π·n), with the limit wc/π at n = 0
#[inline]
fn ideal_lowpass(wc: f64, n: f64) -> f64 {
    if n == 0.0 {
        wc / PI
    } else {
        (wc * n).sin() / (PI * n)
    }
}
