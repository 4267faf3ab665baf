//! Transfer function analysis: poles, zeros, gain and frequency response
//!
//! Coefficients are in descending powers of z, so `b = [b0, b1, .., bM]` is the
//! polynomial b0·z^M + b1·z^(M-1) + .. + bM. Sequences written in powers of z⁻¹
//! (the difference-equation form) go through `TransferFunction::from_delay_form`.

use super::roots::roots;
use crate::error::{DspError, DspResult};
use crate::signal::validate_sample_rate;
use crate::spectrum::analysis::{abs, arg, MagnitudeScale, PhaseMode};
use num_complex::Complex64;
use std::f64::consts::PI;
use tracing::debug;

/// Which frequencies are accepted by the response evaluators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyBounds {
    /// Only 0 <= f <= fs/2
    #[default]
    Nyquist,
    /// Any finite frequency; the response is periodic in fs
    AllowAliasing,
}

/// Frequency grid used by `freqz`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    #[default]
    Linear,
    Logarithmic,
}

/// Rational transfer function H(z) = B(z) / A(z)
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    numerator: Vec<f64>,
    denominator: Vec<f64>,
}

impl TransferFunction {
    /// Create a transfer function from descending-power coefficients
    ///
    /// # Arguments
    /// * `numerator` - b coefficients of B(z)
    /// * `denominator` - a coefficients of A(z)
    ///
    /// # Errors
    /// `InvalidArgument` for empty or non-finite coefficient sequences
    pub fn new(numerator: Vec<f64>, denominator: Vec<f64>) -> DspResult<Self> {
        validate_coefficients("numerator", &numerator)?;
        validate_coefficients("denominator", &denominator)?;

        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Create a transfer function from coefficients in powers of z⁻¹
    ///
    /// y[n] = Σ b[k]·x[n-k] - Σ a[k]·y[n-k] for k >= 1, with a[0] = 1 after
    /// normalization. The shorter sequence is padded with trailing zeros, which
    /// turns both into descending powers of z of the same degree.
    pub fn from_delay_form(mut numerator: Vec<f64>, mut denominator: Vec<f64>) -> DspResult<Self> {
        let length = numerator.len().max(denominator.len());
        numerator.resize(length, 0.0);
        denominator.resize(length, 0.0);

        Self::new(numerator, denominator)
    }

    pub fn numerator(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[f64] {
        &self.denominator
    }

    /// Factor into zeros, poles and gain
    pub fn zpk(&self) -> DspResult<ZeroPoleGain> {
        poles_zeros_gain(&self.numerator, &self.denominator)
    }

    /// Complex response at the given frequencies (Hz)
    pub fn frequency_response(
        &self,
        frequencies: &[f64],
        sample_rate: f64,
        bounds: FrequencyBounds,
    ) -> DspResult<Vec<Complex64>> {
        frequency_response(
            &self.numerator,
            &self.denominator,
            frequencies,
            sample_rate,
            bounds,
        )
    }

    /// Equal-length (b, a) in powers of z⁻¹, ready for a difference equation
    ///
    /// # Errors
    /// * `DivisionByZero` when a[0] is zero
    /// * `InvalidArgument` when deg B > deg A (the system is not causal)
    pub fn delay_form(&self) -> DspResult<(Vec<f64>, Vec<f64>)> {
        if self.denominator[0] == 0.0 {
            return Err(DspError::DivisionByZero(
                "leading denominator coefficient a[0] is zero".into(),
            ));
        }

        let order = self.denominator.len() - 1;
        let b = match self.numerator.iter().position(|&c| c != 0.0) {
            Some(first) => &self.numerator[first..],
            None => &[][..],
        };

        if b.len() > order + 1 {
            return Err(DspError::invalid(format!(
                "numerator degree {} exceeds denominator degree {} (non-causal)",
                b.len() - 1,
                order
            )));
        }

        let mut delayed = vec![0.0; order + 1 - b.len()];
        delayed.extend_from_slice(b);

        Ok((delayed, self.denominator.clone()))
    }
}

/// Factored form H(z) = k · ∏(z - zᵢ) / ∏(z - pᵢ)
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroPoleGain {
    pub zeros: Vec<Complex64>,
    pub poles: Vec<Complex64>,
    pub gain: f64,
}

impl ZeroPoleGain {
    /// Complex response at the given frequencies (Hz)
    ///
    /// Matches `TransferFunction::frequency_response` up to rounding.
    pub fn frequency_response(
        &self,
        frequencies: &[f64],
        sample_rate: f64,
        bounds: FrequencyBounds,
    ) -> DspResult<Vec<Complex64>> {
        validate_frequencies(frequencies, sample_rate, bounds)?;

        frequencies
            .iter()
            .map(|&f| {
                let z = unit_circle(f, sample_rate);
                let num: Complex64 = self.zeros.iter().map(|&q| z - q).product();
                let den: Complex64 = self.poles.iter().map(|&p| z - p).product();

                if den == Complex64::new(0.0, 0.0) {
                    return Err(DspError::DivisionByZero(format!(
                        "pole on the unit circle at {} Hz",
                        f
                    )));
                }
                Ok(num * self.gain / den)
            })
            .collect()
    }

    /// True when every pole lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }
}

/// Poles, zeros and gain of B(z)/A(z)
///
/// # Arguments
/// * `b` - Numerator coefficients (descending powers of z)
/// * `a` - Denominator coefficients (descending powers of z)
///
/// # Errors
/// * `InvalidArgument` for empty or non-finite coefficients
/// * `DivisionByZero` when a[0] is zero
/// * `NumericalInstability` when root finding fails
pub fn poles_zeros_gain(b: &[f64], a: &[f64]) -> DspResult<ZeroPoleGain> {
    validate_coefficients("numerator", b)?;
    validate_coefficients("denominator", a)?;

    let a0 = a[0];
    if a0 == 0.0 {
        return Err(DspError::DivisionByZero(
            "leading denominator coefficient a[0] is zero".into(),
        ));
    }

    let a_norm: Vec<f64> = a.iter().map(|c| c / a0).collect();
    let b_norm: Vec<f64> = b.iter().map(|c| c / a0).collect();

    let poles = roots(&a_norm)?;

    let (zeros, gain) = match b_norm.iter().position(|&c| c != 0.0) {
        Some(first) => (roots(&b_norm[first..])?, b_norm[first]),
        None => (Vec::new(), 0.0),
    };

    debug!(
        "zpk: {} zeros, {} poles, gain {}",
        zeros.len(),
        poles.len(),
        gain
    );

    Ok(ZeroPoleGain { zeros, poles, gain })
}

/// Evaluate B(z)/A(z) at z = e^(j2πf/fs) for each frequency
///
/// # Errors
/// * `InvalidArgument` for bad coefficients, a bad sample rate, or a frequency that is
///   non-finite or (with `FrequencyBounds::Nyquist`) outside [0, fs/2]
/// * `DivisionByZero` when A(z) vanishes at a requested frequency
pub fn frequency_response(
    b: &[f64],
    a: &[f64],
    frequencies: &[f64],
    sample_rate: f64,
    bounds: FrequencyBounds,
) -> DspResult<Vec<Complex64>> {
    validate_coefficients("numerator", b)?;
    validate_coefficients("denominator", a)?;
    validate_frequencies(frequencies, sample_rate, bounds)?;

    frequencies
        .iter()
        .map(|&f| {
            let z = unit_circle(f, sample_rate);
            let den = horner(a, z);

            if den == Complex64::new(0.0, 0.0) {
                return Err(DspError::DivisionByZero(format!(
                    "denominator vanishes at {} Hz",
                    f
                )));
            }
            Ok(horner(b, z) / den)
        })
        .collect()
}

/// Sampled frequency response
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    frequencies: Vec<f64>,
    response: Vec<Complex64>,
}

impl FrequencyResponse {
    /// Frequency of each point in Hz
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn response(&self) -> &[Complex64] {
        &self.response
    }

    pub fn magnitude(&self, scale: MagnitudeScale) -> Vec<f64> {
        abs(&self.response, scale)
    }

    pub fn phase(&self, mode: PhaseMode) -> Vec<f64> {
        arg(&self.response, mode)
    }
}

/// Frequency response on a grid from DC (or 1 rad/sample when logarithmic) up to,
/// but excluding, Nyquist
///
/// # Arguments
/// * `tf` - Transfer function
/// * `points` - Number of grid points (> 0)
/// * `sample_rate` - Sample rate in Hz
/// * `spacing` - Linear: ω_k = πk/points. Logarithmic: ω_k = π^(k/points)
pub fn freqz(
    tf: &TransferFunction,
    points: usize,
    sample_rate: f64,
    spacing: Spacing,
) -> DspResult<FrequencyResponse> {
    if points == 0 {
        return Err(DspError::invalid("points must be > 0"));
    }
    validate_sample_rate(sample_rate)?;

    let frequencies: Vec<f64> = (0..points)
        .map(|k| {
            let fraction = k as f64 / points as f64;
            let omega = match spacing {
                Spacing::Linear => PI * fraction,
                Spacing::Logarithmic => PI.powf(fraction),
            };
            omega * sample_rate / (2.0 * PI)
        })
        .collect();

    let response = tf.frequency_response(&frequencies, sample_rate, FrequencyBounds::Nyquist)?;

    Ok(FrequencyResponse {
        frequencies,
        response,
    })
}

/// Point on the unit circle for frequency f
#[inline]
fn unit_circle(frequency: f64, sample_rate: f64) -> Complex64 {
    Complex64::from_polar(1.0, 2.0 * PI * frequency / sample_rate)
}

/// Descending-power polynomial at z
#[inline]
fn horner(coefficients: &[f64], z: Complex64) -> Complex64 {
    coefficients
        .iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
}

fn validate_coefficients(name: &str, coefficients: &[f64]) -> DspResult<()> {
    if coefficients.is_empty() {
        return Err(DspError::invalid(format!("{} coefficients are empty", name)));
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(DspError::invalid(format!(
            "{} coefficients must be finite",
            name
        )));
    }
    Ok(())
}

fn validate_frequencies(
    frequencies: &[f64],
    sample_rate: f64,
    bounds: FrequencyBounds,
) -> DspResult<()> {
    validate_sample_rate(sample_rate)?;

    let nyquist = sample_rate / 2.0;
    for &f in frequencies {
        if !f.is_finite() {
            return Err(DspError::invalid(format!("frequency {} is not finite", f)));
        }
        if bounds == FrequencyBounds::Nyquist && !(0.0..=nyquist).contains(&f) {
            return Err(DspError::invalid(format!(
                "frequency {} Hz outside [0, {}] Hz",
                f, nyquist
            )));
        }
    }
    Ok(())
}
