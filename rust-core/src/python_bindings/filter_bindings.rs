//! Python bindings for transfer function analysis and FIR design

use super::spectrum_bindings::PyWindowKind;
use crate::error::DspError;
use crate::filters::{self, Band, FirSpec, FrequencyBounds, Spacing, TransferFunction};
use num_complex::Complex64;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

fn to_vec(array: &PyReadonlyArray1<f64>) -> Vec<f64> {
    array.as_array().to_vec()
}

/// Poles, zeros and gain of B(z)/A(z)
///
/// Args:
///     b: Numerator coefficients, descending powers of z
///     a: Denominator coefficients, descending powers of z
///
/// Returns:
///     (zeros, poles, gain)
#[pyfunction]
pub fn poles_zeros_gain<'py>(
    py: Python<'py>,
    b: PyReadonlyArray1<f64>,
    a: PyReadonlyArray1<f64>,
) -> PyResult<(&'py PyArray1<Complex64>, &'py PyArray1<Complex64>, f64)> {
    let zpk = filters::poles_zeros_gain(&to_vec(&b), &to_vec(&a))?;

    Ok((
        PyArray1::from_vec(py, zpk.zeros),
        PyArray1::from_vec(py, zpk.poles),
        zpk.gain,
    ))
}

/// Complex response of B(z)/A(z) at the given frequencies
///
/// Args:
///     b: Numerator coefficients, descending powers of z
///     a: Denominator coefficients, descending powers of z
///     frequencies: Frequencies in Hz
///     sample_rate: Sample rate in Hz
///     allow_aliasing: Accept frequencies outside [0, fs/2]
#[pyfunction]
#[pyo3(signature = (b, a, frequencies, sample_rate=crate::DEFAULT_SAMPLE_RATE, allow_aliasing=false))]
pub fn frequency_response<'py>(
    py: Python<'py>,
    b: PyReadonlyArray1<f64>,
    a: PyReadonlyArray1<f64>,
    frequencies: PyReadonlyArray1<f64>,
    sample_rate: f64,
    allow_aliasing: bool,
) -> PyResult<&'py PyArray1<Complex64>> {
    let bounds = if allow_aliasing {
        FrequencyBounds::AllowAliasing
    } else {
        FrequencyBounds::Nyquist
    };
    let response = filters::frequency_response(
        &to_vec(&b),
        &to_vec(&a),
        &to_vec(&frequencies),
        sample_rate,
        bounds,
    )?;

    Ok(PyArray1::from_vec(py, response))
}

/// Frequency response on a grid below Nyquist
///
/// Args:
///     b: Numerator coefficients, powers of z⁻¹ (difference equation form)
///     a: Denominator coefficients, powers of z⁻¹
///     points: Number of grid points
///     sample_rate: Sample rate in Hz
///     log: Logarithmic instead of linear spacing
///
/// Returns:
///     (frequencies, response)
#[pyfunction]
#[pyo3(signature = (b, a, points=1024, sample_rate=crate::DEFAULT_SAMPLE_RATE, log=false))]
pub fn freqz<'py>(
    py: Python<'py>,
    b: PyReadonlyArray1<f64>,
    a: PyReadonlyArray1<f64>,
    points: usize,
    sample_rate: f64,
    log: bool,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<Complex64>)> {
    let tf = TransferFunction::from_delay_form(to_vec(&b), to_vec(&a))?;
    let spacing = if log {
        Spacing::Logarithmic
    } else {
        Spacing::Linear
    };
    let response = filters::freqz(&tf, points, sample_rate, spacing)?;

    Ok((
        PyArray1::from_slice(py, response.frequencies()),
        PyArray1::from_slice(py, response.response()),
    ))
}

/// First n samples of the impulse response
///
/// Args:
///     b: Numerator coefficients, powers of z⁻¹
///     a: Denominator coefficients, powers of z⁻¹
///     n: Number of samples
#[pyfunction]
#[pyo3(signature = (b, a, n=10))]
pub fn impulse_response<'py>(
    py: Python<'py>,
    b: PyReadonlyArray1<f64>,
    a: PyReadonlyArray1<f64>,
    n: usize,
) -> PyResult<&'py PyArray1<f64>> {
    let tf = TransferFunction::from_delay_form(to_vec(&b), to_vec(&a))?;
    let h = filters::impulse_response(&tf, n)?;

    Ok(PyArray1::from_vec(py, h))
}

/// Design an FIR filter using the windowing method
///
/// Args:
///     band: "lowpass", "highpass" or "bandpass"
///     cutoffs: One cutoff in Hz, or (low, high) for bandpass
///     transition_width: Transition width in Hz
///     window: Window kind
///     sample_rate: Sample rate in Hz
///
/// Returns:
///     Filter coefficients h[n]
#[pyfunction]
#[pyo3(signature = (band, cutoffs, transition_width, window=None, sample_rate=crate::DEFAULT_SAMPLE_RATE))]
pub fn design_fir<'py>(
    py: Python<'py>,
    band: &str,
    cutoffs: Vec<f64>,
    transition_width: f64,
    window: Option<PyWindowKind>,
    sample_rate: f64,
) -> PyResult<&'py PyArray1<f64>> {
    let band = match (band.to_ascii_lowercase().as_str(), cutoffs.as_slice()) {
        ("lowpass", [cutoff]) => Band::Lowpass { cutoff: *cutoff },
        ("highpass", [cutoff]) => Band::Highpass { cutoff: *cutoff },
        ("bandpass", [low, high]) => Band::Bandpass {
            low: *low,
            high: *high,
        },
        (name, edges) => {
            return Err(DspError::invalid(format!(
                "unsupported band '{}' with {} cutoff(s)",
                name,
                edges.len()
            ))
            .into())
        }
    };

    let spec = FirSpec {
        band,
        transition_width,
        window: window.map(|w| w.kind).unwrap_or(crate::spectrum::WindowKind::Hamming),
    };
    let tf = filters::design_fir(&spec, sample_rate)?;

    Ok(PyArray1::from_slice(py, tf.numerator()))
}
