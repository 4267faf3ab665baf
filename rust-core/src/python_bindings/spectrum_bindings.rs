//! Python bindings for windows, STFT/ISTFT and spectrum analysis

use crate::error::DspError;
use crate::signal::Signal;
use crate::spectrum::{
    self, Alignment, AnalyzerConfig, MagnitudeScale, Normalization, Padding, PhaseMode,
    SpectrumAnalyzer, StftConfig, StftMatrix, Window, WindowKind,
};
use num_complex::Complex64;
use numpy::{PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;

/// Window kind exposed to Python, parsed from names like "hann" or "kaiser:8.6"
#[pyclass(name = "WindowKind")]
#[derive(Clone)]
pub struct PyWindowKind {
    pub(crate) kind: WindowKind,
}

#[pymethods]
impl PyWindowKind {
    #[new]
    fn new(name: &str) -> PyResult<Self> {
        Ok(Self { kind: name.parse()? })
    }

    /// Kaiser window with an explicit shape parameter
    #[staticmethod]
    fn kaiser(beta: f64) -> PyResult<Self> {
        Self::new(&format!("kaiser:{}", beta))
    }

    /// Mainlobe width factor (mainlobe width = factor·π/M)
    fn mainlobe_width_factor(&self) -> f64 {
        self.kind.mainlobe_width_factor()
    }

    /// Odd FIR length for a transition width in radians
    fn filter_length(&self, delta_omega: f64) -> usize {
        self.kind.filter_length(delta_omega)
    }

    fn __str__(&self) -> String {
        self.kind.to_string()
    }

    fn __repr__(&self) -> String {
        format!("WindowKind('{}')", self.kind)
    }
}

fn parse_normalization(name: &str) -> Result<Normalization, DspError> {
    match name.to_ascii_lowercase().as_str() {
        "none" => Ok(Normalization::None),
        "peak" => Ok(Normalization::Peak),
        "sum" => Ok(Normalization::Sum),
        "energy" => Ok(Normalization::Energy),
        _ => Err(DspError::invalid(format!(
            "unrecognized normalization '{}'",
            name
        ))),
    }
}

fn window_kind(window: Option<PyWindowKind>) -> WindowKind {
    window.map(|w| w.kind).unwrap_or(WindowKind::Hann)
}

/// Generate window weights
///
/// Args:
///     length: Number of samples
///     kind: Window kind (default Hann)
///     symmetric: Symmetric (FIR design) instead of periodic (analysis) window
///     normalization: "none", "peak", "sum" or "energy"
#[pyfunction]
#[pyo3(signature = (length, kind=None, symmetric=false, normalization="peak"))]
pub fn window<'py>(
    py: Python<'py>,
    length: usize,
    kind: Option<PyWindowKind>,
    symmetric: bool,
    normalization: &str,
) -> PyResult<&'py PyArray1<f64>> {
    let kind = window_kind(kind);
    let normalization = parse_normalization(normalization)?;

    let window = if symmetric {
        Window::symmetric(kind, length, normalization)?
    } else {
        Window::new(kind, length, normalization)?
    };

    Ok(PyArray1::from_slice(py, window.weights()))
}

/// STFT result exposed to Python
#[pyclass(name = "StftMatrix")]
pub struct PyStftMatrix {
    matrix: StftMatrix,
}

#[pymethods]
impl PyStftMatrix {
    /// Complex coefficients, shape (frames, bins)
    fn frames<'py>(&self, py: Python<'py>) -> &'py PyArray2<Complex64> {
        PyArray2::from_owned_array(py, self.matrix.frames().clone())
    }

    /// Bin frequencies in Hz
    fn frequencies<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.matrix.frequencies())
    }

    /// Frame center times in seconds
    fn times<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_vec(py, self.matrix.times())
    }

    #[pyo3(signature = (db=false))]
    fn magnitude<'py>(&self, py: Python<'py>, db: bool) -> &'py PyArray2<f64> {
        let scale = if db {
            MagnitudeScale::Decibels
        } else {
            MagnitudeScale::Linear
        };
        PyArray2::from_owned_array(py, self.matrix.magnitude(scale))
    }

    #[pyo3(signature = (unwrap=false))]
    fn phase<'py>(&self, py: Python<'py>, unwrap: bool) -> &'py PyArray2<f64> {
        let mode = if unwrap {
            PhaseMode::Unwrapped
        } else {
            PhaseMode::Wrapped
        };
        PyArray2::from_owned_array(py, self.matrix.phase(mode))
    }

    #[getter]
    fn num_frames(&self) -> usize {
        self.matrix.num_frames()
    }

    #[getter]
    fn num_bins(&self) -> usize {
        self.matrix.num_bins()
    }

    #[getter]
    fn sample_rate(&self) -> f64 {
        self.matrix.sample_rate()
    }
}

/// Short-time Fourier transform
///
/// Args:
///     signal: Input samples as numpy array
///     frame_length: Samples per frame
///     hop: Samples between frame starts
///     window: Window kind (default Hann)
///     sample_rate: Sample rate in Hz
///     center: Center frames on their time stamps
///     truncate: Drop the partial tail instead of zero-padding it
#[pyfunction]
#[pyo3(signature = (
    signal,
    frame_length=2048,
    hop=512,
    window=None,
    sample_rate=crate::DEFAULT_SAMPLE_RATE,
    center=false,
    truncate=false
))]
pub fn stft(
    signal: PyReadonlyArray1<f64>,
    frame_length: usize,
    hop: usize,
    window: Option<PyWindowKind>,
    sample_rate: f64,
    center: bool,
    truncate: bool,
) -> PyResult<PyStftMatrix> {
    let signal = Signal::new(signal.as_array().to_vec(), sample_rate)?;
    let config = StftConfig {
        padding: if truncate {
            Padding::Truncate
        } else {
            Padding::ZeroPad
        },
        alignment: if center {
            Alignment::Center
        } else {
            Alignment::Start
        },
        ..StftConfig::new(frame_length, hop)
    };
    let window = Window::new(window_kind(window), frame_length, Normalization::Peak)?;

    Ok(PyStftMatrix {
        matrix: spectrum::stft(&signal, &window, &config)?,
    })
}

/// Inverse STFT by weighted overlap-add
#[pyfunction]
pub fn istft<'py>(
    py: Python<'py>,
    matrix: PyRef<'_, PyStftMatrix>,
) -> PyResult<&'py PyArray1<f64>> {
    let signal = spectrum::istft(&matrix.matrix)?;
    Ok(PyArray1::from_vec(py, signal.into_samples()))
}

/// Spectrum analyzer exposed to Python
#[pyclass(name = "SpectrumAnalyzer")]
pub struct PySpectrumAnalyzer {
    analyzer: SpectrumAnalyzer,
}

#[pymethods]
impl PySpectrumAnalyzer {
    /// Create a new spectrum analyzer
    ///
    /// Args:
    ///     fft_size: FFT size (number of samples)
    ///     window: Window kind for analysis (default Hann)
    ///     apply_correction: Whether to apply amplitude correction for windowing
    #[new]
    #[pyo3(signature = (fft_size=2048, window=None, apply_correction=true))]
    fn new(fft_size: usize, window: Option<PyWindowKind>, apply_correction: bool) -> PyResult<Self> {
        let config = AnalyzerConfig {
            fft_size,
            window: window_kind(window),
            apply_correction,
        };

        Ok(Self {
            analyzer: SpectrumAnalyzer::new(config)?,
        })
    }

    /// Analyze signal and return (frequencies, magnitude)
    ///
    /// Args:
    ///     signal: Input signal as numpy array
    ///     sample_rate: Sample rate in Hz
    ///     db: Magnitude in dB instead of linear
    #[pyo3(signature = (signal, sample_rate=crate::DEFAULT_SAMPLE_RATE, db=false))]
    fn analyze<'py>(
        &self,
        py: Python<'py>,
        signal: PyReadonlyArray1<f64>,
        sample_rate: f64,
        db: bool,
    ) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
        let signal = Signal::new(signal.as_array().to_vec(), sample_rate)?;
        let spectrum = self.analyzer.analyze(&signal)?;
        let scale = if db {
            MagnitudeScale::Decibels
        } else {
            MagnitudeScale::Linear
        };

        Ok((
            PyArray1::from_slice(py, spectrum.frequencies()),
            PyArray1::from_vec(py, spectrum.magnitude(scale)),
        ))
    }

    /// Frequency of the strongest non-DC bin, or None
    #[pyo3(signature = (signal, sample_rate=crate::DEFAULT_SAMPLE_RATE))]
    fn peak_frequency(&self, signal: PyReadonlyArray1<f64>, sample_rate: f64) -> PyResult<Option<f64>> {
        let signal = Signal::new(signal.as_array().to_vec(), sample_rate)?;
        Ok(self.analyzer.analyze(&signal)?.peak_frequency())
    }

    /// Get number of frequency bins
    fn num_bins(&self) -> usize {
        self.analyzer.num_bins()
    }

    /// Get current FFT size
    fn get_fft_size(&self) -> usize {
        self.analyzer.config().fft_size
    }
}
