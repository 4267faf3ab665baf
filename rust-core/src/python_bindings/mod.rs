//! PyO3 bindings for Python integration

use crate::error::DspError;
use pyo3::exceptions::{PyArithmeticError, PyValueError, PyZeroDivisionError};
use pyo3::prelude::*;

mod filter_bindings;
mod pitch_bindings;
mod spectrum_bindings;

impl From<DspError> for PyErr {
    fn from(err: DspError) -> PyErr {
        match err {
            DspError::InvalidArgument(_) => PyValueError::new_err(err.to_string()),
            DspError::DivisionByZero(_) => PyZeroDivisionError::new_err(err.to_string()),
            DspError::NumericalInstability(_) => PyArithmeticError::new_err(err.to_string()),
        }
    }
}

/// Python module definition
#[pymodule]
fn dsp_toolkit(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PyWindowKind>()?;
    m.add_class::<spectrum_bindings::PyStftMatrix>()?;
    m.add_class::<spectrum_bindings::PySpectrumAnalyzer>()?;
    m.add_class::<pitch_bindings::PyPitchMapper>()?;

    m.add_function(wrap_pyfunction!(spectrum_bindings::window, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::stft, m)?)?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::istft, m)?)?;

    m.add_function(wrap_pyfunction!(filter_bindings::poles_zeros_gain, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::frequency_response, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::freqz, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::impulse_response, m)?)?;
    m.add_function(wrap_pyfunction!(filter_bindings::design_fir, m)?)?;

    m.add("DEFAULT_SAMPLE_RATE", crate::DEFAULT_SAMPLE_RATE)?;
    m.add("DEFAULT_CONCERT_PITCH", crate::DEFAULT_CONCERT_PITCH)?;

    Ok(())
}
