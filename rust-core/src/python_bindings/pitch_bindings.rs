//! Python bindings for pitch mapping

use crate::pitch::{scale, PitchMapper};
use pyo3::prelude::*;

/// Equal-tempered pitch mapper exposed to Python
#[pyclass(name = "PitchMapper")]
pub struct PyPitchMapper {
    mapper: PitchMapper,
}

#[pymethods]
impl PyPitchMapper {
    /// Create a pitch mapper
    ///
    /// Args:
    ///     concert_pitch: Frequency of A4 in Hz
    #[new]
    #[pyo3(signature = (concert_pitch=crate::DEFAULT_CONCERT_PITCH))]
    fn new(concert_pitch: f64) -> PyResult<Self> {
        Ok(Self {
            mapper: PitchMapper::new(concert_pitch)?,
        })
    }

    /// Nearest semitone counted from C0
    ///
    /// Args:
    ///     frequency: Frequency in Hz
    ///     relative: Reduce to the position within the octave (0..12)
    #[pyo3(signature = (frequency, relative=false))]
    fn semitone(&self, frequency: f64, relative: bool) -> PyResult<i32> {
        let semitone = if relative {
            self.mapper.relative_semitone(frequency)?
        } else {
            self.mapper.semitone(frequency)?
        };
        Ok(semitone)
    }

    fn octave(&self, frequency: f64) -> PyResult<i32> {
        Ok(self.mapper.octave(frequency)?)
    }

    /// Nearest note as (name, octave, cents)
    fn note(&self, frequency: f64) -> PyResult<(String, i32, f64)> {
        let pitch = self.mapper.note(frequency)?;
        Ok((pitch.name.to_string(), pitch.octave, pitch.cents))
    }

    /// Frequency in Hz of a semitone within an octave
    #[pyo3(signature = (semitone, octave=0))]
    fn frequency(&self, semitone: i32, octave: i32) -> f64 {
        self.mapper.frequency(semitone, octave)
    }

    /// Note names starting at C
    #[staticmethod]
    fn scale() -> Vec<&'static str> {
        scale().iter().map(|name| name.as_str()).collect()
    }

    #[getter]
    fn concert_pitch(&self) -> f64 {
        self.mapper.concert_pitch()
    }
}
