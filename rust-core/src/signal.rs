//! Sampled signal container
//!
//! A signal owns its samples and carries its sample rate explicitly.
//! Mixing signals of different rates is the caller's responsibility; nothing here resamples.

use crate::error::{DspError, DspResult};

/// Real-valued discrete-time signal
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Create a signal
    ///
    /// # Arguments
    /// * `samples` - Sample values x[n]
    /// * `sample_rate` - Sample rate in Hz (finite, > 0)
    ///
    /// # Errors
    /// `InvalidArgument` for a non-positive sample rate or non-finite samples
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> DspResult<Self> {
        validate_sample_rate(sample_rate)?;

        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(DspError::invalid(format!(
                "sample {} is not finite ({})",
                idx, samples[idx]
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Silent signal of `length` samples
    pub fn zeros(length: usize, sample_rate: f64) -> DspResult<Self> {
        Self::new(vec![0.0; length], sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time of each sample in seconds
    pub fn timeline(&self) -> Vec<f64> {
        (0..self.samples.len())
            .map(|n| n as f64 / self.sample_rate)
            .collect()
    }
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> DspResult<()> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(DspError::invalid(format!(
            "sample rate must be finite and > 0 (got {})",
            sample_rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_basic() {
        let signal = Signal::new(vec![0.0, 0.5, 1.0, 0.5], 4.0).unwrap();

        assert_eq!(signal.len(), 4);
        assert!((signal.duration() - 1.0).abs() < 1e-12);
        assert_eq!(signal.timeline(), vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_signal_rejects_bad_input() {
        assert!(Signal::new(vec![0.0], 0.0).is_err());
        assert!(Signal::new(vec![0.0], -44100.0).is_err());
        assert!(Signal::new(vec![0.0], f64::NAN).is_err());
        assert!(Signal::new(vec![0.0, f64::INFINITY], 44100.0).is_err());
    }

    #[test]
    fn test_empty_signal_allowed() {
        let signal = Signal::zeros(0, 44100.0).unwrap();
        assert!(signal.is_empty());
    }
}
