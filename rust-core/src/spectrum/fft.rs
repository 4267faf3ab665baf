//! Full-length forward/inverse Fourier transform of a single buffer
//!
//! Any length is supported, not only powers of two. Real input goes through
//! realfft; complex input and all inverse transforms go through rustfft.
//! The forward transform is unnormalized, the inverse divides by N.

use super::analysis::{abs, arg, MagnitudeScale, PhaseMode};
use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Which bins a spectrum frame stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinLayout {
    /// All N bins
    Full,
    /// Non-redundant half of a real-input spectrum: bins 0..=N/2.
    /// Bin N-k is implicitly conj(bin k).
    #[default]
    Half,
}

impl BinLayout {
    /// Number of stored bins for a length-`n` transform
    pub fn num_bins(&self, n: usize) -> usize {
        match self {
            BinLayout::Full => n,
            BinLayout::Half => n / 2 + 1,
        }
    }
}

/// Spectrum of one buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    bins: Vec<Complex64>,
    /// Time-domain length N of the transformed buffer
    length: usize,
    layout: BinLayout,
}

impl SpectrumFrame {
    /// Wrap existing coefficients
    ///
    /// # Errors
    /// `InvalidArgument` when the bin count does not match `length` and `layout`
    pub fn new(bins: Vec<Complex64>, length: usize, layout: BinLayout) -> DspResult<Self> {
        if length == 0 {
            return Err(DspError::invalid("spectrum length must be > 0"));
        }
        let expected = layout.num_bins(length);
        if bins.len() != expected {
            return Err(DspError::invalid(format!(
                "{:?} spectrum of length {} needs {} bins, got {}",
                layout,
                length,
                expected,
                bins.len()
            )));
        }

        Ok(Self {
            bins,
            length,
            layout,
        })
    }

    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn into_bins(self) -> Vec<Complex64> {
        self.bins
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn layout(&self) -> BinLayout {
        self.layout
    }

    /// Magnitude per stored bin
    pub fn abs(&self, scale: MagnitudeScale) -> Vec<f64> {
        abs(&self.bins, scale)
    }

    /// Phase per stored bin
    pub fn arg(&self, mode: PhaseMode) -> Vec<f64> {
        arg(&self.bins, mode)
    }

    /// All N bins, conjugate-mirroring a half spectrum
    pub fn to_full(&self) -> Vec<Complex64> {
        match self.layout {
            BinLayout::Full => self.bins.clone(),
            BinLayout::Half => mirror_half(&self.bins, self.length),
        }
    }
}

/// Rebuild the full Hermitian spectrum from its first N/2+1 bins
fn mirror_half(half: &[Complex64], n: usize) -> Vec<Complex64> {
    let mut full = Vec::with_capacity(n);
    full.extend_from_slice(&half[..half.len().min(n)]);
    for k in full.len()..n {
        full.push(half[n - k].conj());
    }
    full
}

/// FFT engine for a fixed transform size
///
/// Plans are created once; every call allocates its own buffers, so a single
/// engine can be shared across worker threads.
pub struct FftEngine {
    /// FFT size (number of samples)
    size: usize,

    /// Real FFT processor
    r2c: Arc<dyn RealToComplex<f64>>,

    /// Complex forward processor
    forward: Arc<dyn Fft<f64>>,

    /// Complex inverse processor
    inverse: Arc<dyn Fft<f64>>,
}

impl FftEngine {
    /// Create new FFT engine
    ///
    /// # Arguments
    /// * `size` - FFT size (number of samples, any value > 0)
    pub fn new(size: usize) -> DspResult<Self> {
        if size == 0 {
            return Err(DspError::invalid("FFT size must be > 0"));
        }

        let r2c = RealFftPlanner::<f64>::new().plan_fft_forward(size);

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);

        Ok(Self {
            size,
            r2c,
            forward,
            inverse,
        })
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get number of frequency bins for a layout
    pub fn num_bins(&self, layout: BinLayout) -> usize {
        layout.num_bins(self.size)
    }

    fn check_len(&self, len: usize) -> DspResult<()> {
        if len != self.size {
            return Err(DspError::invalid(format!(
                "buffer length {} does not match FFT size {}",
                len, self.size
            )));
        }
        Ok(())
    }

    /// Forward transform of a real buffer
    ///
    /// # Arguments
    /// * `x` - Input buffer (length must equal the FFT size)
    /// * `crop` - Return only the Hermitian half (N/2+1 bins)
    pub fn forward_real(&self, x: &[f64], crop: bool) -> DspResult<SpectrumFrame> {
        self.check_len(x.len())?;

        let mut input = x.to_vec();
        let mut output = self.r2c.make_output_vec();
        self.r2c
            .process(&mut input, &mut output)
            .map_err(|e| DspError::invalid(format!("real FFT failed: {}", e)))?;

        let (bins, layout) = if crop {
            (output, BinLayout::Half)
        } else {
            (mirror_half(&output, self.size), BinLayout::Full)
        };

        Ok(SpectrumFrame {
            bins,
            length: self.size,
            layout,
        })
    }

    /// Forward transform of a complex buffer (full layout)
    pub fn forward(&self, x: &[Complex64]) -> DspResult<SpectrumFrame> {
        self.check_len(x.len())?;

        let mut buffer = x.to_vec();
        self.forward.process(&mut buffer);

        Ok(SpectrumFrame {
            bins: buffer,
            length: self.size,
            layout: BinLayout::Full,
        })
    }

    /// Inverse transform, scaled by 1/N
    ///
    /// Half-layout frames are conjugate-mirrored to full length first.
    pub fn inverse(&self, frame: &SpectrumFrame) -> DspResult<Vec<Complex64>> {
        self.check_len(frame.length)?;

        let mut buffer = frame.to_full();
        self.inverse.process(&mut buffer);

        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }

        Ok(buffer)
    }

    /// Inverse transform keeping only the real part
    pub fn inverse_real(&self, frame: &SpectrumFrame) -> DspResult<Vec<f64>> {
        Ok(self.inverse(frame)?.into_iter().map(|c| c.re).collect())
    }
}

/// Forward transform of a real buffer, planning for its length
pub fn forward(x: &[f64], crop: bool) -> DspResult<SpectrumFrame> {
    FftEngine::new(x.len())?.forward_real(x, crop)
}

/// Forward transform of a complex buffer, planning for its length
pub fn forward_complex(x: &[Complex64]) -> DspResult<SpectrumFrame> {
    FftEngine::new(x.len())?.forward(x)
}

/// Inverse transform of a spectrum frame
pub fn inverse(frame: &SpectrumFrame) -> DspResult<Vec<Complex64>> {
    FftEngine::new(frame.length)?.inverse(frame)
}

/// Inverse transform of a spectrum frame, real part only
pub fn inverse_real(frame: &SpectrumFrame) -> DspResult<Vec<f64>> {
    FftEngine::new(frame.length)?.inverse_real(frame)
}

/// Inverse transform of a bare half spectrum
///
/// N/2+1 bins can come from an even or odd N, so `length` is mandatory.
///
/// # Errors
/// `InvalidArgument` when `length` is missing or inconsistent with the bin count
pub fn inverse_half(bins: &[Complex64], length: Option<usize>) -> DspResult<Vec<f64>> {
    let length = length.ok_or_else(|| {
        DspError::invalid(format!(
            "{} half-spectrum bins could come from length {} or {}; length is required",
            bins.len(),
            2 * bins.len().saturating_sub(1),
            2 * bins.len().saturating_sub(1) + 1
        ))
    })?;

    let frame = SpectrumFrame::new(bins.to_vec(), length, BinLayout::Half)?;
    inverse_real(&frame)
}

/// Frequency of a bin in Hz
pub fn bin_frequency(bin: usize, size: usize, sample_rate: f64) -> f64 {
    bin as f64 * sample_rate / size as f64
}

/// Frequency axis in Hz for the stored bins of a layout
pub fn frequency_axis(size: usize, sample_rate: f64, layout: BinLayout) -> Vec<f64> {
    (0..layout.num_bins(size))
        .map(|bin| bin_frequency(bin, size, sample_rate))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Deterministic pseudo-noise in [-1, 1)
    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_fft_dc_signal() {
        let signal = vec![1.0; 100];
        let spectrum = forward(&signal, true).unwrap();

        assert_eq!(spectrum.bins().len(), 51);
        assert!((spectrum.bins()[0].re - 100.0).abs() < 1e-9);
        assert!(spectrum.bins()[10].norm() < 1e-9);
    }

    #[test]
    fn test_fft_sine_wave() {
        let n = 1000;
        let bin = 37;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * bin as f64 * i as f64 / n as f64).sin())
            .collect();

        let magnitude = forward(&signal, true).unwrap().abs(MagnitudeScale::Linear);

        let (peak_bin, &peak_mag) = magnitude
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, bin);
        // Unnormalized transform: a unit sine has magnitude N/2
        assert!((peak_mag - n as f64 / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_real() {
        for n in [1, 2, 7, 64, 1000, 1023] {
            let x = noise(n, n as u64);
            let spectrum = forward(&x, false).unwrap();
            let y = inverse_real(&spectrum).unwrap();

            assert_eq!(y.len(), n);
            for (a, b) in x.iter().zip(y.iter()) {
                assert!((a - b).abs() < 1e-12, "length {}", n);
            }
        }
    }

    #[test]
    fn test_round_trip_cropped() {
        for n in [9, 10] {
            let x = noise(n, 7);
            let spectrum = forward(&x, true).unwrap();
            assert_eq!(spectrum.bins().len(), n / 2 + 1);

            let y = inverse_real(&spectrum).unwrap();
            for (a, b) in x.iter().zip(y.iter()) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_round_trip_complex() {
        let re = noise(33, 1);
        let im = noise(33, 2);
        let x: Vec<Complex64> = re
            .iter()
            .zip(im.iter())
            .map(|(&r, &i)| Complex64::new(r, i))
            .collect();

        let y = inverse(&forward_complex(&x).unwrap()).unwrap();
        for (a, b) in x.iter().zip(y.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_hermitian_symmetry() {
        for n in [16, 17] {
            let x = noise(n, 3);
            let spectrum = forward(&x, false).unwrap();
            let bins = spectrum.bins();

            for k in 1..n {
                let mirrored = bins[n - k].conj();
                assert!((bins[k] - mirrored).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn test_half_matches_full_transform() {
        let x = noise(24, 5);
        let complex: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();

        let full = forward_complex(&complex).unwrap();
        let half = forward(&x, true).unwrap();

        for (a, b) in half.bins().iter().zip(full.bins().iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }

    #[test]
    fn test_inverse_half_requires_length() {
        let x = noise(11, 9);
        let bins = forward(&x, true).unwrap().into_bins();

        let err = inverse_half(&bins, None).unwrap_err();
        assert!(matches!(err, DspError::InvalidArgument(_)));

        // 6 bins fit length 10 or 11, not 12
        assert!(inverse_half(&bins, Some(12)).is_err());

        let y = inverse_half(&bins, Some(11)).unwrap();
        for (a, b) in x.iter().zip(y.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_engine_rejects_wrong_length() {
        let engine = FftEngine::new(8).unwrap();
        assert!(engine.forward_real(&[0.0; 7], true).is_err());
        assert!(FftEngine::new(0).is_err());
        assert!(forward(&[], true).is_err());
    }

    #[test]
    fn test_frequency_axis() {
        let freqs = frequency_axis(1024, 48000.0, BinLayout::Half);

        assert_eq!(freqs.len(), 513);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[512] - 24000.0).abs() < 1e-9);
    }
}
