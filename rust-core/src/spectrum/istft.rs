//! Inverse STFT by weighted overlap-add
//!
//! Each frame is inverse-transformed, multiplied again by the analysis window and
//! summed into the output at its original offset. The sum is divided by the
//! accumulated squared window weight per sample, which makes the reconstruction
//! exact for any window scaling wherever that weight is non-zero.

use super::fft::{FftEngine, SpectrumFrame};
use super::stft::StftMatrix;
use crate::error::{DspError, DspResult};
use crate::signal::{validate_sample_rate, Signal};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Accumulated squared weight, relative to the window's peak squared weight,
/// at or below which a sample counts as uncovered
pub const WEIGHT_EPSILON: f64 = 1e-12;

/// Reconstructed signal plus coverage diagnostics
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub signal: Signal,

    /// Output positions with zero total window weight (emitted as 0.0)
    pub uncovered: Vec<usize>,
}

impl Reconstruction {
    /// True when every output sample received window weight
    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }
}

/// Invert an STFT matrix
pub fn istft(matrix: &StftMatrix) -> DspResult<Signal> {
    Ok(istft_detailed(matrix)?.signal)
}

/// Invert an STFT matrix and report positions that no frame covered
///
/// # Errors
/// `InvalidArgument` when the matrix is internally inconsistent
pub fn istft_detailed(matrix: &StftMatrix) -> DspResult<Reconstruction> {
    validate(matrix)?;

    let n = matrix.frame_length();
    let length = matrix.signal_length();
    let window = matrix.window().weights();
    let fft = FftEngine::new(n)?;

    debug!(
        "iSTFT: {} frames × {} bins → {} samples (frame_length={}, hop={})",
        matrix.num_frames(),
        matrix.num_bins(),
        length,
        n,
        matrix.hop()
    );

    let synthesize = |index: usize| -> DspResult<Vec<f64>> {
        let bins = matrix.frames().row(index).to_vec();
        let frame = SpectrumFrame::new(bins, n, matrix.layout())?;
        let time = fft.inverse_real(&frame)?;
        Ok(time.iter().zip(window.iter()).map(|(x, w)| x * w).collect())
    };

    // Parallel map only; overlap-add below stays sequential
    #[cfg(feature = "parallel")]
    let weighted: Vec<DspResult<Vec<f64>>> =
        (0..matrix.num_frames()).into_par_iter().map(synthesize).collect();

    #[cfg(not(feature = "parallel"))]
    let weighted: Vec<DspResult<Vec<f64>>> = (0..matrix.num_frames()).map(synthesize).collect();

    let mut output = vec![0.0; length];
    let mut weight_sum = vec![0.0; length];

    for (frame, &offset) in weighted.into_iter().zip(matrix.offsets()) {
        let frame = frame?;
        for (j, (&sample, &w)) in frame.iter().zip(window.iter()).enumerate() {
            let pos = offset + j as isize;
            if pos < 0 || pos as usize >= length {
                continue;
            }
            output[pos as usize] += sample;
            weight_sum[pos as usize] += w * w;
        }
    }

    let peak_sq = window.iter().fold(0.0f64, |m, w| m.max(w * w));
    let threshold = WEIGHT_EPSILON * peak_sq;

    let mut uncovered = Vec::new();
    for (i, (sample, &weight)) in output.iter_mut().zip(weight_sum.iter()).enumerate() {
        if weight > threshold {
            *sample /= weight;
        } else {
            *sample = 0.0;
            uncovered.push(i);
        }
    }

    if !uncovered.is_empty() {
        warn!(
            "iSTFT: {} of {} samples have zero window weight and were set to 0 (first at {})",
            uncovered.len(),
            length,
            uncovered[0]
        );
    }

    Ok(Reconstruction {
        signal: Signal::new(output, matrix.sample_rate())?,
        uncovered,
    })
}

/// Consistency checks for matrices that may have been assembled by hand
fn validate(matrix: &StftMatrix) -> DspResult<()> {
    let n = matrix.frame_length();
    let hop = matrix.hop();

    if n == 0 {
        return Err(DspError::invalid("frame_length must be > 0"));
    }
    if matrix.window().len() != n {
        return Err(DspError::invalid(format!(
            "window length {} does not match frame_length {}",
            matrix.window().len(),
            n
        )));
    }
    if hop == 0 || hop > n {
        return Err(DspError::invalid(format!(
            "hop {} must satisfy 0 < hop <= frame_length ({})",
            hop, n
        )));
    }
    if matrix.num_frames() == 0 {
        return Err(DspError::invalid("STFT matrix has no frames"));
    }
    if matrix.offsets().len() != matrix.num_frames() {
        return Err(DspError::invalid(format!(
            "{} frame offsets for {} frames",
            matrix.offsets().len(),
            matrix.num_frames()
        )));
    }
    if matrix.offsets().windows(2).any(|w| w[0] > w[1]) {
        return Err(DspError::invalid("frame offsets must be non-decreasing"));
    }

    let expected_bins = matrix.layout().num_bins(n);
    if matrix.num_bins() != expected_bins {
        return Err(DspError::invalid(format!(
            "{:?} layout with frame_length {} needs {} bins, matrix has {}",
            matrix.layout(),
            n,
            expected_bins,
            matrix.num_bins()
        )));
    }
    if matrix
        .frames()
        .iter()
        .any(|c| !c.re.is_finite() || !c.im.is_finite())
    {
        return Err(DspError::invalid("STFT matrix contains non-finite coefficients"));
    }

    validate_sample_rate(matrix.sample_rate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::fft::BinLayout;
    use crate::spectrum::stft::{stft, Alignment, StftConfig};
    use crate::spectrum::window::{Normalization, Window, WindowKind};
    use ndarray::Array2;
    use num_complex::Complex64;

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

    fn round_trip(
        samples: &[f64],
        kind: WindowKind,
        normalization: Normalization,
        config: StftConfig,
    ) -> Reconstruction {
        let signal = Signal::new(samples.to_vec(), 44100.0).unwrap();
        let window = Window::new(kind, config.frame_length, normalization).unwrap();
        let matrix = stft(&signal, &window, &config).unwrap();
        istft_detailed(&matrix).unwrap()
    }

    fn assert_reconstructed(x: &[f64], result: &Reconstruction) {
        let y = result.signal.samples();
        assert_eq!(x.len(), y.len());

        let peak = x.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        for (i, (a, b)) in x.iter().zip(y.iter()).enumerate() {
            if result.uncovered.contains(&i) {
                continue;
            }
            assert!((a - b).abs() <= 1e-9 * peak, "sample {}: {} vs {}", i, a, b);
        }
    }

    #[test]
    fn test_round_trip_hann_half_overlap() {
        let x = noise(2000, 1);
        let config = StftConfig::new(256, 128);
        let result = round_trip(&x, WindowKind::Hann, Normalization::Peak, config);

        // Periodic Hann is exactly zero at the first sample of frame 0 only
        assert_eq!(result.uncovered, vec![0]);
        assert_eq!(result.signal.samples()[0], 0.0);
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_round_trip_hamming_three_quarter_overlap() {
        let x = noise(3000, 2);
        let result =
            round_trip(&x, WindowKind::Hamming, Normalization::Peak, StftConfig::new(256, 64));

        assert!(result.is_complete());
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_round_trip_centered() {
        let x = noise(1500, 3);
        let config = StftConfig {
            alignment: Alignment::Center,
            ..StftConfig::new(512, 128)
        };
        let result = round_trip(&x, WindowKind::Hann, Normalization::Peak, config);

        assert!(result.is_complete());
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_round_trip_independent_of_normalization() {
        let x = noise(1200, 4);
        for normalization in [Normalization::None, Normalization::Sum, Normalization::Energy] {
            let result =
                round_trip(&x, WindowKind::Blackman, normalization, StftConfig::new(128, 32));
            assert_reconstructed(&x, &result);
        }
    }

    #[test]
    fn test_round_trip_full_layout_odd_frame() {
        let x = noise(999, 5);
        let config = StftConfig {
            layout: BinLayout::Full,
            ..StftConfig::new(255, 85)
        };
        let result = round_trip(&x, WindowKind::Hamming, Normalization::Peak, config);

        assert!(result.is_complete());
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_short_signal_single_frame() {
        let x = noise(100, 6);
        let result =
            round_trip(&x, WindowKind::Rectangular, Normalization::Peak, StftConfig::new(256, 128));

        assert!(result.is_complete());
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_zero_weight_positions_are_reported() {
        // No overlap with a periodic Hann window: the first sample of every frame has zero weight
        let x = noise(64, 7);
        let result = round_trip(&x, WindowKind::Hann, Normalization::Peak, StftConfig::new(16, 16));

        let expected: Vec<usize> = (0..64).step_by(16).collect();
        assert_eq!(result.uncovered, expected);
        for &i in &result.uncovered {
            assert_eq!(result.signal.samples()[i], 0.0);
        }
        assert_reconstructed(&x, &result);
    }

    #[test]
    fn test_inconsistent_matrix_rejected() {
        let signal = Signal::new(noise(600, 8), 8000.0).unwrap();
        let config = StftConfig::new(128, 64);
        let window = Window::new(WindowKind::Hann, 128, Normalization::Peak).unwrap();
        let matrix = stft(&signal, &window, &config).unwrap();

        // Window of the wrong length
        let short_window = Window::new(WindowKind::Hann, 64, Normalization::Peak).unwrap();
        let broken = StftMatrix::from_parts(
            matrix.frames().clone(),
            matrix.offsets().to_vec(),
            short_window,
            config.clone(),
            8000.0,
            600,
        );
        let err = istft(&broken).unwrap_err();
        assert!(matches!(err, DspError::InvalidArgument(_)));

        // Bin count that does not match the frame length
        let broken = StftMatrix::from_parts(
            Array2::<Complex64>::zeros((matrix.num_frames(), 10)),
            matrix.offsets().to_vec(),
            window.clone(),
            config.clone(),
            8000.0,
            600,
        );
        assert!(istft(&broken).is_err());

        // Offsets out of order
        let mut offsets = matrix.offsets().to_vec();
        offsets.swap(0, 1);
        let broken = StftMatrix::from_parts(
            matrix.frames().clone(),
            offsets,
            window.clone(),
            config.clone(),
            8000.0,
            600,
        );
        assert!(istft(&broken).is_err());

        // Missing offsets
        let broken = StftMatrix::from_parts(
            matrix.frames().clone(),
            vec![0],
            window,
            config,
            8000.0,
            600,
        );
        assert!(istft(&broken).is_err());
    }
}
