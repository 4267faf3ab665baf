//! Window functions for spectral analysis and FIR design
//!
//! Windows carry their kind, symmetry and normalization alongside the weights,
//! since the overlap-add inverse has to reproduce exactly the analysis weighting.

use crate::error::{DspError, DspResult};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Default Kaiser shape parameter when parsed from a bare "kaiser" name
pub const DEFAULT_KAISER_BETA: f64 = 8.6;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowKind {
    /// Rectangular window (no windowing)
    Rectangular,

    /// Triangular window: w[n] = 1 - |2n/(M-1) - 1|
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~25 dB
    Bartlett,

    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~44 dB
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~53 dB
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Mainlobe width: 12π/M, Sidelobe attenuation: ~74 dB
    Blackman,

    /// Kaiser window: w[n] = I0(β·sqrt(1 - (2n/(M-1) - 1)²)) / I0(β)
    Kaiser { beta: f64 },
}

/// Scaling applied to the raw window formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Raw formula values
    None,
    /// Largest weight is 1
    #[default]
    Peak,
    /// Weights sum to 1
    Sum,
    /// Squared weights sum to 1
    Energy,
}

/// Symmetric windows suit FIR design; periodic (DFT-even) windows suit spectral analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symmetry {
    Symmetric,
    Periodic,
}

impl WindowKind {
    /// Get mainlobe width factor (mainlobe width = factor·π/M)
    pub fn mainlobe_width_factor(&self) -> f64 {
        match self {
            WindowKind::Rectangular => 4.0,
            WindowKind::Bartlett => 8.0,
            WindowKind::Hann => 8.0,
            WindowKind::Hamming => 8.0,
            WindowKind::Blackman => 12.0,
            WindowKind::Kaiser { beta } => 4.0 * (1.0 + (beta / PI).powi(2)).sqrt(),
        }
    }

    /// Calculate required filter length M for given transition width
    /// Based on Table 7.1 from Oppenheim & Schafer
    ///
    /// # Arguments
    /// * `delta_omega` - Transition width in radians
    ///
    /// # Returns
    /// Filter length M (odd number for Type I linear phase)
    pub fn filter_length(&self, delta_omega: f64) -> usize {
        let m = (self.mainlobe_width_factor() * PI / delta_omega).ceil() as usize;

        if m % 2 == 0 {
            m + 1
        } else {
            m
        }
    }

    fn validate(&self) -> DspResult<()> {
        if let WindowKind::Kaiser { beta } = self {
            if !beta.is_finite() || *beta < 0.0 {
                return Err(DspError::invalid(format!(
                    "kaiser beta must be finite and >= 0 (got {})",
                    beta
                )));
            }
        }
        Ok(())
    }

    /// Raw symmetric weight at position n of an M-point window (M >= 2)
    fn weight(&self, n: usize, m: usize) -> f64 {
        let denom = (m - 1) as f64;
        let x = n as f64 / denom;

        match self {
            WindowKind::Rectangular => 1.0,
            WindowKind::Bartlett => 1.0 - (2.0 * x - 1.0).abs(),
            WindowKind::Hann => 0.5 - 0.5 * (2.0 * PI * x).cos(),
            WindowKind::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
            WindowKind::Blackman => {
                0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
            }
            WindowKind::Kaiser { beta } => {
                let r = 2.0 * x - 1.0;
                let arg = (1.0 - r * r).max(0.0).sqrt();
                (ln_bessel_i0(beta * arg) - ln_bessel_i0(*beta)).exp()
            }
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKind::Rectangular => write!(f, "rectangular"),
            WindowKind::Bartlett => write!(f, "bartlett"),
            WindowKind::Hann => write!(f, "hann"),
            WindowKind::Hamming => write!(f, "hamming"),
            WindowKind::Blackman => write!(f, "blackman"),
            WindowKind::Kaiser { beta } => write!(f, "kaiser:{}", beta),
        }
    }
}

impl FromStr for WindowKind {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();

        if let Some(beta) = name.strip_prefix("kaiser:") {
            let beta: f64 = beta
                .parse()
                .map_err(|_| DspError::invalid(format!("invalid kaiser beta '{}'", beta)))?;
            let kind = WindowKind::Kaiser { beta };
            kind.validate()?;
            return Ok(kind);
        }

        match name.as_str() {
            "rect" | "rectangular" | "boxcar" => Ok(WindowKind::Rectangular),
            "triangular" | "bartlett" => Ok(WindowKind::Bartlett),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            "hamming" => Ok(WindowKind::Hamming),
            "blackman" => Ok(WindowKind::Blackman),
            "kaiser" => Ok(WindowKind::Kaiser {
                beta: DEFAULT_KAISER_BETA,
            }),
            _ => Err(DspError::invalid(format!("unrecognized window kind '{}'", s))),
        }
    }
}

/// Window weights plus the metadata that produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    weights: Vec<f64>,
    kind: WindowKind,
    normalization: Normalization,
    symmetry: Symmetry,
}

impl Window {
    /// Periodic (DFT-even) window for spectral analysis
    ///
    /// # Arguments
    /// * `kind` - Window function
    /// * `length` - Number of samples (M > 0)
    /// * `normalization` - Scaling applied after generation
    pub fn new(kind: WindowKind, length: usize, normalization: Normalization) -> DspResult<Self> {
        Self::generate(kind, length, normalization, Symmetry::Periodic)
    }

    /// Symmetric window, as used by the windowing method of FIR design
    pub fn symmetric(
        kind: WindowKind,
        length: usize,
        normalization: Normalization,
    ) -> DspResult<Self> {
        Self::generate(kind, length, normalization, Symmetry::Symmetric)
    }

    pub fn generate(
        kind: WindowKind,
        length: usize,
        normalization: Normalization,
        symmetry: Symmetry,
    ) -> DspResult<Self> {
        if length == 0 {
            return Err(DspError::invalid("window length must be > 0"));
        }
        kind.validate()?;

        // Degenerate window
        if length == 1 {
            return Ok(Self {
                weights: vec![1.0],
                kind,
                normalization,
                symmetry,
            });
        }

        // A periodic window is the symmetric M+1 window without its last point
        let m = match symmetry {
            Symmetry::Symmetric => length,
            Symmetry::Periodic => length + 1,
        };

        let mut weights: Vec<f64> = (0..length)
            .map(|n| kind.weight(n, m).max(0.0))
            .collect();

        let divisor = match normalization {
            Normalization::None => 1.0,
            Normalization::Peak => weights.iter().cloned().fold(0.0, f64::max),
            Normalization::Sum => weights.iter().sum(),
            Normalization::Energy => weights.iter().map(|w| w * w).sum::<f64>().sqrt(),
        };

        // All-zero windows (e.g. symmetric Hann with M = 2) are left as they are
        if divisor > 0.0 && divisor != 1.0 {
            for w in weights.iter_mut() {
                *w /= divisor;
            }
        }

        Ok(Self {
            weights,
            kind,
            normalization,
            symmetry,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Multiply a frame elementwise by the window
    pub fn apply(&self, frame: &[f64]) -> DspResult<Vec<f64>> {
        if frame.len() != self.weights.len() {
            return Err(DspError::invalid(format!(
                "frame length {} does not match window length {}",
                frame.len(),
                self.weights.len()
            )));
        }

        Ok(frame
            .iter()
            .zip(self.weights.iter())
            .map(|(&s, &w)| s * w)
            .collect())
    }

    /// Amplitude correction factor
    ///
    /// Windowing reduces the signal amplitude; multiply FFT magnitudes by this to compensate.
    pub fn amplitude_correction(&self) -> f64 {
        let sum: f64 = self.weights.iter().sum();
        self.weights.len() as f64 / sum
    }

    /// Power correction factor (for power spectral density)
    pub fn power_correction(&self) -> f64 {
        let sum_sq: f64 = self.weights.iter().map(|&w| w * w).sum();
        self.weights.len() as f64 / sum_sq
    }
}

/// Above this argument I0 is taken from its asymptotic expansion
const BESSEL_ASYMPTOTIC_THRESHOLD: f64 = 500.0;

/// Natural log of the zeroth-order modified Bessel function of the first kind
///
/// Power series below the threshold, asymptotic expansion
/// I0(x) ≈ e^x / sqrt(2πx) · Σ ((2k-1)!!)² / (k! (8x)^k) above it.
fn ln_bessel_i0(x: f64) -> f64 {
    if x >= BESSEL_ASYMPTOTIC_THRESHOLD {
        let inv = 1.0 / (8.0 * x);
        let series = 1.0 + inv * (1.0 + inv * (4.5 + inv * (37.5 + inv * 459.375)));
        return x - 0.5 * (2.0 * PI * x).ln() + series.ln();
    }

    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;

    loop {
        term *= (half / k) * (half / k);
        if !term.is_finite() {
            break;
        }
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
        k += 1.0;
    }

    sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [WindowKind; 6] = [
        WindowKind::Rectangular,
        WindowKind::Bartlett,
        WindowKind::Hann,
        WindowKind::Hamming,
        WindowKind::Blackman,
        WindowKind::Kaiser { beta: 8.6 },
    ];

    #[test]
    fn test_window_length_invariant() {
        for kind in ALL_KINDS {
            for n in [1, 2, 17, 1024] {
                for norm in [Normalization::None, Normalization::Peak, Normalization::Energy] {
                    let periodic = Window::new(kind, n, norm).unwrap();
                    let symmetric = Window::symmetric(kind, n, norm).unwrap();
                    assert_eq!(periodic.len(), n, "{} periodic", kind);
                    assert_eq!(symmetric.len(), n, "{} symmetric", kind);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_length_one() {
        for kind in ALL_KINDS {
            let window = Window::new(kind, 1, Normalization::Sum).unwrap();
            assert_eq!(window.weights(), &[1.0]);
        }
    }

    #[test]
    fn test_zero_length_rejected() {
        let err = Window::new(WindowKind::Hann, 0, Normalization::Peak).unwrap_err();
        assert!(matches!(err, DspError::InvalidArgument(_)));
    }

    #[test]
    fn test_filter_length_calculation() {
        let delta_omega = 0.05 * PI;

        let m_hann = WindowKind::Hann.filter_length(delta_omega);
        let m_hamming = WindowKind::Hamming.filter_length(delta_omega);
        let m_blackman = WindowKind::Blackman.filter_length(delta_omega);

        assert_eq!(m_hann, 161);
        assert_eq!(m_hamming, 161);
        assert_eq!(m_blackman, 241);

        // Kaiser with beta = 0 is a rectangular window
        let m_kaiser = WindowKind::Kaiser { beta: 0.0 }.filter_length(delta_omega);
        assert_eq!(m_kaiser, WindowKind::Rectangular.filter_length(delta_omega));
    }

    #[test]
    fn test_symmetric_windows() {
        let length = 161;

        for kind in [WindowKind::Hann, WindowKind::Hamming, WindowKind::Blackman] {
            let w = Window::symmetric(kind, length, Normalization::None).unwrap();
            let w = w.weights();

            // Endpoints match, center is 1.0
            assert!((w[0] - w[length - 1]).abs() < 1e-10);
            assert!((w[length / 2] - 1.0).abs() < 1e-10);
        }

        let hamming = Window::symmetric(WindowKind::Hamming, length, Normalization::None).unwrap();
        assert!(hamming.weights()[0] > 0.07 && hamming.weights()[0] < 0.09);
    }

    #[test]
    fn test_periodic_hann() {
        // Periodic Hann of length 4: [0, 0.5, 1, 0.5]
        let w = Window::new(WindowKind::Hann, 4, Normalization::None).unwrap();
        let expected = [0.0, 0.5, 1.0, 0.5];
        for (a, b) in w.weights().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bartlett_shape() {
        let w = Window::symmetric(WindowKind::Bartlett, 5, Normalization::None).unwrap();
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (a, b) in w.weights().iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kaiser_window() {
        let w = Window::symmetric(WindowKind::Kaiser { beta: 5.0 }, 33, Normalization::None)
            .unwrap();
        let w = w.weights();

        assert!((w[16] - 1.0).abs() < 1e-12);
        assert!((w[0] - (-ln_bessel_i0(5.0)).exp()).abs() < 1e-12);
        assert!((w[3] - w[29]).abs() < 1e-12);

        assert!(Window::new(WindowKind::Kaiser { beta: -1.0 }, 8, Normalization::Peak).is_err());
        assert!(ln_bessel_i0(0.0).abs() < 1e-15);
        assert!((ln_bessel_i0(1.0).exp() - 1.266_065_877_752_008_4).abs() < 1e-12);
    }

    #[test]
    fn test_kaiser_large_beta() {
        for beta in [800.0, 1000.0] {
            let kind = WindowKind::Kaiser { beta };

            let window = Window::symmetric(kind, 17, Normalization::None).unwrap();
            let w = window.weights();
            assert!((w[8] - 1.0).abs() < 1e-12);
            assert!(w.iter().all(|&v| v.is_finite() && v >= 0.0));
            assert!((w[3] - w[13]).abs() < 1e-12);
            assert!(w[7] < 1.0 && w[7] > w[6]);

            let w = Window::new(kind, 16, Normalization::Peak).unwrap();
            let max = w.weights().iter().cloned().fold(0.0, f64::max);
            assert!(w.weights().iter().all(|&v| v.is_finite() && v >= 0.0));
            assert!((max - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bessel_i0_branches_agree() {
        let below = ln_bessel_i0(BESSEL_ASYMPTOTIC_THRESHOLD - 1e-12);
        let at = ln_bessel_i0(BESSEL_ASYMPTOTIC_THRESHOLD);
        assert!((below - at).abs() < 1e-10);

        assert!(ln_bessel_i0(2000.0).is_finite());
    }

    #[test]
    fn test_normalization_modes() {
        let n = 64;

        let peak = Window::new(WindowKind::Hann, n, Normalization::Peak).unwrap();
        let max = peak.weights().iter().cloned().fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-12);

        let sum = Window::new(WindowKind::Hamming, n, Normalization::Sum).unwrap();
        assert!((sum.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);

        let energy = Window::new(WindowKind::Blackman, n, Normalization::Energy).unwrap();
        let sum_sq: f64 = energy.weights().iter().map(|w| w * w).sum();
        assert!((sum_sq - 1.0).abs() < 1e-12);

        assert!(energy.weights().iter().all(|&w| w >= 0.0));
    }

    #[test]
    fn test_parse_window_kind() {
        assert_eq!("hann".parse::<WindowKind>().unwrap(), WindowKind::Hann);
        assert_eq!("Rect".parse::<WindowKind>().unwrap(), WindowKind::Rectangular);
        assert_eq!("triangular".parse::<WindowKind>().unwrap(), WindowKind::Bartlett);
        assert_eq!(
            "kaiser:5".parse::<WindowKind>().unwrap(),
            WindowKind::Kaiser { beta: 5.0 }
        );
        assert_eq!(
            "kaiser".parse::<WindowKind>().unwrap(),
            WindowKind::Kaiser { beta: DEFAULT_KAISER_BETA }
        );

        let err = "gaussian".parse::<WindowKind>().unwrap_err();
        assert!(matches!(err, DspError::InvalidArgument(_)));
        assert!("kaiser:abc".parse::<WindowKind>().is_err());
    }

    #[test]
    fn test_apply_window() {
        let window = Window::symmetric(WindowKind::Hamming, 101, Normalization::None).unwrap();
        let windowed = window.apply(&vec![1.0; 101]).unwrap();

        assert!((windowed[50] - 1.0).abs() < 0.01);
        assert!(windowed[0] < 0.1);
        assert!(windowed[100] < 0.1);

        assert!(window.apply(&[1.0; 100]).is_err());
    }

    #[test]
    fn test_correction_factor() {
        let rect = Window::new(WindowKind::Rectangular, 100, Normalization::None).unwrap();
        let hamming = Window::new(WindowKind::Hamming, 100, Normalization::None).unwrap();

        assert!((rect.amplitude_correction() - 1.0).abs() < 0.01);

        let factor = hamming.amplitude_correction();
        assert!(factor > 1.5 && factor < 2.5);
        assert!(hamming.power_correction() > factor);
    }
}
