//! Windows, FFT, STFT and the overlap-add inverse

pub mod analysis;
pub mod fft;
pub mod istft;
pub mod stft;
pub mod window;

pub use analysis::{AnalyzerConfig, MagnitudeScale, PhaseMode, Spectrum, SpectrumAnalyzer};
pub use fft::{BinLayout, FftEngine, SpectrumFrame};
pub use istft::{istft, istft_detailed, Reconstruction};
pub use stft::{stft, Alignment, Padding, StftConfig, StftEngine, StftMatrix};
pub use window::{Normalization, Symmetry, Window, WindowKind};
