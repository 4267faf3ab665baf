//! Short-time Fourier transform
//!
//! Slides a window of `frame_length` samples across the signal with step `hop`,
//! windows each frame and transforms it. Frames are rows of the output matrix,
//! ordered by start offset.
//!
//! Frame count for the default (start-aligned, zero-padded) layout:
//! `ceil((len - frame_length) / hop) + 1`, or 1 when the signal fits in one frame.

use super::analysis::{to_db, unwrap_phase, wrap_phase, MagnitudeScale, PhaseMode};
use super::fft::{frequency_axis, BinLayout, FftEngine, SpectrumFrame};
use super::window::Window;
use crate::error::{DspError, DspResult};
use crate::signal::Signal;
use ndarray::{Array2, ArrayView1};
use num_complex::Complex64;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Treatment of the final partial frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Padding {
    /// Zero-pad the last frame so every sample is covered
    #[default]
    ZeroPad,
    /// Drop frames that would run past the end of the signal
    Truncate,
}

/// Position of the first frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// First frame starts at sample 0
    #[default]
    Start,
    /// First frame is centered on sample 0 (frame_length/2 zeros pre-padded)
    Center,
}

/// STFT configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StftConfig {
    /// Frame length in samples (also the transform size)
    pub frame_length: usize,

    /// Hop between frame starts (0 < hop <= frame_length)
    pub hop: usize,

    pub padding: Padding,

    pub alignment: Alignment,

    /// Keep only the non-redundant half of each spectrum
    pub layout: BinLayout,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop: 512,
            padding: Padding::ZeroPad,
            alignment: Alignment::Start,
            layout: BinLayout::Half,
        }
    }
}

impl StftConfig {
    /// Config with the given frame length and hop, defaults elsewhere
    pub fn new(frame_length: usize, hop: usize) -> Self {
        Self {
            frame_length,
            hop,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> DspResult<()> {
        if self.frame_length == 0 {
            return Err(DspError::invalid("frame_length must be > 0"));
        }
        if self.hop == 0 {
            return Err(DspError::invalid("hop must be > 0"));
        }
        if self.hop > self.frame_length {
            return Err(DspError::invalid(format!(
                "hop ({}) must be <= frame_length ({})",
                self.hop, self.frame_length
            )));
        }
        Ok(())
    }

    /// Zeros inserted before sample 0
    pub fn pre_padding(&self) -> usize {
        match self.alignment {
            Alignment::Start => 0,
            Alignment::Center => self.frame_length / 2,
        }
    }

    /// Number of frames produced for a signal of `signal_len` samples
    pub fn frame_count(&self, signal_len: usize) -> DspResult<usize> {
        if signal_len == 0 {
            return Err(DspError::invalid("cannot transform an empty signal"));
        }

        let padded = signal_len + self.pre_padding();
        let n = self.frame_length;

        match self.padding {
            Padding::ZeroPad if padded <= n => Ok(1),
            Padding::ZeroPad => Ok((padded - n).div_ceil(self.hop) + 1),
            Padding::Truncate if padded < n => Err(DspError::invalid(format!(
                "signal of {} samples is shorter than one frame ({}) and truncation drops partial frames",
                signal_len, n
            ))),
            Padding::Truncate => Ok((padded - n) / self.hop + 1),
        }
    }

    /// Start offset of frame `index` relative to sample 0
    pub fn frame_offset(&self, index: usize) -> isize {
        (index * self.hop) as isize - self.pre_padding() as isize
    }
}

/// Time-frequency matrix produced by the STFT
///
/// Rows are frames, columns are frequency bins.
#[derive(Debug, Clone)]
pub struct StftMatrix {
    frames: Array2<Complex64>,
    offsets: Vec<isize>,
    window: Window,
    config: StftConfig,
    sample_rate: f64,
    signal_length: usize,
}

impl StftMatrix {
    /// Assemble a matrix from raw parts without validation
    ///
    /// `istft` checks consistency before using it.
    pub fn from_parts(
        frames: Array2<Complex64>,
        offsets: Vec<isize>,
        window: Window,
        config: StftConfig,
        sample_rate: f64,
        signal_length: usize,
    ) -> Self {
        Self {
            frames,
            offsets,
            window,
            config,
            sample_rate,
            signal_length,
        }
    }

    pub fn frames(&self) -> &Array2<Complex64> {
        &self.frames
    }

    pub fn into_frames(self) -> Array2<Complex64> {
        self.frames
    }

    /// Spectrum of one frame
    pub fn frame(&self, index: usize) -> Option<SpectrumFrame> {
        if index >= self.frames.nrows() {
            return None;
        }
        let bins = self.frames.row(index).to_vec();
        SpectrumFrame::new(bins, self.config.frame_length, self.config.layout).ok()
    }

    /// Start offset of each frame (negative when center-aligned)
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn config(&self) -> &StftConfig {
        &self.config
    }

    pub fn frame_length(&self) -> usize {
        self.config.frame_length
    }

    pub fn hop(&self) -> usize {
        self.config.hop
    }

    pub fn layout(&self) -> BinLayout {
        self.config.layout
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Length of the analyzed signal
    pub fn signal_length(&self) -> usize {
        self.signal_length
    }

    pub fn num_frames(&self) -> usize {
        self.frames.nrows()
    }

    pub fn num_bins(&self) -> usize {
        self.frames.ncols()
    }

    /// Frequency of each bin in Hz
    pub fn frequencies(&self) -> Vec<f64> {
        frequency_axis(self.config.frame_length, self.sample_rate, self.config.layout)
    }

    /// Time of each frame center in seconds
    pub fn times(&self) -> Vec<f64> {
        let half = (self.config.frame_length / 2) as f64;
        self.offsets
            .iter()
            .map(|&offset| (offset as f64 + half) / self.sample_rate)
            .collect()
    }

    /// Magnitude spectrogram (frames × bins)
    pub fn magnitude(&self, scale: MagnitudeScale) -> Array2<f64> {
        match scale {
            MagnitudeScale::Linear => self.frames.mapv(|c| c.norm()),
            MagnitudeScale::Decibels => self.frames.mapv(|c| to_db(c.norm())),
        }
    }

    /// Phasogram (frames × bins); unwrapping runs along frequency within each frame
    pub fn phase(&self, mode: PhaseMode) -> Array2<f64> {
        let mut phase = self.frames.mapv(|c| wrap_phase(c.arg()));

        if mode == PhaseMode::Unwrapped {
            for mut row in phase.rows_mut() {
                let unwrapped = unwrap_phase(&row.to_vec());
                row.assign(&ArrayView1::from(&unwrapped[..]));
            }
        }

        phase
    }
}

/// STFT processor bound to one configuration and window
pub struct StftEngine {
    config: StftConfig,
    window: Window,
    fft: FftEngine,
}

impl StftEngine {
    /// Create an engine
    ///
    /// # Errors
    /// `InvalidArgument` for an invalid config or a window whose length differs from
    /// `frame_length`
    pub fn new(config: StftConfig, window: Window) -> DspResult<Self> {
        config.validate()?;

        if window.len() != config.frame_length {
            return Err(DspError::invalid(format!(
                "window length {} does not match frame_length {}",
                window.len(),
                config.frame_length
            )));
        }

        let fft = FftEngine::new(config.frame_length)?;

        Ok(Self {
            config,
            window,
            fft,
        })
    }

    pub fn config(&self) -> &StftConfig {
        &self.config
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Transform a signal into its time-frequency matrix
    pub fn process(&self, signal: &Signal) -> DspResult<StftMatrix> {
        let num_frames = self.config.frame_count(signal.len())?;
        let num_bins = self.config.layout.num_bins(self.config.frame_length);

        debug!(
            "STFT: {} samples → {} frames × {} bins (frame_length={}, hop={})",
            signal.len(),
            num_frames,
            num_bins,
            self.config.frame_length,
            self.config.hop
        );

        let offsets: Vec<isize> = (0..num_frames)
            .map(|i| self.config.frame_offset(i))
            .collect();

        #[cfg(feature = "parallel")]
        let spectra: Vec<DspResult<SpectrumFrame>> = offsets
            .par_iter()
            .map(|&offset| self.transform_frame(signal.samples(), offset))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let spectra: Vec<DspResult<SpectrumFrame>> = offsets
            .iter()
            .map(|&offset| self.transform_frame(signal.samples(), offset))
            .collect();

        let mut frames = Array2::<Complex64>::zeros((num_frames, num_bins));
        for (mut row, spectrum) in frames.rows_mut().into_iter().zip(spectra) {
            let spectrum = spectrum?;
            row.assign(&ArrayView1::from(spectrum.bins()));
        }

        Ok(StftMatrix {
            frames,
            offsets,
            window: self.window.clone(),
            config: self.config.clone(),
            sample_rate: signal.sample_rate(),
            signal_length: signal.len(),
        })
    }

    /// Extract, window and transform the frame starting at `offset`
    fn transform_frame(&self, samples: &[f64], offset: isize) -> DspResult<SpectrumFrame> {
        let frame: Vec<f64> = self
            .window
            .weights()
            .iter()
            .enumerate()
            .map(|(j, &w)| {
                let idx = offset + j as isize;
                if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize] * w
                } else {
                    0.0
                }
            })
            .collect();

        self.fft
            .forward_real(&frame, self.config.layout == BinLayout::Half)
    }
}

/// Compute the STFT of a signal
///
/// # Arguments
/// * `signal` - Input signal
/// * `window` - Analysis window (length must equal `config.frame_length`)
/// * `config` - Frame length, hop, padding, alignment and bin layout
pub fn stft(signal: &Signal, window: &Window, config: &StftConfig) -> DspResult<StftMatrix> {
    StftEngine::new(config.clone(), window.clone())?.process(signal)
}
