//! Equal-tempered pitch mapping
//!
//! Semitones are counted from C0, which sits 57 semitones below the concert pitch
//! (A4). Semitone 0 is C0, 57 is A4.

use crate::error::{DspError, DspResult};
use crate::DEFAULT_CONCERT_PITCH;
use std::fmt;

/// Semitones from C0 up to A4
const A4_SEMITONE: i32 = 9 + 4 * 12;

/// Note names of the chromatic scale, sharps only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Name of a semitone index; any integer is reduced modulo 12
    pub fn from_semitone(semitone: i32) -> Self {
        Self::ALL[semitone.rem_euclid(12) as usize]
    }

    /// Position within the octave (C = 0, B = 11)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 12 note names starting at C
pub fn scale() -> [NoteName; 12] {
    NoteName::ALL
}

/// Nearest equal-tempered note to a frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pitch {
    pub name: NoteName,
    pub octave: i32,

    /// Semitones from C0
    pub semitone: i32,

    /// Deviation from the note in cents, in [-50, 50]
    pub cents: f64,
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} ({:+.1} cents)", self.name, self.octave, self.cents)
    }
}

/// Maps between frequencies and equal-tempered notes for a given concert pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchMapper {
    concert_pitch: f64,
    c0: f64,
}

impl Default for PitchMapper {
    fn default() -> Self {
        Self {
            concert_pitch: DEFAULT_CONCERT_PITCH,
            c0: c0_for(DEFAULT_CONCERT_PITCH),
        }
    }
}

impl PitchMapper {
    /// Create a mapper
    ///
    /// # Arguments
    /// * `concert_pitch` - Frequency of A4 in Hz
    pub fn new(concert_pitch: f64) -> DspResult<Self> {
        validate_frequency(concert_pitch)?;

        Ok(Self {
            concert_pitch,
            c0: c0_for(concert_pitch),
        })
    }

    pub fn concert_pitch(&self) -> f64 {
        self.concert_pitch
    }

    /// Frequency of C0 in Hz
    pub fn c0(&self) -> f64 {
        self.c0
    }

    /// Nearest semitone index counted from C0
    pub fn semitone(&self, frequency: f64) -> DspResult<i32> {
        Ok(self.fractional_semitone(frequency)?.round() as i32)
    }

    /// Nearest semitone within its octave (0..12)
    pub fn relative_semitone(&self, frequency: f64) -> DspResult<i32> {
        Ok(self.semitone(frequency)?.rem_euclid(12))
    }

    pub fn octave(&self, frequency: f64) -> DspResult<i32> {
        Ok(self.semitone(frequency)?.div_euclid(12))
    }

    /// Nearest note with its deviation in cents
    pub fn note(&self, frequency: f64) -> DspResult<Pitch> {
        let exact = self.fractional_semitone(frequency)?;
        let semitone = exact.round() as i32;

        Ok(Pitch {
            name: NoteName::from_semitone(semitone),
            octave: semitone.div_euclid(12),
            semitone,
            cents: 100.0 * (exact - semitone as f64),
        })
    }

    /// Frequency of a semitone within an octave: C0·2^(semitone/12 + octave)
    pub fn frequency(&self, semitone: i32, octave: i32) -> f64 {
        self.c0 * 2f64.powf(semitone as f64 / 12.0 + octave as f64)
    }

    fn fractional_semitone(&self, frequency: f64) -> DspResult<f64> {
        validate_frequency(frequency)?;
        Ok(12.0 * (frequency / self.c0).log2())
    }
}

#[inline]
fn c0_for(concert_pitch: f64) -> f64 {
    concert_pitch * 2f64.powf(-(A4_SEMITONE as f64) / 12.0)
}

fn validate_frequency(frequency: f64) -> DspResult<()> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(DspError::invalid(format!(
            "frequency must be finite and > 0 (got {})",
            frequency
        )));
    }
    Ok(())
}
