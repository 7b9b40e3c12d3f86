//! Pitch units and their conversion to Hertz
//!
//! All conversions assume twelve-tone equal temperament tuned to A4 = 440 Hz.

use crate::error::{DeformError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference frequency of A4
pub const A4_HZ: f64 = 440.0;

/// MIDI number of A4
pub const A4_MIDI: f64 = 69.0;

/// Convert a (possibly fractional) MIDI number to Hertz
#[inline]
pub fn midi_to_hz(midi: f64) -> f64 {
    A4_HZ * 2.0_f64.powf((midi - A4_MIDI) / 12.0)
}

/// Convert a frequency in Hertz to a (fractional) MIDI number
#[inline]
pub fn hz_to_midi(hz: f64) -> f64 {
    12.0 * (hz / A4_HZ).log2() + A4_MIDI
}

/// Convert a note name such as `"C#4"` or `"Bb-1"` to Hertz
pub fn note_to_hz(note: &str) -> Result<f64> {
    Ok(note.parse::<PitchClass>()?.hz())
}

/// A pitch class with octave, e.g. `C#4`
///
/// The accidental is kept as a signed semitone offset, so `Db4` and `C#4`
/// are distinct values with the same frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchClass {
    /// Natural note letter, `A` to `G`
    pub letter: char,
    /// Sharps (positive) or flats (negative)
    pub accidental: i8,
    /// Scientific pitch octave (C4 is middle C)
    pub octave: i32,
}

impl PitchClass {
    /// Parse a tonic spelling (letter plus accidentals) and attach an octave
    pub fn from_tonic(tonic: &str, octave: i32) -> Result<Self> {
        let invalid = || DeformError::InvalidPitchClass {
            token: format!("{}{}", tonic, octave),
        };

        let mut chars = tonic.trim().chars();
        let letter = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| ('A'..='G').contains(c))
            .ok_or_else(invalid)?;

        let mut accidental: i8 = 0;
        for c in chars {
            accidental = match c {
                '#' | '♯' => accidental.checked_add(1),
                'b' | '♭' | '!' => accidental.checked_sub(1),
                '𝄪' => accidental.checked_add(2),
                '𝄫' => accidental.checked_sub(2),
                '♮' => Some(accidental),
                _ => None,
            }
            .ok_or_else(invalid)?;
        }

        let class = Self {
            letter,
            accidental,
            octave,
        };
        class.checked_midi().ok_or_else(invalid)?;
        Ok(class)
    }

    /// Semitone offset of the natural letter above C
    fn letter_offset(&self) -> i32 {
        match self.letter {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            _ => 11,
        }
    }

    fn checked_midi(&self) -> Option<i32> {
        self.octave
            .checked_add(1)?
            .checked_mul(12)?
            .checked_add(self.letter_offset())?
            .checked_add(self.accidental as i32)
    }

    /// MIDI note number
    ///
    /// Saturates for octaves whose note number does not fit an `i32`;
    /// [`PitchClass::from_tonic`] rejects those.
    pub fn midi(&self) -> i32 {
        self.checked_midi().unwrap_or(if self.octave < 0 {
            i32::MIN
        } else {
            i32::MAX
        })
    }

    /// Frequency in Hertz
    pub fn hz(&self) -> f64 {
        midi_to_hz(self.midi() as f64)
    }

    /// Tonic spelling without the octave, e.g. `"Bb"`
    pub fn tonic(&self) -> String {
        let mark = if self.accidental >= 0 { '#' } else { 'b' };
        let mut tonic = String::with_capacity(1 + self.accidental.unsigned_abs() as usize);
        tonic.push(self.letter);
        tonic.extend(std::iter::repeat(mark).take(self.accidental.unsigned_abs() as usize));
        tonic
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.tonic(), self.octave)
    }
}

impl FromStr for PitchClass {
    type Err = DeformError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
            .ok_or_else(|| DeformError::InvalidPitchClass {
                token: s.to_string(),
            })?;
        let (tonic, octave) = s.split_at(split);
        let octave = octave
            .parse::<i32>()
            .map_err(|_| DeformError::InvalidPitchClass {
                token: s.to_string(),
            })?;
        Self::from_tonic(tonic, octave)
    }
}

/// A pitch value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pitch {
    /// MIDI note number (may be fractional)
    Midi(f64),
    /// Frequency in Hertz
    Hz(f64),
    /// Pitch class with octave
    PitchClass(PitchClass),
}

impl Pitch {
    /// Frequency of this pitch in Hertz
    pub fn to_hz(&self) -> f64 {
        match self {
            Pitch::Midi(midi) => midi_to_hz(*midi),
            Pitch::Hz(hz) => *hz,
            Pitch::PitchClass(pc) => pc.hz(),
        }
    }
}
