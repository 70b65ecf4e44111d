//! Concrete pitch spelling: letters, accidentals and octaves.
//!
//! Octaves follow scientific pitch notation, so `C4` is MIDI note 60.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ScoreError, ScoreResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}
impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Position of the letter from C, 0..=6.
    pub fn number(self) -> i32 {
        self as i32
    }

    /// Wraps any integer into the letters cycle.
    pub fn from_number(number: i32) -> Self {
        Self::ALL[number.rem_euclid(7) as usize]
    }

    /// Half steps of the natural note above C.
    pub fn natural_half_steps(self) -> i32 {
        [0, 2, 4, 5, 7, 9, 11][self as usize]
    }

    pub fn lilypond(self) -> char {
        ['c', 'd', 'e', 'f', 'g', 'a', 'b'][self as usize]
    }
}
impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lilypond().to_ascii_uppercase())
    }
}

/// Letter with accidental, but without octave.
///
/// Accidental counts half steps: `-1` is flat, `2` is double sharp.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: i32,
}
impl NoteName {
    pub fn new(letter: Letter, accidental: i32) -> Self {
        Self { letter, accidental }
    }

    /// Half steps above C of the same octave. Not wrapped: `Cb` gives -1.
    pub fn half_steps(&self) -> i32 {
        self.letter.natural_half_steps() + self.accidental
    }

    pub fn midi_pitch(&self, octave: i32) -> i32 {
        12 * (octave + 1) + self.half_steps()
    }
}
impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = match self.accidental {
            x if x > 0 => "#".repeat(x as usize),
            x => "b".repeat(x.unsigned_abs() as usize),
        };
        write!(f, "{}{}", self.letter, accidental)
    }
}
impl FromStr for NoteName {
    type Err = ScoreError;

    /// Parses `C`, `f#`, `Bb`, `Ebb`, `G♯` and `x` for double sharp.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |msg: &str| {
            ScoreError::NoteStringParse(s.to_string(), msg.to_string())
        };
        let mut chars = s.trim().chars();
        let letter = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => Letter::C,
            Some('D') => Letter::D,
            Some('E') => Letter::E,
            Some('F') => Letter::F,
            Some('G') => Letter::G,
            Some('A') => Letter::A,
            Some('B') => Letter::B,
            _ => return Err(err("note name should start with a letter")),
        };
        let accidental = chars.try_fold(0, |acc, c| match c {
            '#' | '♯' => Ok(acc + 1),
            'x' => Ok(acc + 2),
            'b' | '♭' => Ok(acc - 1),
            _ => Err(err("unknown accidental")),
        })?;
        Ok(Self { letter, accidental })
    }
}

/// Pitch, resolved against a scale: a spelled note with its MIDI number.
///
/// `octave` is the octave of the letter, so `B#3` and `C4` have
/// different octaves, but the same `midi_pitch`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct ResolvedPitch {
    pub letter: Letter,
    pub accidental: i32,
    pub octave: i32,
    pub midi_pitch: i32,
}
impl ResolvedPitch {
    pub fn new(letter: Letter, accidental: i32, octave: i32) -> Self {
        let midi_pitch = NoteName::new(letter, accidental).midi_pitch(octave);
        Self {
            letter,
            accidental,
            octave,
            midi_pitch,
        }
    }

    pub fn name(&self) -> NoteName {
        NoteName::new(self.letter, self.accidental)
    }

    /// Same sound, spelled with at most `max_accidental` sharps or flats.
    ///
    /// The letter moves towards the sound one step at a time.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::primitives::{Letter, ResolvedPitch};
    /// let pitch = ResolvedPitch::new(Letter::E, 3, 4);
    /// assert_eq!(
    ///     pitch.respelled(2),
    ///     ResolvedPitch::new(Letter::F, 2, 4)
    /// );
    /// let pitch = ResolvedPitch::new(Letter::C, -3, 4);
    /// assert_eq!(
    ///     pitch.respelled(2),
    ///     ResolvedPitch::new(Letter::B, -2, 3)
    /// );
    /// ```
    pub fn respelled(self, max_accidental: i32) -> Self {
        let mut pitch = self;
        while pitch.accidental.abs() > max_accidental {
            let shift = pitch.accidental.signum();
            let letter_index = pitch.letter.number() + shift;
            let letter = Letter::from_number(letter_index);
            let octave = pitch.octave + letter_index.div_euclid(7);
            let natural = NoteName::new(letter, 0).midi_pitch(octave);
            pitch = Self {
                letter,
                accidental: pitch.midi_pitch - natural,
                octave,
                midi_pitch: pitch.midi_pitch,
            };
        }
        pitch
    }

    /// MIDI key number, checked to be within 0..=127.
    pub fn midi_key(&self) -> ScoreResult<u8> {
        match self.midi_pitch {
            x if (0..=127).contains(&x) => Ok(x as u8),
            x => Err(ScoreError::PitchOutOfRange(x)),
        }
    }
}
impl fmt::Display for ResolvedPitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::{Letter, NoteName, ResolvedPitch};
    use crate::ScoreError;

    #[test]
    fn parse_note_names() {
        let parse = |s: &str| s.parse::<NoteName>().unwrap();
        assert_eq!(parse("C"), NoteName::new(Letter::C, 0));
        assert_eq!(parse("f#"), NoteName::new(Letter::F, 1));
        assert_eq!(parse("Bb"), NoteName::new(Letter::B, -1));
        assert_eq!(parse("bb"), NoteName::new(Letter::B, -1));
        assert_eq!(parse("Ebb"), NoteName::new(Letter::E, -2));
        assert_eq!(parse("G♯"), NoteName::new(Letter::G, 1));
        assert_eq!(parse("A♭"), NoteName::new(Letter::A, -1));
        assert_eq!(parse("Fx"), NoteName::new(Letter::F, 2));
        assert!(matches!(
            "H".parse::<NoteName>(),
            Err(ScoreError::NoteStringParse(_, _))
        ));
        assert!("C?".parse::<NoteName>().is_err());
        assert!("".parse::<NoteName>().is_err());
    }

    #[test]
    fn display() {
        assert_eq!(NoteName::new(Letter::F, 1).to_string(), "F#");
        assert_eq!(NoteName::new(Letter::E, -2).to_string(), "Ebb");
        assert_eq!(ResolvedPitch::new(Letter::C, 0, 4).to_string(), "C4");
    }

    #[test]
    fn midi_pitches() {
        assert_eq!(ResolvedPitch::new(Letter::C, 0, 4).midi_pitch, 60);
        assert_eq!(ResolvedPitch::new(Letter::A, 0, 4).midi_pitch, 69);
        assert_eq!(ResolvedPitch::new(Letter::B, 1, 3).midi_pitch, 60);
        assert_eq!(ResolvedPitch::new(Letter::C, -1, 4).midi_pitch, 59);
        assert_eq!(ResolvedPitch::new(Letter::C, 0, -1).midi_key().unwrap(), 0);
        assert!(matches!(
            ResolvedPitch::new(Letter::C, -1, -1).midi_key(),
            Err(ScoreError::PitchOutOfRange(-1))
        ));
        assert!(ResolvedPitch::new(Letter::A, 0, 9).midi_key().is_err());
    }

    #[test]
    fn respell_keeps_sound() {
        let pitch = ResolvedPitch::new(Letter::B, 4, 4);
        let respelled = pitch.respelled(2);
        assert_eq!(respelled.midi_pitch, pitch.midi_pitch);
        assert_eq!(respelled, ResolvedPitch::new(Letter::C, 3, 5).respelled(2));
        assert_eq!(respelled, ResolvedPitch::new(Letter::D, 1, 5));
        let natural = ResolvedPitch::new(Letter::G, -2, 2);
        assert_eq!(natural.respelled(2), natural);
    }
}
