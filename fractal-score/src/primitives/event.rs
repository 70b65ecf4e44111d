//! Abstract notes, as they come from the generation stage.
//!
//! Pitch of a [`Note`] is relative to a scale, so the same note list can be
//! rendered in any key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::Rational;
use crate::{scale::Scale, ScoreError, ScoreResult};

/// One note or rest of a voice.
///
/// Rests keep their duration only; pitch fields of a rest are zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    scale_step: i32,
    chromatic_adjustment: i32,
    octave: i32,
    duration: Rational,
    volume: u8,
    is_rest: bool,
}
impl Note {
    /// # Parameters
    ///
    /// - scale_step: 0 is tonic. Steps outside the scale carry octaves.
    /// - octave: octave of the tonic, 4 holds middle C.
    /// - volume: MIDI velocity, 0..=127. Anything louder is an error.
    pub fn new(
        scale_step: i32,
        chromatic_adjustment: i32,
        octave: i32,
        duration: Rational,
        volume: u8,
    ) -> ScoreResult<Self> {
        check_duration(duration)?;
        Ok(Self {
            scale_step,
            chromatic_adjustment,
            octave,
            duration,
            volume: midi_data("velocity", volume)?,
            is_rest: false,
        })
    }

    pub fn rest(duration: Rational) -> ScoreResult<Self> {
        check_duration(duration)?;
        Ok(Self {
            scale_step: 0,
            chromatic_adjustment: 0,
            octave: 0,
            duration,
            volume: 0,
            is_rest: true,
        })
    }

    pub fn scale_step(&self) -> i32 {
        self.scale_step
    }
    pub fn chromatic_adjustment(&self) -> i32 {
        self.chromatic_adjustment
    }
    pub fn octave(&self) -> i32 {
        self.octave
    }
    pub fn duration(&self) -> Rational {
        self.duration
    }
    pub fn volume(&self) -> u8 {
        self.volume
    }
    pub fn is_rest(&self) -> bool {
        self.is_rest
    }

    /// Scale step wrapped into the scale with the octave carried.
    ///
    /// Two notes are at the same scale position only if these are equal.
    pub fn normalized_position(&self, scale: &Scale) -> (i32, i32) {
        scale.normalize(self.scale_step, self.octave)
    }

    /// The diatonic tone of the note: the chromatic adjustment dropped.
    pub fn without_adjustment(&self) -> Self {
        Self {
            chromatic_adjustment: 0,
            ..self.clone()
        }
    }
}

fn check_duration(duration: Rational) -> ScoreResult<()> {
    match duration.is_positive() {
        true => Ok(()),
        false => Err(ScoreError::UnsupportedDuration(format!(
            "note duration must be positive, got {}",
            duration
        ))),
    }
}

fn midi_data(field: &'static str, value: u8) -> ScoreResult<u8> {
    match value {
        0..=127 => Ok(value),
        _ => Err(ScoreError::MidiDataOutOfRange(field, value)),
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Dynamic {
    PPP,
    PP,
    P,
    MP,
    MF,
    F,
    FF,
    FFF,
}
impl Dynamic {
    pub fn volume(&self) -> u8 {
        match self {
            Self::PPP => 16,
            Self::PP => 33,
            Self::P => 49,
            Self::MP => 64,
            Self::MF => 80,
            Self::F => 96,
            Self::FF => 112,
            Self::FFF => 127,
        }
    }
}
impl Default for Dynamic {
    fn default() -> Self {
        Self::MF
    }
}
impl FromStr for Dynamic {
    type Err = ScoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppp" => Ok(Self::PPP),
            "pp" => Ok(Self::PP),
            "p" => Ok(Self::P),
            "mp" => Ok(Self::MP),
            "mf" => Ok(Self::MF),
            "f" => Ok(Self::F),
            "ff" => Ok(Self::FF),
            "fff" => Ok(Self::FFF),
            _ => Err(ScoreError::NoteStringParse(
                s.to_string(),
                "unknown dynamic".to_string(),
            )),
        }
    }
}

/// Instrument of a voice: a name for notation and a General MIDI program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Instrument {
    name: String,
    program: u8,
}
impl Instrument {
    pub fn new(name: impl Into<String>, program: u8) -> ScoreResult<Self> {
        Ok(Self {
            name: name.into(),
            program: midi_data("program", program)?,
        })
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn program(&self) -> u8 {
        self.program
    }
    pub fn to_guido(&self) -> String {
        format!(r#"\instr<"{}">"#, self.name)
    }
}
impl Default for Instrument {
    fn default() -> Self {
        Self {
            name: "Piano".to_string(),
            program: 0,
        }
    }
}
impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Ordered notes of one voice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NoteList {
    notes: Vec<Note>,
    instrument: Option<Instrument>,
}
impl NoteList {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instrument = Some(instrument);
        self
    }
    pub fn instrument(&self) -> Option<&Instrument> {
        self.instrument.as_ref()
    }
    pub fn push(&mut self, note: Note) {
        self.notes.push(note)
    }
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }
    pub fn len(&self) -> usize {
        self.notes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Sounding length of the whole voice.
    pub fn duration(&self) -> Rational {
        self.notes.iter().map(Note::duration).sum()
    }

    /// Copy of the list, where every run of rests is a single rest.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::{Note, NoteList, Rational};
    /// let eighth = Rational::new(1, 8);
    /// let list = NoteList::from(vec![
    ///     Note::rest(eighth).unwrap(),
    ///     Note::rest(eighth).unwrap(),
    ///     Note::new(0, 0, 4, eighth, 80).unwrap(),
    /// ]);
    /// let normalized = list.with_normalized_rests();
    /// assert_eq!(normalized.len(), 2);
    /// assert_eq!(normalized.notes()[0].duration(), Rational::new(1, 4));
    /// ```
    pub fn with_normalized_rests(&self) -> Self {
        let mut notes: Vec<Note> = Vec::with_capacity(self.notes.len());
        for note in self.notes.iter() {
            match notes.last_mut() {
                Some(last) if last.is_rest && note.is_rest => {
                    last.duration += note.duration;
                }
                _ => notes.push(note.clone()),
            }
        }
        Self {
            notes,
            instrument: self.instrument.clone(),
        }
    }
}
impl From<Vec<Note>> for NoteList {
    fn from(notes: Vec<Note>) -> Self {
        Self {
            notes,
            instrument: None,
        }
    }
}
impl FromIterator<Note> for NoteList {
    fn from_iter<T: IntoIterator<Item = Note>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}
impl<'a> IntoIterator for &'a NoteList {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;
    fn into_iter(self) -> Self::IntoIter {
        self.notes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Dynamic, Instrument, Note, NoteList};
    use crate::{scale::Scale, Rational, ScoreError};

    #[test]
    fn note_validation() {
        assert!(matches!(
            Note::new(0, 0, 4, Rational::zero(), 80),
            Err(ScoreError::UnsupportedDuration(_))
        ));
        assert!(Note::rest(Rational::new(-1, 4)).is_err());
        assert!(matches!(
            Note::new(2, 1, 4, Rational::new(1, 4), 200),
            Err(ScoreError::MidiDataOutOfRange("velocity", 200))
        ));
        let note = Note::new(2, 1, 4, Rational::new(1, 4), 127).unwrap();
        assert_eq!(note.volume(), 127);
        assert!(!note.is_rest());
        assert_eq!(note.without_adjustment().chromatic_adjustment(), 0);
    }

    #[test]
    fn normalized_position() {
        let scale = Scale::major("C".parse().unwrap()).unwrap();
        let quarter = Rational::new(1, 4);
        let high = Note::new(7, 0, 4, quarter, 80).unwrap();
        let tonic = Note::new(0, 0, 5, quarter, 80).unwrap();
        let low = Note::new(-1, 0, 4, quarter, 80).unwrap();
        assert_eq!(high.normalized_position(&scale), (0, 5));
        assert_eq!(
            high.normalized_position(&scale),
            tonic.normalized_position(&scale)
        );
        assert_eq!(low.normalized_position(&scale), (6, 3));
    }

    #[test]
    fn rests_are_merged() {
        let eighth = Rational::new(1, 8);
        let list: NoteList = vec![
            Note::new(0, 0, 4, eighth, 80).unwrap(),
            Note::rest(eighth).unwrap(),
            Note::rest(Rational::new(1, 12)).unwrap(),
            Note::rest(eighth).unwrap(),
            Note::new(1, 0, 4, eighth, 80).unwrap(),
            Note::rest(eighth).unwrap(),
        ]
        .into_iter()
        .collect();
        let normalized = list
            .with_instrument(Instrument::new("Flute", 73).unwrap())
            .with_normalized_rests();
        let durations: Vec<_> =
            normalized.iter().map(|n| n.duration()).collect();
        assert_eq!(
            durations,
            vec![eighth, Rational::new(1, 3), eighth, eighth]
        );
        assert_eq!(normalized.instrument().unwrap().program(), 73);
        assert_eq!(normalized.duration(), Rational::new(17, 24));
    }

    #[test]
    fn dynamics() {
        assert_eq!("mf".parse::<Dynamic>().unwrap(), Dynamic::MF);
        assert_eq!("FFF".parse::<Dynamic>().unwrap().volume(), 127);
        assert_eq!(Dynamic::default().volume(), 80);
        assert!("mff".parse::<Dynamic>().is_err());
        assert_eq!(Instrument::default().to_guido(), r#"\instr<"Piano">"#);
        assert!(matches!(
            Instrument::new("Organ", 128),
            Err(ScoreError::MidiDataOutOfRange("program", 128))
        ));
    }
}
