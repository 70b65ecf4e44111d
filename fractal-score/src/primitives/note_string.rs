//! Textual germ notation.
//!
//! Notes are separated by whitespace, fields of a note by commas:
//! `PITCH,DURATION[,DYNAMIC]`, where pitch is a note name with octave
//! (`G4`, `F#3`, `Bb-1`) or `R` for a rest.

use log::trace;

use super::{Dynamic, Note, NoteList, NoteName, Rational};
use crate::{scale::Scale, ScoreError, ScoreResult};

/// Parse a germ string into a note list, relative to the given scale.
///
/// Empty string gives an empty list, but a string of rests only is an
/// error.
///
/// # Example
///
/// ```
/// # use fractal_score::{primitives::parse_note_list, Rational, Scale};
/// let scale = Scale::major("G".parse().unwrap()).unwrap();
/// let germ = parse_note_list("G4,1/4,MF R,1/8 A4,1/8,F", &scale).unwrap();
/// assert_eq!(germ.len(), 3);
/// assert_eq!(germ.notes()[2].scale_step(), 1);
/// assert!(germ.notes()[1].is_rest());
/// assert_eq!(germ.duration(), Rational::new(1, 2));
/// ```
pub fn parse_note_list(text: &str, scale: &Scale) -> ScoreResult<NoteList> {
    let notes = text
        .split_whitespace()
        .map(|token| parse_note(token, scale))
        .collect::<ScoreResult<NoteList>>()?;
    if !notes.is_empty() && notes.iter().all(Note::is_rest) {
        return Err(ScoreError::NoteStringOnlyRest(text.to_string()));
    }
    Ok(notes)
}

fn parse_note(token: &str, scale: &Scale) -> ScoreResult<Note> {
    let err = |msg: &str| {
        ScoreError::NoteStringParse(token.to_string(), msg.to_string())
    };
    let fields: Vec<&str> = token.split(',').collect();
    let (pitch, duration, dynamic) = match fields.as_slice() {
        [pitch, duration] => (*pitch, *duration, None),
        [pitch, duration, dynamic] => (*pitch, *duration, Some(*dynamic)),
        _ => return Err(err("expected PITCH,DURATION[,DYNAMIC]")),
    };
    let duration: Rational =
        duration.parse().map_err(|_| err("bad duration"))?;
    if pitch.eq_ignore_ascii_case("r") {
        return Note::rest(duration);
    }
    let dynamic = match dynamic {
        Some(dynamic) => dynamic.parse()?,
        None => Dynamic::default(),
    };
    let split = pitch
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .ok_or_else(|| err("pitch has no octave"))?;
    let (name, octave) = pitch.split_at(split);
    let name: NoteName = name.parse()?;
    let octave: i32 = octave.parse().map_err(|_| err("bad octave"))?;
    let (degree, tonic_octave) = scale.locate_pitch(name, octave);
    trace!("{} located as {:?} in octave {}", token, degree, tonic_octave);
    Note::new(
        degree.scale_step,
        degree.chromatic_adjustment,
        tonic_octave,
        duration,
        dynamic.volume(),
    )
}
