//! Rational-time rendering of fractal pieces.
//!
//! Voices come in as abstract note lists: scale-relative pitches with exact
//! rational durations. They leave as a tick-accurate MIDI event stream and
//! as a notation string with ties and (nested) tuplets.
//!
//! Pipeline:
//! - [`quantize`] picks one tick resolution for all voices;
//! - [`midi`] walks every voice and builds one track per voice;
//! - [`notation`] groups tuplets and renders LilyPond text per voice;
//! - [`dom`] holds the piece description and assembles the outputs.

pub mod dom;
pub mod lilypond_render;
pub mod midi;
pub mod notation;
pub mod primitives;
pub mod quantize;
pub mod scale;

pub use dom::{output::assemble, output::Output, FractalPiece, Section};
pub use lilypond_render::{RenderSettings, RendersToLilypond};
pub use primitives::{Note, NoteList, Rational};
pub use scale::{KeySignature, Scale, ScaleKind};

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error(
        "Invalid key signature: {0} sharps or flats, \
        but it must be within -7..=7"
    )]
    InvalidKeySignature(i32),
    #[error("The germ is empty: nothing can be rendered")]
    GermIsEmpty,
    #[error("Unsupported duration: {0}")]
    UnsupportedDuration(String),
    #[error("Internal consistency violated: {0}")]
    InternalConsistency(String),
    #[error("Invalid time signature: {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u8, denominator: u8 },
    #[error("Invalid tempo: {0} bpm")]
    InvalidTempo(u16),
    #[error("Accidental out of range: {0}")]
    InvalidAccidental(i32),
    #[error("MIDI pitch out of range: {0}")]
    PitchOutOfRange(i32),
    #[error("MIDI {0} out of range: {1}, but it must be within 0..=127")]
    MidiDataOutOfRange(&'static str, u8),
    #[error("Too many voices: {0}, MIDI has only 16 channels")]
    TooManyVoices(usize),
    #[error("Can not parse `{0}`: {1}")]
    NoteStringParse(String, String),
    #[error(
        "The note string `{0}` must contain at least one note \
        that is not a rest"
    )]
    NoteStringOnlyRest(String),
}
pub type ScoreResult<T> = Result<T, ScoreError>;
