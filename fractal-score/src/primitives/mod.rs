//! Elements, from which voices are constructed.
//!
//! Durations and positions are exact [`Rational`]s counted in whole notes.
//! Pitches are scale-relative in [`Note`] and become concrete
//! [`ResolvedPitch`]es only when resolved against a scale.

pub mod event;
pub mod fraction_tools;
pub mod length;
pub mod meter;
pub mod note_string;
pub mod pitch;
pub mod position;
pub mod rational;

pub use event::{Dynamic, Instrument, Note, NoteList};
pub use fraction_tools::{is_power_of_two, lcm, power_of_two};
pub use length::Length;
pub use meter::{Tempo, TimeSignature};
pub use note_string::parse_note_list;
pub use pitch::{Letter, NoteName, ResolvedPitch};
pub use position::AbsolutePosition;
pub use rational::Rational;

/// Largest duration denominator LilyPond can engrave (a 64th note).
pub static MAX_DURATION_DENOMINATOR: u64 = 64;
