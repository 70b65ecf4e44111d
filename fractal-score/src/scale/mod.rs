//! Scales and resolution of scale-relative pitches.
//!
//! Every [`ScaleKind`] is a static table of half steps and letter steps
//! above the tonic. The resolver itself is shared by all kinds: it walks
//! the tables, so adding a scale means adding a table only.
//!
//! # Example
//!
//! ```
//! use fractal_score::scale::{Scale, ScaleDegree};
//!
//! let scale = Scale::major("C".parse().unwrap()).unwrap();
//! let degree = scale.classify_pitch("F#".parse().unwrap());
//! assert_eq!(
//!     degree,
//!     ScaleDegree { scale_step: 3, chromatic_adjustment: 1 }
//! );
//! let pitch = scale.resolve_pitch(3, 1, 4);
//! assert_eq!(pitch.midi_pitch, 66);
//! assert_eq!(pitch.to_string(), "F#4");
//! ```

pub mod key_signature;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use key_signature::KeySignature;

use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{Letter, NoteName, ResolvedPitch},
    ScoreResult,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Tonality {
    Major,
    Minor,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum ScaleKind {
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    MajorPentatonic,
    MinorPentatonic,
    Chromatic,
}

struct ScaleTable {
    /// Half steps above the tonic.
    steps: &'static [i32],
    /// Letter steps above the tonic letter.
    letters: &'static [i32],
    tonality: Tonality,
}

static MAJOR: ScaleTable = ScaleTable {
    steps: &[0, 2, 4, 5, 7, 9, 11],
    letters: &[0, 1, 2, 3, 4, 5, 6],
    tonality: Tonality::Major,
};
static MINOR: ScaleTable = ScaleTable {
    steps: &[0, 2, 3, 5, 7, 8, 10],
    letters: &[0, 1, 2, 3, 4, 5, 6],
    tonality: Tonality::Minor,
};
static HARMONIC_MINOR: ScaleTable = ScaleTable {
    steps: &[0, 2, 3, 5, 7, 8, 11],
    letters: &[0, 1, 2, 3, 4, 5, 6],
    tonality: Tonality::Minor,
};
static MELODIC_MINOR: ScaleTable = ScaleTable {
    steps: &[0, 2, 3, 5, 7, 9, 11],
    letters: &[0, 1, 2, 3, 4, 5, 6],
    tonality: Tonality::Minor,
};
static MAJOR_PENTATONIC: ScaleTable = ScaleTable {
    steps: &[0, 2, 4, 7, 9],
    letters: &[0, 1, 2, 4, 5],
    tonality: Tonality::Major,
};
static MINOR_PENTATONIC: ScaleTable = ScaleTable {
    steps: &[0, 3, 5, 7, 10],
    letters: &[0, 2, 3, 4, 6],
    tonality: Tonality::Minor,
};
static CHROMATIC: ScaleTable = ScaleTable {
    steps: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
    letters: &[0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6],
    tonality: Tonality::Major,
};

impl ScaleKind {
    fn table(self) -> &'static ScaleTable {
        match self {
            Self::Major => &MAJOR,
            Self::Minor => &MINOR,
            Self::HarmonicMinor => &HARMONIC_MINOR,
            Self::MelodicMinor => &MELODIC_MINOR,
            Self::MajorPentatonic => &MAJOR_PENTATONIC,
            Self::MinorPentatonic => &MINOR_PENTATONIC,
            Self::Chromatic => &CHROMATIC,
        }
    }
    pub fn scale_steps(self) -> &'static [i32] {
        self.table().steps
    }
    pub fn letter_numbers(self) -> &'static [i32] {
        self.table().letters
    }
    pub fn tonality(self) -> Tonality {
        self.table().tonality
    }
}

/// Position of a pitch relative to a scale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub struct ScaleDegree {
    pub scale_step: i32,
    pub chromatic_adjustment: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    kind: ScaleKind,
    tonic: NoteName,
    key_signature: KeySignature,
}
impl Scale {
    /// Fails if the key of the tonic has more than 7 sharps or flats.
    pub fn new(kind: ScaleKind, tonic: NoteName) -> ScoreResult<Self> {
        let key_signature = KeySignature::from_tonic(tonic, kind.tonality())?;
        Ok(Self {
            kind,
            tonic,
            key_signature,
        })
    }
    pub fn major(tonic: NoteName) -> ScoreResult<Self> {
        Self::new(ScaleKind::Major, tonic)
    }
    pub fn minor(tonic: NoteName) -> ScoreResult<Self> {
        Self::new(ScaleKind::Minor, tonic)
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }
    pub fn tonic(&self) -> NoteName {
        self.tonic
    }
    pub fn key_signature(&self) -> KeySignature {
        self.key_signature
    }
    /// Count of steps in one octave of the scale.
    pub fn len(&self) -> usize {
        self.kind.scale_steps().len()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wraps the step into `0..len` and carries whole octaves.
    pub fn normalize(&self, scale_step: i32, octave: i32) -> (i32, i32) {
        let len = self.len() as i32;
        (
            scale_step.rem_euclid(len),
            octave + scale_step.div_euclid(len),
        )
    }

    /// Concrete pitch of the scale step in the given tonic octave.
    pub fn resolve_pitch(
        &self,
        scale_step: i32,
        chromatic_adjustment: i32,
        octave: i32,
    ) -> ResolvedPitch {
        let (step, octave) = self.normalize(scale_step, octave);
        let table = self.kind.table();
        let midi_pitch = 12 * (octave + 1)
            + self.tonic.half_steps()
            + table.steps[step as usize]
            + chromatic_adjustment;
        let letter_index =
            self.tonic.letter.number() + table.letters[step as usize];
        let letter = Letter::from_number(letter_index);
        let letter_octave = octave + letter_index.div_euclid(7);
        let natural = NoteName::new(letter, 0).midi_pitch(letter_octave);
        ResolvedPitch {
            letter,
            accidental: midi_pitch - natural,
            octave: letter_octave,
            midi_pitch,
        }
    }

    /// Scale step and chromatic adjustment of the note name.
    ///
    /// The letter decides the step. When the scale lacks the letter
    /// (pentatonic scales), the nearer of the neighbouring steps is taken.
    pub fn classify_pitch(&self, name: NoteName) -> ScaleDegree {
        let table = self.kind.table();
        let letter_steps =
            (name.letter.number() - self.tonic.letter.number()).rem_euclid(7);
        let half_steps = name.half_steps() - self.tonic.half_steps();
        let adjustment =
            |idx: usize| normalize_half_steps(half_steps - table.steps[idx]);
        let same_letter = table
            .letters
            .iter()
            .positions(|&letter| letter == letter_steps)
            .min_by_key(|&idx| adjustment(idx).abs());
        let (idx, chromatic_adjustment) = match same_letter {
            Some(idx) => (idx, adjustment(idx)),
            None => {
                let last = table.letters.len() - 1;
                let lower = table
                    .letters
                    .iter()
                    .rposition(|&letter| letter < letter_steps)
                    .unwrap_or(last);
                let higher = table
                    .letters
                    .iter()
                    .position(|&letter| letter > letter_steps)
                    .unwrap_or(0);
                nearer_candidate(
                    (lower, adjustment(lower)),
                    (higher, adjustment(higher)),
                )
            }
        };
        ScaleDegree {
            scale_step: idx as i32,
            chromatic_adjustment,
        }
    }

    /// Scale degree and tonic octave, that resolve exactly to the pitch.
    pub fn locate_pitch(
        &self,
        name: NoteName,
        octave: i32,
    ) -> (ScaleDegree, i32) {
        let degree = self.classify_pitch(name);
        let target = name.midi_pitch(octave);
        let resolved = self
            .resolve_pitch(degree.scale_step, degree.chromatic_adjustment, octave)
            .midi_pitch;
        (degree, octave + (target - resolved).div_euclid(12))
    }
}

impl RendersToLilypond for Scale {
    fn render_lilypond(&self) -> ScoreResult<String> {
        let tonality = match self.kind.tonality() {
            Tonality::Major => "major",
            Tonality::Minor => "minor",
        };
        Ok(format!(
            r"\key {} \{}",
            self.tonic.render_lilypond()?,
            tonality
        ))
    }
}

/// Half steps wrapped into `-6..6`.
fn normalize_half_steps(half_steps: i32) -> i32 {
    (half_steps + 6).rem_euclid(12) - 6
}

/// The lower candidate wins only when it is strictly nearer.
fn nearer_candidate(lower: (usize, i32), higher: (usize, i32)) -> (usize, i32) {
    match lower.1.abs() < higher.1.abs() {
        true => lower,
        false => higher,
    }
}
