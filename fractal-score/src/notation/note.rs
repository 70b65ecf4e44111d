use derivative::Derivative;
use itertools::Itertools;
use log::trace;
use once_cell::unsync::OnceCell;

use super::{NotationElement, NotationElementList, Tuplet};
use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{Length, Note, Rational, ResolvedPitch},
    scale::Scale,
    ScoreError, ScoreResult,
};

/// Largest accidental a notation note may carry.
pub static MAX_ACCIDENTAL: i32 = 2;

/// Note or rest, as it is written.
///
/// Duration is the written one: inside a tuplet it differs from the
/// sounding duration by the tuplet multiplier.
#[derive(Clone, Derivative)]
#[derivative(Debug, PartialEq)]
pub struct NotationNote {
    pitch: Option<ResolvedPitch>,
    duration: Rational,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    rendered: OnceCell<String>,
}
impl NotationNote {
    /// Fails if the pitch has more than two sharps or flats.
    pub fn new(pitch: ResolvedPitch, duration: Rational) -> ScoreResult<Self> {
        if pitch.accidental.abs() > MAX_ACCIDENTAL {
            return Err(ScoreError::InvalidAccidental(pitch.accidental));
        }
        Self::checked(Some(pitch), duration)
    }

    pub fn rest(duration: Rational) -> ScoreResult<Self> {
        Self::checked(None, duration)
    }

    /// Resolve the note against the scale, respelling extreme accidentals.
    pub fn from_note(note: &Note, scale: &Scale) -> ScoreResult<Self> {
        if note.is_rest() {
            return Self::rest(note.duration());
        }
        let pitch = scale
            .resolve_pitch(
                note.scale_step(),
                note.chromatic_adjustment(),
                note.octave(),
            )
            .respelled(MAX_ACCIDENTAL);
        Self::new(pitch, note.duration())
    }

    fn checked(
        pitch: Option<ResolvedPitch>,
        duration: Rational,
    ) -> ScoreResult<Self> {
        if !duration.is_positive() {
            return Err(ScoreError::UnsupportedDuration(format!(
                "notation note duration must be positive, got {}",
                duration
            )));
        }
        Ok(Self {
            pitch,
            duration,
            rendered: OnceCell::new(),
        })
    }

    pub fn pitch(&self) -> Option<&ResolvedPitch> {
        self.pitch.as_ref()
    }
    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
    pub fn duration(&self) -> Rational {
        self.duration
    }

    /// Written copy of the note inside a tuplet with the multiplier.
    pub fn apply_tuplet_multiplier(&self, multiplier: Rational) -> Self {
        Self {
            pitch: self.pitch,
            duration: self.duration / multiplier,
            rendered: OnceCell::new(),
        }
    }

    fn render_uncached(&self) -> ScoreResult<String> {
        if !self.duration.denom_is_power_of_2() {
            trace!("{:?} is wrapped into its own tuplet", self);
            let single = NotationElementList::from(vec![
                NotationElement::Note(self.clone()),
            ]);
            return Tuplet::new(single)?.render_lilypond();
        }
        let glyphs = Length::from(self.duration).glyphs()?;
        let rendered = match &self.pitch {
            None => glyphs.iter().map(|glyph| format!("r{glyph}")).join(" "),
            Some(pitch) => {
                let name = pitch.render_lilypond()?;
                glyphs
                    .iter()
                    .map(|glyph| format!("{name}{glyph}"))
                    .join(" ~ ")
            }
        };
        Ok(rendered)
    }
}

impl RendersToLilypond for NotationNote {
    /// Rendered once, then reused.
    fn render_lilypond(&self) -> ScoreResult<String> {
        self.rendered
            .get_or_try_init(|| self.render_uncached())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::NotationNote;
    use crate::{
        lilypond_render::RendersToLilypond,
        primitives::{Letter, Note, ResolvedPitch},
        scale::Scale,
        Rational, ScoreError,
    };

    fn c4(numer: i64, denom: i64) -> NotationNote {
        NotationNote::new(
            ResolvedPitch::new(Letter::C, 0, 4),
            Rational::new(numer, denom),
        )
        .unwrap()
    }

    #[test]
    fn render_plain() {
        assert_eq!(c4(1, 4).render_lilypond().unwrap(), "c'4");
        assert_eq!(c4(3, 8).render_lilypond().unwrap(), "c'4.");
        assert_eq!(c4(5, 8).render_lilypond().unwrap(), "c'2 ~ c'8");
        assert_eq!(c4(2, 1).render_lilypond().unwrap(), r"c'\breve");
    }

    #[test]
    fn render_rest() {
        let rest = NotationNote::rest(Rational::new(5, 8)).unwrap();
        assert_eq!(rest.render_lilypond().unwrap(), "r2 r8");
        assert!(rest.is_rest());
    }

    #[test]
    fn irregular_note_renders_as_tuplet() {
        assert_eq!(
            c4(1, 7).render_lilypond().unwrap(),
            r"\tuplet 7/4 { c'4 }"
        );
        assert_eq!(
            c4(1, 6).render_lilypond().unwrap(),
            r"\tuplet 3/2 { c'4 }"
        );
    }

    #[test]
    fn rendered_once() {
        let note = c4(1, 4);
        assert!(note.rendered.get().is_none());
        let first = note.render_lilypond().unwrap();
        assert_eq!(note.rendered.get(), Some(&first));
        assert_eq!(note.render_lilypond().unwrap(), first);
        assert_eq!(note, c4(1, 4));
    }

    #[test]
    fn validation() {
        assert!(matches!(
            NotationNote::new(
                ResolvedPitch::new(Letter::C, 3, 4),
                Rational::new(1, 4)
            ),
            Err(ScoreError::InvalidAccidental(3))
        ));
        assert!(matches!(
            NotationNote::rest(Rational::zero()),
            Err(ScoreError::UnsupportedDuration(_))
        ));
        assert!(matches!(
            c4(1, 128).render_lilypond(),
            Err(ScoreError::UnsupportedDuration(_))
        ));
    }

    #[test]
    fn from_note_respells() {
        let scale = Scale::major("C".parse().unwrap()).unwrap();
        let note = Note::new(2, 3, 4, Rational::new(1, 4), 80).unwrap();
        let notation = NotationNote::from_note(&note, &scale).unwrap();
        assert_eq!(
            notation.pitch(),
            Some(&ResolvedPitch::new(Letter::F, 2, 4))
        );
        assert_eq!(notation.render_lilypond().unwrap(), "fisis'4");
    }
}
