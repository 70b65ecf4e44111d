//! Notation tree of a voice, rendered to LilyPond music text.
//!
//! A voice becomes a flat [`NotationElementList`] of [`NotationNote`]s,
//! then runs of irregular durations are grouped into (nested)
//! [`Tuplet`]s, and only then everything is rendered. The renderer works
//! with rational durations only, it knows nothing about ticks.
//!
//! # Example
//!
//! ```
//! use fractal_score::{notation::NotationRenderer, Note, NoteList, Rational, Scale};
//!
//! let scale = Scale::major("C".parse().unwrap()).unwrap();
//! let triplet = Rational::new(1, 12);
//! let voice: NoteList = [
//!     Note::new(0, 0, 4, triplet, 80),
//!     Note::new(1, 0, 4, triplet, 80),
//!     Note::new(2, 0, 4, triplet, 80),
//!     Note::new(4, 0, 4, Rational::new(5, 8), 80),
//! ]
//! .into_iter()
//! .collect::<Result<_, _>>()
//! .unwrap();
//! let rendered = NotationRenderer::new(&scale).render(&voice).unwrap();
//! assert_eq!(rendered, r"\tuplet 3/2 { c'8 d'8 e'8 } g'2 ~ g'8");
//! ```

use log::debug;

use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{NoteList, Rational, MAX_DURATION_DENOMINATOR},
    scale::Scale,
    ScoreError, ScoreResult,
};

pub mod element_list;
pub mod note;
pub mod tuplet;

pub use element_list::NotationElementList;
pub use note::NotationNote;
pub use tuplet::Tuplet;

#[derive(Debug, Clone, PartialEq)]
pub enum NotationElement {
    Note(NotationNote),
    Tuplet(Tuplet),
}
impl NotationElement {
    /// Written duration of a note, sounding duration of a tuplet.
    pub fn duration(&self) -> Rational {
        match self {
            Self::Note(note) => note.duration(),
            Self::Tuplet(tuplet) => tuplet.duration(),
        }
    }
    pub fn apply_tuplet_multiplier(&self, multiplier: Rational) -> Self {
        match self {
            Self::Note(note) => {
                Self::Note(note.apply_tuplet_multiplier(multiplier))
            }
            Self::Tuplet(tuplet) => {
                Self::Tuplet(tuplet.apply_tuplet_multiplier(multiplier))
            }
        }
    }
    pub fn as_note(&self) -> Option<&NotationNote> {
        match self {
            Self::Note(note) => Some(note),
            Self::Tuplet(_) => None,
        }
    }
    pub fn as_tuplet(&self) -> Option<&Tuplet> {
        match self {
            Self::Note(_) => None,
            Self::Tuplet(tuplet) => Some(tuplet),
        }
    }
}
impl RendersToLilypond for NotationElement {
    fn render_lilypond(&self) -> ScoreResult<String> {
        match self {
            Self::Note(note) => note.render_lilypond(),
            Self::Tuplet(tuplet) => tuplet.render_lilypond(),
        }
    }
}

/// Renders voices in the given scale.
#[derive(Debug, Clone)]
pub struct NotationRenderer<'a> {
    scale: &'a Scale,
}
impl<'a> NotationRenderer<'a> {
    pub fn new(scale: &'a Scale) -> Self {
        Self { scale }
    }

    /// Grouped notation tree of the voice.
    ///
    /// Fails before anything is rendered if some duration is too short
    /// to be engraved.
    pub fn element_list(
        &self,
        voice: &NoteList,
    ) -> ScoreResult<NotationElementList> {
        let mut list = voice
            .with_normalized_rests()
            .iter()
            .map(|note| {
                NotationNote::from_note(note, self.scale)
                    .map(NotationElement::Note)
            })
            .collect::<ScoreResult<NotationElementList>>()?;
        list.group_tuplets()?;
        if let Some(denom) = list.largest_duration_denominator() {
            if denom > MAX_DURATION_DENOMINATOR {
                return Err(ScoreError::UnsupportedDuration(format!(
                    "1/{} is shorter than 1/{}",
                    denom, MAX_DURATION_DENOMINATOR
                )));
            }
        }
        debug!(
            "voice of {} notes grouped into {} elements",
            voice.len(),
            list.len()
        );
        Ok(list)
    }

    pub fn render(&self, voice: &NoteList) -> ScoreResult<String> {
        self.element_list(voice)?.render_lilypond()
    }
}

#[cfg(test)]
mod tests {
    use super::NotationRenderer;
    use crate::{Note, NoteList, Rational, Scale, ScoreError};

    #[test]
    fn rests_are_merged_before_rendering() {
        let scale = Scale::major("G".parse().unwrap()).unwrap();
        let eighth = Rational::new(1, 8);
        let voice: NoteList = vec![
            Note::new(6, 0, 4, eighth, 80).unwrap(),
            Note::rest(eighth).unwrap(),
            Note::rest(Rational::new(1, 2)).unwrap(),
            Note::new(0, 0, 5, Rational::new(1, 4), 80).unwrap(),
        ]
        .into();
        let rendered = NotationRenderer::new(&scale).render(&voice).unwrap();
        assert_eq!(rendered, "fis''8 r2 r8 g''4");
    }

    #[test]
    fn too_short() {
        let scale = Scale::major("C".parse().unwrap()).unwrap();
        let voice: NoteList =
            vec![Note::new(0, 0, 4, Rational::new(1, 128), 80).unwrap()].into();
        assert!(matches!(
            NotationRenderer::new(&scale).render(&voice),
            Err(ScoreError::UnsupportedDuration(_))
        ));
    }
}
