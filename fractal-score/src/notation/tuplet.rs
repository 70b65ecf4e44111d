use log::debug;

use super::NotationElementList;
use crate::{
    lilypond_render::RendersToLilypond,
    primitives::{is_power_of_two, power_of_two, Rational},
    ScoreError, ScoreResult,
};

/// Group of elements, played in the time of fewer written ones.
///
/// Children keep written durations: each of them, multiplied by
/// [`Tuplet::multiplier`], gives its sounding duration. Children are
/// grouped into nested tuplets where needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuplet {
    multiplier: Rational,
    elements: NotationElementList,
}
impl Tuplet {
    /// Build a tuplet from elements with sounding durations.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::notation::{
    /// #     NotationElement, NotationElementList, NotationNote, Tuplet};
    /// # use fractal_score::{Rational, RendersToLilypond};
    /// let triplet: NotationElementList = (0..3)
    ///     .map(|_| NotationNote::rest(Rational::new(1, 12)).unwrap())
    ///     .map(NotationElement::Note)
    ///     .collect();
    /// let tuplet = Tuplet::new(triplet).unwrap();
    /// assert_eq!(tuplet.multiplier(), Rational::new(2, 3));
    /// assert_eq!(tuplet.duration(), Rational::new(1, 4));
    /// assert_eq!(
    ///     tuplet.render_lilypond().unwrap(),
    ///     r"\tuplet 3/2 { r8 r8 r8 }"
    /// );
    /// ```
    pub fn new(elements: NotationElementList) -> ScoreResult<Self> {
        let multiplier = tuplet_multiplier(&elements)?;
        let mut written = elements
            .iter()
            .map(|element| element.apply_tuplet_multiplier(multiplier))
            .collect::<NotationElementList>();
        written.group_tuplets()?;
        debug!(
            "tuplet {} of {} elements, sounding {}",
            multiplier,
            written.len(),
            elements.duration()
        );
        Ok(Self {
            multiplier,
            elements: written,
        })
    }

    /// Ratio of sounding to written duration, always within (0, 1).
    pub fn multiplier(&self) -> Rational {
        self.multiplier
    }
    pub fn elements(&self) -> &NotationElementList {
        &self.elements
    }
    /// Sounding duration.
    pub fn duration(&self) -> Rational {
        self.elements.duration() * self.multiplier
    }

    /// Same tuplet, written inside an outer tuplet with the multiplier.
    pub fn apply_tuplet_multiplier(&self, multiplier: Rational) -> Self {
        Self {
            multiplier: self.multiplier,
            elements: self
                .elements
                .iter()
                .map(|element| element.apply_tuplet_multiplier(multiplier))
                .collect(),
        }
    }
}

/// `2^floor(log2 d) / d`, where `d` is the denominator, that is left
/// after runs, which do not need the tuplet, are stripped.
fn tuplet_multiplier(elements: &NotationElementList) -> ScoreResult<Rational> {
    let base = elements.smallest_irregular_denominator().ok_or_else(|| {
        ScoreError::InternalConsistency(format!(
            "tuplet without irregular durations: {:?}",
            elements
        ))
    })?;
    let mut stripped = elements.clone();
    stripped.remove_consecutive_notes_whose_denoms_add_to_power_of_2();
    let denominator = match stripped.smallest_duration_denominator() {
        Some(denom) if !is_power_of_two(denom) => denom,
        _ => base,
    };
    let written = power_of_two(denominator).ok_or_else(|| {
        ScoreError::InternalConsistency("zero denominator".to_string())
    })?;
    Ok(Rational::from_unsigned(written, denominator))
}

impl RendersToLilypond for Tuplet {
    fn render_lilypond(&self) -> ScoreResult<String> {
        Ok(format!(
            r"\tuplet {}/{} {{ {} }}",
            self.multiplier.denom(),
            self.multiplier.numer(),
            self.elements.render_lilypond()?
        ))
    }
}
