use super::{is_power_of_two, Rational, MAX_DURATION_DENOMINATOR};
use crate::{ScoreError, ScoreResult};

/// Written length of a notation element.
///
/// Unlike a raw [`Rational`], length knows how it looks on paper:
/// [`Length::glyphs`] splits it into note values that can be tied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Length {
    fraction: Rational,
}
impl Length {
    pub fn get(&self) -> Rational {
        self.fraction
    }

    /// LilyPond duration strings, that sound together as this length.
    ///
    /// A single glyph, when it is a plain, dotted or double-dotted note,
    /// or one of breve and longa. Otherwise the largest power of two
    /// (capped at longa) is split off and the rest is rendered
    /// recursively, so glyphs come from longest to shortest.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::{primitives::Length, Rational};
    /// let length = Length::from(Rational::new(13, 16));
    /// assert_eq!(length.glyphs().unwrap(), vec!["2", "4", "16"]);
    /// let length = Length::from(Rational::new(7, 16));
    /// assert_eq!(length.glyphs().unwrap(), vec!["4.."]);
    /// ```
    pub fn glyphs(&self) -> ScoreResult<Vec<String>> {
        let fraction = self.fraction;
        if !fraction.is_positive() {
            return Err(ScoreError::UnsupportedDuration(format!(
                "{} is not a positive length",
                fraction
            )));
        }
        let denom = fraction.denom();
        if !is_power_of_two(denom) {
            return Err(ScoreError::UnsupportedDuration(format!(
                "{} can be written only inside a tuplet",
                fraction
            )));
        }
        if denom > MAX_DURATION_DENOMINATOR {
            return Err(ScoreError::UnsupportedDuration(format!(
                "{} is shorter than 1/{}",
                fraction, MAX_DURATION_DENOMINATOR
            )));
        }
        if let Some(glyph) = single_glyph(fraction.numer(), denom) {
            return Ok(vec![glyph]);
        }
        let longa = Rational::from_integer(4);
        let head = fraction
            .largest_power_of_2_at_most()
            .map_or(longa, |head| head.min(longa));
        let mut glyphs = Length::from(head).glyphs()?;
        glyphs.extend(Length::from(fraction - head).glyphs()?);
        Ok(glyphs)
    }
}

fn single_glyph(numer: i64, denom: u64) -> Option<String> {
    match (numer, denom) {
        (1, d) => Some(d.to_string()),
        (3, d) if d >= 2 => Some(format!("{}.", d / 2)),
        (7, d) if d >= 4 => Some(format!("{}..", d / 4)),
        (2, 1) => Some(r"\breve".to_string()),
        (3, 1) => Some(r"\breve.".to_string()),
        (4, 1) => Some(r"\longa".to_string()),
        (6, 1) => Some(r"\longa.".to_string()),
        _ => None,
    }
}

impl From<Rational> for Length {
    fn from(value: Rational) -> Self {
        Self { fraction: value }
    }
}
