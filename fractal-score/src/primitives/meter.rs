//! Time signature and tempo of a piece.

use serde::{Deserialize, Serialize};

use super::{is_power_of_two, Rational};
use crate::{lilypond_render::RendersToLilypond, ScoreError, ScoreResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct TimeSignature {
    numerator: u8,
    denominator: u8,
}
impl TimeSignature {
    /// Denominator must be a power of two, numerator must be positive.
    pub fn new(numerator: u8, denominator: u8) -> ScoreResult<Self> {
        match numerator > 0 && is_power_of_two(denominator as u64) {
            true => Ok(Self {
                numerator,
                denominator,
            }),
            false => Err(ScoreError::InvalidTimeSignature {
                numerator,
                denominator,
            }),
        }
    }
    pub fn numerator(&self) -> u8 {
        self.numerator
    }
    pub fn denominator(&self) -> u8 {
        self.denominator
    }
    /// Measure length in whole notes.
    pub fn measure_length(&self) -> Rational {
        Rational::new(self.numerator as i64, self.denominator as i64)
    }
    pub fn to_guido(&self) -> String {
        format!(r#"\meter<"{}/{}">"#, self.numerator, self.denominator)
    }
}
impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}
impl RendersToLilypond for TimeSignature {
    fn render_lilypond(&self) -> ScoreResult<String> {
        let (num, denom) = (self.numerator, self.denominator);
        Ok(format!(r"\time {num}/{denom}"))
    }
}

/// Tempo in quarter notes per minute.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct Tempo {
    bpm: u16,
}
impl Tempo {
    pub fn new(bpm: u16) -> ScoreResult<Self> {
        match bpm {
            0 => Err(ScoreError::InvalidTempo(bpm)),
            bpm => Ok(Self { bpm }),
        }
    }
    pub fn bpm(&self) -> u16 {
        self.bpm
    }
    /// Value of the MIDI set-tempo meta event.
    pub fn micros_per_quarter(&self) -> u32 {
        60_000_000 / self.bpm as u32
    }
    /// Conventional Italian marking for the speed.
    pub fn italian_name(&self) -> &'static str {
        match self.bpm {
            0..=39 => "Grave",
            40..=59 => "Largo",
            60..=65 => "Larghetto",
            66..=75 => "Adagio",
            76..=107 => "Andante",
            108..=119 => "Moderato",
            120..=167 => "Allegro",
            168..=199 => "Presto",
            _ => "Prestissimo",
        }
    }
    pub fn to_guido(&self) -> String {
        format!(r#"\tempo<"{}","1/4={}">"#, self.italian_name(), self.bpm)
    }
}
impl Default for Tempo {
    fn default() -> Self {
        Self { bpm: 90 }
    }
}
impl RendersToLilypond for Tempo {
    fn render_lilypond(&self) -> ScoreResult<String> {
        Ok(format!(r#"\tempo "{}" 4 = {}"#, self.italian_name(), self.bpm))
    }
}

#[cfg(test)]
mod tests {
    use super::{Tempo, TimeSignature};
    use crate::{lilypond_render::RendersToLilypond, Rational, ScoreError};

    #[test]
    fn time_signature() {
        let ts = TimeSignature::new(6, 8).unwrap();
        assert_eq!(ts.measure_length(), Rational::new(3, 4));
        assert_eq!(ts.to_guido(), r#"\meter<"6/8">"#);
        assert_eq!(ts.render_lilypond().unwrap(), r"\time 6/8");
        assert!(matches!(
            TimeSignature::new(3, 6),
            Err(ScoreError::InvalidTimeSignature {
                numerator: 3,
                denominator: 6
            })
        ));
        assert!(TimeSignature::new(0, 4).is_err());
    }

    #[test]
    fn tempo() {
        let tempo = Tempo::new(120).unwrap();
        assert_eq!(tempo.micros_per_quarter(), 500_000);
        assert_eq!(tempo.to_guido(), r#"\tempo<"Allegro","1/4=120">"#);
        assert_eq!(
            tempo.render_lilypond().unwrap(),
            r#"\tempo "Allegro" 4 = 120"#
        );
        assert_eq!(Tempo::new(60).unwrap().italian_name(), "Larghetto");
        assert_eq!(Tempo::default().italian_name(), "Andante");
        assert!(matches!(Tempo::new(0), Err(ScoreError::InvalidTempo(0))));
    }
}
