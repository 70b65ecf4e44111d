use serde::{Deserialize, Serialize};

use super::Tonality;
use crate::{
    primitives::{Letter, NoteName},
    ScoreError, ScoreResult,
};

/// Count of sharps (positive) or flats (negative) with tonality.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct KeySignature {
    sharps_or_flats: i32,
    tonality: Tonality,
}
impl KeySignature {
    pub fn new(sharps_or_flats: i32, tonality: Tonality) -> ScoreResult<Self> {
        match (-7..=7).contains(&sharps_or_flats) {
            true => Ok(Self {
                sharps_or_flats,
                tonality,
            }),
            false => Err(ScoreError::InvalidKeySignature(sharps_or_flats)),
        }
    }

    /// Key signature of the key, that starts from the given tonic.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::scale::{KeySignature, Tonality};
    /// let d_major = KeySignature::from_tonic(
    ///     "D".parse().unwrap(), Tonality::Major
    /// ).unwrap();
    /// assert_eq!(d_major.sharps_or_flats(), 2);
    /// let g_sharp_minor = KeySignature::from_tonic(
    ///     "G#".parse().unwrap(), Tonality::Minor
    /// ).unwrap();
    /// assert_eq!(g_sharp_minor.sharps_or_flats(), 5);
    /// assert!(KeySignature::from_tonic(
    ///     "A#".parse().unwrap(), Tonality::Major
    /// ).is_err());
    /// ```
    pub fn from_tonic(tonic: NoteName, tonality: Tonality) -> ScoreResult<Self> {
        let major = match tonic.letter {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => -1,
            Letter::G => 1,
            Letter::A => 3,
            Letter::B => 5,
        };
        let base = match tonality {
            Tonality::Major => major,
            Tonality::Minor => major - 3,
        };
        Self::new(base + 7 * tonic.accidental, tonality)
    }

    pub fn sharps_or_flats(&self) -> i32 {
        self.sharps_or_flats
    }
    pub fn tonality(&self) -> Tonality {
        self.tonality
    }
    pub fn to_guido(&self) -> String {
        format!(r"\key<{}>", self.sharps_or_flats)
    }
}
impl Default for KeySignature {
    fn default() -> Self {
        Self {
            sharps_or_flats: 0,
            tonality: Tonality::Major,
        }
    }
}
