//! Common tick resolution for all voices of a piece.
//!
//! Ticks are counted per whole note. The resolution is the least common
//! multiple of every duration denominator, so each note starts and ends
//! exactly on a tick.

use std::collections::BTreeSet;

use log::debug;

use crate::{
    dom::{FractalPiece, Section},
    primitives::{lcm, Note, NoteList, Rational},
    ScoreError, ScoreResult,
};

/// Ticks per whole note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resolution(u64);
impl Resolution {
    /// # Panics
    ///
    /// If `ticks_per_whole_note` is zero.
    pub fn new(ticks_per_whole_note: u64) -> Self {
        assert!(ticks_per_whole_note > 0, "resolution can not be zero");
        Self(ticks_per_whole_note)
    }

    pub fn ticks_per_whole_note(&self) -> u64 {
        self.0
    }

    /// Ticks of a duration (or a position) counted in whole notes.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::{quantize::Resolution, Rational};
    /// let resolution = Resolution::new(24);
    /// assert_eq!(resolution.ticks(Rational::new(1, 6)).unwrap(), 4);
    /// assert!(resolution.ticks(Rational::new(1, 5)).is_err());
    /// ```
    pub fn ticks(&self, duration: Rational) -> ScoreResult<u64> {
        let scaled = duration.numer() as i128 * self.0 as i128;
        let denom = duration.denom() as i128;
        if scaled < 0 || scaled % denom != 0 {
            return Err(ScoreError::InternalConsistency(format!(
                "{} does not fall on a tick of resolution {}",
                duration, self.0
            )));
        }
        u64::try_from(scaled / denom).map_err(|_| {
            ScoreError::InternalConsistency(format!(
                "{} overflows ticks at resolution {}",
                duration, self.0
            ))
        })
    }
}
impl Default for Resolution {
    fn default() -> Self {
        Self(1)
    }
}

/// Least common multiple of duration denominators over all voices.
///
/// One, if there are no notes at all.
pub fn compute_resolution<'a>(
    voices: impl IntoIterator<Item = &'a NoteList>,
) -> ScoreResult<Resolution> {
    resolution_of(
        voices
            .into_iter()
            .flat_map(NoteList::iter)
            .map(Note::duration),
    )
}

/// Resolution, on which every note and every section boundary of the
/// piece falls.
pub fn piece_resolution(
    piece: &FractalPiece,
    voices: &[NoteList],
) -> ScoreResult<Resolution> {
    resolution_of(
        voices
            .iter()
            .flat_map(NoteList::iter)
            .map(Note::duration)
            .chain(piece.sections().iter().map(Section::duration)),
    )
}

fn resolution_of(
    durations: impl Iterator<Item = Rational>,
) -> ScoreResult<Resolution> {
    let denominators: BTreeSet<u64> =
        durations.map(|duration| duration.denom()).collect();
    let resolution = denominators
        .iter()
        .try_fold(1, |acc, &denom| lcm(acc, denom))
        .ok_or_else(|| {
            ScoreError::InternalConsistency(format!(
                "resolution overflow for denominators {:?}",
                denominators
            ))
        })?;
    debug!(
        "resolution {} from denominators {:?}",
        resolution, denominators
    );
    Ok(Resolution(resolution))
}

#[cfg(test)]
mod tests {
    use super::{compute_resolution, piece_resolution, Resolution};
    use crate::{
        scale::{KeySignature, Tonality},
        FractalPiece, Note, NoteList, Rational, Scale, ScoreError, Section,
    };

    fn voice(durations: &[(i64, i64)]) -> NoteList {
        durations
            .iter()
            .map(|&(n, d)| Note::new(0, 0, 4, Rational::new(n, d), 80).unwrap())
            .collect()
    }

    #[test]
    fn lcm_of_denominators() {
        let a = voice(&[(1, 4), (1, 6)]);
        let b = voice(&[(1, 8), (3, 8)]);
        let resolution = compute_resolution([&a, &b]).unwrap();
        assert_eq!(resolution, Resolution::new(24));
        let c = voice(&[(1, 5), (1, 7), (2, 1)]);
        assert_eq!(compute_resolution([&c]).unwrap().ticks_per_whole_note(), 35);
        assert_eq!(compute_resolution([]).unwrap(), Resolution::new(1));
    }

    #[test]
    fn every_duration_is_integral() {
        let a = voice(&[(1, 4), (1, 6), (1, 9), (5, 12), (1, 16)]);
        let resolution = compute_resolution([&a]).unwrap();
        for note in a.iter() {
            let ticks = resolution.ticks(note.duration()).unwrap();
            assert_eq!(
                Rational::new(ticks as i64, resolution.ticks_per_whole_note() as i64),
                note.duration()
            );
        }
    }

    #[test]
    fn overflow() {
        let primes = [
            1_000_003, 1_000_033, 1_000_037, 1_000_039, 1_000_081,
        ];
        let a: NoteList = primes
            .iter()
            .map(|&p| Note::new(0, 0, 4, Rational::new(1, p), 80).unwrap())
            .collect();
        assert!(matches!(
            compute_resolution([&a]),
            Err(ScoreError::InternalConsistency(_))
        ));
    }

    #[test]
    fn negative_ticks() {
        assert!(Resolution::new(4).ticks(Rational::new(-1, 4)).is_err());
        assert_eq!(Resolution::new(4).ticks(Rational::zero()).unwrap(), 0);
    }

    #[test]
    fn section_boundaries_are_on_ticks() {
        let scale = Scale::major("C".parse().unwrap()).unwrap();
        let home = scale.key_signature();
        let voice = voice(&[(1, 4), (1, 4), (1, 2)]);
        let piece = FractalPiece::new(voice.clone(), scale).with_sections(vec![
            Section::new(Rational::new(3, 8), home),
            Section::new(
                Rational::new(5, 8),
                KeySignature::new(2, Tonality::Major).unwrap(),
            ),
        ]);
        let voices = [voice];
        assert_eq!(compute_resolution(&voices).unwrap(), Resolution::new(4));
        let resolution = piece_resolution(&piece, &voices).unwrap();
        assert_eq!(resolution, Resolution::new(8));
        assert_eq!(resolution.ticks(Rational::new(3, 8)).unwrap(), 3);
    }
}
