//! Positions of events along the piece timeline.
//!
//! Positions are absolute: the distance from the piece start in whole
//! notes. They become ticks only through a [`Resolution`].
//!
//! # Examples
//!
//! ```
//! use fractal_score::{primitives::AbsolutePosition, Rational};
//! use fractal_score::quantize::Resolution;
//!
//! let mut position = AbsolutePosition::default();
//! position += Rational::new(1, 4);
//! position += Rational::new(1, 12);
//! assert_eq!(position.get(), Rational::new(1, 3));
//! let resolution = Resolution::new(12);
//! assert_eq!(position.ticks(&resolution).unwrap(), 4);
//! ```

use std::ops::AddAssign;

use super::Rational;
use crate::{quantize::Resolution, ScoreResult};

/// Absolute position in whole notes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AbsolutePosition {
    position: Rational,
}
impl AbsolutePosition {
    pub fn new(position: Rational) -> Self {
        Self { position }
    }

    pub fn get(&self) -> Rational {
        self.position
    }

    /// Tick of the position at the given resolution.
    ///
    /// Fails if the position does not fall on a tick.
    pub fn ticks(&self, resolution: &Resolution) -> ScoreResult<u64> {
        resolution.ticks(self.position)
    }
}
impl AddAssign<Rational> for AbsolutePosition {
    fn add_assign(&mut self, rhs: Rational) {
        self.position += rhs
    }
}
impl From<Rational> for AbsolutePosition {
    fn from(value: Rational) -> Self {
        Self { position: value }
    }
}

#[cfg(test)]
mod tests {
    use super::AbsolutePosition;
    use crate::{quantize::Resolution, Rational};

    #[test]
    fn advance() {
        let mut position = AbsolutePosition::new(Rational::new(1, 4));
        position += Rational::new(1, 12);
        assert_eq!(position, AbsolutePosition::from(Rational::new(1, 3)));
    }

    #[test]
    fn off_grid_ticks() {
        let position = AbsolutePosition::from(Rational::new(1, 6));
        assert!(position.ticks(&Resolution::new(8)).is_err());
        assert_eq!(position.ticks(&Resolution::new(24)).unwrap(), 4);
    }
}
