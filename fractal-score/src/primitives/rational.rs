use std::{
    cmp::Ordering,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub},
    str::FromStr,
};

use fraction::Fraction;

use super::fraction_tools::is_power_of_two;
use crate::ScoreError;

/// Exact fraction in lowest terms with a positive denominator.
///
/// All musical time in the crate is counted in whole notes with it:
/// `Rational::new(1, 4)` is a quarter note.
///
/// Wraps [`fraction::Fraction`], which is always normalized, so equal
/// values compare equal whatever they were built from.
///
/// # Example
///
/// ```
/// # use fractal_score::Rational;
/// let triplet_eighth = Rational::new(1, 12);
/// let sum: Rational = std::iter::repeat(triplet_eighth).take(3).sum();
/// assert_eq!(sum, Rational::new(1, 4));
/// assert!(sum.denom_is_power_of_2());
/// assert_eq!(Rational::new(2, -4).to_string(), "-1/2");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational(Fraction);

impl Rational {
    /// # Panics
    ///
    /// If `denom` is zero, or the reduced numerator does not fit in i64.
    pub fn new(numer: i64, denom: i64) -> Self {
        match Self::checked_new(numer, denom) {
            Some(ratio) => ratio,
            None => panic!("{}/{} is not a valid rational", numer, denom),
        }
    }

    /// Same as [`Rational::new`], but returns None instead of panicking.
    pub fn checked_new(numer: i64, denom: i64) -> Option<Self> {
        let ratio = Self::checked_from_unsigned(
            numer.unsigned_abs(),
            denom.unsigned_abs(),
        )?;
        match (numer < 0) != (denom < 0) {
            true => Some(-ratio),
            false => Some(ratio),
        }
    }

    /// # Panics
    ///
    /// If `denom` is zero, or the reduced numerator does not fit in i64.
    pub fn from_unsigned(numer: u64, denom: u64) -> Self {
        match Self::checked_from_unsigned(numer, denom) {
            Some(ratio) => ratio,
            None => panic!("{}/{} is not a valid rational", numer, denom),
        }
    }

    /// None on zero denominator, or if the numerator in lowest terms is
    /// above `i64::MAX`.
    pub fn checked_from_unsigned(numer: u64, denom: u64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let fraction = Fraction::new(numer, denom);
        let reduced = fraction.numer().copied().unwrap_or(0);
        i64::try_from(reduced).ok().map(|_| Self(fraction))
    }

    pub fn from_integer(value: i64) -> Self {
        Self::new(value, 1)
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    /// Signed numerator in lowest terms.
    ///
    /// Saturates at `i64::MAX` if arithmetic has grown the value past the
    /// range every constructor checks.
    pub fn numer(&self) -> i64 {
        let numer = self
            .0
            .numer()
            .copied()
            .map_or(0, |numer| i64::try_from(numer).unwrap_or(i64::MAX));
        match self.0.is_sign_negative() {
            true => -numer,
            false => numer,
        }
    }

    pub fn denom(&self) -> u64 {
        self.0.denom().copied().unwrap_or(1)
    }

    pub fn is_zero(&self) -> bool {
        self.numer() == 0
    }

    pub fn is_positive(&self) -> bool {
        self.numer() > 0
    }

    pub fn denom_is_power_of_2(&self) -> bool {
        is_power_of_two(self.denom())
    }

    pub fn to_f64(&self) -> f64 {
        self.numer() as f64 / self.denom() as f64
    }

    /// Largest `2^k` (k may be negative) not greater than self.
    ///
    /// None for zero and negative values.
    ///
    /// # Example
    ///
    /// ```
    /// # use fractal_score::Rational;
    /// assert_eq!(
    ///     Rational::new(5, 8).largest_power_of_2_at_most(),
    ///     Some(Rational::new(1, 2))
    /// );
    /// assert_eq!(
    ///     Rational::new(7, 2).largest_power_of_2_at_most(),
    ///     Some(Rational::from_integer(2))
    /// );
    /// ```
    pub fn largest_power_of_2_at_most(&self) -> Option<Self> {
        if !self.is_positive() {
            return None;
        }
        let numer = self.numer() as u128;
        let denom = self.denom() as u128;
        if numer >= denom {
            let whole = (numer / denom) as u64;
            let power = 1u64 << (63 - whole.leading_zeros());
            return Some(Self::from_unsigned(power, 1));
        }
        let mut power: u128 = 1;
        while power * numer < denom {
            power *= 2;
        }
        Some(Self::from_unsigned(1, power as u64))
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.numer() as i128 * other.denom() as i128;
        let right = other.numer() as i128 * self.denom() as i128;
        left.cmp(&right)
    }
}

impl Add for Rational {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl Sub for Rational {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl Mul for Rational {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
impl Mul<i64> for Rational {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self::Output {
        self * Self::from_integer(rhs)
    }
}
impl Div for Rational {
    type Output = Self;
    /// # Panics
    ///
    /// On division by zero.
    fn div(self, rhs: Self) -> Self::Output {
        assert!(!rhs.is_zero(), "division of a rational by zero");
        Self(self.0 / rhs.0)
    }
}
impl Neg for Rational {
    type Output = Self;
    fn neg(self) -> Self::Output {
        match self.is_zero() {
            true => self,
            false => Self(-self.0),
        }
    }
}
impl Sum for Rational {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, item| acc + item)
    }
}
impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.denom() {
            1 => write!(f, "{}", self.numer()),
            denom => write!(f, "{}/{}", self.numer(), denom),
        }
    }
}
impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({})", self)
    }
}

impl FromStr for Rational {
    type Err = ScoreError;
    /// Parses "3/8", "-1/4" or "2".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |msg: &str| {
            ScoreError::NoteStringParse(s.to_string(), msg.to_string())
        };
        let (numer, denom) = match s.trim().split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (s.trim(), "1"),
        };
        let numer: i64 = numer.parse().map_err(|_| err("bad numerator"))?;
        let denom: i64 =
            denom.parse().map_err(|_| err("bad denominator"))?;
        Self::checked_new(numer, denom)
            .ok_or_else(|| err("zero denominator or numerator out of range"))
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Rational;

    #[test]
    fn test_normalization() {
        assert_eq!(Rational::new(2, 8), Rational::new(1, 4));
        assert_eq!(Rational::new(-3, -6), Rational::new(1, 2));
        assert_eq!(Rational::new(3, -6).numer(), -1);
        assert_eq!(Rational::new(3, -6).denom(), 2);
        assert_eq!(Rational::new(0, -5), Rational::zero());
        assert_eq!(Rational::checked_new(1, 0), None);
    }

    #[test]
    fn numerator_range() {
        assert_eq!(Rational::checked_from_unsigned(u64::MAX, 1), None);
        assert_eq!(
            Rational::checked_from_unsigned(u64::MAX - 1, 2).map(|r| r.numer()),
            Some(i64::MAX)
        );
        assert_eq!(Rational::checked_new(i64::MIN, 1), None);
        assert_eq!(
            Rational::checked_new(i64::MIN, 2),
            Some(Rational::from_integer(-(1 << 62)))
        );
        assert!("9223372036854775807/1".parse::<Rational>().is_ok());
    }

    #[test]
    #[should_panic]
    fn numerator_above_i64() {
        let _ = Rational::from_unsigned(u64::MAX, 1);
    }

    #[test]
    fn test_arithmetic() {
        let third = Rational::new(1, 3);
        let sixth = Rational::new(1, 6);
        assert_eq!(third + sixth, Rational::new(1, 2));
        assert_eq!(sixth - third, Rational::new(-1, 6));
        assert_eq!(third * sixth, Rational::new(1, 18));
        assert_eq!(sixth / Rational::new(2, 3), Rational::new(1, 4));
        assert_eq!(-(sixth - sixth), Rational::zero());
        assert_eq!(third * 3, Rational::one());
        assert!(third > sixth);
        assert!(Rational::new(-1, 2) < Rational::zero());
    }

    #[test]
    fn test_power_of_two_helpers() {
        assert!(Rational::new(3, 16).denom_is_power_of_2());
        assert!(Rational::from_integer(3).denom_is_power_of_2());
        assert!(!Rational::new(1, 6).denom_is_power_of_2());
        assert_eq!(
            Rational::new(1, 6).largest_power_of_2_at_most(),
            Some(Rational::new(1, 8))
        );
        assert_eq!(
            Rational::new(1, 4).largest_power_of_2_at_most(),
            Some(Rational::new(1, 4))
        );
        assert_eq!(
            Rational::from_integer(13).largest_power_of_2_at_most(),
            Some(Rational::from_integer(8))
        );
        assert_eq!(Rational::zero().largest_power_of_2_at_most(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("3/8".parse::<Rational>().unwrap(), Rational::new(3, 8));
        assert_eq!("2".parse::<Rational>().unwrap(), Rational::new(2, 1));
        assert_eq!(" -1/4 ".parse::<Rational>().unwrap(), Rational::new(-1, 4));
        assert!("1/0".parse::<Rational>().is_err());
        assert!("x/4".parse::<Rational>().is_err());
    }
}
