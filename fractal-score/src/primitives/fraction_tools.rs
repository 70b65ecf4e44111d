//! Integer helpers for musical lengths.

use fraction::Integer;

/// True for 1, 2, 4, 8...
pub fn is_power_of_two(num: u64) -> bool {
    num.is_power_of_two()
}

/// Largest power of two, that is not greater than `num`.
///
/// # Example
///
/// ```
/// # use fractal_score::primitives::power_of_two;
/// assert_eq!(power_of_two(12), Some(8));
/// assert_eq!(power_of_two(8), Some(8));
/// assert_eq!(power_of_two(0), None);
/// ```
pub fn power_of_two(num: u64) -> Option<u64> {
    match num {
        0 => None,
        x => Some(1 << (63 - x.leading_zeros())),
    }
}

/// Least common multiple, or None on overflow.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / a.gcd(&b)).checked_mul(b)
}

#[cfg(test)]
mod tests {
    use super::{is_power_of_two, lcm, power_of_two};

    #[test]
    fn test_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(64));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(12));
        assert_eq!(power_of_two(1), Some(1));
        assert_eq!(power_of_two(3), Some(2));
        assert_eq!(power_of_two(5), Some(4));
        assert_eq!(power_of_two(36), Some(32));
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(12, 18), Some(36));
        assert_eq!(lcm(0, 5), Some(0));
        assert_eq!(lcm(4, 6), Some(12));
        assert_eq!(lcm(12, 8), Some(24));
        assert_eq!(lcm(1, 7), Some(7));
        assert_eq!(lcm(u64::MAX, u64::MAX - 1), None);
    }
}
