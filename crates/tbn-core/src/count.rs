//! Monomer and polymer multiplicities, which may be infinite.

use crate::error::{TbnError, TbnResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

/// A multiplicity in ℕ ∪ {∞}.
///
/// Infinite counts absorb addition and multiplication by a positive
/// factor; subtraction is partial (see [`Count::checked_sub`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Count {
    Finite(u64),
    Infinite,
}

impl Count {
    pub const ZERO: Count = Count::Finite(0);
    pub const ONE: Count = Count::Finite(1);

    pub fn is_infinite(&self) -> bool {
        matches!(self, Count::Infinite)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Count::Finite(0))
    }

    /// The finite value, if there is one.
    pub fn as_finite(&self) -> Option<u64> {
        match self {
            Count::Finite(n) => Some(*n),
            Count::Infinite => None,
        }
    }

    /// Lossy conversion for energy arithmetic; infinity maps to `f64::INFINITY`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Count::Finite(n) => *n as f64,
            Count::Infinite => f64::INFINITY,
        }
    }

    /// Partial subtraction.
    ///
    /// `∞ − ∞` is undefined and `a − b` with `b > a` underflows; both fail.
    pub fn checked_sub(self, rhs: Count) -> TbnResult<Count> {
        match (self, rhs) {
            (Count::Infinite, Count::Infinite) => Err(TbnError::Unsupported(
                "cannot subtract an infinite count from an infinite count".into(),
            )),
            (Count::Infinite, Count::Finite(_)) => Ok(Count::Infinite),
            (Count::Finite(a), Count::Finite(b)) if a >= b => Ok(Count::Finite(a - b)),
            (Count::Finite(a), Count::Finite(b)) => Err(TbnError::Unsupported(format!(
                "cannot subtract a count of {b} from a count of {a}"
            ))),
            (Count::Finite(a), Count::Infinite) => Err(TbnError::Unsupported(format!(
                "cannot subtract an infinite count from a count of {a}"
            ))),
        }
    }
}

impl Add for Count {
    type Output = Count;

    fn add(self, rhs: Count) -> Count {
        match (self, rhs) {
            (Count::Finite(a), Count::Finite(b)) => Count::Finite(a.saturating_add(b)),
            _ => Count::Infinite,
        }
    }
}

impl AddAssign for Count {
    fn add_assign(&mut self, rhs: Count) {
        *self = *self + rhs;
    }
}

impl Mul<u64> for Count {
    type Output = Count;

    fn mul(self, rhs: u64) -> Count {
        match self {
            _ if rhs == 0 => Count::Finite(0),
            Count::Finite(a) => Count::Finite(a.saturating_mul(rhs)),
            Count::Infinite => Count::Infinite,
        }
    }
}

impl Sum for Count {
    fn sum<I: Iterator<Item = Count>>(iter: I) -> Count {
        iter.fold(Count::ZERO, Add::add)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Finite(n) => write!(f, "{n}"),
            Count::Infinite => write!(f, "inf"),
        }
    }
}

impl FromStr for Count {
    type Err = TbnError;

    fn from_str(s: &str) -> TbnResult<Count> {
        if s == "inf" {
            return Ok(Count::Infinite);
        }
        let n: u64 = s
            .parse()
            .map_err(|_| TbnError::Parse(format!("could not parse count: '{s}'")))?;
        Ok(Count::Finite(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_places_infinity_last() {
        assert!(Count::Finite(0) < Count::Finite(7));
        assert!(Count::Finite(u64::MAX) < Count::Infinite);
    }

    #[test]
    fn arithmetic_absorbs_infinity() {
        assert_eq!(Count::Finite(2) + Count::Finite(3), Count::Finite(5));
        assert_eq!(Count::Finite(2) + Count::Infinite, Count::Infinite);
        assert_eq!(Count::Infinite * 4, Count::Infinite);
        assert_eq!(Count::Infinite * 0, Count::Finite(0));
    }

    #[test]
    fn subtraction_is_partial() {
        assert_eq!(
            Count::Finite(5).checked_sub(Count::Finite(2)).unwrap(),
            Count::Finite(3)
        );
        assert_eq!(
            Count::Infinite.checked_sub(Count::Finite(9)).unwrap(),
            Count::Infinite
        );
        assert!(Count::Finite(1).checked_sub(Count::Finite(2)).is_err());
        assert!(Count::Infinite.checked_sub(Count::Infinite).is_err());
    }

    #[test]
    fn parse_and_display_round_trip() {
        assert_eq!("inf".parse::<Count>().unwrap(), Count::Infinite);
        assert_eq!("12".parse::<Count>().unwrap(), Count::Finite(12));
        assert!("-3".parse::<Count>().is_err());
        assert_eq!(Count::Infinite.to_string(), "inf");
        assert_eq!(Count::Finite(3).to_string(), "3");
    }
}
