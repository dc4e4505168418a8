//! Polymers: bound complexes of monomers.

use crate::count::Count;
use crate::error::{TbnError, TbnResult};
use crate::monomer::Monomer;
use crate::multiset::PositiveMultiset;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A non-empty multiset of monomers representing one bound complex.
///
/// Polymers order by their monomer counts over the sorted key sequence,
/// larger counts first, so that bigger complexes render ahead of smaller
/// ones in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polymer {
    monomers: PositiveMultiset<Monomer>,
    size: u64,
}

impl Polymer {
    pub fn try_new(monomer_counts: BTreeMap<Monomer, Count>) -> TbnResult<Polymer> {
        if monomer_counts.is_empty() {
            return Err(TbnError::InvalidInput(
                "received request to create empty polymer".into(),
            ));
        }
        let monomers = PositiveMultiset::finite(monomer_counts)?;
        let size = monomers
            .iter()
            .map(|(_, count)| count.as_finite().unwrap_or(0))
            .sum();
        Ok(Polymer { monomers, size })
    }

    /// A polymer holding a single monomer.
    pub fn singleton(monomer: Monomer) -> Polymer {
        let mut counts = BTreeMap::new();
        counts.insert(monomer, Count::ONE);
        Polymer {
            monomers: PositiveMultiset::from_validated(counts),
            size: 1,
        }
    }

    /// Total number of monomers in the complex.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn count(&self, monomer: &Monomer) -> Count {
        self.monomers.count(monomer)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Monomer, Count)> {
        self.monomers.iter()
    }
}

impl fmt::Display for Polymer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pieces: Vec<String> = self
            .monomers
            .iter()
            .map(|(monomer, count)| match count {
                Count::Finite(1) => monomer.to_string(),
                count => format!("{count}({monomer})"),
            })
            .collect();
        write!(f, "{{{}}}", pieces.join(", "))
    }
}

impl PartialOrd for Polymer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Polymer {
    fn cmp(&self, other: &Self) -> Ordering {
        let keys: BTreeSet<&Monomer> = self.monomers.keys().chain(other.monomers.keys()).collect();
        for monomer in keys {
            // larger count sorts earlier
            match other.count(monomer).cmp(&self.count(monomer)) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monomer(text: &str, name: &str) -> Monomer {
        Monomer::from_string(text, Some(name)).unwrap()
    }

    fn polymer(counts: &[(&Monomer, u64)]) -> Polymer {
        Polymer::try_new(
            counts
                .iter()
                .map(|(m, c)| ((*m).clone(), Count::Finite(*c)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn size_sums_multiplicities() {
        let x = monomer("x0 x1", "X");
        let y = monomer("2(y0) y1 3(y2)", "Y");
        assert_eq!(polymer(&[(&x, 1)]).size(), 1);
        assert_eq!(polymer(&[(&x, 2), (&y, 3)]).size(), 5);
    }

    #[test]
    fn renders_with_count_prefixes() {
        let x = monomer("x0 x1", "X");
        let y = monomer("2(y0) y1 3(y2)", "Y");
        assert_eq!(polymer(&[(&x, 2), (&y, 3)]).to_string(), "{2(X), 3(Y)}");
        assert_eq!(polymer(&[(&x, 1), (&y, 1)]).to_string(), "{X, Y}");
    }

    #[test]
    fn larger_counts_order_first() {
        let x = monomer("x0 x1", "X");
        let y = monomer("2(y0) y1 3(y2)", "Y");
        let big = polymer(&[(&x, 2), (&y, 3)]);
        let pair = polymer(&[(&x, 1), (&y, 1)]);
        let just_x = polymer(&[(&x, 1)]);
        let just_y = polymer(&[(&y, 1)]);
        assert!(big < pair);
        assert!(pair < just_x);
        assert!(just_x < just_y);
        assert_eq!(just_y, polymer(&[(&y, 1)]));
    }

    #[test]
    fn rejects_empty() {
        assert!(Polymer::try_new(BTreeMap::new()).is_err());
    }
}
