//! A multiset with strictly positive (optionally infinite) multiplicities.

use crate::count::Count;
use crate::error::{TbnError, TbnResult};
use std::collections::BTreeMap;

/// BTreeMap-backed multiset whose counts are all ≥ 1.
///
/// Iteration is in sorted key order, which keeps rendering, matrix column
/// order, and limiting-domain order deterministic. Whether infinite counts
/// are admitted is decided at construction: monomers and polymers are
/// finite, TBNs and configurations are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositiveMultiset<T: Ord> {
    counts: BTreeMap<T, Count>,
}

impl<T: Ord> PositiveMultiset<T> {
    /// Build a multiset whose counts must all be finite.
    pub fn finite(counts: BTreeMap<T, Count>) -> TbnResult<Self> {
        for count in counts.values() {
            if count.is_infinite() {
                return Err(TbnError::InvalidInput(
                    "infinite count in a finite multiset".into(),
                ));
            }
        }
        Self::with_infinities(counts)
    }

    /// Build a multiset that may contain infinite counts.
    pub fn with_infinities(counts: BTreeMap<T, Count>) -> TbnResult<Self> {
        for count in counts.values() {
            if count.is_zero() {
                return Err(TbnError::InvalidInput(
                    "count in a multiset is not positive".into(),
                ));
            }
        }
        Ok(PositiveMultiset { counts })
    }

    /// Wrap counts that are already known to satisfy the positivity
    /// invariant (e.g. results of arithmetic on validated multisets).
    pub(crate) fn from_validated(counts: BTreeMap<T, Count>) -> Self {
        debug_assert!(counts.values().all(|count| !count.is_zero()));
        PositiveMultiset { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Multiplicity of `item`, zero if absent.
    pub fn count(&self, item: &T) -> Count {
        self.counts.get(item).copied().unwrap_or(Count::ZERO)
    }

    /// Total multiplicity over all keys.
    pub fn total(&self) -> Count {
        self.counts.values().copied().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, Count)> {
        self.counts.iter().map(|(item, count)| (item, *count))
    }

    pub fn keys(&self) -> impl Iterator<Item = &T> {
        self.counts.keys()
    }

    pub fn get_key_value(&self, item: &T) -> Option<(&T, Count)> {
        self.counts
            .get_key_value(item)
            .map(|(item, count)| (item, *count))
    }
}
