//! Thermodynamic binding networks: pools of monomer types.

use crate::count::Count;
use crate::domain::Domain;
use crate::error::{TbnError, TbnResult};
use crate::monomer::Monomer;
use crate::multiset::PositiveMultiset;
use std::collections::BTreeMap;
use std::fmt;

/// A pool of monomer types with multiplicities in ℕ⁺ ∪ {∞}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tbn {
    monomers: PositiveMultiset<Monomer>,
}

/// Signed tally that tracks net domain counts across possibly-infinite
/// monomer multiplicities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tally {
    Finite(i64),
    PosInfinite,
    NegInfinite,
}

impl Tally {
    fn add(self, other: Tally, domain: &Domain) -> TbnResult<Tally> {
        use Tally::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Ok(Finite(a + b)),
            (PosInfinite, NegInfinite) | (NegInfinite, PosInfinite) => Err(
                TbnError::ConflictingInfinity(domain.unstarred().to_string()),
            ),
            (PosInfinite, _) | (_, PosInfinite) => Ok(PosInfinite),
            (NegInfinite, _) | (_, NegInfinite) => Ok(NegInfinite),
        }
    }

    fn of(net: i64, count: Count) -> Tally {
        match count {
            Count::Finite(count) => Tally::Finite(net * count as i64),
            Count::Infinite if net > 0 => Tally::PosInfinite,
            Count::Infinite if net < 0 => Tally::NegInfinite,
            Count::Infinite => Tally::Finite(0),
        }
    }

    fn is_positive(&self) -> bool {
        matches!(self, Tally::PosInfinite) || matches!(self, Tally::Finite(n) if *n > 0)
    }

    fn is_negative(&self) -> bool {
        matches!(self, Tally::NegInfinite) || matches!(self, Tally::Finite(n) if *n < 0)
    }
}

impl Tbn {
    /// Builds a TBN, enforcing that a monomer name denotes exactly one
    /// composition.
    pub fn try_new(monomer_counts: impl IntoIterator<Item = (Monomer, Count)>) -> TbnResult<Tbn> {
        let mut counts: BTreeMap<Monomer, Count> = BTreeMap::new();
        for (monomer, count) in monomer_counts {
            if let Some((known, _)) = counts.get_key_value(&monomer) {
                if !known.same_composition(&monomer) {
                    return Err(TbnError::InvalidInput(format!(
                        "cannot have two distinct monomers with the same name: {monomer}"
                    )));
                }
            }
            *counts.entry(monomer).or_insert(Count::ZERO) += count;
        }
        Ok(Tbn {
            monomers: PositiveMultiset::with_infinities(counts)?,
        })
    }

    pub(crate) fn from_validated(counts: BTreeMap<Monomer, Count>) -> Tbn {
        Tbn {
            monomers: PositiveMultiset::from_validated(counts),
        }
    }

    /// Parses one monomer per non-blank line, optionally prefixed with a
    /// count: `inf[a* b*]`, `2[a b >X]`, or a bare `a b*`.
    pub fn from_string(text: &str) -> TbnResult<Tbn> {
        let mut counts: Vec<(Monomer, Count)> = Vec::new();
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let (count, monomer_text) = match line.find('[') {
                Some(open) if line.ends_with(']') => {
                    let prefix = line[..open].trim();
                    let count: Count = if prefix.is_empty() {
                        Count::ONE
                    } else {
                        prefix.parse()?
                    };
                    if count.is_zero() {
                        return Err(TbnError::Parse(format!(
                            "monomer count must be positive: '{line}'"
                        )));
                    }
                    (count, line[open + 1..line.len() - 1].trim())
                }
                _ => (Count::ONE, line),
            };
            let monomer = Monomer::from_string(monomer_text, None)?;
            counts.push((monomer, count));
        }
        Tbn::try_new(counts)
    }

    /// Monomer types in sorted order.
    pub fn monomer_types(&self) -> impl Iterator<Item = &Monomer> {
        self.monomers.keys()
    }

    pub fn count(&self, monomer: &Monomer) -> Count {
        self.monomers.count(monomer)
    }

    pub fn number_of_monomer_types(&self) -> usize {
        self.monomers.len()
    }

    pub fn number_of_monomers(&self) -> Count {
        self.monomers.total()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Monomer, Count)> {
        self.monomers.iter()
    }

    /// Every monomer instance listed individually, in sorted order.
    ///
    /// Formulations that label single monomers cannot handle infinite
    /// multiplicities.
    pub fn flattened_monomers(&self) -> TbnResult<Vec<Monomer>> {
        let mut list = Vec::new();
        for (monomer, count) in self.monomers.iter() {
            let count = count.as_finite().ok_or_else(|| {
                TbnError::Unsupported(format!(
                    "cannot list single monomers of '{monomer}' with an infinite count"
                ))
            })?;
            for _ in 0..count {
                list.push(monomer.clone());
            }
        }
        Ok(list)
    }

    /// The limiting (minority) domain flavor for each identifier in the
    /// network, sorted by identifier.
    ///
    /// A strictly positive net tally of the unstarred flavor makes the
    /// starred flavor limiting and vice versa; an exact tie yields both
    /// flavors. Opposing infinite quantities fail.
    pub fn limiting_domain_types(&self) -> TbnResult<Vec<Domain>> {
        self.limiting_domains(false)
    }

    /// Like [`Tbn::limiting_domain_types`] but ties are excluded; used to
    /// decide which domains receive slack columns in lattice projections.
    pub fn strictly_limiting_domain_types(&self) -> TbnResult<Vec<Domain>> {
        self.limiting_domains(true)
    }

    fn limiting_domains(&self, filter_ties: bool) -> TbnResult<Vec<Domain>> {
        let mut tallies: BTreeMap<Domain, Tally> = BTreeMap::new();
        for (monomer, count) in self.monomers.iter() {
            for domain in monomer.unstarred_domain_types() {
                let contribution = Tally::of(monomer.net_count(&domain), count);
                let tally = tallies.entry(domain.clone()).or_insert(Tally::Finite(0));
                *tally = tally.add(contribution, &domain)?;
            }
        }

        let mut limiting = Vec::new();
        for (domain, tally) in &tallies {
            if tally.is_positive() {
                limiting.push(domain.complement());
            } else if tally.is_negative() {
                limiting.push(domain.clone());
            } else if !filter_ties {
                limiting.push(domain.clone());
                limiting.push(domain.complement());
            }
        }
        Ok(limiting)
    }

    /// Monomer types carrying at least one limiting domain in positive
    /// net count; these must be fully consumed by any saturated cover.
    pub fn limiting_monomer_types(&self) -> TbnResult<Vec<Monomer>> {
        let limiting_domains = self.limiting_domain_types()?;
        Ok(self
            .monomers
            .keys()
            .filter(|monomer| {
                limiting_domains
                    .iter()
                    .any(|domain| monomer.net_count(domain) > 0)
            })
            .cloned()
            .collect())
    }

    /// `self − other`; defined only when `other` is a sub-multiset.
    pub fn subtract(&self, other: &Tbn) -> TbnResult<Tbn> {
        let mut counts: BTreeMap<Monomer, Count> = BTreeMap::new();
        for (monomer, count) in self.monomers.iter() {
            counts.insert(monomer.clone(), count);
        }
        for (monomer, removed) in other.monomers.iter() {
            let present = self.count(monomer);
            if present.is_zero() {
                return Err(TbnError::Unsupported(format!(
                    "cannot subtract monomer '{monomer}' that is not present"
                )));
            }
            let remaining = present.checked_sub(removed)?;
            if remaining.is_zero() {
                counts.remove(monomer);
            } else {
                counts.insert(monomer.clone(), remaining);
            }
        }
        Ok(Tbn::from_validated(counts))
    }
}

impl fmt::Display for Tbn {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts_and_accumulates_duplicates() {
        let tbn = Tbn::from_string("2[a b]\n a b \n inf[a* b*]").unwrap();
        let ab = Monomer::from_string("a b", None).unwrap();
        let star = Monomer::from_string("a* b*", None).unwrap();
        assert_eq!(tbn.count(&ab), Count::Finite(3));
        assert_eq!(tbn.count(&star), Count::Infinite);
        assert_eq!(tbn.number_of_monomers(), Count::Infinite);
    }

    #[test]
    fn render_and_reparse_is_identity() {
        let tbn = Tbn::from_string("a* b* \n a b \n a* \n b*").unwrap();
        let rendered = tbn.to_string();
        let lines: String = rendered
            .trim_start_matches('{')
            .trim_end_matches('}')
            .split(", ")
            .map(|piece| {
                // `k(monomer)` renders back into the `k[monomer]` line form
                match piece.split_once('(') {
                    Some((count, rest)) => {
                        format!("{count}[{}]\n", rest.trim_end_matches(')'))
                    }
                    None => format!("{}\n", piece.trim_start_matches('[').trim_end_matches(']')),
                }
            })
            .collect();
        assert_eq!(Tbn::from_string(&lines).unwrap(), tbn);
    }

    #[test]
    fn rejects_conflicting_name_redefinition() {
        let x1 = Monomer::from_string("a b", Some("X")).unwrap();
        let x2 = Monomer::from_string("a* b*", Some("X")).unwrap();
        let result = Tbn::try_new([(x1, Count::ONE), (x2, Count::ONE)]);
        assert!(matches!(result, Err(TbnError::InvalidInput(_))));
    }

    #[test]
    fn limiting_domains_follow_the_minority_side() {
        let tbn = Tbn::from_string("a* b* \n a b \n a* \n b*").unwrap();
        let limiting = tbn.limiting_domain_types().unwrap();
        assert_eq!(
            limiting,
            vec!["a".parse::<Domain>().unwrap(), "b".parse().unwrap()]
        );

        let excess_unstarred = Tbn::from_string("a \n a \n a*").unwrap();
        assert_eq!(
            excess_unstarred.limiting_domain_types().unwrap(),
            vec!["a*".parse::<Domain>().unwrap()]
        );
    }

    #[test]
    fn tie_yields_both_flavors() {
        let tbn = Tbn::from_string("a \n a*").unwrap();
        assert_eq!(
            tbn.limiting_domain_types().unwrap(),
            vec!["a".parse::<Domain>().unwrap(), "a*".parse().unwrap()]
        );
        assert!(tbn.strictly_limiting_domain_types().unwrap().is_empty());
    }

    #[test]
    fn infinite_tallies() {
        let tbn = Tbn::from_string("inf[a* b*] \n 2[a b]").unwrap();
        assert_eq!(
            tbn.limiting_domain_types().unwrap(),
            vec!["a".parse::<Domain>().unwrap(), "b".parse().unwrap()]
        );

        let conflicted = Tbn::from_string("inf[a] \n inf[a*]").unwrap();
        assert!(matches!(
            conflicted.limiting_domain_types(),
            Err(TbnError::ConflictingInfinity(_))
        ));
    }

    #[test]
    fn limiting_monomers_contain_limiting_excess() {
        let tbn = Tbn::from_string("a* b* \n a b \n a* \n b*").unwrap();
        let limiting = tbn.limiting_monomer_types().unwrap();
        let ab = Monomer::from_string("a b", None).unwrap();
        assert_eq!(limiting, vec![ab]);
    }

    #[test]
    fn subtraction_requires_sub_multiset() {
        let tbn = Tbn::from_string("2[a b] \n a*").unwrap();
        let part = Tbn::from_string("a b").unwrap();
        let rest = tbn.subtract(&part).unwrap();
        assert_eq!(rest, Tbn::from_string("a b \n a*").unwrap());
        assert!(rest.subtract(&tbn).is_err());
    }

    #[test]
    fn flatten_list_rejects_infinity() {
        let tbn = Tbn::from_string("inf[a]").unwrap();
        assert!(matches!(
            tbn.flattened_monomers(),
            Err(TbnError::Unsupported(_))
        ));
        let finite = Tbn::from_string("2[a] \n b").unwrap();
        assert_eq!(finite.flattened_monomers().unwrap().len(), 3);
    }
}
