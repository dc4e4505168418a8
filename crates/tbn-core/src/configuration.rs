//! Configurations: multisets of polymers covering a TBN.

use crate::count::Count;
use crate::error::{TbnError, TbnResult};
use crate::monomer::Monomer;
use crate::multiset::PositiveMultiset;
use crate::polymer::Polymer;
use crate::tbn::Tbn;
use std::collections::BTreeMap;
use std::fmt;

/// A multiset of polymers; polymer multiplicities may be infinite.
///
/// `Display` suppresses singleton polymers; use
/// [`Configuration::render`] to include them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    polymers: PositiveMultiset<Polymer>,
}

impl Configuration {
    pub fn try_new(polymer_counts: BTreeMap<Polymer, Count>) -> TbnResult<Configuration> {
        Ok(Configuration {
            polymers: PositiveMultiset::with_infinities(polymer_counts)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Polymer, Count)> {
        self.polymers.iter()
    }

    pub fn number_of_polymers(&self) -> Count {
        self.polymers.total()
    }

    /// A polymer of size `s` contributes `s − 1` merges per copy;
    /// singletons contribute nothing even at infinite multiplicity.
    pub fn number_of_merges(&self) -> Count {
        self.polymers
            .iter()
            .filter(|(polymer, _)| polymer.size() > 1)
            .map(|(polymer, count)| count * (polymer.size() - 1))
            .sum()
    }

    /// Multiplies every polymer through, yielding the covered TBN.
    pub fn flatten(&self) -> Tbn {
        let mut counts: BTreeMap<Monomer, Count> = BTreeMap::new();
        for (polymer, polymer_count) in self.polymers.iter() {
            for (monomer, monomer_count) in polymer.iter() {
                let contribution = polymer_count * monomer_count.as_finite().unwrap_or(0);
                *counts.entry(monomer.clone()).or_insert(Count::ZERO) += contribution;
            }
        }
        Tbn::from_validated(counts)
    }

    /// Weighted energy: `w · total_bond_deficit + merges`, rounded to 8
    /// decimals. Requires `w > 0`; infinite quantities propagate to
    /// `f64::INFINITY`.
    pub fn energy(&self, bond_weight: f64) -> TbnResult<f64> {
        if !(bond_weight > 0.0) {
            return Err(TbnError::Unsupported(format!(
                "bond weight must be positive, got {bond_weight}"
            )));
        }

        let mut total_deficit = 0.0f64;
        for domain in self.flatten().limiting_domain_types()? {
            for (polymer, polymer_count) in self.polymers.iter() {
                let excess: i64 = polymer
                    .iter()
                    .map(|(monomer, count)| {
                        monomer.net_count(&domain) * count.as_finite().unwrap_or(0) as i64
                    })
                    .sum();
                if excess > 0 {
                    total_deficit += excess as f64 * polymer_count.to_f64();
                }
            }
        }

        let energy = bond_weight * total_deficit + self.number_of_merges().to_f64();
        Ok((energy * 1e8).round() / 1e8)
    }

    /// Renders `"; "`-joined polymers, each prefixed with its count when
    /// above one; `singletons = false` hides polymers of size one.
    pub fn render(&self, singletons: bool) -> String {
        let pieces: Vec<String> = self
            .polymers
            .iter()
            .filter(|(polymer, _)| singletons || polymer.size() > 1)
            .map(|(polymer, count)| match count {
                Count::Finite(1) => polymer.to_string(),
                count => format!("{count}{polymer}"),
            })
            .collect();
        pieces.join("; ")
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(false))
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

    fn configuration(counts: &[(&Polymer, Count)]) -> Configuration {
        Configuration::try_new(
            counts
                .iter()
                .map(|(p, c)| ((*p).clone(), *c))
                .collect(),
        )
        .unwrap()
    }

    struct Fixture {
        one_x: Polymer,
        one_y: Polymer,
        x_y: Polymer,
        two_x_three_y: Polymer,
    }

    fn fixture() -> Fixture {
        let x = monomer("x0 x1", "X");
        let y = monomer("2(y0) y1 3(y2)", "Y");
        Fixture {
            one_x: polymer(&[(&x, 1)]),
            one_y: polymer(&[(&y, 1)]),
            x_y: polymer(&[(&x, 1), (&y, 1)]),
            two_x_three_y: polymer(&[(&x, 2), (&y, 3)]),
        }
    }

    #[test]
    fn counts_polymers_and_merges() {
        let f = fixture();
        let config = configuration(&[
            (&f.one_x, Count::Finite(1)),
            (&f.one_y, Count::Finite(2)),
            (&f.x_y, Count::Finite(2)),
            (&f.two_x_three_y, Count::Finite(2)),
        ]);
        assert_eq!(config.number_of_polymers(), Count::Finite(7));
        assert_eq!(config.number_of_merges(), Count::Finite(10));
    }

    #[test]
    fn infinite_singletons_do_not_merge() {
        let f = fixture();
        let config = configuration(&[
            (&f.x_y, Count::Finite(1)),
            (&f.one_y, Count::Infinite),
        ]);
        assert_eq!(config.number_of_polymers(), Count::Infinite);
        assert_eq!(config.number_of_merges(), Count::Finite(1));

        let inf_pair = configuration(&[
            (&f.x_y, Count::Infinite),
            (&f.one_y, Count::Finite(1)),
        ]);
        assert_eq!(inf_pair.number_of_merges(), Count::Infinite);
    }

    #[test]
    fn rendering_orders_and_hides_singletons() {
        let f = fixture();
        let config = configuration(&[
            (&f.one_y, Count::Finite(1)),
            (&f.x_y, Count::Finite(2)),
            (&f.two_x_three_y, Count::Finite(3)),
            (&f.one_x, Count::Finite(4)),
        ]);
        assert_eq!(
            config.render(true),
            "3{2(X), 3(Y)}; 2{X, Y}; 4{X}; {Y}"
        );
        assert_eq!(config.to_string(), "3{2(X), 3(Y)}; 2{X, Y}");

        let with_inf = configuration(&[
            (&f.one_y, Count::Infinite),
            (&f.x_y, Count::Infinite),
            (&f.two_x_three_y, Count::Finite(3)),
            (&f.one_x, Count::Finite(4)),
        ]);
        assert_eq!(
            with_inf.render(true),
            "3{2(X), 3(Y)}; inf{X, Y}; 4{X}; inf{Y}"
        );
        assert_eq!(with_inf.to_string(), "3{2(X), 3(Y)}; inf{X, Y}");
    }

    #[test]
    fn flatten_multiplies_through() {
        let f = fixture();
        let x = monomer("x0 x1", "X");
        let y = monomer("2(y0) y1 3(y2)", "Y");
        let config = configuration(&[
            (&f.x_y, Count::Finite(1)),
            (&f.two_x_three_y, Count::Finite(2)),
        ]);
        let expected = Tbn::try_new([
            (x.clone(), Count::Finite(5)),
            (y.clone(), Count::Finite(7)),
        ])
        .unwrap();
        assert_eq!(config.flatten(), expected);

        let infinite = configuration(&[
            (&f.x_y, Count::Finite(1)),
            (&f.one_y, Count::Infinite),
        ]);
        let expected = Tbn::try_new([(x, Count::Finite(1)), (y, Count::Infinite)]).unwrap();
        assert_eq!(infinite.flatten(), expected);
    }

    #[test]
    fn energy_weights_deficits_against_merges() {
        // a b alone leaves both of its limiting partners unbound
        let ab = Monomer::from_string("a b", None).unwrap();
        let star = Monomer::from_string("a* b*", None).unwrap();
        let pair = polymer(&[(&ab, 1), (&star, 1)]);
        let alone_ab = Polymer::singleton(ab);
        let alone_star = Polymer::singleton(star.clone());

        let bound = configuration(&[
            (&pair, Count::Finite(1)),
            (&alone_star, Count::Finite(1)),
        ]);
        assert_eq!(bound.energy(0.6).unwrap(), 1.0);

        let unbound = configuration(&[
            (&alone_ab, Count::Finite(1)),
            (&alone_star, Count::Finite(2)),
        ]);
        assert_eq!(unbound.energy(0.6).unwrap(), 1.2);
        assert_eq!(unbound.energy(0.4).unwrap(), 0.8);

        assert!(bound.energy(0.0).is_err());
        assert!(bound.energy(-1.0).is_err());
    }
}
