//! Bond-aware network formulation.
//!
//! Extends the bond-oblivious grouping relation with one boolean per
//! pair of complementary domain sites. Every limiting site must find
//! exactly one partner, no site binds twice, and a bond pulls its two
//! monomers into the same polymer. Whether this pinning admits exactly
//! the polymer-matrix optima on every input is untested, so its output
//! is reported as-is rather than deduplicated against them.

use crate::adapters::Assignment;
use crate::error::SolveResult;
use crate::formulations::bond_oblivious_network::{
    add_representatives, add_transitivity, apply_counting, build_grouping, decode_grouping,
    grouping_literals,
};
use crate::formulations::Formulation;
use crate::model::{LinExpr, Lit, Model};
use std::collections::BTreeMap;
use tbn_core::{Configuration, Constraints, Domain, Monomer, Tbn};

/// A domain occurrence: (monomer index, site index).
type Site = (usize, usize);

#[derive(Debug)]
pub struct BondAwareNetwork {
    tbn: Tbn,
    constraints: Constraints,
    monomers: Vec<Monomer>,
    grouping: Vec<Vec<Lit>>,
}

impl BondAwareNetwork {
    pub fn new(tbn: &Tbn, constraints: Constraints) -> Self {
        BondAwareNetwork {
            tbn: tbn.clone(),
            constraints,
            monomers: Vec::new(),
            grouping: Vec::new(),
        }
    }
}

impl Formulation for BondAwareNetwork {
    fn populate_model<M: Model>(&mut self, model: &mut M) -> SolveResult<()> {
        self.monomers = self.tbn.flattened_monomers()?;
        let limiting_domains: Vec<Domain> = self.tbn.limiting_domain_types()?;
        let n = self.monomers.len();
        model.set_big_m(n as i64);

        self.grouping = build_grouping(model, n);
        add_transitivity(model, &self.grouping)?;
        let reps = add_representatives(model, &self.grouping)?;

        let sites: Vec<Vec<Domain>> = self
            .monomers
            .iter()
            .map(Monomer::as_explicit_list)
            .collect();

        // one boolean per unordered pair of complementary sites; all
        // other pairs are pinned unbonded
        let mut bonds: BTreeMap<(Site, Site), Lit> = BTreeMap::new();
        for (i, row) in sites.iter().enumerate() {
            for (p, domain) in row.iter().enumerate() {
                for (j, other_row) in sites.iter().enumerate() {
                    for (q, other_domain) in other_row.iter().enumerate() {
                        let first = (i, p);
                        let second = (j, q);
                        let lit = if *other_domain == domain.complement() {
                            if first < second {
                                Lit::Pos(model.bool_var(&format!("domain_bind_{i}_{p}_{j}_{q}")))
                            } else {
                                bonds[&(second, first)]
                            }
                        } else {
                            Lit::Const(false)
                        };
                        bonds.insert((first, second), lit);
                    }
                }
            }
        }

        // every limiting site is bound exactly once, nothing binds twice
        for (i, row) in sites.iter().enumerate() {
            for (p, domain) in row.iter().enumerate() {
                let partners = LinExpr::sum(
                    bonds
                        .range(((i, p), (0, 0))..((i, p + 1), (0, 0)))
                        .map(|(_, lit)| *lit),
                );
                if limiting_domains.contains(domain) {
                    model.add_constraint(partners.eq(1));
                } else {
                    model.add_constraint(partners.le(1));
                }
            }
        }

        // a bond pulls both monomers into the same polymer
        for (&((i, _), (j, _)), &bond) in &bonds {
            model.add_implication(&[bond], self.grouping[i][j])?;
        }

        // group-level saturation still applies on top of the pairing
        for i in 0..n {
            for domain in &limiting_domains {
                let excess = LinExpr::sum((0..n).map(|j| {
                    self.monomers[j].net_count(domain) * LinExpr::from(self.grouping[i][j])
                }));
                model.add_constraint(excess.le(0));
            }
        }

        apply_counting(model, &self.constraints, &reps);
        Ok(())
    }

    fn variables_to_keep(&self) -> Vec<Lit> {
        grouping_literals(&self.grouping)
    }

    fn interpret_solution(&self, solution: &Assignment) -> SolveResult<Configuration> {
        decode_grouping(&self.monomers, &self.grouping, solution)
    }
}
