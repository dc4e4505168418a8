//! Hilbert-basis (lattice) formulation.
//!
//! Projects the TBN onto a matrix whose rows demand saturation of every
//! limiting domain, asks the external oracle for the Hilbert basis of
//! the resulting cone, and then picks a non-negative integer coefficient
//! per basis vector: each vector is a saturated polymer, and
//! conservation equalities force the chosen polymers to exactly cover
//! the pool.

use crate::adapters::Assignment;
use crate::error::{SolveError, SolveResult};
use crate::formulations::Formulation;
use crate::model::{LinExpr, Lit, Model, VarId};
use crate::oracle;
use std::collections::BTreeMap;
use tbn_core::{Configuration, Constraints, Count, Monomer, Polymer, Tbn};
use tracing::debug;

#[derive(Debug)]
pub struct HilbertBasisFormulation {
    tbn: Tbn,
    constraints: Constraints,
    monomer_types: Vec<Monomer>,
    polymer_basis: Vec<Vec<i64>>,
    coefficient_vars: Vec<VarId>,
}

impl HilbertBasisFormulation {
    pub fn new(tbn: &Tbn, constraints: Constraints) -> Self {
        HilbertBasisFormulation {
            tbn: tbn.clone(),
            constraints,
            monomer_types: Vec::new(),
            polymer_basis: Vec::new(),
            coefficient_vars: Vec::new(),
        }
    }

    /// One column per monomer type; each limiting domain contributes a
    /// row of negated net counts, so `Ax ≥ 0` is exactly saturation.
    pub(crate) fn project_tbn_to_column_matrix(tbn: &Tbn) -> SolveResult<Vec<Vec<i64>>> {
        let limiting_domains = tbn.limiting_domain_types()?;
        Ok(limiting_domains
            .iter()
            .map(|domain| {
                tbn.monomer_types()
                    .map(|monomer| -monomer.net_count(domain))
                    .collect()
            })
            .collect())
    }

    fn polymer_from_vector(&self, vector: &[i64]) -> SolveResult<Polymer> {
        let mut monomers: BTreeMap<Monomer, Count> = BTreeMap::new();
        for (monomer, &count) in self.monomer_types.iter().zip(vector) {
            if count > 0 {
                monomers.insert(monomer.clone(), Count::Finite(count as u64));
            }
        }
        Ok(Polymer::try_new(monomers)?)
    }
}

impl Formulation for HilbertBasisFormulation {
    fn populate_model<M: Model>(&mut self, model: &mut M) -> SolveResult<()> {
        let monomer_counts: Vec<u64> = {
            let mut counts = Vec::new();
            for (monomer, count) in self.tbn.iter() {
                let count = count.as_finite().ok_or_else(|| {
                    SolveError::Unsupported(format!(
                        "cannot use the Hilbert basis formulation with an infinite count of '{monomer}'"
                    ))
                })?;
                counts.push(count);
            }
            counts
        };
        self.monomer_types = self.tbn.monomer_types().cloned().collect();

        let matrix = Self::project_tbn_to_column_matrix(&self.tbn)?;
        // capping the basis by available monomer counts has not shown a
        // runtime benefit, so the homogeneous cone is used as-is
        self.polymer_basis = oracle::hilbert_basis(&matrix, None, true)?;
        for vector in &self.polymer_basis {
            let polymer = self.polymer_from_vector(vector)?;
            debug!(%polymer, "basis polymer");
        }

        // bound on monomers inside non-singleton polymers, reused as big-M
        let limiting_domains = self.tbn.limiting_domain_types()?;
        let mut monomers_in_complexes: u64 = self
            .tbn
            .limiting_monomer_types()?
            .iter()
            .map(|monomer| {
                let count = self.tbn.count(monomer).as_finite().unwrap_or(0);
                limiting_domains
                    .iter()
                    .map(|domain| count * (1 + monomer.net_count(domain).unsigned_abs()))
                    .sum::<u64>()
            })
            .sum();
        monomers_in_complexes = monomers_in_complexes.min(monomer_counts.iter().sum());
        model.set_big_m(monomers_in_complexes as i64);

        self.coefficient_vars = (0..self.polymer_basis.len())
            .map(|i| {
                model.int_var(
                    0,
                    monomers_in_complexes as i64,
                    &format!("basis_coefficient_{i}"),
                )
            })
            .collect();

        // conservation: the chosen polymers exactly cover the pool
        for (i, &count) in monomer_counts.iter().enumerate() {
            let covered = LinExpr::sum(
                self.polymer_basis
                    .iter()
                    .zip(&self.coefficient_vars)
                    .map(|(vector, &coefficient)| vector[i] * LinExpr::from(coefficient)),
            );
            model.add_constraint(covered.eq(count as i64));
        }

        let polymers = LinExpr::sum(self.coefficient_vars.iter().copied());
        if let Some(max) = self.constraints.max_polymers() {
            model.add_constraint(polymers.clone().le(max as i64));
        }
        if self.constraints.min_polymers() > 0 {
            model.add_constraint(polymers.clone().ge(self.constraints.min_polymers() as i64));
        }
        if self.constraints.optimize() {
            model.maximize(polymers);
        }

        Ok(())
    }

    fn variables_to_keep(&self) -> Vec<Lit> {
        self.coefficient_vars.iter().map(|&var| Lit::Pos(var)).collect()
    }

    fn interpret_solution(&self, solution: &Assignment) -> SolveResult<Configuration> {
        let mut polymer_counts: BTreeMap<Polymer, Count> = BTreeMap::new();
        for (vector, &coefficient) in self.polymer_basis.iter().zip(&self.coefficient_vars) {
            let count = solution.value(Lit::Pos(coefficient));
            if count > 0 {
                let polymer = self.polymer_from_vector(vector)?;
                *polymer_counts.entry(polymer).or_insert(Count::ZERO) +=
                    Count::Finite(count as u64);
            }
        }
        Ok(Configuration::try_new(polymer_counts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_negates_net_counts_per_limiting_domain() {
        // exact ties make both flavors limiting, one row each
        let tbn = Tbn::from_string("a* b* \n a b").unwrap();
        // monomer types sort as [a b], [a* b*]; rows are a, a*, b, b*
        let matrix = HilbertBasisFormulation::project_tbn_to_column_matrix(&tbn).unwrap();
        assert_eq!(
            matrix,
            vec![vec![-1, 1], vec![1, -1], vec![-1, 1], vec![1, -1]]
        );
    }

    #[test]
    fn projection_covers_every_limiting_domain_row() {
        let tbn = Tbn::from_string("a* b* \n a b \n a* \n b*").unwrap();
        // columns: [a b], [a* b*], [a*], [b*]
        let matrix = HilbertBasisFormulation::project_tbn_to_column_matrix(&tbn).unwrap();
        assert_eq!(matrix, vec![vec![-1, 1, 1, 0], vec![-1, 1, 0, 1]]);
    }
}
