//! Polymer-composition-matrix formulations.
//!
//! All four variants share an integer matrix `X[i, j]`: the count of
//! monomer `i` placed into polymer slot `j`. They differ in what counts
//! as a monomer, which monomers are conserved exactly, how many slots
//! exist, and the objective:
//!
//! | variant            | universe     | conserved   | objective        |
//! |--------------------|--------------|-------------|------------------|
//! | binary             | individuals  | all         | max polymers     |
//! | integer            | types        | all         | max polymers     |
//! | unbounded          | types        | limiting    | min merges       |
//! | variable bond weight | types      | limiting    | min energy       |
//!
//! The unbounded variants admit infinite monomer counts: excess monomers
//! simply stay out of the matrix and are restored as singleton polymers
//! when a solution is decoded.

use crate::adapters::Assignment;
use crate::error::{SolveError, SolveResult};
use crate::formulations::Formulation;
use crate::model::{LinExpr, Lit, Model, VarId};
use std::collections::{BTreeMap, BTreeSet};
use tbn_core::{Configuration, Constraints, Count, Domain, Monomer, Polymer, Tbn};

/// Energy terms are scaled by 100 to keep objective coefficients
/// integral; the bond weight is rounded to the nearest multiple of 1/100.
const ENERGY_SCALE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixVariant {
    Binary,
    Integer,
    Unbounded,
    VariableBondWeight,
}

impl MatrixVariant {
    /// Binary and integer matrices conserve every monomer exactly, so
    /// all of them take part in slot accounting.
    fn treats_all_monomers_as_limiting(&self) -> bool {
        matches!(self, MatrixVariant::Binary | MatrixVariant::Integer)
    }
}

#[derive(Debug)]
pub struct PolymerMatrixFormulation {
    tbn: Tbn,
    constraints: Constraints,
    variant: MatrixVariant,

    // populated lists and constants
    monomer_types: Vec<Monomer>,
    monomer_counts: Vec<Count>,
    limiting: Vec<bool>,
    limiting_domains: Vec<Domain>,
    slots: usize,

    // variable handles
    composition_vars: Vec<Vec<VarId>>,
}

impl PolymerMatrixFormulation {
    pub fn new(tbn: &Tbn, constraints: Constraints, variant: MatrixVariant) -> Self {
        PolymerMatrixFormulation {
            tbn: tbn.clone(),
            constraints,
            variant,
            monomer_types: Vec::new(),
            monomer_counts: Vec::new(),
            limiting: Vec::new(),
            limiting_domains: Vec::new(),
            slots: 0,
            composition_vars: Vec::new(),
        }
    }

    fn prepare(&mut self) -> SolveResult<Constants> {
        match self.variant {
            MatrixVariant::Binary => {
                self.monomer_types = self.tbn.flattened_monomers()?;
                self.monomer_counts = vec![Count::ONE; self.monomer_types.len()];
            }
            _ => {
                self.monomer_types = self.tbn.monomer_types().cloned().collect();
                self.monomer_counts = self
                    .monomer_types
                    .iter()
                    .map(|monomer| self.tbn.count(monomer))
                    .collect();
            }
        }

        if self.variant == MatrixVariant::Integer
            && self.monomer_counts.iter().any(Count::is_infinite)
        {
            return Err(SolveError::Unsupported(
                "cannot run the integer matrix formulation on a tbn with infinite monomer counts"
                    .into(),
            ));
        }
        if self.variant == MatrixVariant::VariableBondWeight
            && !(self.constraints.bond_weight() > 0.0)
        {
            return Err(SolveError::Unsupported(
                "the variable-bond-weight formulation requires a positive bond weight".into(),
            ));
        }

        self.limiting_domains = self.tbn.limiting_domain_types()?;
        self.limiting = if self.variant.treats_all_monomers_as_limiting() {
            vec![true; self.monomer_types.len()]
        } else {
            let limiting_types: BTreeSet<Monomer> =
                self.tbn.limiting_monomer_types()?.into_iter().collect();
            self.monomer_types
                .iter()
                .map(|monomer| limiting_types.contains(monomer))
                .collect()
        };

        let total_monomers = self.tbn.number_of_monomers();

        // limiting monomers always carry finite counts, so these sums do too
        let total_limiting: u64 = self
            .monomer_counts
            .iter()
            .zip(&self.limiting)
            .filter(|(_, limiting)| **limiting)
            .map(|(count, _)| count.as_finite().unwrap_or(0))
            .sum();

        // upper bound on monomers inside non-singleton polymers
        let mut monomers_in_complexes: u64 = self
            .monomer_types
            .iter()
            .zip(&self.monomer_counts)
            .zip(&self.limiting)
            .filter(|(_, limiting)| **limiting)
            .map(|((monomer, count), _)| {
                let count = count.as_finite().unwrap_or(0);
                self.limiting_domains
                    .iter()
                    .map(|domain| count * (1 + monomer.net_count(domain).unsigned_abs()))
                    .sum::<u64>()
            })
            .sum();
        if let Some(total) = total_monomers.as_finite() {
            monomers_in_complexes = monomers_in_complexes.min(total);
        }

        let constants = match self.variant {
            MatrixVariant::Binary | MatrixVariant::Integer => {
                // flattened/typed universes are finite here
                let total = total_monomers.as_finite().unwrap_or(0);
                Constants {
                    big_m: total as i64,
                    monomers_in_complexes: total,
                }
            }
            _ => Constants {
                big_m: monomers_in_complexes as i64,
                monomers_in_complexes,
            },
        };

        self.slots = match self.variant {
            MatrixVariant::Binary | MatrixVariant::Integer => {
                let total = total_monomers.as_finite().unwrap_or(0);
                match self.constraints.max_polymers() {
                    Some(max) => max.min(total) as usize,
                    None => total as usize,
                }
            }
            _ => match self.constraints.max_polymers() {
                Some(max) => max as usize,
                None => total_limiting as usize,
            },
        };

        Ok(constants)
    }

    /// `Σ_i net_count_i(d) · X[i, j]` for one slot.
    fn slot_excess(&self, domain: &Domain, slot: usize) -> LinExpr {
        LinExpr::sum(self.monomer_types.iter().enumerate().map(|(i, monomer)| {
            monomer.net_count(domain) * LinExpr::from(self.composition_vars[i][slot])
        }))
    }

    fn add_sorting_constraints<M: Model>(&self, model: &mut M) -> SolveResult<()> {
        // lexicographic column ordering via tie-chain booleans:
        // tiebreaker[i, j] = "columns j and j+1 agree on all rows ≤ i"
        for j in 0..self.slots.saturating_sub(1) {
            let mut previous_tie = Lit::Const(true);
            for i in 0..self.monomer_types.len() {
                let tie = Lit::Pos(model.bool_var(&format!("tiebreaker_{i}_{j}")));
                let difference = LinExpr::from(self.composition_vars[i][j])
                    - LinExpr::from(self.composition_vars[i][j + 1]);

                // a tie only continues if the previous rows were tied
                model.add_implication(&[tie], previous_tie)?;
                // still tied: the entries match
                model.add_equal_to_zero_implication(&[tie], difference.clone())?;
                // tie broken here: the left column is strictly larger
                model.add_greater_than_zero_implication(
                    &[tie.negate(), previous_tie],
                    difference,
                )?;

                previous_tie = tie;
            }
        }
        Ok(())
    }
}

struct Constants {
    big_m: i64,
    monomers_in_complexes: u64,
}

impl Formulation for PolymerMatrixFormulation {
    fn populate_model<M: Model>(&mut self, model: &mut M) -> SolveResult<()> {
        let constants = self.prepare()?;
        model.set_big_m(constants.big_m);

        // X[i, j] = count of monomer i in polymer slot j
        self.composition_vars = (0..self.monomer_types.len())
            .map(|i| {
                let ub = match self.monomer_counts[i] {
                    Count::Finite(count) => count.min(constants.monomers_in_complexes),
                    Count::Infinite => constants.monomers_in_complexes,
                };
                (0..self.slots)
                    .map(|j| model.int_var(0, ub as i64, &format!("polymer_composition_{i}_{j}")))
                    .collect()
            })
            .collect();

        // indicator[j] = slot j holds a real polymer
        let indicator_vars: Vec<VarId> = (0..self.slots)
            .map(|j| model.bool_var(&format!("indicator_{j}")))
            .collect();

        // conservation: limiting monomers are consumed exactly, the rest
        // cannot exceed their supply; infinite excess is unconstrained
        for i in 0..self.monomer_types.len() {
            let used = LinExpr::sum(self.composition_vars[i].iter().copied());
            if self.limiting[i] {
                let count = self.monomer_counts[i].as_finite().unwrap_or(0);
                model.add_constraint(used.eq(count as i64));
            } else if let Count::Finite(count) = self.monomer_counts[i] {
                model.add_constraint(used.le(count as i64));
            }
        }

        // saturation, with per-slot deficit slack under variable bond weight
        let mut deficit_vars: Vec<VarId> = Vec::new();
        if self.variant == MatrixVariant::VariableBondWeight {
            for domain in &self.limiting_domains {
                let limiting_sites: u64 = self
                    .monomer_types
                    .iter()
                    .zip(&self.monomer_counts)
                    .zip(&self.limiting)
                    .filter(|(_, limiting)| **limiting)
                    .map(|((monomer, count), _)| {
                        count.as_finite().unwrap_or(0) * monomer.net_count(domain).unsigned_abs()
                    })
                    .sum();
                for j in 0..self.slots {
                    let deficit =
                        model.int_var(0, limiting_sites as i64, &format!("deficit_{domain}_{j}"));
                    let exists = model.bool_var(&format!("deficit_exists_{domain}_{j}"));
                    deficit_vars.push(deficit);

                    let excess = self.slot_excess(domain, j);
                    model.add_constraint(excess.clone().le(LinExpr::from(deficit)));

                    // pin the slack to exactly max(0, excess)
                    model.add_equal_to_zero_implication(
                        &[Lit::Pos(exists)],
                        excess - LinExpr::from(deficit),
                    )?;
                    model.add_equal_to_zero_implication(
                        &[Lit::Neg(exists)],
                        LinExpr::from(deficit),
                    )?;
                    model.add_greater_than_zero_implication(
                        &[Lit::Pos(exists)],
                        LinExpr::from(deficit),
                    )?;
                }
            }
        } else {
            for domain in &self.limiting_domains {
                for j in 0..self.slots {
                    model.add_constraint(self.slot_excess(domain, j).le(0));
                }
            }
        }

        // a slot only counts as a polymer when it holds a limiting
        // monomer; anything else decodes into singletons anyway
        for j in 0..self.slots {
            let limiting_content = LinExpr::sum(
                self.composition_vars
                    .iter()
                    .zip(&self.limiting)
                    .filter(|(_, limiting)| **limiting)
                    .map(|(row, _)| row[j]),
            );
            model.add_constraint(LinExpr::from(indicator_vars[j]).le(limiting_content));
        }

        if self.constraints.sort() {
            self.add_sorting_constraints(model)?;
        }

        let total_used = LinExpr::sum(
            self.composition_vars
                .iter()
                .flat_map(|row| row.iter().copied()),
        );
        let polymers = LinExpr::sum(indicator_vars.iter().copied());
        let merges = total_used - polymers.clone();

        if let Some(max) = self.constraints.max_polymers() {
            model.add_constraint(polymers.clone().le(max as i64));
        }
        if self.constraints.min_polymers() > 0 {
            model.add_constraint(polymers.clone().ge(self.constraints.min_polymers() as i64));
        }
        if let Some(max) = self.constraints.max_merges() {
            model.add_constraint(merges.clone().le(max as i64));
        }
        if self.constraints.min_merges() > 0 {
            model.add_constraint(merges.clone().ge(self.constraints.min_merges() as i64));
        }

        let scaled_energy = if self.variant == MatrixVariant::VariableBondWeight {
            let weight = (ENERGY_SCALE as f64 * self.constraints.bond_weight()).round() as i64;
            let total_deficit = LinExpr::sum(deficit_vars.iter().copied());
            let energy = weight * total_deficit + ENERGY_SCALE * merges.clone();
            if let Some(max) = self.constraints.max_energy() {
                model.add_constraint(
                    energy
                        .clone()
                        .le((ENERGY_SCALE as f64 * max).ceil() as i64),
                );
            }
            if let Some(min) = self.constraints.min_energy() {
                model.add_constraint(
                    energy
                        .clone()
                        .ge((ENERGY_SCALE as f64 * min).floor() as i64),
                );
            }
            Some(energy)
        } else {
            None
        };

        if self.constraints.optimize() {
            match self.variant {
                MatrixVariant::Binary | MatrixVariant::Integer => model.maximize(polymers),
                MatrixVariant::Unbounded => model.minimize(merges),
                MatrixVariant::VariableBondWeight => {
                    if let Some(energy) = scaled_energy {
                        model.minimize(energy);
                    }
                }
            }
        }

        Ok(())
    }

    fn variables_to_keep(&self) -> Vec<Lit> {
        self.composition_vars
            .iter()
            .flat_map(|row| row.iter().map(|&var| Lit::Pos(var)))
            .collect()
    }

    fn interpret_solution(&self, solution: &Assignment) -> SolveResult<Configuration> {
        let mut polymer_counts: BTreeMap<Polymer, Count> = BTreeMap::new();

        for j in 0..self.slots {
            let mut monomers: BTreeMap<Monomer, Count> = BTreeMap::new();
            for (i, monomer) in self.monomer_types.iter().enumerate() {
                let count = solution.value(Lit::Pos(self.composition_vars[i][j]));
                if count > 0 {
                    *monomers.entry(monomer.clone()).or_insert(Count::ZERO) +=
                        Count::Finite(count as u64);
                }
            }
            if !monomers.is_empty() {
                let polymer = Polymer::try_new(monomers)?;
                *polymer_counts.entry(polymer).or_insert(Count::ZERO) += Count::ONE;
            }
        }

        // whatever the matrix left out returns as singleton polymers
        let partial = Configuration::try_new(polymer_counts.clone())?;
        let residual = self.tbn.subtract(&partial.flatten())?;
        for (monomer, count) in residual.iter() {
            *polymer_counts
                .entry(Polymer::singleton(monomer.clone()))
                .or_insert(Count::ZERO) += count;
        }

        Ok(Configuration::try_new(polymer_counts)?)
    }
}
