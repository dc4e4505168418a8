//! Bond-oblivious network formulation.
//!
//! Works on the flattened monomer list: a boolean grouping relation
//! `G[i, j]` ("i and j share a polymer", reflexive, symmetric, with
//! transitivity enforced by implications) plus representative booleans
//! used to count polymers. Saturation is checked per monomer over its
//! whole group, without tracking individual bonds.

use crate::adapters::Assignment;
use crate::error::SolveResult;
use crate::formulations::Formulation;
use crate::model::{LinExpr, Lit, Model, VarId};
use itertools::Itertools;
use std::collections::BTreeMap;
use tbn_core::{Configuration, Constraints, Count, Domain, Monomer, Polymer, Tbn};

#[derive(Debug)]
pub struct BondObliviousNetwork {
    tbn: Tbn,
    constraints: Constraints,
    monomers: Vec<Monomer>,
    grouping: Vec<Vec<Lit>>,
}

impl BondObliviousNetwork {
    pub fn new(tbn: &Tbn, constraints: Constraints) -> Self {
        BondObliviousNetwork {
            tbn: tbn.clone(),
            constraints,
            monomers: Vec::new(),
            grouping: Vec::new(),
        }
    }
}

/// Reflexive, symmetric grouping matrix with one variable per unordered
/// pair.
pub(crate) fn build_grouping<M: Model>(model: &mut M, n: usize) -> Vec<Vec<Lit>> {
    let mut grouping = vec![vec![Lit::Const(true); n]; n];
    for i in 0..n {
        for j in i + 1..n {
            let var = Lit::Pos(model.bool_var(&format!("monomer_grouping_{i}_{j}")));
            grouping[i][j] = var;
            grouping[j][i] = var;
        }
    }
    grouping
}

/// Grouping is transitive: `G[i, j] ∧ G[i, k] ⟹ G[j, k]` over every
/// ordered triple of distinct monomers.
pub(crate) fn add_transitivity<M: Model>(
    model: &mut M,
    grouping: &[Vec<Lit>],
) -> SolveResult<()> {
    for triple in (0..grouping.len()).permutations(3) {
        let (m1, m2, m3) = (triple[0], triple[1], triple[2]);
        model.add_implication(&[grouping[m1][m2], grouping[m1][m3]], grouping[m2][m3])?;
    }
    Ok(())
}

/// Representative booleans count polymers: grouped monomers cannot both
/// lead, so each polymer contributes at most one.
pub(crate) fn add_representatives<M: Model>(
    model: &mut M,
    grouping: &[Vec<Lit>],
) -> SolveResult<Vec<VarId>> {
    let n = grouping.len();
    let reps: Vec<VarId> = (0..n).map(|i| model.bool_var(&format!("rep_{i}"))).collect();
    for i in 0..n {
        for j in i + 1..n {
            model.add_implication(&[grouping[i][j]], Lit::Neg(reps[j]))?;
        }
    }
    Ok(reps)
}

/// Polymer-count bounds and the maximize-polymers objective.
pub(crate) fn apply_counting<M: Model>(
    model: &mut M,
    constraints: &Constraints,
    reps: &[VarId],
) {
    let polymers = LinExpr::sum(reps.iter().copied());
    if let Some(max) = constraints.max_polymers() {
        model.add_constraint(polymers.clone().le(max as i64));
    }
    if constraints.min_polymers() > 0 {
        model.add_constraint(polymers.clone().ge(constraints.min_polymers() as i64));
    }
    if constraints.optimize() {
        model.maximize(polymers);
    }
}

/// Walks the grouping relation, collecting each monomer's group into a
/// polymer the first time it is seen.
pub(crate) fn decode_grouping(
    monomers: &[Monomer],
    grouping: &[Vec<Lit>],
    solution: &Assignment,
) -> SolveResult<Configuration> {
    let n = monomers.len();
    let mut polymer_counts: BTreeMap<Polymer, Count> = BTreeMap::new();
    let mut discovered = vec![false; n];
    for i in 0..n {
        if discovered[i] {
            continue;
        }
        discovered[i] = true;
        let mut members: BTreeMap<Monomer, Count> = BTreeMap::new();
        members.insert(monomers[i].clone(), Count::ONE);
        for j in i + 1..n {
            if solution.value(grouping[i][j]) > 0 {
                discovered[j] = true;
                *members.entry(monomers[j].clone()).or_insert(Count::ZERO) += Count::ONE;
            }
        }
        let polymer = Polymer::try_new(members)?;
        *polymer_counts.entry(polymer).or_insert(Count::ZERO) += Count::ONE;
    }
    Ok(Configuration::try_new(polymer_counts)?)
}

/// Upper-triangle (and reflexive diagonal) grouping literals.
pub(crate) fn grouping_literals(grouping: &[Vec<Lit>]) -> Vec<Lit> {
    let n = grouping.len();
    let mut kept = Vec::new();
    for i in 0..n {
        for j in i..n {
            kept.push(grouping[i][j]);
        }
    }
    kept
}

impl Formulation for BondObliviousNetwork {
    fn populate_model<M: Model>(&mut self, model: &mut M) -> SolveResult<()> {
        self.monomers = self.tbn.flattened_monomers()?;
        let limiting_domains: Vec<Domain> = self.tbn.limiting_domain_types()?;
        let n = self.monomers.len();
        model.set_big_m(n as i64);

        self.grouping = build_grouping(model, n);
        add_transitivity(model, &self.grouping)?;
        let reps = add_representatives(model, &self.grouping)?;

        // limiting sites must be in the minority within every group
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
