//! Solver orchestrator: formulation choice and the two-pass enumeration
//! protocol.

use crate::adapters::{CpSolver, IpSolver, SolverAdapter};
use crate::error::{SolveError, SolveResult};
use crate::formulations::{
    solve_one, solve_stream, BondAwareNetwork, BondObliviousNetwork, Formulation,
    GraverBasisFormulation, HilbertBasisFormulation, MatrixVariant, PolymerMatrixFormulation,
};
use serde::{Deserialize, Serialize};
use tbn_core::{Configuration, Constraints, Count, Tbn};
use tracing::debug;

/// Which back-end answers single queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    ConstraintProgramming,
    /// Only implemented for single queries.
    IntegerProgramming,
}

/// The available problem encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulationKind {
    BondAwareNetwork,
    BondObliviousNetwork,
    PolymerBinaryMatrix,
    PolymerIntegerMatrix,
    PolymerUnboundedMatrix,
    VariableBondWeight,
    HilbertBasis,
    GraverBasis,
}

/// The quantity frozen between the optimize and enumerate passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrozenQuantity {
    Polymers,
    Merges,
    Energy,
}

impl FormulationKind {
    fn frozen_quantity(&self) -> FrozenQuantity {
        match self {
            FormulationKind::PolymerUnboundedMatrix => FrozenQuantity::Merges,
            FormulationKind::VariableBondWeight => FrozenQuantity::Energy,
            _ => FrozenQuantity::Polymers,
        }
    }
}

/// Entry point for stable-configuration queries.
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    method: SolverMethod,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::new(SolverMethod::ConstraintProgramming)
    }
}

impl Solver {
    pub fn new(method: SolverMethod) -> Solver {
        Solver { method }
    }

    /// Finds one stable configuration. A `bond_weight` argument folds
    /// into the constraints before solving.
    pub fn stable_config(
        &self,
        tbn: &Tbn,
        formulation: FormulationKind,
        constraints: &Constraints,
        bond_weight: Option<f64>,
        verbose: bool,
    ) -> SolveResult<Configuration> {
        let constraints = apply_bond_weight(constraints, bond_weight);
        match self.method {
            SolverMethod::ConstraintProgramming => {
                run_single(&mut CpSolver::new(), tbn, formulation, constraints, verbose)
            }
            SolverMethod::IntegerProgramming => {
                run_single(&mut IpSolver::new(), tbn, formulation, constraints, verbose)
            }
        }
    }

    /// Enumerates every stable configuration.
    ///
    /// When optimization is on this is a two-pass protocol: solve once,
    /// freeze the achieved optimum as an equality (polymer count, merge
    /// count, or energy, depending on the formulation), then stream all
    /// solutions of the frozen model on the constraint-programming
    /// adapter.
    pub fn stable_configs(
        &self,
        tbn: &Tbn,
        formulation: FormulationKind,
        constraints: &Constraints,
        bond_weight: Option<f64>,
        verbose: bool,
    ) -> SolveResult<Vec<Configuration>> {
        let constraints = apply_bond_weight(constraints, bond_weight);

        let locked = if constraints.optimize() {
            let example = self.stable_config(tbn, formulation, &constraints, None, verbose)?;
            let base = constraints.with_unset_optimization_flag();
            match formulation.frozen_quantity() {
                FrozenQuantity::Polymers => {
                    let polymers = finite(example.number_of_polymers(), "polymer count")?;
                    debug!(polymers, "freezing optimum");
                    base.with_fixed_polymers(polymers)
                }
                FrozenQuantity::Merges => {
                    let merges = finite(example.number_of_merges(), "merge count")?;
                    debug!(merges, "freezing optimum");
                    base.with_fixed_merges(merges)
                }
                FrozenQuantity::Energy => {
                    let energy = example.energy(constraints.bond_weight())?;
                    if !energy.is_finite() {
                        return Err(SolveError::Unsupported(
                            "cannot enumerate configurations with an infinite optimal energy"
                                .into(),
                        ));
                    }
                    debug!(energy, "freezing optimum");
                    base.with_fixed_energy(energy)
                }
            }
        } else {
            constraints
        };

        // enumeration always runs on the multi-solve CP adapter
        run_stream(&mut CpSolver::new(), tbn, formulation, locked, verbose)
    }
}

fn apply_bond_weight(constraints: &Constraints, bond_weight: Option<f64>) -> Constraints {
    match bond_weight {
        Some(weight) => constraints.with_bond_weight(weight),
        None => constraints.clone(),
    }
}

fn finite(count: Count, what: &str) -> SolveResult<u64> {
    count.as_finite().ok_or_else(|| {
        SolveError::Unsupported(format!(
            "cannot enumerate configurations with an infinite optimal {what}"
        ))
    })
}

fn run_single<A: SolverAdapter>(
    adapter: &mut A,
    tbn: &Tbn,
    formulation: FormulationKind,
    constraints: Constraints,
    verbose: bool,
) -> SolveResult<Configuration> {
    match build(tbn, formulation, constraints) {
        Built::BondAware(mut f) => solve_one(adapter, &mut f, verbose),
        Built::BondOblivious(mut f) => solve_one(adapter, &mut f, verbose),
        Built::Matrix(mut f) => solve_one(adapter, &mut f, verbose),
        Built::Hilbert(mut f) => solve_one(adapter, &mut f, verbose),
        Built::Graver(mut f) => solve_one(adapter, &mut f, verbose),
    }
}

fn run_stream<A: SolverAdapter>(
    adapter: &mut A,
    tbn: &Tbn,
    formulation: FormulationKind,
    constraints: Constraints,
    verbose: bool,
) -> SolveResult<Vec<Configuration>> {
    match build(tbn, formulation, constraints) {
        Built::BondAware(mut f) => solve_stream(adapter, &mut f, verbose),
        Built::BondOblivious(mut f) => solve_stream(adapter, &mut f, verbose),
        Built::Matrix(mut f) => solve_stream(adapter, &mut f, verbose),
        Built::Hilbert(mut f) => solve_stream(adapter, &mut f, verbose),
        Built::Graver(mut f) => solve_stream(adapter, &mut f, verbose),
    }
}

enum Built {
    BondAware(BondAwareNetwork),
    BondOblivious(BondObliviousNetwork),
    Matrix(PolymerMatrixFormulation),
    Hilbert(HilbertBasisFormulation),
    Graver(GraverBasisFormulation),
}

fn build(tbn: &Tbn, formulation: FormulationKind, constraints: Constraints) -> Built {
    match formulation {
        FormulationKind::BondAwareNetwork => Built::BondAware(BondAwareNetwork::new(tbn, constraints)),
        FormulationKind::BondObliviousNetwork => {
            Built::BondOblivious(BondObliviousNetwork::new(tbn, constraints))
        }
        FormulationKind::PolymerBinaryMatrix => Built::Matrix(PolymerMatrixFormulation::new(
            tbn,
            constraints,
            MatrixVariant::Binary,
        )),
        FormulationKind::PolymerIntegerMatrix => Built::Matrix(PolymerMatrixFormulation::new(
            tbn,
            constraints,
            MatrixVariant::Integer,
        )),
        FormulationKind::PolymerUnboundedMatrix => Built::Matrix(PolymerMatrixFormulation::new(
            tbn,
            constraints,
            MatrixVariant::Unbounded,
        )),
        FormulationKind::VariableBondWeight => Built::Matrix(PolymerMatrixFormulation::new(
            tbn,
            constraints,
            MatrixVariant::VariableBondWeight,
        )),
        FormulationKind::HilbertBasis => {
            Built::Hilbert(HilbertBasisFormulation::new(tbn, constraints))
        }
        FormulationKind::GraverBasis => {
            Built::Graver(GraverBasisFormulation::new(tbn, constraints))
        }
    }
}
