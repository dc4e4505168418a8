//! Formulations: variable encodings of the stable-configuration problem.
//!
//! Every formulation populates a fresh model from its TBN and the user
//! constraints, names the variables whose values suffice to rebuild a
//! configuration, and decodes solver output back into a
//! [`Configuration`]. The shared drivers run the populate → solve →
//! interpret lifecycle over any adapter.

pub mod bond_aware_network;
pub mod bond_oblivious_network;
pub mod graver_basis;
pub mod hilbert_basis;
pub mod polymer_matrix;

pub use bond_aware_network::BondAwareNetwork;
pub use bond_oblivious_network::BondObliviousNetwork;
pub use graver_basis::GraverBasisFormulation;
pub use hilbert_basis::HilbertBasisFormulation;
pub use polymer_matrix::{MatrixVariant, PolymerMatrixFormulation};

use crate::adapters::{Assignment, SolveStatus, SolverAdapter};
use crate::error::{SolveError, SolveResult};
use crate::model::{Lit, Model};
use tbn_core::Configuration;

/// One encoding of the search problem.
pub trait Formulation {
    /// Builds variables, constraints, and the objective on an empty model.
    fn populate_model<M: Model>(&mut self, model: &mut M) -> SolveResult<()>;

    /// The variables whose values suffice to rebuild a configuration
    /// (composition or grouping variables, never tie-breakers).
    fn variables_to_keep(&self) -> Vec<Lit>;

    /// Decodes kept-variable values back into a configuration.
    fn interpret_solution(&self, solution: &Assignment) -> SolveResult<Configuration>;
}

/// Populates and solves once, returning a single configuration.
pub fn solve_one<A, F>(
    adapter: &mut A,
    formulation: &mut F,
    verbose: bool,
) -> SolveResult<Configuration>
where
    A: SolverAdapter,
    F: Formulation,
{
    let mut model = adapter.model();
    formulation.populate_model(&mut model)?;
    let kept = formulation.variables_to_keep();
    match adapter.solve(&model, &kept, verbose)? {
        SolveStatus::Infeasible => Err(SolveError::Infeasible),
        SolveStatus::Optimal => {
            let mut assignment = Assignment::default();
            for lit in &kept {
                if let Lit::Pos(var) | Lit::Neg(var) = lit {
                    assignment.set(var.0, adapter.value(Lit::Pos(*var))?);
                }
            }
            formulation.interpret_solution(&assignment)
        }
    }
}

/// Populates and streams every solution as a configuration.
pub fn solve_stream<A, F>(
    adapter: &mut A,
    formulation: &mut F,
    verbose: bool,
) -> SolveResult<Vec<Configuration>>
where
    A: SolverAdapter,
    F: Formulation,
{
    let mut model = adapter.model();
    formulation.populate_model(&mut model)?;
    let kept = formulation.variables_to_keep();
    adapter
        .solve_all(&model, &kept, verbose)?
        .iter()
        .map(|solution| formulation.interpret_solution(solution))
        .collect()
}
