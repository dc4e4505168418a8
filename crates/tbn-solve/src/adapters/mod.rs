//! Solver adapters: a uniform API over the two model back-ends.

pub mod constraint_programming;
pub mod integer_programming;

pub use constraint_programming::CpSolver;
pub use integer_programming::IpSolver;

use crate::error::SolveResult;
use crate::model::{Lit, Model};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal solver status; other failures surface as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Values of the kept variables for one solution.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    values: BTreeMap<usize, i64>,
}

impl Assignment {
    pub(crate) fn project(full: &[i64], kept: &[Lit]) -> Assignment {
        let mut values = BTreeMap::new();
        for lit in kept {
            if let Lit::Pos(var) | Lit::Neg(var) = lit {
                values.insert(var.0, full[var.0]);
            }
        }
        Assignment { values }
    }

    pub(crate) fn set(&mut self, var: usize, value: i64) {
        self.values.insert(var, value);
    }

    /// Reads a literal back; pinned constants pass through.
    pub fn value(&self, lit: Lit) -> i64 {
        match lit {
            Lit::Const(b) => b as i64,
            Lit::Pos(var) => self.values.get(&var.0).copied().unwrap_or(0),
            Lit::Neg(var) => 1 - self.values.get(&var.0).copied().unwrap_or(0),
        }
    }
}

/// Uniform interface over the back-ends.
///
/// `solve` runs a single query whose result is read back through
/// [`SolverAdapter::value`]; `solve_all` streams every feasible solution
/// projected onto the kept variables. Back-ends are not required to
/// support `solve_all`.
pub trait SolverAdapter {
    type ModelT: Model;

    fn model(&self) -> Self::ModelT;

    fn solve(
        &mut self,
        model: &Self::ModelT,
        kept_vars: &[Lit],
        verbose: bool,
    ) -> SolveResult<SolveStatus>;

    /// Post-solve readback of one literal.
    fn value(&self, lit: Lit) -> SolveResult<i64>;

    fn solve_all(
        &mut self,
        model: &Self::ModelT,
        kept_vars: &[Lit],
        verbose: bool,
    ) -> SolveResult<Vec<Assignment>>;
}
