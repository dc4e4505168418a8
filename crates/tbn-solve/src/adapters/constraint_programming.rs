//! Constraint-programming adapter: native implications, full enumeration.

use crate::adapters::{Assignment, SolveStatus, SolverAdapter};
use crate::engine::{self, Implication, Row, SearchOutcome, Sense};
use crate::error::{SolveError, SolveResult};
use crate::model::{
    consequent_rows, normalize_antecedents, Comparison, LinExpr, Lit, Model, ModelState, VarId,
};

/// Model whose implications stay native; the search engine propagates
/// them directly.
#[derive(Debug, Default)]
pub struct CpModel {
    state: ModelState,
    // accepted for interface parity; propagation needs no Big-M
    #[allow(dead_code)]
    big_m: Option<i64>,
}

impl CpModel {
    fn push_implication(&mut self, antecedents: &[Lit], consequent: Vec<Row>) {
        match normalize_antecedents(antecedents) {
            None => {} // an antecedent is pinned false
            Some(normalized) if normalized.is_empty() => self.state.rows.extend(consequent),
            Some(normalized) => self.state.implications.push(Implication {
                antecedents: normalized,
                consequent,
            }),
        }
    }
}

impl Model for CpModel {
    fn int_var(&mut self, lo: i64, hi: i64, name: &str) -> VarId {
        self.state.new_var(lo, hi, name)
    }

    fn bool_var(&mut self, name: &str) -> VarId {
        self.state.new_var(0, 1, name)
    }

    fn add_constraint(&mut self, comparison: Comparison) {
        self.state.push_comparison(&comparison);
    }

    fn add_implication(&mut self, antecedents: &[Lit], consequent: Lit) -> SolveResult<()> {
        if let Some(rows) = consequent_rows(consequent) {
            self.push_implication(antecedents, rows);
        }
        Ok(())
    }

    fn add_equal_to_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()> {
        let rows = vec![
            Row::from_expr_le_zero(&expr),
            Row::from_expr_le_zero(&(-expr)),
        ];
        self.push_implication(antecedents, rows);
        Ok(())
    }

    fn add_greater_than_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()> {
        // expr > 0 over the integers is expr ≥ 1
        let rows = vec![Row::from_expr_le_zero(&(LinExpr::constant(1) - expr))];
        self.push_implication(antecedents, rows);
        Ok(())
    }

    fn minimize(&mut self, objective: LinExpr) {
        self.state.set_objective(Sense::Minimize, objective);
    }

    fn maximize(&mut self, objective: LinExpr) {
        self.state.set_objective(Sense::Maximize, objective);
    }

    fn set_big_m(&mut self, big_m: i64) {
        self.big_m = Some(big_m);
    }
}

/// Single- and multi-solve driver over [`CpModel`].
#[derive(Debug, Default)]
pub struct CpSolver {
    last_solution: Option<Vec<i64>>,
}

impl CpSolver {
    pub fn new() -> CpSolver {
        CpSolver::default()
    }
}

impl SolverAdapter for CpSolver {
    type ModelT = CpModel;

    fn model(&self) -> CpModel {
        CpModel::default()
    }

    fn solve(
        &mut self,
        model: &CpModel,
        _kept_vars: &[Lit],
        verbose: bool,
    ) -> SolveResult<SolveStatus> {
        let problem = model.state.to_search_problem();
        match engine::solve(&problem, verbose) {
            SearchOutcome::Optimal(assignment) => {
                self.last_solution = Some(assignment);
                Ok(SolveStatus::Optimal)
            }
            SearchOutcome::Infeasible => {
                self.last_solution = None;
                Ok(SolveStatus::Infeasible)
            }
        }
    }

    fn value(&self, lit: Lit) -> SolveResult<i64> {
        let solution = self
            .last_solution
            .as_ref()
            .ok_or_else(|| SolveError::Solver("no solution available to read values from".into()))?;
        Ok(match lit {
            Lit::Const(b) => b as i64,
            Lit::Pos(var) => solution[var.0],
            Lit::Neg(var) => 1 - solution[var.0],
        })
    }

    fn solve_all(
        &mut self,
        model: &CpModel,
        kept_vars: &[Lit],
        verbose: bool,
    ) -> SolveResult<Vec<Assignment>> {
        let problem = model.state.to_search_problem();
        let solutions = engine::solve_all(&problem, verbose);
        Ok(solutions
            .iter()
            .map(|solution| Assignment::project(solution, kept_vars))
            .collect())
    }
}
