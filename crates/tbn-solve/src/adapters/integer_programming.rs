//! Integer-programming adapter: implications become Big-M rows.

use crate::adapters::{Assignment, SolveStatus, SolverAdapter};
use crate::engine::{self, SearchOutcome, Sense};
use crate::error::{SolveError, SolveResult};
use crate::model::{
    normalize_antecedents, require_big_m, Comparison, LinExpr, Lit, Model, ModelState, VarId,
};

/// Model that compiles every implication into Big-M linear rows as it is
/// added; [`Model::set_big_m`] must therefore be called first.
#[derive(Debug, Default)]
pub struct IpModel {
    state: ModelState,
    big_m: Option<i64>,
    id_counter: usize,
}

impl IpModel {
    fn next_id(&mut self) -> usize {
        self.id_counter += 1;
        self.id_counter
    }

    /// `Σ (1 − antecedent)` over the normalized antecedents.
    fn complement_sum(antecedents: &[(usize, bool)]) -> LinExpr {
        LinExpr::sum(antecedents.iter().map(|&(var, expected)| {
            let lit = if expected {
                Lit::Pos(VarId(var))
            } else {
                Lit::Neg(VarId(var))
            };
            LinExpr::from(lit.negate())
        }))
    }
}

impl Model for IpModel {
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
        let big_m = require_big_m(self.big_m)?;
        let Some(antecedents) = normalize_antecedents(antecedents) else {
            return Ok(());
        };
        let consequent = LinExpr::from(consequent);

        // delta1/delta2 witness a negative/positive consequent; one of
        // them (or a failed antecedent) must hold
        let id = self.next_id();
        let delta1 = self.bool_var(&format!("indicator_chain1_{id}"));
        let delta2 = self.bool_var(&format!("indicator_chain2_{id}"));
        self.add_constraint(
            consequent
                .clone()
                .le(LinExpr::constant(-1) + big_m * (LinExpr::from(Lit::Neg(delta1)))),
        );
        self.add_constraint(
            consequent.ge(LinExpr::constant(1) - big_m * LinExpr::from(Lit::Neg(delta2))),
        );
        self.add_constraint(
            (LinExpr::from(delta1) + LinExpr::from(delta2) + Self::complement_sum(&antecedents))
                .ge(1),
        );
        Ok(())
    }

    fn add_equal_to_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()> {
        let big_m = require_big_m(self.big_m)?;
        let Some(antecedents) = normalize_antecedents(antecedents) else {
            return Ok(());
        };

        // delta witnesses a zero consequent
        let id = self.next_id();
        let delta = self.bool_var(&format!("indicator_zero_{id}"));
        self.add_constraint(expr.clone().le(big_m * LinExpr::from(Lit::Neg(delta))));
        self.add_constraint(expr.ge(-big_m * LinExpr::from(Lit::Neg(delta))));
        self.add_constraint(
            (LinExpr::from(delta) + Self::complement_sum(&antecedents)).ge(1),
        );
        Ok(())
    }

    fn add_greater_than_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()> {
        let big_m = require_big_m(self.big_m)?;
        let Some(antecedents) = normalize_antecedents(antecedents) else {
            return Ok(());
        };

        // delta witnesses a positive consequent
        let id = self.next_id();
        let delta = self.bool_var(&format!("indicator_gt_zero_{id}"));
        self.add_constraint(
            expr.ge(LinExpr::constant(1) - big_m * LinExpr::from(Lit::Neg(delta))),
        );
        self.add_constraint(
            (LinExpr::from(delta) + Self::complement_sum(&antecedents)).ge(1),
        );
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

/// Single-solve driver over [`IpModel`]; enumeration is not supported.
#[derive(Debug, Default)]
pub struct IpSolver {
    last_solution: Option<Vec<i64>>,
}

impl IpSolver {
    pub fn new() -> IpSolver {
        IpSolver::default()
    }
}

impl SolverAdapter for IpSolver {
    type ModelT = IpModel;

    fn model(&self) -> IpModel {
        IpModel::default()
    }

    fn solve(
        &mut self,
        model: &IpModel,
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
        _model: &IpModel,
        _kept_vars: &[Lit],
        _verbose: bool,
    ) -> SolveResult<Vec<Assignment>> {
        Err(SolveError::Unsupported(
            "querying the complete solution set is not implemented for integer programming".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implications_require_big_m() {
        let mut solver = IpSolver::new();
        let mut model = solver.model();
        let a = model.bool_var("a");
        let b = model.bool_var("b");
        assert!(model.add_implication(&[Lit::Pos(a)], Lit::Pos(b)).is_err());
        model.set_big_m(10);
        assert!(model.add_implication(&[Lit::Pos(a)], Lit::Pos(b)).is_ok());
    }

    #[test]
    fn big_m_implication_chains_hold() {
        let mut solver = IpSolver::new();
        let mut model = solver.model();
        model.set_big_m(10);
        let a = model.bool_var("a");
        let b = model.bool_var("b");
        let x = model.int_var(0, 5, "x");
        model.add_implication(&[Lit::Pos(a)], Lit::Pos(b)).unwrap();
        model
            .add_equal_to_zero_implication(&[Lit::Pos(b)], LinExpr::from(x) - 3)
            .unwrap();
        model.add_constraint(LinExpr::from(a).eq(1));
        model.maximize(LinExpr::from(x));
        let status = solver
            .solve(&model, &[Lit::Pos(a), Lit::Pos(b), Lit::Pos(x)], false)
            .unwrap();
        assert!(status.is_optimal());
        assert_eq!(solver.value(Lit::Pos(b)).unwrap(), 1);
        assert_eq!(solver.value(Lit::Pos(x)).unwrap(), 3);
    }

    #[test]
    fn greater_than_zero_implication_forces_positivity() {
        let mut solver = IpSolver::new();
        let mut model = solver.model();
        model.set_big_m(10);
        let a = model.bool_var("a");
        let x = model.int_var(0, 5, "x");
        model
            .add_greater_than_zero_implication(&[Lit::Pos(a)], LinExpr::from(x))
            .unwrap();
        model.add_constraint(LinExpr::from(a).eq(1));
        model.minimize(LinExpr::from(x));
        let status = solver.solve(&model, &[Lit::Pos(x)], false).unwrap();
        assert!(status.is_optimal());
        assert_eq!(solver.value(Lit::Pos(x)).unwrap(), 1);
    }

    #[test]
    fn solve_all_is_not_supported() {
        let mut solver = IpSolver::new();
        let model = solver.model();
        assert!(matches!(
            solver.solve_all(&model, &[], false),
            Err(SolveError::Unsupported(_))
        ));
    }
}
