//! Abstract optimization model shared by the solver adapters.
//!
//! A [`Model`] is an opaque builder over integer variables, linear
//! constraints, and three kinds of implication primitives. The
//! constraint-programming adapter keeps implications native; the
//! integer-programming adapter compiles them into Big-M rows as they are
//! added. Formulations only ever talk to this trait, so further
//! back-ends are cheap to bolt on.

use crate::engine::{Implication, Objective, Row, SearchProblem, Sense, VarBounds};
use crate::error::{SolveError, SolveResult};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg, Sub};

/// Handle to a model variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

/// A boolean literal: a variable, its complement, or a pinned constant.
///
/// Constants appear where a formulation fixes part of a boolean matrix
/// up front (e.g. the reflexive diagonal of a grouping relation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lit {
    Const(bool),
    Pos(VarId),
    Neg(VarId),
}

impl Lit {
    /// `1 − self`.
    pub fn negate(self) -> Lit {
        match self {
            Lit::Const(b) => Lit::Const(!b),
            Lit::Pos(var) => Lit::Neg(var),
            Lit::Neg(var) => Lit::Pos(var),
        }
    }
}

impl From<VarId> for Lit {
    fn from(var: VarId) -> Lit {
        Lit::Pos(var)
    }
}

/// A linear expression over model variables with integer coefficients.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    pub(crate) terms: Vec<(VarId, i64)>,
    pub(crate) constant: i64,
}

impl LinExpr {
    pub fn constant(value: i64) -> LinExpr {
        LinExpr {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn sum<I>(items: I) -> LinExpr
    where
        I: IntoIterator,
        I::Item: Into<LinExpr>,
    {
        items
            .into_iter()
            .fold(LinExpr::default(), |acc, item| acc + item.into())
    }

    pub fn le(self, rhs: impl Into<LinExpr>) -> Comparison {
        Comparison {
            lhs: self,
            op: CmpOp::Le,
            rhs: rhs.into(),
        }
    }

    pub fn ge(self, rhs: impl Into<LinExpr>) -> Comparison {
        Comparison {
            lhs: self,
            op: CmpOp::Ge,
            rhs: rhs.into(),
        }
    }

    pub fn eq(self, rhs: impl Into<LinExpr>) -> Comparison {
        Comparison {
            lhs: self,
            op: CmpOp::Eq,
            rhs: rhs.into(),
        }
    }
}

impl From<VarId> for LinExpr {
    fn from(var: VarId) -> LinExpr {
        LinExpr {
            terms: vec![(var, 1)],
            constant: 0,
        }
    }
}

impl From<i64> for LinExpr {
    fn from(value: i64) -> LinExpr {
        LinExpr::constant(value)
    }
}

impl From<Lit> for LinExpr {
    fn from(lit: Lit) -> LinExpr {
        match lit {
            Lit::Const(b) => LinExpr::constant(b as i64),
            Lit::Pos(var) => LinExpr::from(var),
            Lit::Neg(var) => LinExpr::constant(1) - LinExpr::from(var),
        }
    }
}

impl Add for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: LinExpr) -> LinExpr {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl Add<i64> for LinExpr {
    type Output = LinExpr;

    fn add(mut self, rhs: i64) -> LinExpr {
        self.constant += rhs;
        self
    }
}

impl Sub for LinExpr {
    type Output = LinExpr;

    fn sub(self, rhs: LinExpr) -> LinExpr {
        self + (-rhs)
    }
}

impl Sub<i64> for LinExpr {
    type Output = LinExpr;

    fn sub(mut self, rhs: i64) -> LinExpr {
        self.constant -= rhs;
        self
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;

    fn neg(mut self) -> LinExpr {
        for (_, coefficient) in &mut self.terms {
            *coefficient = -*coefficient;
        }
        self.constant = -self.constant;
        self
    }
}

impl Mul<i64> for LinExpr {
    type Output = LinExpr;

    fn mul(mut self, rhs: i64) -> LinExpr {
        for (_, coefficient) in &mut self.terms {
            *coefficient *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Mul<LinExpr> for i64 {
    type Output = LinExpr;

    fn mul(self, rhs: LinExpr) -> LinExpr {
        rhs * self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Le,
    Ge,
    Eq,
}

/// A comparison between two linear expressions.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub(crate) lhs: LinExpr,
    pub(crate) op: CmpOp,
    pub(crate) rhs: LinExpr,
}

/// Builder interface over variables, constraints, implications, and an
/// objective. At most one objective may be set.
pub trait Model {
    fn int_var(&mut self, lo: i64, hi: i64, name: &str) -> VarId;

    fn bool_var(&mut self, name: &str) -> VarId;

    fn add_constraint(&mut self, comparison: Comparison);

    /// Conjunction of `antecedents` implies the `consequent` literal.
    fn add_implication(&mut self, antecedents: &[Lit], consequent: Lit) -> SolveResult<()>;

    /// Conjunction of `antecedents` implies `expr == 0`.
    fn add_equal_to_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()>;

    /// Conjunction of `antecedents` implies `expr > 0`.
    fn add_greater_than_zero_implication(
        &mut self,
        antecedents: &[Lit],
        expr: LinExpr,
    ) -> SolveResult<()>;

    fn minimize(&mut self, objective: LinExpr);

    fn maximize(&mut self, objective: LinExpr);

    /// Large-integer hint for linear back-ends; must be at least the
    /// magnitude any implication consequent can reach.
    fn set_big_m(&mut self, big_m: i64);
}

/// Variable/constraint storage shared by the concrete model types.
#[derive(Debug, Default)]
pub(crate) struct ModelState {
    pub(crate) vars: Vec<VarBounds>,
    pub(crate) rows: Vec<Row>,
    pub(crate) implications: Vec<Implication>,
    pub(crate) objective: Option<Objective>,
}

impl ModelState {
    pub(crate) fn new_var(&mut self, lo: i64, hi: i64, name: &str) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarBounds {
            lo,
            hi,
            name: name.to_string(),
        });
        id
    }

    /// Lowers a comparison into `Σ terms ≤ ub` rows.
    pub(crate) fn lower_comparison(comparison: &Comparison) -> Vec<Row> {
        let difference = comparison.lhs.clone() - comparison.rhs.clone();
        match comparison.op {
            CmpOp::Le => vec![Row::from_expr_le_zero(&difference)],
            CmpOp::Ge => vec![Row::from_expr_le_zero(&(-difference))],
            CmpOp::Eq => vec![
                Row::from_expr_le_zero(&difference),
                Row::from_expr_le_zero(&(-difference)),
            ],
        }
    }

    pub(crate) fn push_comparison(&mut self, comparison: &Comparison) {
        self.rows.extend(Self::lower_comparison(comparison));
    }

    pub(crate) fn set_objective(&mut self, sense: Sense, expr: LinExpr) {
        debug_assert!(self.objective.is_none(), "objective set twice");
        self.objective = Some(Objective {
            sense,
            terms: aggregate_terms(&expr),
        });
    }

    pub(crate) fn to_search_problem(&self) -> SearchProblem<'_> {
        SearchProblem {
            vars: &self.vars,
            rows: &self.rows,
            implications: &self.implications,
            objective: self.objective.as_ref(),
        }
    }
}

/// Collapses duplicate variables and drops zero coefficients.
pub(crate) fn aggregate_terms(expr: &LinExpr) -> Vec<(usize, i64)> {
    let mut combined: BTreeMap<usize, i64> = BTreeMap::new();
    for (var, coefficient) in &expr.terms {
        *combined.entry(var.0).or_insert(0) += coefficient;
    }
    combined
        .into_iter()
        .filter(|(_, coefficient)| *coefficient != 0)
        .collect()
}

/// Normalizes antecedent literals for an implication.
///
/// Returns `None` when a constant-false antecedent makes the implication
/// vacuous; constant-true antecedents are elided.
pub(crate) fn normalize_antecedents(antecedents: &[Lit]) -> Option<Vec<(usize, bool)>> {
    let mut normalized = Vec::with_capacity(antecedents.len());
    for lit in antecedents {
        match lit {
            Lit::Const(false) => return None,
            Lit::Const(true) => continue,
            Lit::Pos(var) => normalized.push((var.0, true)),
            Lit::Neg(var) => normalized.push((var.0, false)),
        }
    }
    Some(normalized)
}

/// The rows a consequent literal enforces, or `None` when trivially true.
pub(crate) fn consequent_rows(consequent: Lit) -> Option<Vec<Row>> {
    match consequent {
        Lit::Const(true) => None,
        Lit::Const(false) => Some(vec![Row::never()]),
        lit => {
            let expr = LinExpr::from(lit);
            // lit != 0, i.e. lit ≥ 1 for a boolean
            Some(vec![Row::from_expr_le_zero(&(LinExpr::constant(1) - expr))])
        }
    }
}

/// Shared guard for adapters that require a Big-M value.
pub(crate) fn require_big_m(big_m: Option<i64>) -> SolveResult<i64> {
    big_m.ok_or_else(|| {
        SolveError::Solver(
            "cannot encode an implication without a big-M value for integer programming".into(),
        )
    })
}
