//! # tbn-solve: stable-configuration search for TBNs
//!
//! Translates a [`Tbn`](tbn_core::Tbn) and a
//! [`Constraints`](tbn_core::Constraints) set into a discrete
//! optimization model, solves it, and decodes the results back into
//! [`Configuration`](tbn_core::Configuration)s.
//!
//! # Architecture
//!
//! ```text
//! Solver ──picks──> Formulation ──populates──> Model (abstract builder)
//!                        │                        │
//!                        │              CpModel / IpModel (adapters)
//!                        │                        │
//!                        └──interprets── branch-and-bound engine
//! ```
//!
//! - [`model`] — the abstract model builder: integer variables, linear
//!   constraints, and three implication primitives.
//! - [`adapters`] — the constraint-programming adapter (native
//!   implications, full enumeration) and the integer-programming adapter
//!   (Big-M compilation, single queries only).
//! - [`formulations`] — polymer-matrix variants, bond-network variants,
//!   and the lattice-basis formulations.
//! - [`solver`] — orchestration, including the optimize-then-freeze
//!   two-pass enumeration protocol.
//! - [`oracle`] — subprocess wrapper around the external `4ti2-zsolve`
//!   Hilbert-basis tool.

pub mod adapters;
mod engine;
pub mod error;
pub mod formulations;
pub mod model;
mod oracle;
pub mod solver;

pub use adapters::{Assignment, CpSolver, IpSolver, SolveStatus, SolverAdapter};
pub use error::{SolveError, SolveResult};
pub use formulations::{Formulation, MatrixVariant};
pub use model::{LinExpr, Lit, Model, VarId};
pub use solver::{FormulationKind, Solver, SolverMethod};
