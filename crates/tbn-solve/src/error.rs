//! Error types for model building and solving.

use tbn_core::TbnError;
use thiserror::Error;

/// Errors produced while formulating or solving for stable configurations.
#[derive(Error, Debug)]
pub enum SolveError {
    /// The solver reported that no configuration satisfies the model.
    #[error("could not find a solution to the tbn, it was reported infeasible")]
    Infeasible,

    /// The solver failed for a reason other than infeasibility.
    #[error("solver error: {0}")]
    Solver(String),

    /// The requested combination of formulation and input is not
    /// supported (infinite counts where finite are required, enumerating
    /// under the integer-programming adapter, ...).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A declared but unimplemented extension point was reached.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// The external lattice-basis tool is missing or failed.
    #[error("lattice-basis oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Underlying data-model failure.
    #[error(transparent)]
    Tbn(#[from] TbnError),

    /// Filesystem failure while talking to the oracle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results using [`SolveError`].
pub type SolveResult<T> = Result<T, SolveError>;
