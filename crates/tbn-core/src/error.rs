//! Error types for TBN construction and text parsing.

use thiserror::Error;

/// Errors produced while building or parsing TBN data.
#[derive(Error, Debug)]
pub enum TbnError {
    /// Malformed TBN, monomer, domain, or constraints text.
    #[error("parse error: {0}")]
    Parse(String),

    /// Structurally invalid input (empty monomer/polymer, zero counts,
    /// conflicting monomer-name redefinition, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A domain appears in opposing infinite quantities, so its limiting
    /// side is undefined.
    #[error("conflicting infinity: domain '{0}' appears in opposing infinite quantities")]
    ConflictingInfinity(String),

    /// An operation that is well-defined only for a subset of inputs was
    /// applied outside that subset (infinite counts where finite are
    /// required, subtracting a non-sub-multiset, non-positive bond weight).
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Convenience alias for results using [`TbnError`].
pub type TbnResult<T> = Result<T, TbnError>;
