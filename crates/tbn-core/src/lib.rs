//! # tbn-core: Thermodynamic Binding Network data model
//!
//! Algebraic data types for thermodynamic binding networks (TBNs): a TBN
//! is a pool of abstract molecular monomers, each monomer a multiset of
//! binding-site [`Domain`]s, where every domain may bind its starred
//! complement. A [`Configuration`] groups the pool into [`Polymer`]s;
//! the solver crates search for configurations that saturate the
//! limiting (minority) domains while optimizing polymer count, merge
//! count, or a weighted energy.
//!
//! ## Core Data Structures
//!
//! - [`Domain`] — identifier plus starred flag; complements bind
//! - [`Monomer`] — named multiset of domains
//! - [`Polymer`] — multiset of monomers (one bound complex)
//! - [`Configuration`] — multiset of polymers covering a TBN
//! - [`Tbn`] — the pool itself, with limiting-domain analysis
//! - [`Count`] — multiplicities in ℕ⁺ ∪ {∞}
//! - [`Constraints`] — user bounds and flags for the search
//!
//! All multisets iterate in sorted order, so renderings and the matrix
//! column order used by the solvers are deterministic.

pub mod configuration;
pub mod constraints;
pub mod count;
pub mod domain;
pub mod error;
pub mod monomer;
pub mod multiset;
pub mod polymer;
pub mod tbn;

pub use configuration::Configuration;
pub use constraints::Constraints;
pub use count::Count;
pub use domain::Domain;
pub use error::{TbnError, TbnResult};
pub use monomer::Monomer;
pub use multiset::PositiveMultiset;
pub use polymer::Polymer;
pub use tbn::Tbn;
