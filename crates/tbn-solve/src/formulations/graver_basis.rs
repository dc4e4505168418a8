//! Graver-basis formulation (open extension).
//!
//! The projection with slack columns is in place and tested; the basis
//! construction itself (Hermite normal form, kernel basis, Graver
//! search) is not implemented, and populating this formulation reports
//! that as a typed error.

use crate::adapters::Assignment;
use crate::error::{SolveError, SolveResult};
use crate::formulations::Formulation;
use crate::model::{Lit, Model};
use tbn_core::{Configuration, Constraints, Tbn};

#[derive(Debug)]
pub struct GraverBasisFormulation {
    tbn: Tbn,
    #[allow(dead_code)] // carried for the eventual basis model
    constraints: Constraints,
}

impl GraverBasisFormulation {
    pub fn new(tbn: &Tbn, constraints: Constraints) -> Self {
        GraverBasisFormulation {
            tbn: tbn.clone(),
            constraints,
        }
    }

    /// One column per monomer type carrying net counts, plus one slack
    /// column per strictly limiting domain, so that `Ax = 0` over
    /// non-negative integers encodes saturation with explicit unbound
    /// capacity.
    pub(crate) fn project_tbn_with_slack(tbn: &Tbn) -> SolveResult<Vec<Vec<i64>>> {
        let limiting_domains = tbn.limiting_domain_types()?;
        let slack_domains = tbn.strictly_limiting_domain_types()?;
        Ok(limiting_domains
            .iter()
            .map(|domain| {
                let mut row: Vec<i64> = tbn
                    .monomer_types()
                    .map(|monomer| monomer.net_count(domain))
                    .collect();
                row.extend(
                    slack_domains
                        .iter()
                        .map(|slack| i64::from(slack == domain)),
                );
                row
            })
            .collect())
    }

    fn hermite_normal_form(_matrix: &[Vec<i64>]) -> SolveResult<Vec<Vec<i64>>> {
        Err(SolveError::NotImplemented(
            "Hermite normal form for the Graver basis search".into(),
        ))
    }

    fn kernel_basis(matrix: &[Vec<i64>]) -> SolveResult<Vec<Vec<i64>>> {
        let _hermite = Self::hermite_normal_form(matrix)?;
        Err(SolveError::NotImplemented(
            "kernel basis for the Graver basis search".into(),
        ))
    }

    fn graver_basis(matrix: &[Vec<i64>]) -> SolveResult<Vec<Vec<i64>>> {
        let _kernel = Self::kernel_basis(matrix)?;
        Err(SolveError::NotImplemented("Graver basis construction".into()))
    }
}

impl Formulation for GraverBasisFormulation {
    fn populate_model<M: Model>(&mut self, _model: &mut M) -> SolveResult<()> {
        for (monomer, count) in self.tbn.iter() {
            if count.is_infinite() {
                return Err(SolveError::Unsupported(format!(
                    "cannot use the Graver basis formulation with an infinite count of '{monomer}'"
                )));
            }
        }
        let matrix = Self::project_tbn_with_slack(&self.tbn)?;
        let _basis = Self::graver_basis(&matrix)?;
        Err(SolveError::NotImplemented(
            "Graver basis model construction".into(),
        ))
    }

    fn variables_to_keep(&self) -> Vec<Lit> {
        Vec::new()
    }

    fn interpret_solution(&self, _solution: &Assignment) -> SolveResult<Configuration> {
        Err(SolveError::NotImplemented(
            "Graver basis solution decoding".into(),
        ))
    }
}
