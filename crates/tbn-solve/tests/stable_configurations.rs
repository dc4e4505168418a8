//! End-to-end solver scenarios across formulations and adapters.

use tbn_core::{Configuration, Constraints, Count, Tbn};
use tbn_solve::{FormulationKind, SolveError, Solver, SolverMethod};

fn cp() -> Solver {
    Solver::new(SolverMethod::ConstraintProgramming)
}

fn ip() -> Solver {
    Solver::new(SolverMethod::IntegerProgramming)
}

fn tbn(text: &str) -> Tbn {
    Tbn::from_string(text).unwrap()
}

fn single(
    solver: &Solver,
    text: &str,
    formulation: FormulationKind,
    weight: Option<f64>,
) -> Configuration {
    solver
        .stable_config(&tbn(text), formulation, &Constraints::default(), weight, false)
        .unwrap()
}

fn all(
    solver: &Solver,
    text: &str,
    formulation: FormulationKind,
    weight: Option<f64>,
) -> Vec<Configuration> {
    solver
        .stable_configs(&tbn(text), formulation, &Constraints::default(), weight, false)
        .unwrap()
}

const SMALL: &str = "a* b* \n a b \n a* \n b*";
const DOUBLED: &str = "2[a* b*] \n a b";
const TIED: &str = "6(a*) \n 2[3(a*)] \n a \n 5(a) \n 2(a) \n 4(a)";
const INFINITE: &str = "inf[a* b*] \n 2[a b]";
const INFINITE_WIDE: &str = "inf[2(a*) 2(b*)] \n 2[3(a) 3(b)]";

#[test]
fn single_optimum_across_formulations() {
    use FormulationKind::*;
    for formulation in [
        BondAwareNetwork,
        BondObliviousNetwork,
        PolymerBinaryMatrix,
        PolymerIntegerMatrix,
        PolymerUnboundedMatrix,
        VariableBondWeight,
    ] {
        for solver in [cp(), ip()] {
            let config = single(&solver, SMALL, formulation, Some(2.0));
            assert_eq!(
                config.number_of_polymers(),
                Count::Finite(3),
                "{formulation:?}"
            );
            assert_eq!(config.number_of_merges(), Count::Finite(1), "{formulation:?}");
        }
    }
}

#[test]
fn single_optimum_with_duplicated_monomers() {
    use FormulationKind::*;
    for formulation in [
        BondAwareNetwork,
        BondObliviousNetwork,
        PolymerBinaryMatrix,
        PolymerIntegerMatrix,
        PolymerUnboundedMatrix,
        VariableBondWeight,
    ] {
        let config = single(&cp(), DOUBLED, formulation, Some(2.0));
        assert_eq!(config.number_of_polymers(), Count::Finite(2), "{formulation:?}");
        assert_eq!(config.number_of_merges(), Count::Finite(1), "{formulation:?}");
    }
}

#[test]
fn single_optimum_with_infinite_counts() {
    use FormulationKind::*;
    for formulation in [PolymerUnboundedMatrix, VariableBondWeight] {
        for solver in [cp(), ip()] {
            let config = single(&solver, INFINITE, formulation, Some(2.0));
            assert_eq!(config.number_of_polymers(), Count::Infinite, "{formulation:?}");
            assert_eq!(config.number_of_merges(), Count::Finite(2), "{formulation:?}");
        }
    }
}

#[test]
fn enumeration_on_the_small_pool_is_unique() {
    use FormulationKind::*;
    for formulation in [
        BondAwareNetwork,
        BondObliviousNetwork,
        PolymerBinaryMatrix,
        PolymerIntegerMatrix,
        PolymerUnboundedMatrix,
        VariableBondWeight,
    ] {
        let configs = all(&cp(), SMALL, formulation, Some(2.0));
        assert_eq!(configs.len(), 1, "{formulation:?}");
        for config in &configs {
            assert_eq!(config.number_of_merges(), Count::Finite(1), "{formulation:?}");
        }
    }
}

#[test]
fn labelled_copies_multiply_network_solutions() {
    // with two interchangeable site pairings the bond-aware count doubles
    let configs = all(&cp(), "a a \n a* a*", FormulationKind::BondAwareNetwork, None);
    assert_eq!(configs.len(), 2);
    for config in &configs {
        assert_eq!(config.number_of_merges(), Count::Finite(1));
    }

    let configs = all(&cp(), "a a \n a* a*", FormulationKind::BondObliviousNetwork, None);
    assert_eq!(configs.len(), 1);
}

#[test]
fn enumeration_with_duplicated_monomers() {
    use FormulationKind::*;
    for (formulation, expected) in [
        (BondAwareNetwork, 2),
        (BondObliviousNetwork, 2),
        (PolymerBinaryMatrix, 2),
        (PolymerIntegerMatrix, 1),
        (PolymerUnboundedMatrix, 1),
        (VariableBondWeight, 1),
    ] {
        let configs = all(&cp(), DOUBLED, formulation, Some(2.0));
        assert_eq!(configs.len(), expected, "{formulation:?}");
        for config in &configs {
            assert_eq!(config.number_of_merges(), Count::Finite(1), "{formulation:?}");
        }
    }
}

#[test]
fn tied_domains_enumerate_balanced_splits() {
    let configs = all(&cp(), TIED, FormulationKind::PolymerUnboundedMatrix, None);
    assert_eq!(configs.len(), 3);
    for config in &configs {
        assert_eq!(config.number_of_polymers(), Count::Finite(2));
        assert_eq!(config.number_of_merges(), Count::Finite(5));
    }
}

#[test]
fn infinite_counts_enumerate_once() {
    let configs = all(&cp(), INFINITE, FormulationKind::PolymerUnboundedMatrix, None);
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].number_of_polymers(), Count::Infinite);
    assert_eq!(configs[0].number_of_merges(), Count::Finite(2));
}

#[test]
fn infinite_wide_pool_has_two_stable_splits() {
    let configs = all(&cp(), INFINITE_WIDE, FormulationKind::PolymerUnboundedMatrix, None);
    assert_eq!(configs.len(), 2);
    for config in &configs {
        assert_eq!(config.number_of_polymers(), Count::Infinite);
        assert_eq!(config.number_of_merges(), Count::Finite(4));
    }
}

#[test]
fn flatten_recovers_the_input_pool() {
    for text in [SMALL, DOUBLED, TIED, INFINITE, INFINITE_WIDE] {
        let pool = tbn(text);
        let config = cp()
            .stable_config(
                &pool,
                FormulationKind::PolymerUnboundedMatrix,
                &Constraints::default(),
                None,
                false,
            )
            .unwrap();
        assert_eq!(config.flatten(), pool, "{text}");
    }
}

#[test]
fn saturation_holds_in_every_stable_polymer() {
    for text in [SMALL, DOUBLED, TIED] {
        let pool = tbn(text);
        let limiting = pool.limiting_domain_types().unwrap();
        let config = cp()
            .stable_config(
                &pool,
                FormulationKind::PolymerUnboundedMatrix,
                &Constraints::default(),
                None,
                false,
            )
            .unwrap();
        for (polymer, _) in config.iter() {
            for domain in &limiting {
                let excess: i64 = polymer
                    .iter()
                    .map(|(monomer, count)| {
                        monomer.net_count(domain) * count.as_finite().unwrap_or(0) as i64
                    })
                    .sum();
                assert!(excess <= 0, "{text}: {polymer} exceeds on {domain}");
            }
        }
    }
}

#[test]
fn low_bond_weights_trade_merges_for_deficits() {
    for solver in [cp(), ip()] {
        let config = single(&solver, SMALL, FormulationKind::VariableBondWeight, Some(0.4));
        assert_eq!(config.number_of_polymers(), Count::Finite(4));
        assert_eq!(config.energy(0.4).unwrap(), 0.8);

        let config = single(&solver, SMALL, FormulationKind::VariableBondWeight, Some(0.6));
        assert_eq!(config.number_of_polymers(), Count::Finite(3));
        assert_eq!(config.energy(0.6).unwrap(), 1.0);
    }
}

#[test]
fn low_bond_weights_with_infinite_counts() {
    let config = single(&cp(), INFINITE, FormulationKind::VariableBondWeight, Some(0.5));
    assert_eq!(config.number_of_polymers(), Count::Infinite);
    assert_eq!(config.energy(0.5).unwrap(), 2.0);
}

#[test]
fn energy_enumeration_shares_the_frozen_optimum() {
    for (text, weight, expected_configs, expected_energy) in [
        (SMALL, 0.4, 1, 0.8),
        (SMALL, 0.6, 1, 1.0),
        (INFINITE, 0.6, 1, 2.0),
        (INFINITE_WIDE, 0.6, 2, 4.0),
    ] {
        let configs = all(&cp(), text, FormulationKind::VariableBondWeight, Some(weight));
        assert_eq!(configs.len(), expected_configs, "{text} w={weight}");
        for config in &configs {
            assert_eq!(config.energy(weight).unwrap(), expected_energy, "{text}");
        }
    }
}

#[test]
fn enumeration_without_optimization_respects_fixed_bounds() {
    // with optimization off, the enumeration pass runs directly against
    // the user bounds
    let constraints = Constraints::default()
        .with_unset_optimization_flag()
        .with_fixed_polymers(2);
    let configs = cp()
        .stable_configs(
            &tbn(DOUBLED),
            FormulationKind::PolymerBinaryMatrix,
            &constraints,
            None,
            false,
        )
        .unwrap();
    assert_eq!(configs.len(), 2);
    for config in &configs {
        assert_eq!(config.number_of_polymers(), Count::Finite(2));
    }
}

#[test]
fn over_tight_bounds_are_infeasible() {
    let constraints = Constraints::from_string("MAX MERGES 0").unwrap();
    let result = cp().stable_config(
        &tbn(SMALL),
        FormulationKind::PolymerUnboundedMatrix,
        &constraints,
        None,
        false,
    );
    assert!(matches!(result, Err(SolveError::Infeasible)));
}

#[test]
fn finite_only_formulations_reject_infinite_counts() {
    use FormulationKind::*;
    for formulation in [
        BondAwareNetwork,
        BondObliviousNetwork,
        PolymerBinaryMatrix,
        PolymerIntegerMatrix,
        HilbertBasis,
        GraverBasis,
    ] {
        let result = cp().stable_config(
            &tbn(INFINITE),
            formulation,
            &Constraints::default(),
            None,
            false,
        );
        assert!(
            matches!(result, Err(SolveError::Unsupported(_))),
            "{formulation:?}"
        );
    }
}

#[test]
fn graver_basis_is_a_typed_stub() {
    let result = cp().stable_config(
        &tbn(SMALL),
        FormulationKind::GraverBasis,
        &Constraints::default(),
        None,
        false,
    );
    assert!(matches!(result, Err(SolveError::NotImplemented(_))));
}

#[test]
fn hilbert_basis_agrees_with_the_matrix_optimum() {
    // needs the external lattice-basis tool
    if which::which("4ti2-zsolve").is_err() {
        eprintln!("skipping: 4ti2-zsolve not installed");
        return;
    }
    let config = single(&cp(), SMALL, FormulationKind::HilbertBasis, None);
    assert_eq!(config.number_of_polymers(), Count::Finite(3));
    assert_eq!(config.number_of_merges(), Count::Finite(1));

    let configs = all(&cp(), SMALL, FormulationKind::HilbertBasis, None);
    assert_eq!(configs.len(), 1);
}
