//! `stable_tbn`: compute stable configurations of a thermodynamic
//! binding network described in a text file.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tbn_core::{Constraints, Tbn};
use tbn_solve::{FormulationKind, Solver, SolverMethod};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormulationArg {
    BondAwareNetwork,
    BondObliviousNetwork,
    PolymerBinaryMatrix,
    PolymerIntegerMatrix,
    PolymerUnboundedMatrix,
    VariableBondWeight,
    HilbertBasis,
    GraverBasis,
}

impl From<FormulationArg> for FormulationKind {
    fn from(arg: FormulationArg) -> FormulationKind {
        match arg {
            FormulationArg::BondAwareNetwork => FormulationKind::BondAwareNetwork,
            FormulationArg::BondObliviousNetwork => FormulationKind::BondObliviousNetwork,
            FormulationArg::PolymerBinaryMatrix => FormulationKind::PolymerBinaryMatrix,
            FormulationArg::PolymerIntegerMatrix => FormulationKind::PolymerIntegerMatrix,
            FormulationArg::PolymerUnboundedMatrix => FormulationKind::PolymerUnboundedMatrix,
            FormulationArg::VariableBondWeight => FormulationKind::VariableBondWeight,
            FormulationArg::HilbertBasis => FormulationKind::HilbertBasis,
            FormulationArg::GraverBasis => FormulationKind::GraverBasis,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stable_tbn",
    about = "Compute stable configurations of a thermodynamic binding network"
)]
struct Cli {
    /// Filename for the TBN text file
    tbn_filename: PathBuf,

    /// Filename for a constraints text file
    #[arg(short = 'c', value_name = "CONSTRAINTS_FILE")]
    constraint_filename: Option<PathBuf>,

    /// Energy weight of bonds vs polymers formed, e.g. 0.5; implies the
    /// variable-bond-weight formulation
    #[arg(short = 'w', long = "weight", value_name = "BOND_WEIGHT")]
    weight: Option<f64>,

    /// Use an alternate solution formulation
    #[arg(long, value_enum)]
    formulation: Option<FormulationArg>,

    /// Use the integer-programming adapter instead of constraint programming
    #[arg(short = 'i', long = "ip")]
    ip: bool,

    /// Only report one stable configuration
    #[arg(short = '1')]
    single: bool,

    /// Print the full configuration, including singletons
    #[arg(short = 'f', long = "full")]
    full: bool,

    /// Print elapsed time
    #[arg(short = 't', long = "timed")]
    timed: bool,

    /// Verbose solver output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Solve but suppress configuration output
    #[arg(long)]
    benchmark: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let tbn_text = fs::read_to_string(&args.tbn_filename)
        .with_context(|| format!("could not read tbn file {}", args.tbn_filename.display()))?;
    let tbn = Tbn::from_string(&tbn_text)
        .with_context(|| format!("could not parse tbn file {}", args.tbn_filename.display()))?;

    let constraints = match &args.constraint_filename {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("could not read constraints file {}", path.display()))?;
            Constraints::from_string(&text)
                .with_context(|| format!("could not parse constraints file {}", path.display()))?
        }
        None => Constraints::default(),
    };

    let formulation = match (args.weight, args.formulation) {
        (Some(_), requested) => {
            if let Some(requested) = requested {
                warn!(
                    ?requested,
                    "bond weight was specified, falling back to the variable-bond-weight formulation"
                );
            }
            FormulationKind::VariableBondWeight
        }
        (None, Some(requested)) => requested.into(),
        (None, None) => FormulationKind::PolymerUnboundedMatrix,
    };

    let method = if args.ip {
        SolverMethod::IntegerProgramming
    } else {
        SolverMethod::ConstraintProgramming
    };
    let solver = Solver::new(method);

    let start = Instant::now();
    if args.single {
        let configuration =
            solver.stable_config(&tbn, formulation, &constraints, args.weight, args.verbose)?;
        let elapsed = start.elapsed();
        if !args.benchmark {
            println!("Configuration: {}", configuration.render(args.full));
        }
        if args.timed {
            println!("seconds elapsed: {}", elapsed.as_secs_f64());
        }
    } else {
        let configurations =
            solver.stable_configs(&tbn, formulation, &constraints, args.weight, args.verbose)?;
        let elapsed = start.elapsed();
        if !args.benchmark {
            for (index, configuration) in configurations.iter().enumerate() {
                println!(
                    "Configuration {}:\n{}",
                    index + 1,
                    configuration.render(args.full)
                );
            }
        }
        if args.timed {
            println!("seconds elapsed: {}", elapsed.as_secs_f64());
        }
    }

    Ok(())
}
