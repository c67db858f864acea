//! dcpoint - DC operating-point solver
//!
//! Reads a SPICE-style netlist, solves its DC operating point and prints
//! node voltages followed by per-device currents and powers.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug dcpoint amplifier.cir --max-iterations 200
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dcpoint_core::{
    error::{DcError, Result},
    netlist, report,
    solver::{CurrentStampPolarity, DcAnalysis, DcConfig, SolveMode},
    solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_PIVOT_TOLERANCE, DEFAULT_TOLERANCE},
};

/// DC operating-point solver for SPICE-style netlists
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "NETLIST")]
    netlist: PathBuf,

    /// Solve once from the zero estimate instead of iterating
    #[arg(long)]
    single_pass: bool,

    /// Maximum fixed-point iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Convergence tolerance on node voltages (volts)
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Pivot tolerance relative to the matrix infinity norm
    #[arg(long, default_value_t = DEFAULT_PIVOT_TOLERANCE)]
    pivot_tolerance: f64,

    /// Stamp current sources as flowing from their first node to their second
    #[arg(long)]
    conventional_current_sources: bool,

    /// Fail if the netlist produced any diagnostics
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn config(&self) -> DcConfig {
        let mode = if self.single_pass {
            SolveMode::SinglePass
        } else {
            SolveMode::Iterate
        };
        let polarity = if self.conventional_current_sources {
            CurrentStampPolarity::Conventional
        } else {
            CurrentStampPolarity::Additive
        };
        DcConfig::new()
            .with_mode(mode)
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance)
            .with_pivot_tolerance(self.pivot_tolerance)
            .with_current_polarity(polarity)
    }
}

fn run(args: &Args) -> Result<()> {
    let circuit = netlist::parse_file(&args.netlist)?;

    if args.strict {
        if let Some(first) = circuit.diagnostics().first() {
            return Err(DcError::InvalidTopology {
                message: format!(
                    "{} diagnostic(s) in strict mode, first: {}",
                    circuit.diagnostics().len(),
                    first
                ),
            });
        }
    }

    let solution = DcAnalysis::with_config(&circuit, args.config()).solve()?;
    if !solution.converged {
        log::warn!("single pass over a nonlinear circuit; result is not a converged operating point");
    }

    let devices =
        report::compute_currents_and_powers(&circuit, &solution.voltages, &solution.currents);

    print!("{}", report::format_node_voltages(&circuit, &solution.voltages));
    println!();
    print!("{}", report::format_device_report(&devices));
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
