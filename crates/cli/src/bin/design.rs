use std::io::Write;
use std::path::PathBuf;

use catamaran_cli::{ScenarioArgs, SolverArgs, cruise_scenario, is_stdout, telemetry};
use clap::Parser;
use solar_catamaran::design::{SolverResult, Violation, design_with, verify_feasibility};
use solar_catamaran::export::{self, writer_for_path};
use tracing::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size a minimum-mass solar catamaran hull for one scenario"
)]
struct Cli {
    #[command(flatten)]
    scenario: ScenarioArgs,

    #[command(flatten)]
    solver: SolverArgs,

    /// Write the design as JSON (`-` for stdout)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write `field,value` rows as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Feasibility tolerance on scaled constraint residuals
    #[arg(long, default_value_t = 1e-6)]
    tolerance: f64,

    /// Exit with an error unless the solve converged to a feasible point
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json);

    let (name, scenario) = cli.scenario.resolve(cruise_scenario())?;
    let solver = cli.solver.solver()?;
    let cost_table = cli.solver.cost_table()?;

    info!(scenario = %name, max_iter = solver.options().max_iter(), "starting design");
    let result = design_with(&scenario, &solver, &cost_table)?;
    let violations = verify_feasibility(&result, cli.tolerance);

    let to_stdout = cli.output.as_deref().is_some_and(is_stdout);
    if !to_stdout {
        print_table(&name, &result, &violations);
    }

    if let Some(path) = &cli.output {
        let mut writer = writer_for_path(path)?;
        export::design::write_json(&mut *writer, &name, &result, &violations)?;
        writer.flush()?;
        if !to_stdout {
            println!("Design JSON written to {}", path.display());
        }
    }
    if let Some(path) = &cli.csv {
        let mut writer = writer_for_path(path)?;
        export::design::write_csv(&mut *writer, &result)?;
        writer.flush()?;
    }

    if cli.strict && (!result.is_converged() || !violations.is_empty()) {
        anyhow::bail!(
            "design for '{}' is not a converged feasible point ({}, {} violated constraints)",
            name,
            result.status(),
            violations.len()
        );
    }
    Ok(())
}

fn print_table(name: &str, result: &SolverResult, violations: &[Violation]) {
    println!("=== Hull Design: {} ===", name);
    for (field, value) in result.iter() {
        println!("{:<20}: {:.6}", field.as_str(), value);
    }
    println!("{:<20}: {}", "status", result.status());
    println!("{:<20}: {}", "iterations", result.iterations());
    if violations.is_empty() {
        println!("All constraints satisfied.");
    } else {
        println!("Violated constraints:");
        for v in violations {
            println!(
                "  {:<34} residual = {:.6e} (scaled violation {:.3e})",
                v.constraint, v.residual, v.scaled_violation
            );
        }
    }
}
