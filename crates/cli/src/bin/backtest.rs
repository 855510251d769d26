use std::io::Write;
use std::path::PathBuf;

use catamaran_cli::{ScenarioArgs, SolverArgs, endurance_scenario, is_stdout, telemetry};
use clap::Parser;
use solar_catamaran::backtest::{BacktestSpec, TrajectorySummary, simulate};
use solar_catamaran::design::{design_with, verify_feasibility};
use solar_catamaran::export::{self, writer_for_path};
use solar_catamaran::importer::{DEFAULT_GHI_COLUMN, load_irradiance_csv};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Size a hull, then replay hourly irradiance through its battery"
)]
struct Cli {
    /// Hourly irradiance CSV with a GHI column
    #[arg(long)]
    irradiance: PathBuf,

    /// Name of the irradiance column (case-insensitive)
    #[arg(long, default_value = DEFAULT_GHI_COLUMN)]
    column: String,

    #[command(flatten)]
    scenario: ScenarioArgs,

    #[command(flatten)]
    solver: SolverArgs,

    /// Write the trajectory as CSV (`-` for stdout); a summary JSON is written beside files
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the design as JSON
    #[arg(long)]
    design_output: Option<PathBuf>,

    /// Exit with an error if the battery ever runs empty
    #[arg(long, default_value_t = false)]
    require_reserve: bool,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json);

    let (name, scenario) = cli.scenario.resolve(endurance_scenario())?;
    let solver = cli.solver.solver()?;
    let cost_table = cli.solver.cost_table()?;
    let series = load_irradiance_csv(&cli.irradiance, &cli.column)?;

    let result = design_with(&scenario, &solver, &cost_table)?;
    if !result.is_converged() {
        warn!(status = %result.status(), "replaying an unconverged design");
    }
    let spec = BacktestSpec::try_from(&result)?;
    info!(
        power_w = spec.power_w,
        battery_energy_wh = spec.battery_energy_wh,
        solar_area_m2 = spec.solar_area_m2,
        hours = series.len(),
        "replaying irradiance"
    );
    let trajectory = simulate(&spec, &series)?;
    let summary = trajectory.summary();

    let to_stdout = cli.output.as_deref().is_some_and(is_stdout);
    if !to_stdout {
        print_summary(&name, &summary, &result.status().to_string());
    }

    if let Some(path) = &cli.output {
        let start = series.records().first().and_then(|r| r.timestamp);
        let mut writer = writer_for_path(path)?;
        export::trajectory::write_csv(&mut *writer, &trajectory, start)?;
        writer.flush()?;
        if !to_stdout {
            let sidecar = export::trajectory::write_summary_sidecar(path, &summary)?;
            println!("Trajectory written to {}", path.display());
            println!("Summary written to {}", sidecar.display());
        }
    }
    if let Some(path) = &cli.design_output {
        let violations = verify_feasibility(&result, solver.options().constraint_tolerance());
        let mut writer = writer_for_path(path)?;
        export::design::write_json(&mut *writer, &name, &result, &violations)?;
        writer.flush()?;
    }

    if cli.require_reserve && summary.hours_empty > 0 {
        anyhow::bail!(
            "battery ran empty for {} of {} hours",
            summary.hours_empty,
            summary.hours
        );
    }
    Ok(())
}

fn print_summary(name: &str, summary: &TrajectorySummary, status: &str) {
    println!("=== Battery Backtest: {} ===", name);
    println!("Design status  : {}", status);
    println!("Hours replayed : {}", summary.hours);
    println!("Capacity       : {:.1} Wh", summary.capacity_wh);
    println!(
        "Energy range   : min = {:.1} Wh, max = {:.1} Wh, final = {:.1} Wh",
        summary.min_wh, summary.max_wh, summary.final_wh
    );
    println!(
        "Hours at empty : {} ({:.1}%)",
        summary.hours_empty,
        percent(summary.hours_empty, summary.hours)
    );
    println!(
        "Hours at full  : {} ({:.1}%)",
        summary.hours_full,
        percent(summary.hours_full, summary.hours)
    );
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
