//! Shared argument groups and logging setup for the command-line tools.

pub mod telemetry;

use std::path::{Path, PathBuf};

use clap::Args;
use solar_catamaran::config::{
    CostConfig, ScenarioConfig, find_scenario, load_cost_config, load_solver_config,
};
use solar_catamaran::design::{Scenario, scenario_from_config, solver_options};
use solar_catamaran::nlp::{AugmentedLagrangian, SolverOptions};

/// Scenario selection: a named catalog entry, explicit values, or the tool's default.
#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Scenario name to look up in the catalog
    #[arg(long)]
    pub scenario: Option<String>,

    /// Scenario catalog (YAML list, TOML file, or directory of TOML files)
    #[arg(long, default_value = "configs/scenarios")]
    pub catalog: PathBuf,

    /// Cruise speed in m/s (overrides the catalog)
    #[arg(long)]
    pub speed: Option<f64>,

    /// Hours of full sun available to recharge
    #[arg(long)]
    pub sun_hours: Option<f64>,

    /// Hours the battery must sustain cruise power
    #[arg(long)]
    pub battery_hours: Option<f64>,

    /// Size the boat without solar panels
    #[arg(long, default_value_t = false)]
    pub no_solar: bool,
}

impl ScenarioArgs {
    /// Resolve to a named scenario; explicit values override the catalog entry or `default`.
    pub fn resolve(&self, default: ScenarioConfig) -> anyhow::Result<(String, Scenario)> {
        let mut config = match &self.scenario {
            Some(name) => find_scenario(&self.catalog, name)?,
            None => default,
        };
        if let Some(speed) = self.speed {
            config.boat_speed_m_s = speed;
        }
        if let Some(hours) = self.sun_hours {
            config.sun_hours = hours;
        }
        if let Some(hours) = self.battery_hours {
            config.battery_hours = hours;
        }
        if self.no_solar {
            config.solar = false;
        }
        config.validate()?;
        Ok((config.name.clone(), scenario_from_config(&config)))
    }
}

/// Solver settings and cost table overrides.
#[derive(Args, Debug)]
pub struct SolverArgs {
    /// Solver settings file (TOML or YAML)
    #[arg(long)]
    pub solver_config: Option<PathBuf>,

    /// Cost table file (TOML or YAML)
    #[arg(long)]
    pub cost_config: Option<PathBuf>,

    /// Iteration cap (overrides the solver settings file)
    #[arg(long)]
    pub max_iter: Option<usize>,
}

impl SolverArgs {
    pub fn solver(&self) -> anyhow::Result<AugmentedLagrangian> {
        let mut config = match &self.solver_config {
            Some(path) => load_solver_config(path)?,
            None => Default::default(),
        };
        if self.max_iter.is_some() {
            config.max_iter = self.max_iter;
        }
        let options: SolverOptions = solver_options(&config)?;
        Ok(AugmentedLagrangian::new(options))
    }

    pub fn cost_table(&self) -> anyhow::Result<CostConfig> {
        match &self.cost_config {
            Some(path) => Ok(load_cost_config(path)?),
            None => Ok(CostConfig::default()),
        }
    }
}

/// The scenario sized by `design` when nothing else is requested.
pub fn cruise_scenario() -> ScenarioConfig {
    ScenarioConfig {
        name: "cruise".to_string(),
        boat_speed_m_s: 5.0,
        sun_hours: 5.0,
        battery_hours: 10.0,
        solar: true,
    }
}

/// The slow, long-autonomy scenario replayed by `backtest` when nothing else is requested.
pub fn endurance_scenario() -> ScenarioConfig {
    ScenarioConfig {
        name: "endurance".to_string(),
        boat_speed_m_s: 1.5,
        sun_hours: 2.0,
        battery_hours: 24.0,
        solar: true,
    }
}

/// True when `path` names stdout.
pub fn is_stdout(path: &Path) -> bool {
    path == Path::new("-")
}
