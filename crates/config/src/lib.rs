//! Configuration models and loaders for the solar catamaran sizer.
//!
//! Every loader accepts a YAML file holding a list of records, a single TOML file, or a
//! directory of TOML files (read in file-name order).

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Design query parsed from scenario catalogs.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub name: String,
    pub boat_speed_m_s: f64,
    pub sun_hours: f64,
    pub battery_hours: f64,
    #[serde(default = "default_solar")]
    pub solar: bool,
}

fn default_solar() -> bool {
    true
}

impl ScenarioConfig {
    /// Reject non-finite or non-positive speeds and hour counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("boat_speed_m_s", self.boat_speed_m_s),
            ("sun_hours", self.sun_hours),
            ("battery_hours", self.battery_hours),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    record: self.name.clone(),
                    reason: format!("{field} must be positive and finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Penalty-parameter update rule named in solver settings.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MuStrategyConfig {
    Monotone,
    Adaptive,
}

/// Optional overrides of the solver defaults; absent fields keep the default.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    #[serde(default)]
    pub max_iter: Option<usize>,
    #[serde(default)]
    pub mu_strategy: Option<MuStrategyConfig>,
    #[serde(default)]
    pub required_infeasibility_reduction: Option<f64>,
    #[serde(default)]
    pub expect_infeasible_problem: Option<bool>,
    #[serde(default)]
    pub constraint_tolerance: Option<f64>,
    #[serde(default)]
    pub gradient_tolerance: Option<f64>,
    #[serde(default)]
    pub initial_penalty: Option<f64>,
    #[serde(default)]
    pub penalty_growth: Option<f64>,
}

/// Unit and fixed component prices used for the cost estimate.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CostConfig {
    pub battery_usd_per_kg: f64,
    pub solar_usd_per_m2: f64,
    pub foam_usd_per_m3: f64,
    pub starlink_usd: f64,
    pub mppt_usd: f64,
    pub motors_usd: f64,
    pub electronics_usd: f64,
    pub sensors_usd: f64,
    /// Whether `motors_usd` is added to the total.
    pub include_motors: bool,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            battery_usd_per_kg: 30.0,
            solar_usd_per_m2: 200.0,
            foam_usd_per_m3: 35.0,
            starlink_usd: 600.0,
            mppt_usd: 100.0,
            motors_usd: 150.0,
            electronics_usd: 200.0,
            sensors_usd: 200.0,
            include_motors: false,
        }
    }
}

impl CostConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prices = [
            ("battery_usd_per_kg", self.battery_usd_per_kg),
            ("solar_usd_per_m2", self.solar_usd_per_m2),
            ("foam_usd_per_m3", self.foam_usd_per_m3),
            ("starlink_usd", self.starlink_usd),
            ("mppt_usd", self.mppt_usd),
            ("motors_usd", self.motors_usd),
            ("electronics_usd", self.electronics_usd),
            ("sensors_usd", self.sensors_usd),
        ];
        for (field, value) in prices {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    record: "cost".to_string(),
                    reason: format!("{field} must be non-negative and finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid record '{record}': {reason}")]
    Invalid { record: String, reason: String },
}

/// Load and validate scenario records.
pub fn load_scenarios<P: AsRef<Path>>(path: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    let scenarios: Vec<ScenarioConfig> = load_records(path)?;
    for scenario in &scenarios {
        scenario.validate()?;
    }
    Ok(scenarios)
}

/// Load a single scenario by name from a catalog.
pub fn find_scenario<P: AsRef<Path>>(path: P, name: &str) -> Result<ScenarioConfig, ConfigError> {
    load_scenarios(path)?
        .into_iter()
        .find(|scenario| scenario.name == name)
        .ok_or_else(|| ConfigError::Invalid {
            record: name.to_string(),
            reason: "no scenario with this name".to_string(),
        })
}

/// Load solver overrides; the first record wins.
pub fn load_solver_config<P: AsRef<Path>>(path: P) -> Result<SolverConfig, ConfigError> {
    first_record(path)
}

/// Load cost table; the first record wins.
pub fn load_cost_config<P: AsRef<Path>>(path: P) -> Result<CostConfig, ConfigError> {
    let cost: CostConfig = first_record(path)?;
    cost.validate()?;
    Ok(cost)
}

fn first_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    load_records(path)?
        .into_iter()
        .next()
        .ok_or_else(|| ConfigError::Invalid {
            record: path.display().to_string(),
            reason: "file holds no records".to_string(),
        })
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    let mut records = Vec::with_capacity(entries.len());
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        records.push(toml::from_str(&contents)?);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scenario_from_toml_defaults_solar_on() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cruise.toml");
        fs::write(
            &path,
            "name = \"cruise\"\nboat_speed_m_s = 5.0\nsun_hours = 5.0\nbattery_hours = 10.0\n",
        )
        .expect("write");

        let scenarios = load_scenarios(&path).expect("load");
        assert_eq!(scenarios.len(), 1);
        assert!(scenarios[0].solar);
        assert_eq!(scenarios[0].boat_speed_m_s, 5.0);
    }

    #[test]
    fn scenarios_from_yaml_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.yaml");
        fs::write(
            &path,
            "- name: slow\n  boat_speed_m_s: 1.5\n  sun_hours: 2\n  battery_hours: 24\n\
             - name: dark\n  boat_speed_m_s: 3\n  sun_hours: 4\n  battery_hours: 12\n  solar: false\n",
        )
        .expect("write");

        let scenarios = load_scenarios(&path).expect("load");
        assert_eq!(scenarios.len(), 2);
        assert!(!scenarios[1].solar);
        assert_eq!(find_scenario(&path, "slow").expect("find").battery_hours, 24.0);
        assert!(matches!(
            find_scenario(&path, "missing"),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn directory_reads_toml_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (file, name) in [("b.toml", "second"), ("a.toml", "first")] {
            fs::write(
                dir.path().join(file),
                format!("name = \"{name}\"\nboat_speed_m_s = 2\nsun_hours = 3\nbattery_hours = 4\n"),
            )
            .expect("write");
        }
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let names: Vec<String> = load_scenarios(dir.path())
            .expect("load")
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn non_positive_speed_is_invalid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(
            &path,
            "name = \"bad\"\nboat_speed_m_s = 0.0\nsun_hours = 5.0\nbattery_hours = 10.0\n",
        )
        .expect("write");

        let err = load_scenarios(&path).expect_err("zero speed");
        assert!(err.to_string().contains("boat_speed_m_s"));
    }

    #[test]
    fn solver_overrides_are_partial() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("solver.toml");
        fs::write(&path, "max_iter = 250\nmu_strategy = \"adaptive\"\n").expect("write");

        let config = load_solver_config(&path).expect("load");
        assert_eq!(config.max_iter, Some(250));
        assert_eq!(config.mu_strategy, Some(MuStrategyConfig::Adaptive));
        assert_eq!(config.required_infeasibility_reduction, None);
    }

    #[test]
    fn cost_defaults_fill_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cost.toml");
        fs::write(&path, "battery_usd_per_kg = 45.0\ninclude_motors = true\n").expect("write");

        let cost = load_cost_config(&path).expect("load");
        assert_eq!(cost.battery_usd_per_kg, 45.0);
        assert_eq!(cost.solar_usd_per_m2, 200.0);
        assert!(cost.include_motors);
    }

    #[test]
    fn negative_price_is_invalid() {
        let cost = CostConfig {
            foam_usd_per_m3: -1.0,
            ..CostConfig::default()
        };
        assert!(matches!(cost.validate(), Err(ConfigError::Invalid { .. })));
    }
}
