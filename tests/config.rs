use solar_catamaran::config::{
    MuStrategyConfig, load_cost_config, load_scenarios, load_solver_config,
};
use solar_catamaran::design::solver_options;
use solar_catamaran::nlp::SolverOptions;

#[test]
fn shipped_scenarios_load_in_name_order() {
    let scenarios = load_scenarios("configs/scenarios").expect("scenario catalog");
    let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["cruise", "endurance", "no_solar"]);

    let cruise = &scenarios[0];
    assert_eq!(cruise.boat_speed_m_s, 5.0);
    assert_eq!(cruise.sun_hours, 5.0);
    assert_eq!(cruise.battery_hours, 10.0);
    assert!(cruise.solar);

    let endurance = &scenarios[1];
    assert_eq!(endurance.boat_speed_m_s, 1.5);
    assert_eq!(endurance.battery_hours, 24.0);
}

#[test]
fn shipped_solver_settings_match_defaults() {
    let config = load_solver_config("configs/solver.toml").expect("solver settings");
    assert_eq!(config.mu_strategy, Some(MuStrategyConfig::Monotone));
    let options = solver_options(&config).expect("options");
    assert_eq!(options, SolverOptions::default());
}

#[test]
fn shipped_cost_table_leaves_motors_out() {
    let cost = load_cost_config("configs/cost.toml").expect("cost table");
    assert_eq!(cost, Default::default());
    assert!(!cost.include_motors);
}

#[test]
fn library_reports_version() {
    assert!(!solar_catamaran::version().is_empty());
}
