//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod design {
    use catamaran_design::{SolverResult, Violation};
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::{self, Write};

    #[derive(Serialize)]
    struct DesignReport<'a> {
        scenario: &'a str,
        result: &'a SolverResult,
        violations: &'a [Violation],
    }

    /// Write the resolved design, its status, and any constraint violations as JSON.
    pub fn write_json(
        writer: &mut dyn Write,
        scenario: &str,
        result: &SolverResult,
        violations: &[Violation],
    ) -> io::Result<()> {
        let report = DesignReport {
            scenario,
            result,
            violations,
        };
        to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)
    }

    /// Write `field,value` rows in reporting order.
    pub fn write_csv(writer: &mut dyn Write, result: &SolverResult) -> io::Result<()> {
        writeln!(writer, "field,value")?;
        for (field, value) in result.iter() {
            writeln!(writer, "{},{}", field, value)?;
        }
        Ok(())
    }
}

pub mod trajectory {
    use catamaran_backtest::{BatteryTrajectory, TrajectorySummary};
    use chrono::{NaiveDateTime, TimeDelta};
    use serde_json::to_writer_pretty;
    use std::fs::{self, File};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    const HEADER: &str = "hour,day,energy_wh";

    /// One row per trajectory entry; with `start`, a timestamp column counts hours from it.
    pub fn write_csv(
        writer: &mut dyn Write,
        trajectory: &BatteryTrajectory,
        start: Option<NaiveDateTime>,
    ) -> io::Result<()> {
        match start {
            Some(_) => writeln!(writer, "{HEADER},timestamp")?,
            None => writeln!(writer, "{HEADER}")?,
        }
        for ((hour, wh), (day, _)) in trajectory.by_hour().zip(trajectory.by_day()) {
            write!(writer, "{},{:.6},{:.3}", hour as usize, day, wh)?;
            if let Some(start) = start {
                let stamp = start + TimeDelta::hours(hour as i64);
                write!(writer, ",{}", stamp.format("%Y-%m-%dT%H:%M:%S"))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Path of the summary written next to `output`.
    pub fn summary_path(output: &Path) -> PathBuf {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("trajectory");
        parent.join(format!("{}_summary.json", stem))
    }

    /// Write the trajectory summary as a JSON sidecar of `output`.
    pub fn write_summary_sidecar(output: &Path, summary: &TrajectorySummary) -> io::Result<PathBuf> {
        let path = summary_path(output);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        to_writer_pretty(File::create(&path)?, summary)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catamaran_backtest::{BacktestSpec, simulate};
    use catamaran_design::{Field, Scenario, design_with, verify_feasibility};
    use catamaran_nlp::{Problem, SolveFailure, SolverError, SolverOutput};

    struct Seed;

    impl catamaran_nlp::NlpSolver for Seed {
        fn solve(&self, problem: &Problem) -> Result<SolverOutput, SolveFailure> {
            Err(SolveFailure {
                error: SolverError::OuterLimit(100),
                last_iterate: problem.initial_point(),
                iterations: 0,
            })
        }
    }

    fn seed_result() -> catamaran_design::SolverResult {
        let scenario = Scenario {
            boat_speed_m_s: 5.0,
            sun_hours: 5.0,
            battery_hours: 10.0,
            solar: true,
        };
        design_with(&scenario, &Seed, &Default::default()).expect("design")
    }

    #[test]
    fn design_json_carries_every_field_and_violations() {
        let result = seed_result();
        let violations = verify_feasibility(&result, 1e-6);
        let mut buf = Vec::new();
        design::write_json(&mut buf, "cruise", &result, &violations).expect("write");

        let json: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(json["scenario"], "cruise");
        for field in Field::ALL {
            assert!(json["result"].get(field.as_str()).is_some(), "missing {field}");
        }
        assert_eq!(json["result"]["status"]["kind"], "fallback_iterate");
        assert!(!json["violations"].as_array().expect("array").is_empty());
    }

    #[test]
    fn design_csv_lists_fields_in_order() {
        let mut buf = Vec::new();
        design::write_csv(&mut buf, &seed_result()).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("field,value"));
        assert!(lines.next().expect("first row").starts_with("L,10"));
        assert_eq!(text.lines().count(), Field::COUNT + 1);
    }

    #[test]
    fn trajectory_csv_has_row_per_entry() {
        let spec = BacktestSpec::new(10.0, 100.0, 0.0).expect("spec");
        let trajectory = simulate(&spec, vec![0.0; 30]).expect("simulate");
        let start = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("date");

        let mut buf = Vec::new();
        trajectory::write_csv(&mut buf, &trajectory, Some(start)).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "hour,day,energy_wh,timestamp");
        assert_eq!(lines.len(), 32);
        assert_eq!(lines[1], "0,0.000000,100.000,2020-01-01T00:00:00");
        assert_eq!(lines[25], "24,1.000000,0.000,2020-01-02T00:00:00");
    }

    #[test]
    fn summary_sidecar_lands_next_to_csv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = dir.path().join("runs").join("boston.csv");
        let spec = BacktestSpec::new(10.0, 100.0, 0.0).expect("spec");
        let trajectory = simulate(&spec, vec![0.0; 3]).expect("simulate");

        let path = trajectory::write_summary_sidecar(&output, &trajectory.summary())
            .expect("sidecar");
        assert_eq!(path, dir.path().join("runs").join("boston_summary.json"));
        let json: serde_json::Value =
            serde_json::from_reader(File::open(&path).expect("open")).expect("json");
        assert_eq!(json["hours"], 3);
        assert_eq!(json["final_wh"], 70.0);
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out.csv");
        let mut writer = writer_for_path(&path).expect("writer");
        writeln!(writer, "ok").expect("write");
        drop(writer);
        assert_eq!(fs::read_to_string(&path).expect("read"), "ok\n");
    }
}
