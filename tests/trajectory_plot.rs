use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::Write;

fn write_trajectory(path: &std::path::Path) {
    let mut file = File::create(path).expect("csv create");
    writeln!(file, "hour,day,energy_wh").expect("write");
    for hour in 0..=72 {
        let energy = 1_000.0 - (hour % 24) as f64 * 20.0;
        writeln!(file, "{hour},{:.6},{energy:.3}", hour as f64 / 24.0).expect("write");
    }
}

#[test]
#[ignore = "requires system fonts for plot labels"]
fn trajectory_plot_renders_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("battery.csv");
    let png_path = dir.path().join("battery.png");
    write_trajectory(&csv_path);

    Command::cargo_bin("trajectory_plot")
        .expect("trajectory_plot bin")
        .args([
            "--input",
            csv_path.to_str().expect("utf8"),
            "--output",
            png_path.to_str().expect("utf8"),
            "--start-day",
            "1",
            "--end-day",
            "2",
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}

#[test]
fn trajectory_plot_rejects_missing_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("bad.csv");
    fs::write(&csv_path, "hour,charge\n0,1\n").expect("write");

    Command::cargo_bin("trajectory_plot")
        .expect("trajectory_plot bin")
        .args([
            "--input",
            csv_path.to_str().expect("utf8"),
            "--output",
            dir.path().join("bad.png").to_str().expect("utf8"),
        ])
        .assert()
        .failure()
        .stderr(predicates::str::contains("energy_wh"));
}

fn plot_window(start_day: &str, end_day: &str) -> (tempfile::TempDir, assert_cmd::assert::Assert) {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("battery.csv");
    write_trajectory(&csv_path);

    let assert = Command::cargo_bin("trajectory_plot")
        .expect("trajectory_plot bin")
        .args([
            "--input",
            csv_path.to_str().expect("utf8"),
            "--output",
            dir.path().join("battery.png").to_str().expect("utf8"),
            "--start-day",
            start_day,
            "--end-day",
            end_day,
        ])
        .assert();
    (dir, assert)
}

#[test]
fn trajectory_plot_rejects_window_past_the_end() {
    let (dir, assert) = plot_window("4", "6");
    assert
        .failure()
        .stderr(predicates::str::contains("days 4..=6 fall outside a 72 hour trajectory"));
    assert!(!dir.path().join("battery.png").exists());
}

#[test]
fn trajectory_plot_rejects_reversed_window() {
    let (_dir, assert) = plot_window("2", "1");
    assert.failure().stderr(predicates::str::contains("fall outside"));
}

#[test]
fn trajectory_plot_handles_huge_day_numbers() {
    let huge = usize::MAX.to_string();
    let (_dir, assert) = plot_window(&huge, &huge);
    assert
        .failure()
        .stderr(predicates::str::contains("fall outside"))
        .stderr(predicates::str::contains("panicked").not());
}
