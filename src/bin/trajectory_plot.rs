use chrono::NaiveDateTime;
use clap::Parser;
use csv::ReaderBuilder;
use plotters::prelude::*;
use solar_catamaran::backtest::BatteryTrajectory;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a battery energy trajectory CSV as a line chart"
)]
struct Cli {
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "artifacts/battery.png")]
    output: PathBuf,
    /// Use days instead of hours on the x axis
    #[arg(long, default_value_t = false)]
    days: bool,
    /// First day of a window (implies --days)
    #[arg(long)]
    start_day: Option<usize>,
    /// Last day of a window, inclusive of its first hour (implies --days)
    #[arg(long)]
    end_day: Option<usize>,
    #[arg(long, default_value_t = 1200)]
    width: u32,
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (energy, start) = read_trajectory(&cli.input)?;
    let trajectory = BatteryTrajectory::from_energy(energy)?;

    let windowed = cli.start_day.is_some() || cli.end_day.is_some();
    let points: Vec<(f64, f64)> = if windowed {
        let last_day = trajectory.hours() / 24 + 1;
        let start_day = cli.start_day.unwrap_or(0);
        let end_day = cli.end_day.unwrap_or(last_day);
        trajectory.day_window(start_day, end_day)?.by_day().collect()
    } else if cli.days {
        trajectory.by_day().collect()
    } else {
        trajectory.by_hour().collect()
    };
    let in_days = windowed || cli.days;

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
            (lo.min(x), hi.max(x))
        });
    let x_max = if x_max > x_min { x_max } else { x_min + 1.0 };
    let capacity = trajectory.capacity_wh();
    let y_max = if capacity > 0.0 { capacity * 1.05 } else { 1.0 };

    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let output_str = cli
        .output
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Output path contains invalid UTF-8"))?;
    let root = BitMapBackend::new(output_str, (cli.width, cli.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 24.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 18.0, FontStyle::Normal);

    let caption = match start {
        Some(start) => format!("Battery energy from {}", start.format("%Y-%m-%d")),
        None => "Battery energy".to_string(),
    };
    let x_desc = if in_days { "Time (days)" } else { "Time (hours)" };

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, caption_font)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc("Battery Energy (Wh)")
        .label_style(label_font.clone())
        .axis_desc_style(label_font)
        .x_labels(8)
        .y_labels(6)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_min, capacity), (x_max, capacity)],
        ShapeStyle::from(&BLACK.mix(0.4)).stroke_width(1),
    )))?;
    chart.draw_series(LineSeries::new(
        points,
        ShapeStyle::from(&RGBColor(20, 90, 200)).stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Energy column plus the first timestamp, if the CSV has one.
fn read_trajectory(path: &Path) -> anyhow::Result<(Vec<f64>, Option<NaiveDateTime>)> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let energy_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("energy_wh"))
        .ok_or_else(|| anyhow::anyhow!("CSV missing 'energy_wh' column"))?;
    let timestamp_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("timestamp"));

    let mut energy = Vec::new();
    let mut start = None;
    for rec in rdr.records() {
        let r = rec?;
        let raw = r.get(energy_idx).unwrap_or("");
        let value: f64 = raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid energy value '{}'", raw))?;
        if start.is_none() {
            start = timestamp_idx
                .and_then(|idx| r.get(idx))
                .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok());
        }
        energy.push(value);
    }
    Ok((energy, start))
}
