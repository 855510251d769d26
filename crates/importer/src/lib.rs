//! Hourly irradiance import from CSV.
//!
//! The file needs a header row and a numeric GHI column (matched case-insensitively). Rows
//! are taken in file order, one per simulated hour. Timestamps are optional: either a single
//! `timestamp` column or the split `Year,Month,Day,Hour[,Minute]` columns found in
//! satellite irradiance exports.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use catamaran_backtest::HourlyIrradiance;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{info, warn};

/// Column read when no other name is given.
pub const DEFAULT_GHI_COLUMN: &str = "GHI";

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV missing '{0}' column")]
    MissingColumn(String),
    #[error("line {row}: column '{column}' holds '{value}', expected a number")]
    InvalidValue {
        row: u64,
        column: String,
        value: String,
    },
    #[error("line {row}: invalid timestamp '{value}'")]
    InvalidTimestamp { row: u64, value: String },
}

/// One hour of measured irradiance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceRecord {
    pub timestamp: Option<NaiveDateTime>,
    pub ghi_w_m2: f64,
}

impl HourlyIrradiance for IrradianceRecord {
    fn ghi_w_m2(&self) -> f64 {
        self.ghi_w_m2
    }
}

/// Records in file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrradianceSeries {
    records: Vec<IrradianceRecord>,
}

impl IrradianceSeries {
    pub fn records(&self) -> &[IrradianceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ghi(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.ghi_w_m2).collect()
    }

    /// Timestamp of every record, if the file carried them.
    pub fn timestamps(&self) -> Option<Vec<NaiveDateTime>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Number of consecutive timestamp pairs not exactly one hour apart.
    pub fn hourly_gaps(&self) -> usize {
        let Some(stamps) = self.timestamps() else {
            return 0;
        };
        stamps
            .windows(2)
            .filter(|pair| pair[1] - pair[0] != TimeDelta::hours(1))
            .count()
    }
}

impl<'a> IntoIterator for &'a IrradianceSeries {
    type Item = &'a IrradianceRecord;
    type IntoIter = std::slice::Iter<'a, IrradianceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Load irradiance from a CSV file.
pub fn load_irradiance_csv<P: AsRef<Path>>(
    path: P,
    ghi_column: &str,
) -> Result<IrradianceSeries, ImportError> {
    let path = path.as_ref();
    let series = read_irradiance(File::open(path)?, ghi_column)?;
    info!(path = %path.display(), hours = series.len(), "loaded irradiance");
    Ok(series)
}

/// Read irradiance from any CSV source.
pub fn read_irradiance<R: Read>(reader: R, ghi_column: &str) -> Result<IrradianceSeries, ImportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let ghi_idx = column(&headers, ghi_column)
        .ok_or_else(|| ImportError::MissingColumn(ghi_column.to_string()))?;
    let clock = Clock::detect(&headers);

    let mut records = Vec::new();
    for rec in rdr.records() {
        let r = rec?;
        let row = r.position().map(|p| p.line()).unwrap_or(0);
        let ghi_w_m2 = number(&r, ghi_idx, &headers, row)?;
        let timestamp = clock.read(&r, &headers, row)?;
        records.push(IrradianceRecord {
            timestamp,
            ghi_w_m2,
        });
    }

    let series = IrradianceSeries { records };
    let gaps = series.hourly_gaps();
    if gaps > 0 {
        warn!(gaps, "irradiance timestamps are not evenly hourly");
    }
    Ok(series)
}

fn column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("")
}

fn number(
    record: &StringRecord,
    idx: usize,
    headers: &StringRecord,
    row: u64,
) -> Result<f64, ImportError> {
    let raw = field(record, idx);
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::InvalidValue {
            row,
            column: headers.get(idx).unwrap_or_default().to_string(),
            value: raw.to_string(),
        })
}

/// Where a row's timestamp comes from.
enum Clock {
    None,
    Single(usize),
    Split {
        year: usize,
        month: usize,
        day: usize,
        hour: usize,
        minute: Option<usize>,
    },
}

impl Clock {
    fn detect(headers: &StringRecord) -> Self {
        if let Some(idx) = column(headers, "timestamp") {
            return Clock::Single(idx);
        }
        match (
            column(headers, "Year"),
            column(headers, "Month"),
            column(headers, "Day"),
            column(headers, "Hour"),
        ) {
            (Some(year), Some(month), Some(day), Some(hour)) => Clock::Split {
                year,
                month,
                day,
                hour,
                minute: column(headers, "Minute"),
            },
            _ => Clock::None,
        }
    }

    fn read(
        &self,
        record: &StringRecord,
        headers: &StringRecord,
        row: u64,
    ) -> Result<Option<NaiveDateTime>, ImportError> {
        match *self {
            Clock::None => Ok(None),
            Clock::Single(idx) => {
                let raw = field(record, idx);
                TIMESTAMP_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                    .map(Some)
                    .ok_or_else(|| ImportError::InvalidTimestamp {
                        row,
                        value: raw.to_string(),
                    })
            }
            Clock::Split {
                year,
                month,
                day,
                hour,
                minute,
            } => {
                let part = |idx: usize| -> Result<u32, ImportError> {
                    let raw = field(record, idx);
                    raw.parse::<u32>().map_err(|_| ImportError::InvalidValue {
                        row,
                        column: headers.get(idx).unwrap_or_default().to_string(),
                        value: raw.to_string(),
                    })
                };
                let minute = match minute {
                    Some(idx) => part(idx)?,
                    None => 0,
                };
                let (y, mo, d, h) = (part(year)?, part(month)?, part(day)?, part(hour)?);
                NaiveDate::from_ymd_opt(y as i32, mo, d)
                    .and_then(|date| date.and_hms_opt(h, minute, 0))
                    .map(Some)
                    .ok_or_else(|| ImportError::InvalidTimestamp {
                        row,
                        value: format!("{y}-{mo}-{d} {h}:{minute}"),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_ghi_case_insensitively() {
        let csv = "ghi,DNI\n0,0\n120.5,300\n640,800\n";
        let series = read_irradiance(csv.as_bytes(), DEFAULT_GHI_COLUMN).expect("read");
        assert_eq!(series.ghi(), vec![0.0, 120.5, 640.0]);
        assert_eq!(series.timestamps(), None);
        assert_eq!(series.hourly_gaps(), 0);
    }

    #[test]
    fn split_date_columns_build_timestamps() {
        let csv = "Year,Month,Day,Hour,Minute,GHI\n\
                   2020,1,1,0,30,0\n\
                   2020,1,1,1,30,15\n\
                   2020,1,1,3,30,40\n";
        let series = read_irradiance(csv.as_bytes(), "GHI").expect("read");
        let stamps = series.timestamps().expect("timestamps");
        assert_eq!(stamps[1].to_string(), "2020-01-01 01:30:00");
        assert_eq!(series.hourly_gaps(), 1);
    }

    #[test]
    fn single_timestamp_column() {
        let csv = "timestamp,GHI\n2021-06-01T10:00:00,700\n2021-06-01 11:00,710\n";
        let series = read_irradiance(csv.as_bytes(), "GHI").expect("read");
        assert_eq!(series.len(), 2);
        assert_eq!(series.hourly_gaps(), 0);
    }

    #[test]
    fn missing_column_is_named() {
        let err = read_irradiance("DNI\n1\n".as_bytes(), "GHI").expect_err("no GHI");
        assert!(matches!(err, ImportError::MissingColumn(ref name) if name == "GHI"));
    }

    #[test]
    fn malformed_value_reports_line() {
        let csv = "GHI\n10\n20\nbright\n";
        let err = read_irradiance(csv.as_bytes(), "GHI").expect_err("bad value");
        match err {
            ImportError::InvalidValue { row, column, value } => {
                assert_eq!(row, 4);
                assert_eq!(column, "GHI");
                assert_eq!(value, "bright");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let csv = "timestamp,GHI\nyesterday,5\n";
        let err = read_irradiance(csv.as_bytes(), "GHI").expect_err("bad timestamp");
        assert!(matches!(err, ImportError::InvalidTimestamp { row: 2, .. }));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "GHI").expect("write");
        for ghi in [0, 50, 100] {
            writeln!(file, "{ghi}").expect("write");
        }
        let series = load_irradiance_csv(file.path(), "GHI").expect("load");
        assert_eq!(series.len(), 3);
        assert_eq!((&series).into_iter().count(), 3);
    }
}
