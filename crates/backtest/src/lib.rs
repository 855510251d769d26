//! Battery backtest: replay hourly irradiance through a sized design.
//!
//! The battery starts full and, each hour, gains what the panels collect and loses the cruise
//! draw, clamped to `[0, capacity]`. Nothing but the stored energy carries from hour to hour.

use catamaran_core::constants::HOURS_PER_DAY;
use catamaran_design::SolverResult;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Charge-controller efficiency assumed by the replay.
pub const ETA_CHARGING: f64 = 0.98;
/// Panel conversion efficiency assumed by the replay.
pub const ETA_SOLAR: f64 = 0.20;

/// One hour of global horizontal irradiance.
pub trait HourlyIrradiance {
    /// Mean GHI over the hour (W/m²).
    fn ghi_w_m2(&self) -> f64;
}

impl HourlyIrradiance for f64 {
    fn ghi_w_m2(&self) -> f64 {
        *self
    }
}

impl<T: HourlyIrradiance + ?Sized> HourlyIrradiance for &T {
    fn ghi_w_m2(&self) -> f64 {
        (**self).ghi_w_m2()
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BacktestError {
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidSpec { field: &'static str, value: f64 },
    #[error("irradiance at hour {hour} is not finite ({value})")]
    NonFiniteSample { hour: usize, value: f64 },
    #[error("trajectory is invalid: {0}")]
    InvalidTrajectory(String),
    #[error("days {start_day}..={end_day} fall outside a {hours} hour trajectory")]
    EmptyWindow {
        start_day: usize,
        end_day: usize,
        hours: usize,
    },
}

/// The three design quantities the replay needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestSpec {
    /// Constant draw while cruising (W).
    pub power_w: f64,
    /// Capacity and starting charge (Wh).
    pub battery_energy_wh: f64,
    pub solar_area_m2: f64,
}

impl BacktestSpec {
    pub fn new(
        power_w: f64,
        battery_energy_wh: f64,
        solar_area_m2: f64,
    ) -> Result<Self, BacktestError> {
        let fields = [
            ("power", power_w),
            ("battery_energy", battery_energy_wh),
            ("solar_area", solar_area_m2),
        ];
        for (field, value) in fields {
            if !(value.is_finite() && value >= 0.0) {
                return Err(BacktestError::InvalidSpec { field, value });
            }
        }
        Ok(Self {
            power_w,
            battery_energy_wh,
            solar_area_m2,
        })
    }

    /// Energy the panels deliver to the battery in one hour at `ghi` (Wh).
    pub fn harvest_wh(&self, ghi_w_m2: f64) -> f64 {
        ghi_w_m2 * self.solar_area_m2 * ETA_CHARGING * ETA_SOLAR
    }
}

impl TryFrom<&SolverResult> for BacktestSpec {
    type Error = BacktestError;

    fn try_from(result: &SolverResult) -> Result<Self, Self::Error> {
        Self::new(
            result.power_w(),
            result.battery_energy_wh(),
            result.solar_area_m2(),
        )
    }
}

/// Replay `irradiance` hour by hour, starting from a full battery.
///
/// # Errors
///
/// Returns [`BacktestError::NonFiniteSample`] on the first `NaN` or infinite sample.
pub fn simulate<I>(spec: &BacktestSpec, irradiance: I) -> Result<BatteryTrajectory, BacktestError>
where
    I: IntoIterator,
    I::Item: HourlyIrradiance,
{
    let capacity = spec.battery_energy_wh;
    let samples = irradiance.into_iter();
    let mut energy_wh = Vec::with_capacity(samples.size_hint().0 + 1);
    energy_wh.push(capacity);

    let mut level = capacity;
    for (hour, sample) in samples.enumerate() {
        let ghi = sample.ghi_w_m2();
        if !ghi.is_finite() {
            return Err(BacktestError::NonFiniteSample { hour, value: ghi });
        }
        level = (level + spec.harvest_wh(ghi) - spec.power_w).clamp(0.0, capacity);
        energy_wh.push(level);
    }

    let trajectory = BatteryTrajectory {
        energy_wh,
        capacity_wh: capacity,
    };
    let summary = trajectory.summary();
    debug!(
        hours = trajectory.hours(),
        min_wh = summary.min_wh,
        final_wh = summary.final_wh,
        hours_empty = summary.hours_empty,
        "backtest finished"
    );
    Ok(trajectory)
}

/// Battery energy at the start and after every simulated hour.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryTrajectory {
    energy_wh: Vec<f64>,
    capacity_wh: f64,
}

impl BatteryTrajectory {
    /// Rebuild a trajectory from stored levels; the first entry is the capacity.
    pub fn from_energy(energy_wh: Vec<f64>) -> Result<Self, BacktestError> {
        let Some(&capacity_wh) = energy_wh.first() else {
            return Err(BacktestError::InvalidTrajectory("no entries".to_string()));
        };
        if !(capacity_wh.is_finite() && capacity_wh >= 0.0) {
            return Err(BacktestError::InvalidTrajectory(format!(
                "starting energy {capacity_wh} is not a valid capacity"
            )));
        }
        if let Some((hour, wh)) = energy_wh
            .iter()
            .enumerate()
            .find(|&(_, &wh)| !(0.0..=capacity_wh).contains(&wh))
        {
            return Err(BacktestError::InvalidTrajectory(format!(
                "hour {hour} holds {wh} Wh, outside [0, {capacity_wh}]"
            )));
        }
        Ok(Self {
            energy_wh,
            capacity_wh,
        })
    }

    /// Entry `i` is the stored energy after `i` hours (Wh).
    pub fn values(&self) -> &[f64] {
        &self.energy_wh
    }

    pub fn capacity_wh(&self) -> f64 {
        self.capacity_wh
    }

    /// Number of entries, one more than the simulated hours.
    pub fn len(&self) -> usize {
        self.energy_wh.len()
    }

    /// Always false: the starting charge is present even for an empty input.
    pub fn is_empty(&self) -> bool {
        self.energy_wh.is_empty()
    }

    pub fn hours(&self) -> usize {
        self.energy_wh.len() - 1
    }

    pub fn final_wh(&self) -> f64 {
        self.energy_wh[self.energy_wh.len() - 1]
    }

    /// `(hour, energy)` pairs.
    pub fn by_hour(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy_wh
            .iter()
            .enumerate()
            .map(|(hour, &wh)| (hour as f64, wh))
    }

    /// `(day, energy)` pairs, with fractional days.
    pub fn by_day(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.by_hour()
            .map(|(hour, wh)| (hour / HOURS_PER_DAY, wh))
    }

    /// Entries from hour `24·start_day` through hour `24·end_day` inclusive, cut at the end of
    /// the trajectory.
    pub fn day_window(
        &self,
        start_day: usize,
        end_day: usize,
    ) -> Result<DayWindow<'_>, BacktestError> {
        let per_day = HOURS_PER_DAY as usize;
        let empty = || BacktestError::EmptyWindow {
            start_day,
            end_day,
            hours: self.hours(),
        };
        let first = start_day.checked_mul(per_day).ok_or_else(empty)?;
        if start_day > end_day || first >= self.energy_wh.len() {
            return Err(empty());
        }
        let last = end_day
            .checked_mul(per_day)
            .map_or(self.energy_wh.len() - 1, |hour| {
                hour.min(self.energy_wh.len() - 1)
            });
        Ok(DayWindow {
            first_hour: first,
            energy_wh: &self.energy_wh[first..=last],
        })
    }

    pub fn summary(&self) -> TrajectorySummary {
        let simulated = &self.energy_wh[1..];
        let (min_wh, max_wh) = self
            .energy_wh
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &wh| {
                (lo.min(wh), hi.max(wh))
            });
        TrajectorySummary {
            capacity_wh: self.capacity_wh,
            min_wh,
            max_wh,
            final_wh: self.final_wh(),
            hours: self.hours(),
            hours_empty: simulated.iter().filter(|&&wh| wh <= 0.0).count(),
            hours_full: simulated
                .iter()
                .filter(|&&wh| wh >= self.capacity_wh)
                .count(),
        }
    }
}

/// A contiguous slice of a trajectory selected by day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWindow<'a> {
    pub first_hour: usize,
    pub energy_wh: &'a [f64],
}

impl DayWindow<'_> {
    /// `(day, energy)` pairs on the trajectory's own clock.
    pub fn by_day(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy_wh
            .iter()
            .enumerate()
            .map(|(i, &wh)| ((self.first_hour + i) as f64 / HOURS_PER_DAY, wh))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub capacity_wh: f64,
    pub min_wh: f64,
    pub max_wh: f64,
    pub final_wh: f64,
    pub hours: usize,
    /// Simulated hours that ended with an empty battery.
    pub hours_empty: usize,
    /// Simulated hours that ended with a full battery.
    pub hours_full: usize,
}
