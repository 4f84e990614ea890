//! Hourly weather series contract checks.
//!
//! [`validate_series`] enforces the structural contract the simulation relies
//! on and fails with a data error. [`WeatherValidation`] is a softer,
//! non-fatal quality report for display.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::WeatherSample;
use crate::error::{Result, SimulationError};

const STEP_SECONDS: i64 = 3600;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of hourly samples in a simulated year.
pub fn expected_hours(year: i32) -> usize {
    if is_leap_year(year) {
        8784
    } else {
        8760
    }
}

/// Check start date, cadence, ordering, length and value ranges of a weather series.
pub fn validate_series(samples: &[WeatherSample], year: i32) -> Result<()> {
    let expected = expected_hours(year);
    if samples.len() != expected {
        return Err(SimulationError::data(format!(
            "weather series has {} samples, expected {expected} for year {year}",
            samples.len()
        )));
    }

    // Local or UTC calendar, so UTC-anchored files shifted east still qualify
    let first = samples[0].timestamp;
    let new_year = NaiveDate::from_ymd_opt(year, 1, 1);
    if Some(first.date_naive()) != new_year && Some(first.with_timezone(&Utc).date_naive()) != new_year {
        return Err(SimulationError::data(format!(
            "weather series starts at {first}, expected 1 January {year}"
        )));
    }

    for (i, s) in samples.iter().enumerate() {
        for (field, value) in [("ghi", s.ghi), ("dni", s.dni), ("dhi", s.dhi)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::data(format!(
                    "sample {i} ({}): {field} must be finite and non-negative, got {value}",
                    s.timestamp
                )));
            }
        }
        for (field, value) in [("temp_air", s.temp_air), ("wind_speed", s.wind_speed)] {
            if !value.is_finite() {
                return Err(SimulationError::data(format!(
                    "sample {i} ({}): {field} is not finite",
                    s.timestamp
                )));
            }
        }
    }

    for (i, pair) in samples.windows(2).enumerate() {
        let step = (pair[1].timestamp - pair[0].timestamp).num_seconds();
        if step != STEP_SECONDS {
            let problem = if step <= 0 {
                "not strictly increasing"
            } else {
                "not hourly"
            };
            return Err(SimulationError::data(format!(
                "timestamps {} -> {} (samples {i}, {}) are {problem}",
                pair[0].timestamp,
                pair[1].timestamp,
                i + 1
            )));
        }
    }

    Ok(())
}

/// Observed range of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }
}

/// Data quality report for a weather series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherValidation {
    pub total_hours: usize,
    pub expected_hours: usize,
    pub negative_ghi: usize,
    pub negative_dni: usize,
    pub negative_dhi: usize,
    pub ghi: Option<FieldRange>,
    pub dni: Option<FieldRange>,
    pub dhi: Option<FieldRange>,
    pub temp_air: Option<FieldRange>,
    pub wind_speed: Option<FieldRange>,
    pub is_complete: bool,
    pub is_physically_valid: bool,
}

impl WeatherValidation {
    pub fn inspect(samples: &[WeatherSample], year: i32) -> Self {
        let negative = |f: fn(&WeatherSample) -> f64| samples.iter().filter(|s| f(s) < 0.0).count();
        let negative_ghi = negative(|s| s.ghi);
        let negative_dni = negative(|s| s.dni);
        let negative_dhi = negative(|s| s.dhi);
        let expected = expected_hours(year);

        Self {
            total_hours: samples.len(),
            expected_hours: expected,
            negative_ghi,
            negative_dni,
            negative_dhi,
            ghi: FieldRange::of(samples.iter().map(|s| s.ghi)),
            dni: FieldRange::of(samples.iter().map(|s| s.dni)),
            dhi: FieldRange::of(samples.iter().map(|s| s.dhi)),
            temp_air: FieldRange::of(samples.iter().map(|s| s.temp_air)),
            wind_speed: FieldRange::of(samples.iter().map(|s| s.wind_speed)),
            is_complete: samples.len() == expected,
            is_physically_valid: negative_ghi == 0 && negative_dni == 0 && negative_dhi == 0,
        }
    }
}
