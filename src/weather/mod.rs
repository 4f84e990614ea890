//! Weather input: the hourly series contract and file-based sources.

pub mod pvgis;
pub mod series;

pub use pvgis::{parse_tmy, PvgisTmyFile};
pub use series::{expected_hours, is_leap_year, validate_series, FieldRange, WeatherValidation};

use crate::domain::WeatherSample;

/// Produces the hourly weather series for a simulation run.
pub trait WeatherSource: Send + Sync {
    fn load(&self) -> anyhow::Result<Vec<WeatherSample>>;
}
