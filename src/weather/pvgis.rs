//! PVGIS typical meteorological year (TMY) JSON documents.
//!
//! A TMY stitches whole months from different years together, so timestamps
//! are moved onto the simulation year before being localized from UTC to the
//! plant time zone.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info};

use super::WeatherSource;
use crate::domain::WeatherSample;
use crate::error::{Result, SimulationError};

const PVGIS_TIME_FORMAT: &str = "%Y%m%d:%H%M";

#[derive(Debug, Deserialize)]
struct TmyDocument {
    outputs: TmyOutputs,
}

#[derive(Debug, Deserialize)]
struct TmyOutputs {
    tmy_hourly: Vec<TmyRecord>,
}

#[derive(Debug, Deserialize)]
struct TmyRecord {
    #[serde(rename = "time(UTC)")]
    time_utc: String,
    #[serde(rename = "G(h)", default)]
    ghi: Option<f64>,
    #[serde(rename = "Gb(n)", default)]
    dni: Option<f64>,
    #[serde(rename = "Gd(h)", default)]
    dhi: Option<f64>,
    #[serde(rename = "T2m", default)]
    temp_air: Option<f64>,
    #[serde(rename = "WS10m", default)]
    wind_speed: Option<f64>,
}

/// Parse a PVGIS TMY document into localized, time-ordered samples.
///
/// Missing values become 0.
pub fn parse_tmy(json: &str, timezone: Tz, year: i32) -> Result<Vec<WeatherSample>> {
    let doc: TmyDocument = serde_json::from_str(json)
        .map_err(|e| SimulationError::data(format!("malformed PVGIS TMY document: {e}")))?;

    let mut samples = doc
        .outputs
        .tmy_hourly
        .into_iter()
        .map(|record| {
            let utc = parse_time(&record.time_utc, year)?;
            let local = Utc.from_utc_datetime(&utc).with_timezone(&timezone).fixed_offset();
            Ok(WeatherSample::new(
                local,
                record.ghi.unwrap_or(0.0),
                record.dni.unwrap_or(0.0),
                record.dhi.unwrap_or(0.0),
                record.temp_air.unwrap_or(0.0),
                record.wind_speed.unwrap_or(0.0),
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    samples.sort_by_key(|s| s.timestamp);
    debug!(samples = samples.len(), %timezone, year, "Parsed PVGIS TMY records");
    Ok(samples)
}

fn parse_time(raw: &str, year: i32) -> Result<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(raw, PVGIS_TIME_FORMAT)
        .map_err(|e| SimulationError::data(format!("invalid PVGIS timestamp '{raw}': {e}")))?;
    parsed.with_year(year).ok_or_else(|| {
        SimulationError::data(format!("PVGIS timestamp '{raw}' does not exist in year {year}"))
    })
}

/// A TMY document stored on disk.
#[derive(Debug, Clone)]
pub struct PvgisTmyFile {
    pub path: PathBuf,
    pub timezone: Tz,
    pub year: i32,
}

impl PvgisTmyFile {
    pub fn new(path: impl Into<PathBuf>, timezone: Tz, year: i32) -> Self {
        Self {
            path: path.into(),
            timezone,
            year,
        }
    }
}

impl WeatherSource for PvgisTmyFile {
    fn load(&self) -> anyhow::Result<Vec<WeatherSample>> {
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read weather file {}", self.path.display()))?;
        let samples = parse_tmy(&json, self.timezone, self.year)
            .with_context(|| format!("Failed to parse weather file {}", self.path.display()))?;
        info!(path = %self.path.display(), samples = samples.len(), "Loaded PVGIS TMY weather");
        Ok(samples)
    }
}
