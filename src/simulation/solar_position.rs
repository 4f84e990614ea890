//! # Solar Position
//!
//! Apparent solar zenith and azimuth per timestamp using NREL's Solar Position
//! Algorithm (Reda & Andreas, 2003), including atmospheric refraction.

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use solar_positioning::{spa, time::DeltaT, RefractionCorrection};

use crate::domain::SiteGeometry;
use crate::error::{Result, SimulationError};

/// Years covered by the SPA uncertainty bounds.
const SPA_MIN_YEAR: i32 = -2000;
const SPA_MAX_YEAR: i32 = 6000;

/// Apparent sun position for one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    /// Refraction-corrected zenith angle (degrees, 0-180; > 90 = below horizon)
    pub apparent_zenith: f64,
    /// Azimuth (degrees clockwise from north, 0-360)
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn elevation(&self) -> f64 {
        90.0 - self.apparent_zenith
    }

    pub fn is_above_horizon(&self) -> bool {
        self.apparent_zenith < 90.0
    }
}

/// Computes solar positions for a fixed site.
#[derive(Debug, Clone, Copy)]
pub struct SolarPositionEngine {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    pressure_mbar: f64,
}

impl SolarPositionEngine {
    pub fn new(site: &SiteGeometry) -> Self {
        Self {
            latitude: site.latitude(),
            longitude: site.longitude(),
            altitude: site.altitude(),
            pressure_mbar: site.pressure_pa() / 100.0,
        }
    }

    /// Sun position at `timestamp`, with refraction evaluated at `temp_air` (°C).
    pub fn position(&self, timestamp: DateTime<FixedOffset>, temp_air: f64) -> Result<SolarPosition> {
        let year = timestamp.year();
        if !(SPA_MIN_YEAR..=SPA_MAX_YEAR).contains(&year) {
            return Err(SimulationError::data(format!(
                "timestamp {timestamp} is outside the solar position algorithm's valid range \
                 ({SPA_MIN_YEAR}..={SPA_MAX_YEAR})"
            )));
        }

        let delta_t = DeltaT::estimate_from_date_like(timestamp).map_err(|e| {
            SimulationError::numeric(format!("delta T estimate failed for {timestamp}: {e}"))
        })?;

        let refraction = RefractionCorrection::new(self.pressure_mbar, temp_air).map_err(|e| {
            SimulationError::numeric(format!(
                "refraction parameters rejected (pressure {:.1} mbar, temperature {temp_air} °C): {e}",
                self.pressure_mbar
            ))
        })?;

        let position = spa::solar_position(
            timestamp,
            self.latitude,
            self.longitude,
            self.altitude,
            delta_t,
            Some(refraction),
        )
        .map_err(|e| SimulationError::numeric(format!("SPA failed for {timestamp}: {e}")))?;

        Ok(SolarPosition {
            apparent_zenith: position.zenith_angle(),
            azimuth: position.azimuth(),
        })
    }
}
