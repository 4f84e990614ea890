use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One hour of weather input, localized to the plant's civil time zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<FixedOffset>,
    /// Global horizontal irradiance (W/m²)
    pub ghi: f64,
    /// Direct normal irradiance (W/m²)
    pub dni: f64,
    /// Diffuse horizontal irradiance (W/m²)
    pub dhi: f64,
    /// Ambient air temperature (°C)
    pub temp_air: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
}

impl WeatherSample {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        ghi: f64,
        dni: f64,
        dhi: f64,
        temp_air: f64,
        wind_speed: f64,
    ) -> Self {
        Self {
            timestamp,
            ghi,
            dni,
            dhi,
            temp_air,
            wind_speed,
        }
    }

    /// A night-time sample with no irradiance.
    pub fn dark(timestamp: DateTime<FixedOffset>, temp_air: f64, wind_speed: f64) -> Self {
        Self::new(timestamp, 0.0, 0.0, 0.0, temp_air, wind_speed)
    }
}

/// Energy delivered during one simulated hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub energy_kwh: f64,
}

/// Hourly AC energy series, positionally aligned with the weather input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationResult {
    points: Vec<EnergyPoint>,
}

impl SimulationResult {
    pub(crate) fn new(points: Vec<EnergyPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[EnergyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnergyPoint> {
        self.points.iter()
    }

    /// Sum of hourly energy over the whole series (kWh)
    pub fn total_energy_kwh(&self) -> f64 {
        self.points.iter().map(|p| p.energy_kwh).sum()
    }

    pub fn into_points(self) -> Vec<EnergyPoint> {
        self.points
    }
}
