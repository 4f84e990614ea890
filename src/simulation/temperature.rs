//! # Cell Temperature
//!
//! Module operating temperature from plane-of-array irradiance, ambient
//! temperature and wind speed.
//!
//! Three steady-state models are supported:
//! - **Faiman**: `T = Ta + E / (u0 + u1·ws)`
//! - **PVsyst**: `T = Ta + α·E·(1 − η) / (uc + uv·ws)`
//! - **NOCT**: `T = Ta + (NOCT − 20) / 800 · E`
//!
//! Every model shares the same post-processing: night hours take the ambient
//! temperature, the cell is never cooler than ambient, and the result is kept
//! within the module operating range.

use serde::{Deserialize, Serialize};

use crate::domain::MountingCategory;
use crate::error::{ensure_positive, ensure_range, Result};

/// Module operating range (°C)
pub const MIN_CELL_TEMP_C: f64 = -40.0;
pub const MAX_CELL_TEMP_C: f64 = 85.0;

/// Irradiance at which the NOCT is specified (W/m²)
const NOCT_IRRADIANCE: f64 = 800.0;
/// Ambient temperature at which the NOCT is specified (°C)
const NOCT_AMBIENT: f64 = 20.0;

const PVSYST_ABSORPTANCE: f64 = 0.9;
const PVSYST_MODULE_EFFICIENCY: f64 = 0.1;

/// Steady-state thermal model with its coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ThermalModel {
    Faiman {
        /// Constant heat loss factor (W/m²K)
        u0: f64,
        /// Wind-dependent heat loss factor (W/m²K per m/s)
        u1: f64,
    },
    Pvsyst {
        u_c: f64,
        u_v: f64,
    },
    Noct {
        /// Nominal operating cell temperature (°C)
        t_noct: f64,
    },
}

impl ThermalModel {
    /// Faiman coefficients for a mounting category.
    pub fn faiman_for(mounting: MountingCategory) -> Self {
        let (u0, u1) = match mounting {
            MountingCategory::RoofMounted => (29.0, 1.0),
            MountingCategory::OpenRack => (25.0, 6.84),
            MountingCategory::InsulatedBack => (26.0, 1.2),
        };
        ThermalModel::Faiman { u0, u1 }
    }

    /// PVsyst coefficients for a mounting category.
    pub fn pvsyst_for(mounting: MountingCategory) -> Self {
        let (u_c, u_v) = match mounting {
            MountingCategory::RoofMounted => (29.0, 0.0),
            MountingCategory::OpenRack | MountingCategory::InsulatedBack => (25.0, 1.2),
        };
        ThermalModel::Pvsyst { u_c, u_v }
    }

    /// NOCT model, using the module's NOCT when known.
    pub fn noct_for(mounting: MountingCategory, module_noct: Option<f64>) -> Self {
        let t_noct = module_noct.unwrap_or(match mounting {
            MountingCategory::RoofMounted => 50.0,
            MountingCategory::OpenRack | MountingCategory::InsulatedBack => 45.0,
        });
        ThermalModel::Noct { t_noct }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ThermalModel::Faiman { u0, u1 } => {
                ensure_positive("temperature.u0", u0)?;
                ensure_range("temperature.u1", u1, 0.0, 100.0)
            }
            ThermalModel::Pvsyst { u_c, u_v } => {
                ensure_positive("temperature.u_c", u_c)?;
                ensure_range("temperature.u_v", u_v, 0.0, 100.0)
            }
            ThermalModel::Noct { t_noct } => ensure_range("temperature.t_noct", t_noct, 20.0, 85.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThermalModel::Faiman { .. } => "faiman",
            ThermalModel::Pvsyst { .. } => "pvsyst",
            ThermalModel::Noct { .. } => "noct",
        }
    }

    /// Raw model output before post-processing.
    fn raw(&self, poa_global: f64, temp_air: f64, wind_speed: f64) -> f64 {
        let wind = wind_speed.max(0.0);
        match *self {
            ThermalModel::Faiman { u0, u1 } => temp_air + poa_global / (u0 + u1 * wind),
            ThermalModel::Pvsyst { u_c, u_v } => {
                temp_air
                    + PVSYST_ABSORPTANCE * poa_global * (1.0 - PVSYST_MODULE_EFFICIENCY)
                        / (u_c + u_v * wind)
            }
            ThermalModel::Noct { t_noct } => {
                temp_air + (t_noct - NOCT_AMBIENT) / NOCT_IRRADIANCE * poa_global
            }
        }
    }
}

/// Night rule, ambient floor and operating-range clamp, in that order.
pub fn clip_cell_temperature(cell_temp: f64, poa_global: f64, temp_air: f64) -> f64 {
    let t = if poa_global <= 0.0 { temp_air } else { cell_temp };
    t.max(temp_air).clamp(MIN_CELL_TEMP_C, MAX_CELL_TEMP_C)
}

/// Cell temperature model with post-processing applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTemperatureModel {
    model: ThermalModel,
}

impl CellTemperatureModel {
    pub fn new(model: ThermalModel) -> Result<Self> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn model(&self) -> &ThermalModel {
        &self.model
    }

    pub fn cell_temperature(&self, poa_global: f64, temp_air: f64, wind_speed: f64) -> f64 {
        let raw = self.model.raw(poa_global, temp_air, wind_speed);
        clip_cell_temperature(raw, poa_global, temp_air)
    }
}

/// Temperature derate factor `1 + γ(T − Tref)`, bounded to [0.5, 1.1].
pub fn temperature_loss_factor(cell_temp: f64, t_ref: f64, gamma_pmp: f64) -> f64 {
    (1.0 + gamma_pmp * (cell_temp - t_ref)).clamp(0.5, 1.1)
}
