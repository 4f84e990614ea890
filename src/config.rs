use std::path::PathBuf;

use anyhow::Result;
use chrono_tz::Tz;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;

use crate::domain::{InverterSpec, LossProfile, ModuleSpec, MountingCategory, OpticalConstants, SiteGeometry};
use crate::error::SimulationError;
use crate::simulation::{PlantDefinition, ThermalModel};

const DEFAULT_CONFIG_FILE: &str = "config/default.toml";
const ENV_PREFIX: &str = "PVSIM__";

#[derive(Debug, Clone, Deserialize)]
pub struct PlantConfig {
    pub location: LocationConfig,
    pub system: SystemConfig,
    pub module: ModuleConfig,
    pub inverter: InverterConfig,
    #[serde(default)]
    pub losses: Vec<LossConfig>,
    #[serde(default)]
    pub temperature: TemperatureConfig,
    pub simulation: SimulationConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    /// IANA time zone name, e.g. `Asia/Shanghai`
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    pub capacity_kw: f64,
    pub tilt: f64,
    pub azimuth: f64,
    pub albedo: f64,
    pub mounting: MountingCategory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    pub pmp_w: f64,
    pub gamma_pmp: f64,
    #[serde(default = "default_t_ref")]
    pub t_ref: f64,
    pub t_noct: Option<f64>,
    #[serde(default)]
    pub optics: OpticalConstants,
}

fn default_t_ref() -> f64 {
    25.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct InverterConfig {
    pub pdc0_kw: f64,
    pub pac0_kw: f64,
    pub eta_nom: f64,
    #[serde(default = "default_eta_ref")]
    pub eta_ref: f64,
    #[serde(default)]
    pub pdc_min_kw: f64,
    pub pdc_max_kw: f64,
    pub vdc_min_v: Option<f64>,
    pub vdc_max_v: Option<f64>,
}

fn default_eta_ref() -> f64 {
    0.9637
}

#[derive(Debug, Clone, Deserialize)]
pub struct LossConfig {
    pub category: String,
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermalModelKind {
    #[default]
    Faiman,
    Pvsyst,
    Noct,
}

/// Thermal model selection. Coefficients default from the mounting category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemperatureConfig {
    #[serde(default)]
    pub model: ThermalModelKind,
    pub u0: Option<f64>,
    pub u1: Option<f64>,
    pub u_c: Option<f64>,
    pub u_v: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub year: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// PVGIS TMY JSON document
    pub weather_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Hourly energy series (JSON)
    pub results_file: PathBuf,
    /// Summary report (JSON)
    pub report_file: Option<PathBuf>,
}

/// Validated configuration ready to run.
#[derive(Debug, Clone)]
pub struct Plant {
    pub definition: PlantDefinition,
    pub timezone: Tz,
    pub weather_file: PathBuf,
    pub results_file: PathBuf,
    pub report_file: Option<PathBuf>,
}

impl PlantConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(figment.extract()?)
    }

    /// Convert into validated domain types.
    pub fn build(&self) -> std::result::Result<Plant, SimulationError> {
        let site = SiteGeometry::new(
            self.location.latitude,
            self.location.longitude,
            self.location.altitude,
            self.system.tilt,
            self.system.azimuth,
            self.system.albedo,
            self.system.mounting,
        )?;

        let mut module = ModuleSpec::new(
            self.module.name.clone(),
            self.module.pmp_w,
            self.module.gamma_pmp,
            self.module.t_ref,
            self.module.optics,
        )?;
        if let Some(t_noct) = self.module.t_noct {
            module = module.with_noct(t_noct)?;
        }

        let mut inverter = InverterSpec::new(
            self.inverter.pdc0_kw,
            self.inverter.pac0_kw,
            self.inverter.eta_nom,
            self.inverter.eta_ref,
            self.inverter.pdc_min_kw,
            self.inverter.pdc_max_kw,
        )?;
        match (self.inverter.vdc_min_v, self.inverter.vdc_max_v) {
            (Some(min), Some(max)) => inverter = inverter.with_voltage_window(min, max)?,
            (None, None) => {}
            _ => {
                return Err(SimulationError::config(
                    "inverter.vdc_min_v and inverter.vdc_max_v must be given together",
                ))
            }
        }

        let losses = LossProfile::from_named(
            self.losses
                .iter()
                .map(|l| (l.category.as_str(), l.fraction)),
        )?;

        let timezone: Tz = self.location.timezone.parse().map_err(|e| {
            SimulationError::config(format!(
                "location.timezone '{}' is not a known time zone: {e}",
                self.location.timezone
            ))
        })?;

        Ok(Plant {
            definition: PlantDefinition {
                name: self.location.name.clone(),
                thermal: self.thermal_model(&module),
                site,
                module,
                inverter,
                losses,
                capacity_kw: self.system.capacity_kw,
                year: self.simulation.year,
            },
            timezone,
            weather_file: self.input.weather_file.clone(),
            results_file: self.output.results_file.clone(),
            report_file: self.output.report_file.clone(),
        })
    }

    fn thermal_model(&self, module: &ModuleSpec) -> ThermalModel {
        let mounting = self.system.mounting;
        let t = &self.temperature;
        match t.model {
            ThermalModelKind::Faiman => match ThermalModel::faiman_for(mounting) {
                ThermalModel::Faiman { u0, u1 } => ThermalModel::Faiman {
                    u0: t.u0.unwrap_or(u0),
                    u1: t.u1.unwrap_or(u1),
                },
                other => other,
            },
            ThermalModelKind::Pvsyst => match ThermalModel::pvsyst_for(mounting) {
                ThermalModel::Pvsyst { u_c, u_v } => ThermalModel::Pvsyst {
                    u_c: t.u_c.unwrap_or(u_c),
                    u_v: t.u_v.unwrap_or(u_v),
                },
                other => other,
            },
            ThermalModelKind::Noct => ThermalModel::noct_for(mounting, module.t_noct()),
        }
    }
}
