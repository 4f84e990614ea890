//! # Simulation Pipeline
//!
//! Runs the physical models over a validated weather year:
//!
//! Created → WeatherLoaded → GeometryResolved → TemperatureComputed →
//! DcComputed → LossesApplied → AcComputed → Finalized
//!
//! Each stage is a distinct type consuming the previous stage by value, so a
//! stage can only be reached through all of its predecessors. Per-hour series
//! are aligned by position. Any failure aborts the run without a partial result.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ac_power::AcPowerModel;
use super::dc_power::DcPowerModel;
use super::incidence::{IncidenceAngleCorrector, IncidenceCorrection};
use super::losses::{LossBreakdown, LossCascade};
use super::observer::{NoopObserver, PipelineStage, StageObserver, StageReport};
use super::solar_position::{SolarPosition, SolarPositionEngine};
use super::temperature::{CellTemperatureModel, ThermalModel};
use super::transposition::{HorizontalIrradiance, PoaIrradiance, TranspositionModel};
use crate::domain::{
    EnergyPoint, InverterSpec, LossProfile, ModuleSpec, PlantLayout, SimulationResult, SiteGeometry,
    WeatherSample,
};
use crate::error::{ensure_positive, Result, SimulationError};
use crate::weather::validate_series;

/// Length of one simulation step (h)
const STEP_HOURS: f64 = 1.0;

/// Everything that defines a plant and a simulation year.
#[derive(Debug, Clone)]
pub struct PlantDefinition {
    pub name: String,
    pub site: SiteGeometry,
    pub module: ModuleSpec,
    pub inverter: InverterSpec,
    pub losses: LossProfile,
    pub thermal: ThermalModel,
    /// Nameplate DC capacity (kW)
    pub capacity_kw: f64,
    pub year: i32,
}

/// Per-hour intermediate values of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
    pub temp_air: f64,
    pub wind_speed: f64,
    pub solar_zenith: f64,
    pub solar_azimuth: f64,
    #[serde(flatten)]
    pub poa: PoaIrradiance,
    pub aoi: f64,
    pub iam: f64,
    pub effective_poa: f64,
    pub cell_temp: f64,
    /// DC power before system losses (kW)
    pub dc_kw: f64,
    /// DC power after system losses (kW)
    pub dc_net_kw: f64,
    pub ac_kw: f64,
    pub energy_kwh: f64,
}

/// Result of a run together with its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub result: SimulationResult,
    pub hourly: Vec<HourlyRecord>,
    pub loss_breakdown: LossBreakdown,
}

#[derive(Debug, Clone, Copy)]
struct HourGeometry {
    sun: SolarPosition,
    poa: PoaIrradiance,
    incidence: IncidenceCorrection,
}

struct WeatherLoaded<'w> {
    weather: &'w [WeatherSample],
}

struct GeometryResolved<'w> {
    weather: &'w [WeatherSample],
    geometry: Vec<HourGeometry>,
}

struct TemperatureComputed<'w> {
    prev: GeometryResolved<'w>,
    cell_temp: Vec<f64>,
}

struct DcComputed<'w> {
    prev: TemperatureComputed<'w>,
    dc_kw: Vec<f64>,
}

struct LossesApplied<'w> {
    prev: DcComputed<'w>,
    dc_net_kw: Vec<f64>,
}

struct AcComputed<'w> {
    prev: LossesApplied<'w>,
    ac_kw: Vec<f64>,
}

/// A configured plant ready to simulate weather years.
#[derive(Debug, Clone)]
pub struct Simulation {
    definition: PlantDefinition,
    layout: PlantLayout,
    sun: SolarPositionEngine,
    transposition: TranspositionModel,
    incidence: IncidenceAngleCorrector,
    thermal: CellTemperatureModel,
    dc: DcPowerModel,
    cascade: LossCascade,
    ac: AcPowerModel,
}

impl Simulation {
    pub fn new(definition: PlantDefinition) -> Result<Self> {
        ensure_positive("system.capacity_kw", definition.capacity_kw)?;
        let layout = PlantLayout::new(definition.capacity_kw, &definition.module)?;
        let thermal = CellTemperatureModel::new(definition.thermal)?;

        let site = &definition.site;
        Ok(Self {
            layout,
            sun: SolarPositionEngine::new(site),
            transposition: TranspositionModel::new(site),
            incidence: IncidenceAngleCorrector::new(
                site.tilt(),
                site.azimuth(),
                *definition.module.optics(),
            ),
            thermal,
            dc: DcPowerModel::new(definition.capacity_kw, &definition.module),
            cascade: LossCascade::new(definition.losses.clone()),
            ac: AcPowerModel::new(definition.inverter),
            definition,
        })
    }

    pub fn definition(&self) -> &PlantDefinition {
        &self.definition
    }

    pub fn layout(&self) -> &PlantLayout {
        &self.layout
    }

    pub fn cascade(&self) -> &LossCascade {
        &self.cascade
    }

    pub fn ac_model(&self) -> &AcPowerModel {
        &self.ac
    }

    /// Simulate a weather year and return the hourly AC energy.
    pub fn run(&self, weather: &[WeatherSample]) -> Result<SimulationResult> {
        Ok(self.run_detailed(weather, &mut NoopObserver)?.result)
    }

    /// Simulate a weather year, keeping every intermediate series.
    pub fn run_detailed(
        &self,
        weather: &[WeatherSample],
        observer: &mut dyn StageObserver,
    ) -> Result<SimulationRun> {
        observer.on_stage(&StageReport::new(PipelineStage::Created, 0, None));

        let loaded = self.load_weather(weather)?;
        observer.on_stage(&StageReport::new(
            PipelineStage::WeatherLoaded,
            loaded.weather.len(),
            Some(loaded.weather.iter().map(|w| w.ghi).sum::<f64>() / 1000.0),
        ));

        let geometry = self.resolve_geometry(loaded)?;
        observer.on_stage(&StageReport::new(
            PipelineStage::GeometryResolved,
            geometry.geometry.len(),
            Some(
                geometry
                    .geometry
                    .iter()
                    .map(|g| g.incidence.effective_poa)
                    .sum::<f64>()
                    / 1000.0,
            ),
        ));

        let temperature = self.compute_temperature(geometry);
        observer.on_stage(&StageReport::new(
            PipelineStage::TemperatureComputed,
            temperature.cell_temp.len(),
            temperature.cell_temp.iter().copied().reduce(f64::max),
        ));

        let dc = self.compute_dc(temperature);
        observer.on_stage(&StageReport::new(
            PipelineStage::DcComputed,
            dc.dc_kw.len(),
            Some(dc.dc_kw.iter().sum::<f64>() * STEP_HOURS),
        ));

        let net = self.apply_losses(dc);
        observer.on_stage(&StageReport::new(
            PipelineStage::LossesApplied,
            net.dc_net_kw.len(),
            Some(net.dc_net_kw.iter().sum::<f64>() * STEP_HOURS),
        ));

        let ac = self.compute_ac(net);
        observer.on_stage(&StageReport::new(
            PipelineStage::AcComputed,
            ac.ac_kw.len(),
            Some(ac.ac_kw.iter().sum::<f64>() * STEP_HOURS),
        ));

        let run = self.finalize(ac)?;
        observer.on_stage(&StageReport::new(
            PipelineStage::Finalized,
            run.result.len(),
            Some(run.result.total_energy_kwh()),
        ));
        Ok(run)
    }

    fn load_weather<'w>(&self, weather: &'w [WeatherSample]) -> Result<WeatherLoaded<'w>> {
        validate_series(weather, self.definition.year)?;
        Ok(WeatherLoaded { weather })
    }

    fn resolve_geometry<'w>(&self, stage: WeatherLoaded<'w>) -> Result<GeometryResolved<'w>> {
        let geometry = stage
            .weather
            .iter()
            .map(|w| {
                let sun = self.sun.position(w.timestamp, w.temp_air)?;
                let poa = self.transposition.poa(
                    w.timestamp,
                    HorizontalIrradiance {
                        ghi: w.ghi,
                        dni: w.dni,
                        dhi: w.dhi,
                    },
                    &sun,
                );
                let incidence = self.incidence.correct(sun.apparent_zenith, sun.azimuth, poa.poa_global);
                Ok(HourGeometry {
                    sun,
                    poa,
                    incidence,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GeometryResolved {
            weather: stage.weather,
            geometry,
        })
    }

    fn compute_temperature<'w>(&self, stage: GeometryResolved<'w>) -> TemperatureComputed<'w> {
        let cell_temp = stage
            .weather
            .iter()
            .zip(&stage.geometry)
            .map(|(w, g)| {
                self.thermal
                    .cell_temperature(g.poa.poa_global, w.temp_air, w.wind_speed)
            })
            .collect();
        TemperatureComputed {
            prev: stage,
            cell_temp,
        }
    }

    fn compute_dc<'w>(&self, stage: TemperatureComputed<'w>) -> DcComputed<'w> {
        let dc_kw = stage
            .prev
            .geometry
            .iter()
            .zip(&stage.cell_temp)
            .map(|(g, &t)| self.dc.dc_power(g.incidence.effective_poa, t))
            .collect();
        DcComputed { prev: stage, dc_kw }
    }

    fn apply_losses<'w>(&self, stage: DcComputed<'w>) -> LossesApplied<'w> {
        let dc_net_kw = stage.dc_kw.iter().map(|&p| self.cascade.apply(p)).collect();
        LossesApplied {
            prev: stage,
            dc_net_kw,
        }
    }

    fn compute_ac<'w>(&self, stage: LossesApplied<'w>) -> AcComputed<'w> {
        let ac_kw: Vec<f64> = stage.dc_net_kw.iter().map(|&p| self.ac.ac_power(p)).collect();

        let below_startup = stage
            .dc_net_kw
            .iter()
            .filter(|&&p| self.ac.below_startup(p))
            .count();
        if below_startup > 0 {
            debug!(
                hours = below_startup,
                pdc_min_kw = self.ac.inverter().pdc_min_kw(),
                "Hours with DC input below inverter startup power"
            );
        }

        AcComputed { prev: stage, ac_kw }
    }

    fn finalize(&self, stage: AcComputed<'_>) -> Result<SimulationRun> {
        let AcComputed { prev: net, ac_kw } = stage;
        let LossesApplied { prev: dc, dc_net_kw } = net;
        let DcComputed { prev: temps, dc_kw } = dc;
        let TemperatureComputed { prev: geo, cell_temp } = temps;
        let GeometryResolved { weather, geometry } = geo;

        let loss_breakdown = self.cascade.breakdown(&dc_kw);

        let mut points = Vec::with_capacity(weather.len());
        let mut hourly = Vec::with_capacity(weather.len());
        for (i, w) in weather.iter().enumerate() {
            let ac = ac_kw[i];
            if !ac.is_finite() {
                return Err(SimulationError::numeric(format!(
                    "non-finite AC power at {}",
                    w.timestamp
                )));
            }
            let energy_kwh = ac * STEP_HOURS;
            let g = &geometry[i];

            points.push(EnergyPoint {
                timestamp: w.timestamp,
                energy_kwh,
            });
            hourly.push(HourlyRecord {
                timestamp: w.timestamp,
                ghi: w.ghi,
                dni: w.dni,
                dhi: w.dhi,
                temp_air: w.temp_air,
                wind_speed: w.wind_speed,
                solar_zenith: g.sun.apparent_zenith,
                solar_azimuth: g.sun.azimuth,
                poa: g.poa,
                aoi: g.incidence.aoi,
                iam: g.incidence.iam,
                effective_poa: g.incidence.effective_poa,
                cell_temp: cell_temp[i],
                dc_kw: dc_kw[i],
                dc_net_kw: dc_net_kw[i],
                ac_kw: ac,
                energy_kwh,
            });
        }

        let clipped = ac_kw
            .iter()
            .filter(|&&p| p >= self.ac.inverter().pac0_kw())
            .count();
        if clipped > 0 {
            warn!(hours = clipped, "AC output clipped at inverter rating");
        }

        Ok(SimulationRun {
            result: SimulationResult::new(points),
            hourly,
            loss_breakdown,
        })
    }
}
