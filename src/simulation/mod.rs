//! # Plant Yield Simulation
//!
//! Physical models that turn an hourly weather year into AC energy for a
//! fixed-tilt PV plant.
//!
//! ## Components
//!
//! - **Solar position**: apparent zenith and azimuth (NREL SPA)
//! - **Transposition**: Perez 1990 sky diffuse, isotropic ground reflection
//! - **Incidence**: angle of incidence and physical IAM
//! - **Temperature**: Faiman, PVsyst and NOCT cell temperature models
//! - **DC / AC power**: PVWatts module and inverter models
//! - **Losses**: ordered system loss cascade
//! - **Pipeline**: stage-by-stage orchestration with an observer hook
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pv_yield_sim::config::PlantConfig;
//! use pv_yield_sim::simulation::Simulation;
//!
//! # fn main() -> anyhow::Result<()> {
//! # let weather = Vec::new();
//! let plant = PlantConfig::load()?.build()?;
//! let simulation = Simulation::new(plant.definition)?;
//! let result = simulation.run(&weather)?;
//! println!("{:.0} kWh", result.total_energy_kwh());
//! # Ok(())
//! # }
//! ```

pub mod ac_power;
pub mod dc_power;
pub mod incidence;
pub mod losses;
pub mod observer;
pub mod pipeline;
pub mod solar_position;
pub mod temperature;
pub mod transposition;

pub use ac_power::AcPowerModel;
pub use dc_power::DcPowerModel;
pub use incidence::{IncidenceAngleCorrector, IncidenceCorrection};
pub use losses::{CategoryLoss, LossBreakdown, LossCascade, LossImpact};
pub use observer::{NoopObserver, PipelineStage, StageObserver, StageReport, TracingObserver};
pub use pipeline::{HourlyRecord, PlantDefinition, Simulation, SimulationRun};
pub use solar_position::{SolarPosition, SolarPositionEngine};
pub use temperature::{CellTemperatureModel, ThermalModel};
pub use transposition::{HorizontalIrradiance, PoaIrradiance, TranspositionModel};
