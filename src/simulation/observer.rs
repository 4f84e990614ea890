//! # Stage Observer
//!
//! Hook invoked each time the pipeline completes a stage. The binary narrates
//! progress through [`TracingObserver`]; library callers can pass
//! [`NoopObserver`] or their own implementation.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::info;

/// Pipeline stages in execution order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineStage {
    Created,
    WeatherLoaded,
    GeometryResolved,
    TemperatureComputed,
    DcComputed,
    LossesApplied,
    AcComputed,
    Finalized,
}

/// Summary of a completed stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    /// Number of hourly samples carried by the stage
    pub samples: usize,
    /// Stage-specific aggregate, see [`StageReport::aggregate_label`]
    pub aggregate: Option<f64>,
}

impl StageReport {
    pub fn new(stage: PipelineStage, samples: usize, aggregate: Option<f64>) -> Self {
        Self {
            stage,
            samples,
            aggregate,
        }
    }

    /// What `aggregate` measures for this stage.
    pub fn aggregate_label(&self) -> Option<&'static str> {
        match self.stage {
            PipelineStage::Created => None,
            PipelineStage::WeatherLoaded => Some("annual_ghi_kwh_m2"),
            PipelineStage::GeometryResolved => Some("annual_effective_poa_kwh_m2"),
            PipelineStage::TemperatureComputed => Some("max_cell_temp_c"),
            PipelineStage::DcComputed => Some("dc_energy_kwh"),
            PipelineStage::LossesApplied => Some("net_dc_energy_kwh"),
            PipelineStage::AcComputed | PipelineStage::Finalized => Some("ac_energy_kwh"),
        }
    }
}

pub trait StageObserver {
    fn on_stage(&mut self, report: &StageReport);
}

/// Ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _report: &StageReport) {}
}

/// Logs stage completion through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_stage(&mut self, report: &StageReport) {
        let stage: &'static str = report.stage.into();
        match (report.aggregate_label(), report.aggregate) {
            (Some(label), Some(value)) => info!(
                stage,
                samples = report.samples,
                metric = label,
                value,
                "Stage complete"
            ),
            _ => info!(stage, samples = report.samples, "Stage complete"),
        }
    }
}
