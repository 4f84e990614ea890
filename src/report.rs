//! # Yield Report
//!
//! Annual and monthly summaries derived from a completed simulation run.

use chrono::Datelike;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::{PlantLayout, WeatherSample};
use crate::simulation::temperature::temperature_loss_factor;
use crate::simulation::{HourlyRecord, LossBreakdown, LossImpact, Simulation, SimulationRun};
use crate::weather::WeatherValidation;

/// POA threshold separating daytime hours in temperature statistics (W/m²)
const DAYTIME_POA: f64 = 10.0;
const HOURS_PER_DAY: f64 = 24.0;

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Irradiance totals over the simulated period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrradianceSummary {
    pub annual_ghi_kwh_m2: f64,
    pub annual_poa_kwh_m2: f64,
    pub annual_effective_poa_kwh_m2: f64,
    pub daily_avg_ghi_kwh_m2: f64,
    pub daily_avg_poa_kwh_m2: f64,
    /// Transposition gain of the array plane over horizontal
    pub poa_to_ghi_ratio: f64,
    /// Share of POA irradiance lost to reflection (%)
    pub iam_loss_percent: f64,
}

impl IrradianceSummary {
    pub fn from_hourly(hourly: &[HourlyRecord]) -> Self {
        let ghi = hourly.iter().map(|r| r.ghi).sum::<f64>() / 1000.0;
        let poa = hourly.iter().map(|r| r.poa.poa_global).sum::<f64>() / 1000.0;
        let effective = hourly.iter().map(|r| r.effective_poa).sum::<f64>() / 1000.0;
        let days = hourly.len() as f64 / HOURS_PER_DAY;

        Self {
            annual_ghi_kwh_m2: ghi,
            annual_poa_kwh_m2: poa,
            annual_effective_poa_kwh_m2: effective,
            daily_avg_ghi_kwh_m2: ratio(ghi, days),
            daily_avg_poa_kwh_m2: ratio(poa, days),
            poa_to_ghi_ratio: ratio(poa, ghi),
            iam_loss_percent: ratio(poa - effective, poa) * 100.0,
        }
    }
}

/// Cell and ambient temperature statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStatistics {
    pub mean_temp_air: f64,
    pub mean_cell_temp: f64,
    pub daytime_mean_temp_air: f64,
    pub daytime_mean_cell_temp: f64,
    pub max_cell_temp: f64,
    pub min_cell_temp: f64,
    /// Mean cell temperature rise over ambient during daytime (K)
    pub daytime_temperature_rise: f64,
    pub hours_above_25c: usize,
    pub hours_above_45c: usize,
    pub hours_above_65c: usize,
    /// Power derate at the mean daytime cell temperature, 1 = no derate
    pub temperature_factor: f64,
}

impl TemperatureStatistics {
    pub fn from_hourly(hourly: &[HourlyRecord], t_ref: f64, gamma_pmp: f64) -> Self {
        let daytime = || hourly.iter().filter(|r| r.poa.poa_global > DAYTIME_POA);
        let above = |limit: f64| hourly.iter().filter(|r| r.cell_temp > limit).count();

        let daytime_mean_temp_air = mean(daytime().map(|r| r.temp_air));
        let daytime_mean_cell_temp = mean(daytime().map(|r| r.cell_temp));

        Self {
            mean_temp_air: mean(hourly.iter().map(|r| r.temp_air)),
            mean_cell_temp: mean(hourly.iter().map(|r| r.cell_temp)),
            daytime_mean_temp_air,
            daytime_mean_cell_temp,
            max_cell_temp: hourly.iter().map(|r| r.cell_temp).reduce(f64::max).unwrap_or(0.0),
            min_cell_temp: hourly.iter().map(|r| r.cell_temp).reduce(f64::min).unwrap_or(0.0),
            daytime_temperature_rise: mean(daytime().map(|r| r.cell_temp - r.temp_air)),
            hours_above_25c: above(25.0),
            hours_above_45c: above(45.0),
            hours_above_65c: above(65.0),
            temperature_factor: temperature_loss_factor(daytime_mean_cell_temp, t_ref, gamma_pmp),
        }
    }
}

/// Energy produced in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: u32,
    pub energy_kwh: f64,
    pub peak_ac_kw: f64,
    /// Hours with non-zero AC output
    pub producing_hours: usize,
}

/// Group hourly records by local calendar month, January first.
pub fn monthly_summary(hourly: &[HourlyRecord]) -> Vec<MonthlySummary> {
    hourly
        .iter()
        .into_group_map_by(|r| r.timestamp.month())
        .into_iter()
        .sorted_by_key(|(month, _)| *month)
        .map(|(month, records)| MonthlySummary {
            month,
            energy_kwh: records.iter().map(|r| r.energy_kwh).sum(),
            peak_ac_kw: records.iter().map(|r| r.ac_kw).fold(0.0, f64::max),
            producing_hours: records.iter().filter(|r| r.ac_kw > 0.0).count(),
        })
        .collect()
}

/// Headline yield figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualYield {
    pub energy_kwh: f64,
    pub dc_energy_kwh: f64,
    /// kWh per kWp of nameplate capacity
    pub specific_yield_kwh_kwp: f64,
    /// Fraction of the energy the plant would make at nameplate all year
    pub capacity_factor: f64,
    /// AC energy over the energy implied by POA irradiation at STC efficiency
    pub performance_ratio: f64,
}

impl AnnualYield {
    pub fn new(run: &SimulationRun, capacity_kw: f64, annual_poa_kwh_m2: f64) -> Self {
        let energy_kwh = run.result.total_energy_kwh();
        let hours = run.result.len() as f64;
        Self {
            energy_kwh,
            dc_energy_kwh: run.hourly.iter().map(|r| r.dc_kw).sum(),
            specific_yield_kwh_kwp: ratio(energy_kwh, capacity_kw),
            capacity_factor: ratio(energy_kwh, capacity_kw * hours),
            // Reference yield: POA kWh/m² divided by the 1 kW/m² STC irradiance
            performance_ratio: ratio(energy_kwh, capacity_kw * annual_poa_kwh_m2),
        }
    }
}

/// Complete report for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldReport {
    pub plant: String,
    pub year: i32,
    pub layout: PlantLayout,
    pub annual: AnnualYield,
    pub irradiance: IrradianceSummary,
    pub temperature: TemperatureStatistics,
    pub monthly: Vec<MonthlySummary>,
    pub losses: LossBreakdown,
    pub loss_impact: LossImpact,
    /// Hours with DC input between zero and the inverter startup power
    pub hours_below_pdc_min: usize,
    pub weather: WeatherValidation,
}

impl YieldReport {
    pub fn build(simulation: &Simulation, weather: &[WeatherSample], run: &SimulationRun) -> Self {
        let definition = simulation.definition();
        let irradiance = IrradianceSummary::from_hourly(&run.hourly);
        let annual = AnnualYield::new(run, definition.capacity_kw, irradiance.annual_poa_kwh_m2);

        Self {
            plant: definition.name.clone(),
            year: definition.year,
            layout: *simulation.layout(),
            annual,
            irradiance,
            temperature: TemperatureStatistics::from_hourly(
                &run.hourly,
                definition.module.t_ref(),
                definition.module.gamma_pmp(),
            ),
            monthly: monthly_summary(&run.hourly),
            losses: run.loss_breakdown.clone(),
            loss_impact: simulation.cascade().annual_impact(annual.dc_energy_kwh),
            hours_below_pdc_min: run
                .hourly
                .iter()
                .filter(|r| simulation.ac_model().below_startup(r.dc_net_kw))
                .count(),
            weather: WeatherValidation::inspect(weather, definition.year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::PoaIrradiance;
    use chrono::{DateTime, Duration, FixedOffset, TimeZone};

    fn ts(h: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2021, 1, 31, 22, 0, 0)
            .unwrap()
            + Duration::hours(h)
    }

    fn record(h: i64, ghi: f64, poa: f64, effective: f64, cell: f64, ac: f64) -> HourlyRecord {
        HourlyRecord {
            timestamp: ts(h),
            ghi,
            dni: 0.0,
            dhi: ghi,
            temp_air: 20.0,
            wind_speed: 1.0,
            solar_zenith: 40.0,
            solar_azimuth: 180.0,
            poa: PoaIrradiance {
                poa_direct: 0.0,
                poa_sky_diffuse: poa,
                poa_ground_diffuse: 0.0,
                poa_global: poa,
            },
            aoi: 40.0,
            iam: if poa > 0.0 { effective / poa } else { 0.0 },
            effective_poa: effective,
            cell_temp: cell,
            dc_kw: ac * 1.05,
            dc_net_kw: ac * 1.02,
            ac_kw: ac,
            energy_kwh: ac,
        }
    }

    fn sample() -> Vec<HourlyRecord> {
        vec![
            record(0, 0.0, 0.0, 0.0, 20.0, 0.0),
            record(1, 400.0, 500.0, 480.0, 50.0, 300.0),
            record(2, 600.0, 700.0, 672.0, 70.0, 420.0),
            record(3, 5.0, 5.0, 4.0, 20.0, 0.0),
        ]
    }

    #[test]
    fn test_irradiance_summary() {
        let s = IrradianceSummary::from_hourly(&sample());
        assert!((s.annual_ghi_kwh_m2 - 1.005).abs() < 1e-12);
        assert!((s.annual_poa_kwh_m2 - 1.205).abs() < 1e-12);
        assert!((s.daily_avg_ghi_kwh_m2 - 1.005 * 6.0).abs() < 1e-9);
        assert!(s.poa_to_ghi_ratio > 1.0);
        assert!((s.iam_loss_percent - (1.205 - 1.156) / 1.205 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_irradiance_summary_empty() {
        let s = IrradianceSummary::from_hourly(&[]);
        assert_eq!(s.poa_to_ghi_ratio, 0.0);
        assert_eq!(s.daily_avg_poa_kwh_m2, 0.0);
    }

    #[test]
    fn test_temperature_statistics() {
        let t = TemperatureStatistics::from_hourly(&sample(), 25.0, -0.0035);
        assert_eq!(t.max_cell_temp, 70.0);
        assert_eq!(t.min_cell_temp, 20.0);
        assert_eq!(t.hours_above_25c, 2);
        assert_eq!(t.hours_above_45c, 2);
        assert_eq!(t.hours_above_65c, 1);
        // Only the two hours above 10 W/m² count as daytime
        assert!((t.daytime_mean_cell_temp - 60.0).abs() < 1e-12);
        assert!((t.daytime_temperature_rise - 40.0).abs() < 1e-12);
        assert!((t.temperature_factor - (1.0 - 0.0035 * 35.0)).abs() < 1e-12);
    }

    #[test]
    fn test_monthly_summary_groups_by_month() {
        let months = monthly_summary(&sample());
        assert_eq!(months.len(), 2);
        // 22:00 and 23:00 on Jan 31, the rest in February
        assert_eq!(months[0].month, 1);
        assert_eq!(months[0].energy_kwh, 300.0);
        assert_eq!(months[0].producing_hours, 1);
        assert_eq!(months[1].month, 2);
        assert_eq!(months[1].peak_ac_kw, 420.0);
        assert_eq!(months[1].producing_hours, 1);
    }
}
