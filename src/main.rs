use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use pv_yield_sim::{config, report::YieldReport, simulation, telemetry, weather};
use config::PlantConfig;
use simulation::{Simulation, TracingObserver};
use telemetry::init_tracing;
use tracing::{info, warn};
use weather::{PvgisTmyFile, WeatherSource, WeatherValidation};

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let started = Instant::now();

    let plant = PlantConfig::load()?.build()?;
    let def = &plant.definition;
    info!(
        plant = %def.name,
        latitude = def.site.latitude(),
        longitude = def.site.longitude(),
        capacity_kw = def.capacity_kw,
        year = def.year,
        "starting PV yield simulation"
    );

    let source = PvgisTmyFile::new(&plant.weather_file, plant.timezone, def.year);
    let weather = source.load()?;

    let quality = WeatherValidation::inspect(&weather, def.year);
    if !quality.is_complete || !quality.is_physically_valid {
        warn!(
            total_hours = quality.total_hours,
            expected_hours = quality.expected_hours,
            negative_ghi = quality.negative_ghi,
            negative_dni = quality.negative_dni,
            negative_dhi = quality.negative_dhi,
            "weather data quality check failed"
        );
    }

    let sim = Simulation::new(plant.definition.clone())?;
    info!(
        modules = sim.layout().module_count,
        installed_dc_kw = sim.layout().installed_dc_kw,
        retained_fraction = def.losses.retained_fraction(),
        "plant configured"
    );

    let run = sim.run_detailed(&weather, &mut TracingObserver)?;
    write_json(&plant.results_file, &run.result)?;

    let report = YieldReport::build(&sim, &weather, &run);
    if let Some(path) = &plant.report_file {
        write_json(path, &report)?;
    }

    info!(
        energy_mwh = report.annual.energy_kwh / 1000.0,
        specific_yield_kwh_kwp = report.annual.specific_yield_kwh_kwp,
        capacity_factor = report.annual.capacity_factor,
        performance_ratio = report.annual.performance_ratio,
        hours_below_pdc_min = report.hours_below_pdc_min,
        results = %plant.results_file.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation complete"
    );
    Ok(())
}
