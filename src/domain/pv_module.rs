use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, ensure_range, Result, SimulationError};

/// Optical constants of the module's front glazing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalConstants {
    /// Refractive index
    pub n: f64,
    /// Glazing extinction coefficient (1/m)
    pub k: f64,
    /// Glazing thickness (m)
    pub l: f64,
}

impl Default for OpticalConstants {
    /// Tempered glass, 2 mm
    fn default() -> Self {
        Self {
            n: 1.526,
            k: 4.0,
            l: 0.002,
        }
    }
}

impl OpticalConstants {
    pub fn validate(&self) -> Result<()> {
        ensure_range("optics.n", self.n, 1.0, 3.0)?;
        ensure_range("optics.k", self.k, 0.0, 1000.0)?;
        ensure_range("optics.l", self.l, 0.0, 0.1)?;
        Ok(())
    }
}

/// Electrical and optical rating of a single PV module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSpec {
    name: String,
    pmp_w: f64,
    gamma_pmp: f64,
    t_ref: f64,
    t_noct: Option<f64>,
    optics: OpticalConstants,
}

impl ModuleSpec {
    /// * `pmp_w` - rated maximum power at STC (W)
    /// * `gamma_pmp` - relative power temperature coefficient (1/°C), negative
    /// * `t_ref` - reference cell temperature (°C)
    pub fn new(
        name: impl Into<String>,
        pmp_w: f64,
        gamma_pmp: f64,
        t_ref: f64,
        optics: OpticalConstants,
    ) -> Result<Self> {
        ensure_positive("module.pmp", pmp_w)?;
        if !gamma_pmp.is_finite() || gamma_pmp >= 0.0 || gamma_pmp < -0.02 {
            return Err(SimulationError::config(format!(
                "module.gamma_pmp must be negative and no lower than -0.02 1/°C, got {gamma_pmp}"
            )));
        }
        ensure_range("module.t_ref", t_ref, -40.0, 85.0)?;
        optics.validate()?;

        Ok(Self {
            name: name.into(),
            pmp_w,
            gamma_pmp,
            t_ref,
            t_noct: None,
            optics,
        })
    }

    /// Nominal operating cell temperature used by the NOCT thermal model.
    pub fn with_noct(mut self, t_noct: f64) -> Result<Self> {
        ensure_range("module.t_noct", t_noct, 20.0, 85.0)?;
        self.t_noct = Some(t_noct);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pmp_w(&self) -> f64 {
        self.pmp_w
    }

    pub fn gamma_pmp(&self) -> f64 {
        self.gamma_pmp
    }

    pub fn t_ref(&self) -> f64 {
        self.t_ref
    }

    pub fn t_noct(&self) -> Option<f64> {
        self.t_noct
    }

    pub fn optics(&self) -> &OpticalConstants {
        &self.optics
    }
}

/// Physical layout of the array derived from plant capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantLayout {
    /// Plant DC capacity used by the power model (kW)
    pub capacity_kw: f64,
    /// Whole modules needed to reach the capacity
    pub module_count: u64,
    /// DC rating of the installed whole modules (kW)
    pub installed_dc_kw: f64,
}

impl PlantLayout {
    pub fn new(capacity_kw: f64, module: &ModuleSpec) -> Result<Self> {
        ensure_positive("system.capacity_kw", capacity_kw)?;
        let module_count = (capacity_kw * 1000.0 / module.pmp_w()).floor() as u64;
        if module_count == 0 {
            return Err(SimulationError::config(format!(
                "system.capacity_kw {capacity_kw} is smaller than one {} W module",
                module.pmp_w()
            )));
        }
        Ok(Self {
            capacity_kw,
            module_count,
            installed_dc_kw: module_count as f64 * module.pmp_w() / 1000.0,
        })
    }
}
