use serde::Serialize;

use crate::error::{ensure_positive, ensure_range, Result, SimulationError};

/// Central inverter rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InverterSpec {
    pdc0_kw: f64,
    pac0_kw: f64,
    eta_nom: f64,
    eta_ref: f64,
    pdc_min_kw: f64,
    pdc_max_kw: f64,
    vdc_min_v: Option<f64>,
    vdc_max_v: Option<f64>,
}

impl InverterSpec {
    /// * `pdc0_kw` - rated DC input power
    /// * `pac0_kw` - rated AC output power, the hard output ceiling
    /// * `eta_nom` - nominal (Euro-weighted) efficiency
    /// * `eta_ref` - reference efficiency the PVWatts curve is normalized to
    /// * `pdc_min_kw`, `pdc_max_kw` - DC operating window
    pub fn new(
        pdc0_kw: f64,
        pac0_kw: f64,
        eta_nom: f64,
        eta_ref: f64,
        pdc_min_kw: f64,
        pdc_max_kw: f64,
    ) -> Result<Self> {
        ensure_positive("inverter.pdc0", pdc0_kw)?;
        ensure_positive("inverter.pac0", pac0_kw)?;
        ensure_range("inverter.eta_nom", eta_nom, 0.5, 1.0)?;
        ensure_range("inverter.eta_ref", eta_ref, 0.5, 1.0)?;
        ensure_range("inverter.pdc_min", pdc_min_kw, 0.0, pdc0_kw)?;
        if !pdc_max_kw.is_finite() || pdc_max_kw < pdc0_kw {
            return Err(SimulationError::config(format!(
                "inverter.pdc_max ({pdc_max_kw}) must be at least pdc0 ({pdc0_kw})"
            )));
        }
        if pdc_min_kw >= pdc0_kw {
            return Err(SimulationError::config(format!(
                "inverter.pdc_min ({pdc_min_kw}) must be below pdc0 ({pdc0_kw})"
            )));
        }

        Ok(Self {
            pdc0_kw,
            pac0_kw,
            eta_nom,
            eta_ref,
            pdc_min_kw,
            pdc_max_kw,
            vdc_min_v: None,
            vdc_max_v: None,
        })
    }

    /// Attach the DC voltage window. Informational; the power model is
    /// voltage-agnostic.
    pub fn with_voltage_window(mut self, vdc_min_v: f64, vdc_max_v: f64) -> Result<Self> {
        ensure_positive("inverter.vdc_min", vdc_min_v)?;
        if !vdc_max_v.is_finite() || vdc_max_v <= vdc_min_v {
            return Err(SimulationError::config(format!(
                "inverter.vdc_max ({vdc_max_v}) must exceed vdc_min ({vdc_min_v})"
            )));
        }
        self.vdc_min_v = Some(vdc_min_v);
        self.vdc_max_v = Some(vdc_max_v);
        Ok(self)
    }

    pub fn pdc0_kw(&self) -> f64 {
        self.pdc0_kw
    }

    pub fn pac0_kw(&self) -> f64 {
        self.pac0_kw
    }

    pub fn eta_nom(&self) -> f64 {
        self.eta_nom
    }

    pub fn eta_ref(&self) -> f64 {
        self.eta_ref
    }

    pub fn pdc_min_kw(&self) -> f64 {
        self.pdc_min_kw
    }

    pub fn pdc_max_kw(&self) -> f64 {
        self.pdc_max_kw
    }

    pub fn vdc_window(&self) -> Option<(f64, f64)> {
        self.vdc_min_v.zip(self.vdc_max_v)
    }

    /// DC/AC ratio of the inverter rating
    pub fn dc_ac_ratio(&self) -> f64 {
        self.pdc0_kw / self.pac0_kw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn central_1mw() -> InverterSpec {
        InverterSpec::new(1000.0, 1000.0, 0.98, 0.9637, 50.0, 1050.0).unwrap()
    }

    #[test]
    fn test_valid_inverter() {
        let inv = central_1mw();
        assert_eq!(inv.pac0_kw(), 1000.0);
        assert_eq!(inv.pdc_min_kw(), 50.0);
        assert!((inv.dc_ac_ratio() - 1.0).abs() < 1e-12);
        assert_eq!(inv.vdc_window(), None);
    }

    #[test]
    fn test_invalid_efficiency() {
        assert!(InverterSpec::new(1000.0, 1000.0, 1.2, 0.9637, 50.0, 1050.0).is_err());
        assert!(InverterSpec::new(1000.0, 1000.0, 0.98, 0.0, 50.0, 1050.0).is_err());
    }

    #[test]
    fn test_invalid_dc_window() {
        assert!(InverterSpec::new(1000.0, 1000.0, 0.98, 0.9637, 1000.0, 1050.0).is_err());
        assert!(InverterSpec::new(1000.0, 1000.0, 0.98, 0.9637, 50.0, 900.0).is_err());
        assert!(InverterSpec::new(1000.0, 1000.0, 0.98, 0.9637, -1.0, 1050.0).is_err());
    }

    #[test]
    fn test_voltage_window() {
        let inv = central_1mw().with_voltage_window(450.0, 1000.0).unwrap();
        assert_eq!(inv.vdc_window(), Some((450.0, 1000.0)));
        assert!(central_1mw().with_voltage_window(1000.0, 450.0).is_err());
    }
}
