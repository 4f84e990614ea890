//! # DC Power
//!
//! PVWatts DC model: plant output scales linearly with effective irradiance and
//! is derated by the module power temperature coefficient.

use crate::domain::ModuleSpec;

/// Standard test condition irradiance (W/m²)
pub const STC_IRRADIANCE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcPowerModel {
    /// Plant DC capacity (kW)
    pdc0: f64,
    gamma_pmp: f64,
    t_ref: f64,
}

impl DcPowerModel {
    pub fn new(pdc0_kw: f64, module: &ModuleSpec) -> Self {
        Self {
            pdc0: pdc0_kw,
            gamma_pmp: module.gamma_pmp(),
            t_ref: module.t_ref(),
        }
    }

    pub fn pdc0_kw(&self) -> f64 {
        self.pdc0
    }

    /// DC power (kW) for the given effective irradiance (W/m²) and cell temperature (°C).
    pub fn dc_power(&self, effective_poa: f64, cell_temp: f64) -> f64 {
        let power = self.pdc0
            * (effective_poa / STC_IRRADIANCE)
            * (1.0 + self.gamma_pmp * (cell_temp - self.t_ref));
        power.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OpticalConstants;
    use proptest::prelude::*;

    fn model() -> DcPowerModel {
        let module = ModuleSpec::new("545W", 545.0, -0.0035, 25.0, OpticalConstants::default()).unwrap();
        DcPowerModel::new(1000.0, &module)
    }

    #[test]
    fn test_stc_gives_rated_power() {
        assert!((model().dc_power(1000.0, 25.0) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_hot_cells_derate() {
        // 20 K above reference: 7% loss
        assert!((model().dc_power(1000.0, 45.0) - 930.0).abs() < 1e-9);
        assert!((model().dc_power(500.0, 45.0) - 465.0).abs() < 1e-9);
    }

    #[test]
    fn test_cold_cells_gain() {
        assert!(model().dc_power(1000.0, 0.0) > 1000.0);
    }

    #[test]
    fn test_no_irradiance_no_power() {
        assert_eq!(model().dc_power(0.0, 25.0), 0.0);
    }

    #[test]
    fn test_never_negative() {
        // Temperature factor would go negative far above the operating range
        assert_eq!(model().dc_power(800.0, 400.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_dc_non_negative(poa in 0.0f64..1500.0, temp in -40.0f64..=85.0) {
            prop_assert!(model().dc_power(poa, temp) >= 0.0);
        }
    }
}
