//! # AC Power
//!
//! PVWatts inverter model. Efficiency is a smooth function of the DC loading
//! ratio ζ = Pdc / Pdc0, normalized so that the curve reaches the nominal
//! efficiency where the reference curve reaches `eta_ref`:
//!
//! η(ζ) = η_nom / η_ref · (−0.0162·ζ − 0.0059/ζ + 0.9858)
//!
//! Output is clipped to [0, Pac0].

use crate::domain::InverterSpec;

const CURVE_LINEAR: f64 = -0.0162;
const CURVE_INVERSE: f64 = -0.0059;
const CURVE_CONSTANT: f64 = 0.9858;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcPowerModel {
    inverter: InverterSpec,
}

impl AcPowerModel {
    pub fn new(inverter: InverterSpec) -> Self {
        Self { inverter }
    }

    pub fn inverter(&self) -> &InverterSpec {
        &self.inverter
    }

    /// Conversion efficiency at a DC input (kW). Zero when there is no input.
    pub fn efficiency(&self, pdc_kw: f64) -> f64 {
        if pdc_kw <= 0.0 {
            return 0.0;
        }
        let zeta = pdc_kw / self.inverter.pdc0_kw();
        let eta = self.inverter.eta_nom() / self.inverter.eta_ref()
            * (CURVE_LINEAR * zeta + CURVE_INVERSE / zeta + CURVE_CONSTANT);
        eta.max(0.0)
    }

    /// AC output (kW) for a DC input (kW).
    pub fn ac_power(&self, pdc_kw: f64) -> f64 {
        if pdc_kw.is_nan() || pdc_kw <= 0.0 {
            return 0.0;
        }
        (pdc_kw * self.efficiency(pdc_kw)).clamp(0.0, self.inverter.pac0_kw())
    }

    /// Whether the DC input is below the inverter's declared startup power.
    pub fn below_startup(&self, pdc_kw: f64) -> bool {
        pdc_kw > 0.0 && pdc_kw < self.inverter.pdc_min_kw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> AcPowerModel {
        AcPowerModel::new(InverterSpec::new(1000.0, 1000.0, 0.98, 0.9637, 50.0, 1050.0).unwrap())
    }

    #[test]
    fn test_clipped_at_rated_ac() {
        assert_eq!(model().ac_power(1300.0), 1000.0);
        assert_eq!(model().ac_power(1100.0), 1000.0);
    }

    #[test]
    fn test_zero_input() {
        assert_eq!(model().ac_power(0.0), 0.0);
        assert_eq!(model().ac_power(-5.0), 0.0);
        assert_eq!(model().ac_power(f64::NAN), 0.0);
        assert_eq!(model().efficiency(0.0), 0.0);
    }

    #[test]
    fn test_efficiency_curve_shape() {
        let m = model();
        let low = m.efficiency(10.0);
        let mid = m.efficiency(400.0);
        let full = m.efficiency(1000.0);
        // Poor efficiency near zero load, flat and high from part load upwards
        assert!(low < mid);
        assert!(mid > 0.98 && mid < 1.0);
        assert!(full > 0.97 && full < 0.99);
    }

    #[test]
    fn test_half_load_output() {
        let ac = model().ac_power(500.0);
        let eta = 0.98 / 0.9637 * (-0.0162 * 0.5 - 0.0059 / 0.5 + 0.9858);
        assert!((ac - 500.0 * eta).abs() < 1e-9);
    }

    #[test]
    fn test_below_startup_is_reported_but_not_suppressed() {
        let m = model();
        assert!(m.below_startup(20.0));
        assert!(!m.below_startup(0.0));
        assert!(!m.below_startup(60.0));
        assert!(m.ac_power(20.0) > 0.0);
    }

    proptest! {
        #[test]
        fn prop_ac_within_rating(pdc in -100.0f64..3000.0) {
            let ac = model().ac_power(pdc);
            prop_assert!(ac >= 0.0);
            prop_assert!(ac <= 1000.0);
        }
    }
}
