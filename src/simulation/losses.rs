//! # Loss Cascade
//!
//! Applies the configured system losses to DC power, and attributes lost
//! energy to each category by sequential peeling (each category acts on what
//! the previous ones left over).

use serde::{Deserialize, Serialize};

use crate::domain::{LossCategory, LossProfile};
use crate::error::Result;

/// Applies a [`LossProfile`] to DC power values.
#[derive(Debug, Clone)]
pub struct LossCascade {
    profile: LossProfile,
}

impl LossCascade {
    pub fn new(profile: LossProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &LossProfile {
        &self.profile
    }

    /// Derate `power` by every category in declared order.
    pub fn apply(&self, power: f64) -> f64 {
        self.profile
            .active()
            .fold(power, |p, entry| p * (1.0 - entry.fraction))
    }

    /// Derate `power` by a single category.
    pub fn apply_single(&self, power: f64, category: LossCategory) -> Result<f64> {
        Ok(power * (1.0 - self.profile.fraction(category)?))
    }

    /// Derate `power` by a single category looked up by name.
    pub fn apply_named(&self, power: f64, name: &str) -> Result<f64> {
        Ok(power * (1.0 - self.profile.fraction_by_name(name)?))
    }

    /// Energy lost per category over an hourly DC series (kW per hour = kWh).
    pub fn breakdown(&self, dc_power: &[f64]) -> LossBreakdown {
        let mut remaining: Vec<f64> = dc_power.to_vec();
        let mut categories = Vec::new();

        for entry in self.profile.active() {
            let mut lost = 0.0;
            for p in remaining.iter_mut() {
                lost += *p * entry.fraction;
                *p *= 1.0 - entry.fraction;
            }
            categories.push(CategoryLoss {
                category: entry.category,
                percent: entry.fraction * 100.0,
                energy_loss_kwh: lost,
            });
        }

        let total_before: f64 = dc_power.iter().sum();
        let total_after: f64 = remaining.iter().sum();

        LossBreakdown {
            categories,
            total_percent: self.profile.total_loss_percent(),
            total_energy_loss_kwh: total_before - total_after,
        }
    }

    /// Annual effect of the whole profile on a DC energy total.
    pub fn annual_impact(&self, dc_energy_kwh: f64) -> LossImpact {
        let retained = self.profile.retained_fraction();
        let final_dc_energy_kwh = dc_energy_kwh * retained;
        LossImpact {
            original_dc_energy_kwh: dc_energy_kwh,
            total_loss_energy_kwh: dc_energy_kwh - final_dc_energy_kwh,
            final_dc_energy_kwh,
            total_loss_percent: self.profile.total_loss_percent(),
            system_efficiency_percent: retained * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLoss {
    pub category: LossCategory,
    /// Configured derate (%)
    pub percent: f64,
    /// Energy attributed to this category (kWh)
    pub energy_loss_kwh: f64,
}

/// Sequential attribution of DC losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub categories: Vec<CategoryLoss>,
    pub total_percent: f64,
    pub total_energy_loss_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossImpact {
    pub original_dc_energy_kwh: f64,
    pub total_loss_energy_kwh: f64,
    pub final_dc_energy_kwh: f64,
    pub total_loss_percent: f64,
    pub system_efficiency_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LossEntry;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    fn cascade(pairs: &[(&str, f64)]) -> LossCascade {
        LossCascade::new(LossProfile::from_named(pairs.iter().copied()).unwrap())
    }

    #[test]
    fn test_apply_soiling_and_zero_age() {
        let c = cascade(&[("soiling", 0.02), ("age", 0.0)]);
        assert!((c.apply(500.0) - 490.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_losses_are_no_ops() {
        let c = cascade(&[("shading", 0.0), ("snow", 0.0)]);
        assert_eq!(c.apply(123.456), 123.456);
        assert!(c.breakdown(&[10.0, 20.0]).categories.is_empty());
    }

    #[test]
    fn test_apply_named() {
        let c = cascade(&[("soiling", 0.02), ("wiring", 0.01)]);
        assert!((c.apply_named(100.0, "wiring").unwrap() - 99.0).abs() < 1e-12);
        assert!(c.apply_named(100.0, "bird_droppings").is_err());
        assert!(c.apply_single(100.0, LossCategory::Snow).is_err());
    }

    #[test]
    fn test_breakdown_is_sequential() {
        let c = cascade(&[("soiling", 0.10), ("wiring", 0.10)]);
        let b = c.breakdown(&[100.0]);
        assert_eq!(b.categories.len(), 2);
        assert!((b.categories[0].energy_loss_kwh - 10.0).abs() < 1e-9);
        // Second category only sees the 90 kW left after soiling
        assert!((b.categories[1].energy_loss_kwh - 9.0).abs() < 1e-9);
        assert!((b.total_energy_loss_kwh - 19.0).abs() < 1e-9);
        assert!((b.total_percent - 19.0).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let c = cascade(&[("soiling", 0.02), ("mismatch", 0.02), ("lid", 0.015), ("availability", 0.01)]);
        let series = [0.0, 120.0, 480.0, 910.0, 300.0];
        let b = c.breakdown(&series);
        let sum: f64 = b.categories.iter().map(|l| l.energy_loss_kwh).sum();
        assert!((sum - b.total_energy_loss_kwh).abs() < 1e-9);
    }

    #[test]
    fn test_annual_impact() {
        let c = cascade(&[("soiling", 0.02)]);
        let impact = c.annual_impact(1_000_000.0);
        assert!((impact.final_dc_energy_kwh - 980_000.0).abs() < 1e-6);
        assert!((impact.total_loss_energy_kwh - 20_000.0).abs() < 1e-6);
        assert!((impact.system_efficiency_percent - 98.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_cascade_equals_retained_product(
            fractions in proptest::collection::vec(0.0f64..0.5, 10),
            power in 0.0f64..2000.0,
        ) {
            let entries: Vec<LossEntry> = LossCategory::iter()
                .zip(fractions.iter())
                .map(|(category, &fraction)| LossEntry { category, fraction })
                .collect();
            let product: f64 = fractions.iter().map(|f| 1.0 - f).product();

            let forward = LossProfile::new(entries.clone()).unwrap();
            let reversed = LossProfile::new(entries.into_iter().rev().collect()).unwrap();

            prop_assert!((forward.retained_fraction() - product).abs() < 1e-12);
            prop_assert!((forward.retained_fraction() - reversed.retained_fraction()).abs() < 1e-12);

            let applied = LossCascade::new(forward).apply(power);
            prop_assert!((applied - power * product).abs() < 1e-9);
        }
    }
}
