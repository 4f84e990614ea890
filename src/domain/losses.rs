use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Result, SimulationError};

/// Known DC-side system loss categories.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LossCategory {
    Soiling,
    Shading,
    Snow,
    Mismatch,
    Wiring,
    Connections,
    /// Light-induced degradation
    Lid,
    NameplateRating,
    Age,
    Availability,
}

impl LossCategory {
    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            LossCategory::Soiling => "Soiling",
            LossCategory::Shading => "Shading",
            LossCategory::Snow => "Snow cover",
            LossCategory::Mismatch => "Module mismatch",
            LossCategory::Wiring => "DC wiring",
            LossCategory::Connections => "Connections",
            LossCategory::Lid => "Light-induced degradation",
            LossCategory::NameplateRating => "Nameplate rating",
            LossCategory::Age => "Age",
            LossCategory::Availability => "Availability",
        }
    }
}

/// One configured derate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossEntry {
    pub category: LossCategory,
    /// Fraction of power lost, in [0, 1)
    pub fraction: f64,
}

/// Ordered set of system losses with the combined retained fraction cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LossProfile {
    entries: Vec<LossEntry>,
    retained_fraction: f64,
}

impl LossProfile {
    pub fn new(entries: Vec<LossEntry>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if !entry.fraction.is_finite() || !(0.0..1.0).contains(&entry.fraction) {
                return Err(SimulationError::config(format!(
                    "loss '{}' must be in [0, 1), got {}",
                    entry.category, entry.fraction
                )));
            }
            if entries[..i].iter().any(|e| e.category == entry.category) {
                return Err(SimulationError::config(format!(
                    "loss '{}' is declared more than once",
                    entry.category
                )));
            }
        }

        let retained_fraction = entries.iter().map(|e| 1.0 - e.fraction).product::<f64>();

        Ok(Self {
            entries,
            retained_fraction,
        })
    }

    /// Build from `(name, fraction)` pairs, rejecting unknown category names.
    pub fn from_named<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(name, fraction)| {
                Ok(LossEntry {
                    category: parse_category(name)?,
                    fraction,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(entries)
    }

    /// A profile without losses
    pub fn lossless() -> Self {
        Self {
            entries: Vec::new(),
            retained_fraction: 1.0,
        }
    }

    pub fn entries(&self) -> &[LossEntry] {
        &self.entries
    }

    /// Π(1 − fᵢ) over all categories
    pub fn retained_fraction(&self) -> f64 {
        self.retained_fraction
    }

    /// 1 − Π(1 − fᵢ)
    pub fn total_loss_fraction(&self) -> f64 {
        1.0 - self.retained_fraction
    }

    pub fn total_loss_percent(&self) -> f64 {
        self.total_loss_fraction() * 100.0
    }

    /// Fraction configured for a category.
    pub fn fraction(&self, category: LossCategory) -> Result<f64> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.fraction)
            .ok_or_else(|| {
                SimulationError::config(format!("loss category '{category}' is not configured"))
            })
    }

    /// Fraction configured for a category given by name.
    pub fn fraction_by_name(&self, name: &str) -> Result<f64> {
        self.fraction(parse_category(name)?)
    }

    /// Categories that actually reduce power, in declared order.
    pub fn active(&self) -> impl Iterator<Item = &LossEntry> {
        self.entries.iter().filter(|e| e.fraction > 0.0)
    }
}

fn parse_category(name: &str) -> Result<LossCategory> {
    name.parse::<LossCategory>()
        .map_err(|_| SimulationError::config(format!("unknown loss category '{name}'")))
}
