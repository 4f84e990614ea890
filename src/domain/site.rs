use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::{ensure_range, Result, SimulationError};

/// How the array is mounted; selects the convective cooling coefficients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MountingCategory {
    /// Flush on a roof (e.g. corrugated steel), poor rear ventilation
    RoofMounted,
    /// Free-standing rack with open rear side
    OpenRack,
    /// Rear side thermally insulated
    InsulatedBack,
}

/// Plant location and fixed array orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteGeometry {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    tilt: f64,
    azimuth: f64,
    albedo: f64,
    mounting: MountingCategory,
}

impl SiteGeometry {
    /// Validate and build the site description.
    ///
    /// * `latitude`, `longitude` - degrees, north/east positive
    /// * `altitude` - metres above sea level
    /// * `tilt` - degrees from horizontal, 0..=90
    /// * `azimuth` - degrees clockwise from north, 0..360 (180 = south)
    /// * `albedo` - ground reflectance, 0..=1
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        tilt: f64,
        azimuth: f64,
        albedo: f64,
        mounting: MountingCategory,
    ) -> Result<Self> {
        ensure_range("latitude", latitude, -90.0, 90.0)?;
        ensure_range("longitude", longitude, -180.0, 180.0)?;
        ensure_range("altitude", altitude, -500.0, 9000.0)?;
        ensure_range("tilt", tilt, 0.0, 90.0)?;
        if !azimuth.is_finite() || !(0.0..360.0).contains(&azimuth) {
            return Err(SimulationError::config(format!(
                "azimuth must be in [0, 360), got {azimuth}"
            )));
        }
        ensure_range("albedo", albedo, 0.0, 1.0)?;

        Ok(Self {
            latitude,
            longitude,
            altitude,
            tilt,
            azimuth,
            albedo,
            mounting,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn albedo(&self) -> f64 {
        self.albedo
    }

    pub fn mounting(&self) -> MountingCategory {
        self.mounting
    }

    /// Standard-atmosphere surface pressure at the site altitude (Pa).
    pub fn pressure_pa(&self) -> f64 {
        100.0 * ((44331.514 - self.altitude) / 11880.516).powf(1.0 / 0.1902632)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn suzhou() -> SiteGeometry {
        SiteGeometry::new(31.30, 120.62, 5.0, 3.0, 180.0, 0.2, MountingCategory::RoofMounted)
            .unwrap()
    }

    #[test]
    fn test_valid_site() {
        let site = suzhou();
        assert_eq!(site.tilt(), 3.0);
        assert_eq!(site.azimuth(), 180.0);
        assert_eq!(site.mounting(), MountingCategory::RoofMounted);
    }

    #[rstest]
    #[case(91.0, 180.0, 0.2)]
    #[case(-1.0, 180.0, 0.2)]
    #[case(30.0, 360.0, 0.2)]
    #[case(30.0, -5.0, 0.2)]
    #[case(30.0, 180.0, 1.2)]
    #[case(30.0, 180.0, -0.1)]
    fn test_invalid_orientation(#[case] tilt: f64, #[case] azimuth: f64, #[case] albedo: f64) {
        let err = SiteGeometry::new(31.3, 120.6, 5.0, tilt, azimuth, albedo, MountingCategory::OpenRack)
            .unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn test_invalid_location() {
        assert!(SiteGeometry::new(95.0, 0.0, 0.0, 10.0, 180.0, 0.2, MountingCategory::OpenRack).is_err());
        assert!(SiteGeometry::new(0.0, 200.0, 0.0, 10.0, 180.0, 0.2, MountingCategory::OpenRack).is_err());
    }

    #[test]
    fn test_pressure_from_altitude() {
        let sea = SiteGeometry::new(0.0, 0.0, 0.0, 0.0, 180.0, 0.2, MountingCategory::OpenRack).unwrap();
        assert!((sea.pressure_pa() - 101325.0).abs() < 50.0);

        let high = SiteGeometry::new(0.0, 0.0, 2000.0, 0.0, 180.0, 0.2, MountingCategory::OpenRack)
            .unwrap();
        assert!(high.pressure_pa() < 81000.0 && high.pressure_pa() > 78000.0);
    }

    #[test]
    fn test_mounting_parse() {
        assert_eq!(
            "open_rack".parse::<MountingCategory>().unwrap(),
            MountingCategory::OpenRack
        );
        assert_eq!(MountingCategory::InsulatedBack.to_string(), "insulated_back");
        assert!("ground".parse::<MountingCategory>().is_err());
    }
}
