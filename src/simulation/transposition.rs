//! # Plane-of-Array Transposition
//!
//! Transposes horizontal irradiance onto the tilted array plane:
//! - beam: DNI projected on the surface normal
//! - sky diffuse: Perez (1990) anisotropic model with circumsolar and horizon
//!   brightening terms, isotropic fallback when the sky state is undefined
//! - ground reflected: isotropic with the site albedo

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::incidence::aoi_projection;
use super::solar_position::SolarPosition;
use crate::domain::SiteGeometry;

/// Solar constant used for extraterrestrial irradiance (W/m²)
const SOLAR_CONSTANT: f64 = 1366.1;

/// Perez zenith-angle weight for the sky clearness (1/rad³)
const PEREZ_KAPPA: f64 = 1.041;

/// Upper edges of the sky clearness bins 1-7; bin 8 is open-ended.
const CLEARNESS_BIN_EDGES: [f64; 7] = [1.065, 1.23, 1.5, 1.95, 2.8, 4.5, 6.2];

/// Perez 1990 all-sites composite coefficients: [f11, f12, f13] per bin.
const F1_COEFFS: [[f64; 3]; 8] = [
    [-0.0080, 0.5880, -0.0620],
    [0.1300, 0.6830, -0.1510],
    [0.3300, 0.4870, -0.2210],
    [0.5680, 0.1870, -0.2950],
    [0.8730, -0.3920, -0.3620],
    [1.1320, -1.2370, -0.4120],
    [1.0600, -1.6000, -0.3590],
    [0.6780, -0.3270, -0.2500],
];

/// Perez 1990 all-sites composite coefficients: [f21, f22, f23] per bin.
const F2_COEFFS: [[f64; 3]; 8] = [
    [-0.0600, 0.0720, -0.0220],
    [-0.0190, 0.0660, -0.0290],
    [0.0550, -0.0640, -0.0260],
    [0.1090, -0.1520, -0.0140],
    [0.2260, -0.4620, 0.0010],
    [0.2880, -0.8230, 0.0560],
    [0.2640, -1.1270, 0.1310],
    [0.1560, -1.3770, 0.2510],
];

/// Irradiance components in the array plane (W/m²)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoaIrradiance {
    pub poa_direct: f64,
    pub poa_sky_diffuse: f64,
    pub poa_ground_diffuse: f64,
    pub poa_global: f64,
}

impl PoaIrradiance {
    pub fn poa_diffuse(&self) -> f64 {
        self.poa_sky_diffuse + self.poa_ground_diffuse
    }
}

/// Horizontal irradiance for one hour (W/m²)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalIrradiance {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

/// Extraterrestrial normal irradiance for a day of year (Spencer, 1971).
pub fn extraterrestrial_irradiance(day_of_year: u32) -> f64 {
    let b = 2.0 * PI * (f64::from(day_of_year) - 1.0) / 365.0;
    let r_over_r0_sq = 1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();
    SOLAR_CONSTANT * r_over_r0_sq
}

/// Kasten & Young (1989) relative airmass. `None` with the sun below the horizon.
pub fn relative_airmass(zenith_deg: f64) -> Option<f64> {
    if !zenith_deg.is_finite() || zenith_deg > 90.0 {
        return None;
    }
    let am = 1.0
        / (zenith_deg.to_radians().cos()
            + 0.50572 * (6.07995 + (90.0 - zenith_deg)).powf(-1.6364));
    Some(am)
}

/// Pressure-corrected airmass.
pub fn absolute_airmass(relative: f64, pressure_pa: f64) -> f64 {
    relative * pressure_pa / 101325.0
}

/// Perez sky clearness bin index (0-7) for a clearness value.
pub fn clearness_bin(epsilon: f64) -> usize {
    CLEARNESS_BIN_EDGES
        .iter()
        .position(|&edge| epsilon <= edge)
        .unwrap_or(CLEARNESS_BIN_EDGES.len())
}

/// Isotropic sky diffuse on a tilted plane.
pub fn isotropic_sky_diffuse(dhi: f64, tilt_deg: f64) -> f64 {
    (dhi * (1.0 + tilt_deg.to_radians().cos()) / 2.0).max(0.0)
}

/// Ground-reflected irradiance for a plane with the given tilt.
pub fn ground_diffuse(ghi: f64, albedo: f64, tilt_deg: f64) -> f64 {
    (ghi * albedo * (1.0 - tilt_deg.to_radians().cos()) / 2.0).max(0.0)
}

/// Transposes horizontal irradiance to the array plane for one site.
#[derive(Debug, Clone, Copy)]
pub struct TranspositionModel {
    tilt: f64,
    azimuth: f64,
    albedo: f64,
    pressure_pa: f64,
}

impl TranspositionModel {
    pub fn new(site: &SiteGeometry) -> Self {
        Self {
            tilt: site.tilt(),
            azimuth: site.azimuth(),
            albedo: site.albedo(),
            pressure_pa: site.pressure_pa(),
        }
    }

    pub fn poa(
        &self,
        timestamp: DateTime<FixedOffset>,
        irradiance: HorizontalIrradiance,
        sun: &SolarPosition,
    ) -> PoaIrradiance {
        let cos_aoi = aoi_projection(self.tilt, self.azimuth, sun.apparent_zenith, sun.azimuth);

        let poa_direct = if sun.is_above_horizon() {
            (irradiance.dni * cos_aoi).max(0.0)
        } else {
            0.0
        };

        let poa_sky_diffuse = self.sky_diffuse(timestamp, irradiance, sun, cos_aoi);
        let poa_ground_diffuse = ground_diffuse(irradiance.ghi, self.albedo, self.tilt);

        PoaIrradiance {
            poa_direct,
            poa_sky_diffuse,
            poa_ground_diffuse,
            poa_global: poa_direct + poa_sky_diffuse + poa_ground_diffuse,
        }
    }

    fn sky_diffuse(
        &self,
        timestamp: DateTime<FixedOffset>,
        irradiance: HorizontalIrradiance,
        sun: &SolarPosition,
        cos_aoi: f64,
    ) -> f64 {
        let HorizontalIrradiance { dni, dhi, .. } = irradiance;

        let airmass = match relative_airmass(sun.apparent_zenith) {
            Some(am) if dhi > 0.0 => absolute_airmass(am, self.pressure_pa),
            _ => return isotropic_sky_diffuse(dhi, self.tilt),
        };

        let dni_extra = extraterrestrial_irradiance(timestamp.ordinal());
        let z = sun.apparent_zenith.to_radians();
        let kz3 = PEREZ_KAPPA * z.powi(3);

        // Sky brightness and clearness
        let delta = dhi * airmass / dni_extra;
        let epsilon = ((dhi + dni.max(0.0)) / dhi + kz3) / (1.0 + kz3);
        if !epsilon.is_finite() || !delta.is_finite() {
            return isotropic_sky_diffuse(dhi, self.tilt);
        }

        let bin = clearness_bin(epsilon);
        let [f11, f12, f13] = F1_COEFFS[bin];
        let [f21, f22, f23] = F2_COEFFS[bin];
        let f1 = (f11 + f12 * delta + f13 * z).max(0.0);
        let f2 = f21 + f22 * delta + f23 * z;

        let tilt = self.tilt.to_radians();
        let a = cos_aoi.max(0.0);
        let b = sun.apparent_zenith.to_radians().cos().max(85f64.to_radians().cos());

        let isotropic = 0.5 * (1.0 - f1) * (1.0 + tilt.cos());
        let circumsolar = f1 * a / b;
        let horizon = f2 * tilt.sin();

        (dhi * (isotropic + circumsolar + horizon)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MountingCategory;
    use chrono::TimeZone;
    use rstest::rstest;

    fn model(tilt: f64, albedo: f64) -> TranspositionModel {
        let site = SiteGeometry::new(31.3, 120.62, 5.0, tilt, 180.0, albedo, MountingCategory::OpenRack)
            .unwrap();
        TranspositionModel::new(&site)
    }

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 6, 21, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_extraterrestrial_seasonality() {
        // Perihelion in early January, aphelion in early July
        let jan = extraterrestrial_irradiance(3);
        let jul = extraterrestrial_irradiance(185);
        assert!(jan > 1405.0 && jan < 1420.0);
        assert!(jul > 1315.0 && jul < 1330.0);
    }

    #[test]
    fn test_relative_airmass() {
        assert!((relative_airmass(0.0).unwrap() - 1.0).abs() < 0.001);
        assert!((relative_airmass(60.0).unwrap() - 2.0).abs() < 0.01);
        assert!(relative_airmass(90.0).unwrap() > 30.0);
        assert!(relative_airmass(95.0).is_none());
    }

    #[rstest]
    #[case(1.0, 0)]
    #[case(1.065, 0)]
    #[case(1.1, 1)]
    #[case(1.3, 2)]
    #[case(1.6, 3)]
    #[case(2.0, 4)]
    #[case(3.0, 5)]
    #[case(5.0, 6)]
    #[case(6.2, 6)]
    #[case(12.0, 7)]
    fn test_clearness_bins(#[case] epsilon: f64, #[case] bin: usize) {
        assert_eq!(clearness_bin(epsilon), bin);
    }

    #[test]
    fn test_horizontal_plane_has_no_ground_component() {
        let m = model(0.0, 0.9);
        let sun = SolarPosition { apparent_zenith: 30.0, azimuth: 180.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 800.0, dni: 700.0, dhi: 150.0 }, &sun);
        assert_eq!(poa.poa_ground_diffuse, 0.0);
    }

    #[test]
    fn test_horizontal_plane_beam_equals_horizontal_beam() {
        let m = model(0.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 30.0, azimuth: 150.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 756.0, dni: 700.0, dhi: 150.0 }, &sun);
        let expected = 700.0 * 30f64.to_radians().cos();
        assert!((poa.poa_direct - expected).abs() < 1e-9);
    }

    #[test]
    fn test_components_sum_to_global() {
        let m = model(25.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 40.0, azimuth: 200.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 650.0, dni: 600.0, dhi: 190.0 }, &sun);
        assert!(poa.poa_direct > 0.0);
        assert!(poa.poa_sky_diffuse > 0.0);
        assert!(poa.poa_ground_diffuse > 0.0);
        let sum = poa.poa_direct + poa.poa_sky_diffuse + poa.poa_ground_diffuse;
        assert!((poa.poa_global - sum).abs() < 1e-9);
        assert!((poa.poa_diffuse() - poa.poa_sky_diffuse - poa.poa_ground_diffuse).abs() < 1e-9);
    }

    #[test]
    fn test_sun_below_horizon_uses_isotropic_diffuse() {
        let m = model(20.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 95.0, azimuth: 300.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 10.0, dni: 50.0, dhi: 10.0 }, &sun);
        assert_eq!(poa.poa_direct, 0.0);
        assert!((poa.poa_sky_diffuse - isotropic_sky_diffuse(10.0, 20.0)).abs() < 1e-12);
    }

    #[test]
    fn test_sun_behind_panel_has_no_beam() {
        // South facing, steep tilt, sun low in the north
        let m = model(60.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 70.0, azimuth: 0.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 300.0, dni: 500.0, dhi: 130.0 }, &sun);
        assert_eq!(poa.poa_direct, 0.0);
        assert!(poa.poa_sky_diffuse >= 0.0);
    }

    #[test]
    fn test_zero_irradiance_gives_zero_poa() {
        let m = model(30.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 45.0, azimuth: 180.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 0.0, dni: 0.0, dhi: 0.0 }, &sun);
        assert_eq!(poa, PoaIrradiance::default());
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            ((actual - expected) / expected).abs() < 1e-6,
            "got {actual}, expected {expected}"
        );
    }

    #[test]
    fn test_perez_clear_sky_sun_on_normal() {
        // epsilon 7.96, open-ended clearest bin
        let m = model(30.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 30.0, azimuth: 180.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 793.0, dni: 800.0, dhi: 100.0 }, &sun);
        assert_close(poa.poa_direct, 800.0);
        assert_close(poa.poa_sky_diffuse, 113.160224688);
        assert_close(poa.poa_ground_diffuse, 10.624185480);
        assert_close(poa.poa_global, 923.784410168);
    }

    #[test]
    fn test_perez_clear_sky_sun_off_normal() {
        // epsilon 3.22
        let m = model(25.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 40.0, azimuth: 200.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 395.8, dni: 360.0, dhi: 120.0 }, &sun);
        assert_close(poa.poa_direct, 341.835515506);
        assert_close(poa.poa_sky_diffuse, 150.013920599);
    }

    #[test]
    fn test_perez_clear_sky_spring_morning() {
        // epsilon 4.90, day of year 74
        let m = model(35.0, 0.2);
        let t = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2021, 3, 15, 9, 0, 0)
            .unwrap();
        let sun = SolarPosition { apparent_zenith: 55.0, azimuth: 120.0 };
        let poa = m.poa(t, HorizontalIrradiance { ghi: 636.2, dni: 900.0, dhi: 120.0 }, &sun);
        assert_close(poa.poa_direct, 634.292519030);
        assert_close(poa.poa_sky_diffuse, 142.403018171);
        assert_close(poa.poa_global, 788.201084144);
    }

    #[test]
    fn test_overcast_sky_close_to_isotropic() {
        // dni = 0 puts the hour in the overcast bin where anisotropy is weak
        let m = model(30.0, 0.2);
        let sun = SolarPosition { apparent_zenith: 50.0, azimuth: 180.0 };
        let poa = m.poa(noon(), HorizontalIrradiance { ghi: 200.0, dni: 0.0, dhi: 200.0 }, &sun);
        let iso = isotropic_sky_diffuse(200.0, 30.0);
        assert!((poa.poa_sky_diffuse - iso).abs() / iso < 0.15);
    }
}
