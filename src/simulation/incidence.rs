//! # Incidence Angle
//!
//! Angle of incidence between the sun vector and the array normal, and the
//! optical transmittance loss of the glazing at that angle.

use serde::{Deserialize, Serialize};

use crate::domain::OpticalConstants;

/// Substitute for an exactly normal incidence, avoids 0/0 in the Fresnel terms.
const NEAR_NORMAL_AOI_DEG: f64 = 1e-6;

/// cos(AOI) for a surface and sun position, all angles in degrees.
pub fn aoi_projection(
    surface_tilt: f64,
    surface_azimuth: f64,
    solar_zenith: f64,
    solar_azimuth: f64,
) -> f64 {
    let tilt = surface_tilt.to_radians();
    let zenith = solar_zenith.to_radians();
    let projection = tilt.cos() * zenith.cos()
        + tilt.sin() * zenith.sin() * (solar_azimuth - surface_azimuth).to_radians().cos();
    projection.clamp(-1.0, 1.0)
}

/// Angle of incidence in degrees (0-180).
pub fn aoi(surface_tilt: f64, surface_azimuth: f64, solar_zenith: f64, solar_azimuth: f64) -> f64 {
    aoi_projection(surface_tilt, surface_azimuth, solar_zenith, solar_azimuth)
        .acos()
        .to_degrees()
}

/// Clamp an incidence angle modifier into [0, 1], mapping undefined values to 0.
pub fn clip_iam(iam: f64) -> f64 {
    if iam.is_finite() {
        iam.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Physical IAM model: Fresnel reflection at an air/glass interface plus
/// absorption along the refracted path, relative to normal incidence.
pub fn physical_iam(aoi_deg: f64, optics: &OpticalConstants) -> f64 {
    if !aoi_deg.is_finite() || aoi_deg.abs() >= 90.0 {
        return 0.0;
    }
    let aoi_deg = if aoi_deg == 0.0 { NEAR_NORMAL_AOI_DEG } else { aoi_deg };

    let (n1, n2) = (1.0, optics.n);
    let kl = optics.k * optics.l;

    let cos_a = aoi_deg.to_radians().cos();
    let sin_a = aoi_deg.to_radians().sin();

    // Snell's law
    let sin_b = n1 / n2 * sin_a;
    let cos_b = (1.0 - sin_b * sin_b).sqrt();

    // Fresnel reflectance, s and p polarization
    let rho_s = ((n1 * cos_a - n2 * cos_b) / (n1 * cos_a + n2 * cos_b)).powi(2);
    let rho_p = ((n1 * cos_b - n2 * cos_a) / (n1 * cos_b + n2 * cos_a)).powi(2);
    let rho_0 = ((n1 - n2) / (n1 + n2)).powi(2);

    let absorption = (-kl / cos_b).exp();
    let tau_s = (1.0 - rho_s) * absorption;
    let tau_p = (1.0 - rho_p) * absorption;
    let tau_0 = (1.0 - rho_0) * (-kl).exp();

    clip_iam((tau_s + tau_p) / 2.0 / tau_0)
}

/// Incidence geometry and optical correction for one hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncidenceCorrection {
    /// Angle of incidence (degrees)
    pub aoi: f64,
    /// Incidence angle modifier, 0-1
    pub iam: f64,
    /// POA after optical losses (W/m²)
    pub effective_poa: f64,
}

/// Evaluates AOI and IAM for a fixed array.
#[derive(Debug, Clone, Copy)]
pub struct IncidenceAngleCorrector {
    tilt: f64,
    azimuth: f64,
    optics: OpticalConstants,
}

impl IncidenceAngleCorrector {
    pub fn new(tilt: f64, azimuth: f64, optics: OpticalConstants) -> Self {
        Self {
            tilt,
            azimuth,
            optics,
        }
    }

    pub fn correct(&self, solar_zenith: f64, solar_azimuth: f64, poa_global: f64) -> IncidenceCorrection {
        let aoi = aoi(self.tilt, self.azimuth, solar_zenith, solar_azimuth);
        let iam = physical_iam(aoi, &self.optics);
        IncidenceCorrection {
            aoi,
            iam,
            effective_poa: (poa_global * iam).max(0.0),
        }
    }
}
