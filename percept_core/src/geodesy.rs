// percept_core/src/geodesy.rs

use crate::error::SensorError;
use nalgebra::Vector3;
use serde::Deserialize;

/// WGS-84 semi-major axis in metres.
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// WGS-84 flattening.
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;
/// WGS-84 first eccentricity squared.
pub const WGS84_ECCENTRICITY_SQUARED: f64 =
    2.0 * WGS84_FLATTENING - WGS84_FLATTENING * WGS84_FLATTENING;

/// A resolved geodetic position estimate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeodeticFix {
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Metres above mean sea level.
    pub altitude: f64,
}

impl GeodeticFix {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Latitude clamped to [-90, 90], longitude wrapped to [-180, 180).
    pub fn normalized(self) -> Self {
        Self {
            latitude: self.latitude.clamp(-90.0, 90.0),
            longitude: wrap_longitude(self.longitude),
            altitude: self.altitude,
        }
    }
}

/// Wraps any angle in degrees into [-180, 180).
pub fn wrap_longitude(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Converts between a local ENU tangent plane and geodetic coordinates
/// around a fixed reference point.
///
/// Uses the meridian and prime-vertical radii of curvature at the reference
/// latitude, which keeps the two directions exact inverses of each other
/// and is accurate to centimetres over the few kilometres a vehicle scene
/// spans.
#[derive(Debug, Clone, Copy)]
pub struct GeodeticProjector {
    reference: GeodeticFix,
    meridian_radius: f64,
    parallel_radius: f64,
}

impl GeodeticProjector {
    pub fn new(reference: GeodeticFix) -> Result<Self, SensorError> {
        let finite = reference.latitude.is_finite()
            && reference.longitude.is_finite()
            && reference.altitude.is_finite();
        if !finite {
            return Err(SensorError::invalid("reference point must be finite"));
        }
        if reference.latitude.abs() >= 90.0 {
            return Err(SensorError::invalid(format!(
                "reference latitude {} is at or beyond a pole",
                reference.latitude
            )));
        }

        let reference = reference.normalized();
        let lat0 = reference.latitude.to_radians();
        let w2 = 1.0 - WGS84_ECCENTRICITY_SQUARED * lat0.sin().powi(2);
        let prime_vertical = WGS84_SEMI_MAJOR_AXIS / w2.sqrt();
        let meridian = WGS84_SEMI_MAJOR_AXIS * (1.0 - WGS84_ECCENTRICITY_SQUARED) / w2.powf(1.5);

        Ok(Self {
            reference,
            meridian_radius: meridian,
            parallel_radius: prime_vertical * lat0.cos(),
        })
    }

    pub fn reference(&self) -> &GeodeticFix {
        &self.reference
    }

    /// ENU metres -> geodetic. The result is always normalized.
    pub fn to_geodetic(&self, enu: &Vector3<f64>) -> GeodeticFix {
        let d_lat = (enu.y / self.meridian_radius).to_degrees();
        let d_lon = (enu.x / self.parallel_radius).to_degrees();
        GeodeticFix::new(
            self.reference.latitude + d_lat,
            self.reference.longitude + d_lon,
            self.reference.altitude + enu.z,
        )
        .normalized()
    }

    /// Geodetic -> ENU metres relative to the reference point.
    pub fn to_local(&self, fix: &GeodeticFix) -> Vector3<f64> {
        let d_lat = (fix.latitude - self.reference.latitude).to_radians();
        let d_lon = wrap_longitude(fix.longitude - self.reference.longitude).to_radians();
        Vector3::new(
            self.parallel_radius * d_lon,
            self.meridian_radius * d_lat,
            fix.altitude - self.reference.altitude,
        )
    }
}
