//! Spherical distance and offset sampling.
//!
//! Both functions work on plain degrees and use the same approximations the game
//! has shipped with, so trigger distances stay comparable between versions.

use std::f64::consts::PI;

use rand::Rng;

use crate::geodesy::Coordinate;

/// Earth's diameter in kilometers as used by the distance formula
const EARTH_DIAMETER_KM: f64 = 12742.0;

/// Meters per degree of latitude used when converting a radius to degrees
pub const METERS_PER_DEGREE: f64 = 111_300.0;

/// Great-circle distance in kilometers: `12742 * asin(sqrt(a))` where `a` is the
/// haversine of the central angle.
pub fn haversine_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    // rounding can push `h` a hair past 1 for antipodal points
    EARTH_DIAMETER_KM * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Sample a point uniformly over the disk of `radius_m` meters around `origin`.
///
/// The radius fraction is scaled by `sqrt(u)` so samples are uniform by area
/// rather than bunched at the center. Longitude offsets are stretched by
/// `1 / cos(latitude)` for meridian convergence; this diverges at the poles,
/// where results are clamped into a valid but meaningless coordinate.
pub fn random_point_within_radius<R: Rng + ?Sized>(
    origin: Coordinate,
    radius_m: f64,
    rng: &mut R,
) -> Coordinate {
    let r = radius_m / METERS_PER_DEGREE;
    let u: f64 = rng.random();
    let v: f64 = rng.random();

    let w = r * u.sqrt();
    let t = 2.0 * PI * v;

    let meridian_scale = origin.latitude().to_radians().cos().max(f64::EPSILON);

    Coordinate::normalized(
        origin.latitude() + w * t.cos(),
        origin.longitude() + w * t.sin() / meridian_scale,
    )
}
