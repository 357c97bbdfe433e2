//! Coordinates and the spherical math the game runs on.

pub mod coordinate;
pub mod math;

pub use coordinate::Coordinate;
pub use math::{haversine_distance_km, random_point_within_radius};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    #[error("Latitude out of range [-90, 90]: {0}")]
    LatitudeOutOfRange(f64),

    #[error("Longitude out of range [-180, 180]: {0}")]
    LongitudeOutOfRange(f64),
}
