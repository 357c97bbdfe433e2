use geo::Point;

use crate::geodesy::GeoError;

/// A position on the globe in decimal degrees.
///
/// Always within range: latitude in [-90, 90], longitude in [-180, 180].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        // `contains` is false for NaN, which rejects non-finite input as well
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from arbitrary finite degrees, clamping latitude and
    /// wrapping longitude around the antimeridian.
    pub(crate) fn normalized(latitude: f64, longitude: f64) -> Self {
        let latitude = latitude.clamp(-90.0, 90.0);
        let longitude = (longitude + 180.0).rem_euclid(360.0) - 180.0;

        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<Coordinate> for Point {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

impl TryFrom<Point> for Coordinate {
    type Error = GeoError;

    fn try_from(point: Point) -> Result<Self, Self::Error> {
        Coordinate::new(point.y(), point.x())
    }
}
