use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use geo_riddle_core::{Coordinate, MarkerId, geodesy::math::METERS_PER_DEGREE};

/// What the simulated player can see: where they are and which waypoint markers
/// are on the map.
pub struct Board {
    pub position: Coordinate,
    pub waypoints: HashMap<MarkerId, Coordinate>,
}

pub type SharedBoard = Arc<Mutex<Board>>;

impl Board {
    pub fn shared(position: Coordinate) -> SharedBoard {
        Arc::new(Mutex::new(Board {
            position,
            waypoints: HashMap::new(),
        }))
    }

    pub fn nearest_waypoint(&self) -> Option<Coordinate> {
        self.waypoints
            .values()
            .copied()
            .min_by(|a, b| {
                flat_distance_m(self.position, *a).total_cmp(&flat_distance_m(self.position, *b))
            })
    }
}

/// Equirectangular distance; plenty for a walker covering a kilometer.
pub fn flat_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let (north, east) = offset_m(a, b);
    north.hypot(east)
}

fn offset_m(from: Coordinate, to: Coordinate) -> (f64, f64) {
    let scale = from.latitude().to_radians().cos();
    let north = (to.latitude() - from.latitude()) * METERS_PER_DEGREE;
    let east = (to.longitude() - from.longitude()) * METERS_PER_DEGREE * scale;
    (north, east)
}

/// Move up to `step_m` meters from `from` toward `to`, landing exactly on `to`
/// when it is within reach.
pub fn step_toward(from: Coordinate, to: Coordinate, step_m: f64) -> Coordinate {
    let distance = flat_distance_m(from, to);
    if distance <= step_m {
        return to;
    }

    let fraction = step_m / distance;
    let latitude = from.latitude() + (to.latitude() - from.latitude()) * fraction;
    let longitude = from.longitude() + (to.longitude() - from.longitude()) * fraction;

    Coordinate::new(latitude, longitude).unwrap_or(to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_lands_on_target_when_close() {
        let from = Coordinate::new(10.0, 10.0).unwrap();
        let to = Coordinate::new(10.00001, 10.0).unwrap();

        assert_eq!(step_toward(from, to, 5.0), to);
    }

    #[test]
    fn test_step_moves_fixed_distance() {
        let from = Coordinate::new(10.0, 10.0).unwrap();
        let to = Coordinate::new(10.01, 10.0).unwrap();

        let next = step_toward(from, to, 100.0);
        assert!((flat_distance_m(from, next) - 100.0).abs() < 1e-6);
    }
}
