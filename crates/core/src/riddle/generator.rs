use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{
    config::GameConfig,
    geodesy::{Coordinate, random_point_within_radius},
    identifiers::WaypointId,
    riddle::{QuestionSource, RiddleError, Waypoint},
};

/// Scatters waypoints around an origin.
///
/// Ids come from a counter owned by the generator, so they never repeat across
/// sessions that share one generator.
pub struct WaypointGenerator<R = StdRng> {
    radius_m: f64,
    next_sequence: u64,
    rng: R,
}

impl WaypointGenerator<StdRng> {
    pub fn new(radius_m: f64) -> Self {
        Self::with_rng(radius_m, StdRng::from_os_rng())
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.spawn_radius_m)
    }

    /// Deterministic generator for replays and tests.
    pub fn seeded(radius_m: f64, seed: u64) -> Self {
        Self::with_rng(radius_m, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WaypointGenerator<R> {
    pub fn with_rng(radius_m: f64, rng: R) -> Self {
        Self {
            radius_m,
            next_sequence: 1,
            rng,
        }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Produce exactly `count` waypoints, each carrying a question from `source`.
    pub fn generate<S: QuestionSource + ?Sized>(
        &mut self,
        origin: Coordinate,
        count: usize,
        source: &mut S,
    ) -> Result<Vec<Waypoint>, RiddleError> {
        if count == 0 {
            return Err(RiddleError::InvalidArgument(
                "waypoint count must be greater than zero".into(),
            ));
        }

        let waypoints: Vec<Waypoint> = (0..count)
            .map(|_| {
                let id = WaypointId::generated(self.next_sequence);
                self.next_sequence += 1;

                let location = random_point_within_radius(origin, self.radius_m, &mut self.rng);
                Waypoint::new(id, location, source.next_question())
            })
            .collect();

        debug!(
            count,
            radius_m = self.radius_m,
            lat = origin.latitude(),
            lon = origin.longitude(),
            "generated waypoints"
        );

        Ok(waypoints)
    }
}
