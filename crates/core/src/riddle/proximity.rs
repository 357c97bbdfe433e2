use tracing::debug;

use crate::{
    config::GameConfig,
    geodesy::{Coordinate, haversine_distance_km},
    riddle::Waypoint,
};

/// First waypoint (in slice order) strictly closer than `trigger_radius_km`, or
/// `None` when `suppressed`.
pub fn evaluate(
    position: Coordinate,
    waypoints: &[Waypoint],
    trigger_radius_km: f64,
    suppressed: bool,
) -> Option<&Waypoint> {
    if suppressed {
        return None;
    }

    waypoints
        .iter()
        .find(|waypoint| haversine_distance_km(position, waypoint.location()) < trigger_radius_km)
}

/// Stateless proximity check; the caller decides whether triggers are suppressed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximityDetector {
    trigger_radius_km: f64,
}

impl ProximityDetector {
    pub fn new(trigger_radius_km: f64) -> Self {
        Self { trigger_radius_km }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.trigger_radius_km)
    }

    pub fn trigger_radius_km(&self) -> f64 {
        self.trigger_radius_km
    }

    pub fn evaluate<'a>(
        &self,
        position: Coordinate,
        waypoints: &'a [Waypoint],
        suppressed: bool,
    ) -> Option<&'a Waypoint> {
        let hit = evaluate(position, waypoints, self.trigger_radius_km, suppressed);

        if let Some(waypoint) = hit {
            debug!(waypoint = %waypoint.id(), "position within trigger radius");
        }

        hit
    }
}

impl Default for ProximityDetector {
    fn default() -> Self {
        Self::new(GameConfig::DEFAULT_TRIGGER_RADIUS_KM)
    }
}
