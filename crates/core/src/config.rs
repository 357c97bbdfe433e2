use serde::Deserialize;

/// Tunables for a game session. Everything a deployment may want to change lives
/// here; the engine never reads endpoints or credentials from anywhere else.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Radius around the origin in which waypoints are scattered
    pub spawn_radius_m: f64,

    /// Compared with a strict `<` against `haversine_distance_km`. The default of
    /// 0.01 is the literal the game has always shipped with.
    pub trigger_radius_km: f64,

    /// Answers allowed on a single waypoint; the answer that uses the last one
    /// fails the session. Values below 1 are treated as 1.
    pub max_attempts: u32,

    pub camera_zoom: f64,

    /// Base url of a waypoint server, e.g. `https://riddles.example.org`
    pub remote_base_url: Option<String>,
}

impl GameConfig {
    pub const DEFAULT_SPAWN_RADIUS_M: f64 = 1000.0;
    pub const DEFAULT_TRIGGER_RADIUS_KM: f64 = 0.01;
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_CAMERA_ZOOM: f64 = 15.0;
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_radius_m: Self::DEFAULT_SPAWN_RADIUS_M,
            trigger_radius_km: Self::DEFAULT_TRIGGER_RADIUS_KM,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            camera_zoom: Self::DEFAULT_CAMERA_ZOOM,
            remote_base_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "spawn_radius_m": 250.0 }"#).unwrap();

        assert_eq!(config.spawn_radius_m, 250.0);
        assert_eq!(config.trigger_radius_km, 0.01);
        assert_eq!(config.max_attempts, 3);
        assert!(config.remote_base_url.is_none());
    }
}
