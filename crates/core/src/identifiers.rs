//! Identifiers handed between the session, the map and the position feed.

use std::fmt;
use std::sync::Arc;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(Arc::from(value.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }
    };
}

string_id!(
    /// Names a waypoint for the lifetime of a session. Unique within one.
    WaypointId
);
string_id!(
    /// Handle returned by a map surface for a placed marker
    MarkerId
);
string_id!(WatchId);

impl WaypointId {
    /// The id a generator gives its `sequence`-th waypoint.
    pub fn generated(sequence: u64) -> Self {
        Self::new(format!("waypoint-{sequence}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_waypoint_ids() {
        assert_eq!(WaypointId::generated(1).as_str(), "waypoint-1");
        assert_ne!(WaypointId::generated(1), WaypointId::generated(2));
        assert_eq!(WaypointId::generated(12), WaypointId::from("waypoint-12"));
    }

    #[test]
    fn test_ids_compare_by_value() {
        let seen: HashSet<MarkerId> = ["marker-1", "marker-2", "marker-1"]
            .into_iter()
            .map(MarkerId::from)
            .collect();

        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&MarkerId::new(String::from("marker-2"))));
    }

    #[test]
    fn test_watch_id_displays_raw_value() {
        assert_eq!(WatchId::new("walker-3").to_string(), "walker-3");
    }
}
