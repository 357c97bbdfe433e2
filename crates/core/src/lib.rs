//! # geo-riddle-core
//!
//! Session engine for a location-based trivia game: waypoints are scattered
//! around the player, walking up to one asks its question, and a session is won
//! by clearing every waypoint or lost after too many wrong answers.
//!
//! ## Example
//!
//! ```
//! use geo_riddle_core::prelude::*;
//!
//! let config = GameConfig::default();
//! let mut session = GameSession::new(&config);
//!
//! let origin = Coordinate::new(52.3676, 4.9041).unwrap();
//! session.start(origin, 3, TrackingMode::RealTime).unwrap();
//!
//! // walk onto the first waypoint
//! let target = session.waypoints()[0].location();
//! let PositionOutcome::QuestionRequested(request) = session.on_position_update(target).unwrap()
//! else {
//!     panic!("expected a question");
//! };
//!
//! let outcome = session.resolve_answer(request.question.correct_index()).unwrap();
//! assert!(matches!(outcome, AnswerOutcome::Correct { remaining: 2, .. }));
//! ```

pub mod config;
pub mod geodesy;
pub mod identifiers;
pub mod remote;
pub mod riddle;
pub mod session;

pub use geo_riddle_api_types as api_types;

pub mod prelude {
    pub use crate::config::GameConfig;
    pub use crate::geodesy::{Coordinate, GeoError, haversine_distance_km, random_point_within_radius};
    pub use crate::identifiers::*;
    pub use crate::remote::{RemoteError, RemoteWaypointSource};
    pub use crate::riddle::{
        FixedQuestion, ProximityDetector, Question, QuestionPool, QuestionSource, RiddleError,
        Waypoint, WaypointGenerator,
    };
    pub use crate::session::{
        AnswerOutcome, ControllerError, FeedError, GameSession, MapSurface, MarkerKind,
        PositionFeed, PositionOutcome, PositionSample, PositionWatch, Prompt, QuestionRequest,
        SampleOrigin, SessionController, SessionError, SessionPhase, SessionSnapshot,
        TrackingMode, WatchHandle, WaypointSupply, parse_waypoint_count,
    };
}

pub use prelude::*;
