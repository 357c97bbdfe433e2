//! The game session state machine and the controller that drives it from
//! external events.

pub mod collaborators;
pub mod controller;
pub mod state;

pub use collaborators::{
    FeedError, MapSurface, MarkerKind, PositionFeed, PositionSample, PositionWatch, Prompt,
    SampleOrigin, WatchHandle,
};
pub use controller::{ControllerError, SessionController, WaypointSupply};
pub use state::{
    AnswerOutcome, GameSession, PositionOutcome, QuestionRequest, SessionPhase, SessionSnapshot,
    TrackingMode,
};

use crate::riddle::RiddleError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot {operation} while session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: SessionPhase,
    },
}

impl From<RiddleError> for SessionError {
    fn from(error: RiddleError) -> Self {
        match error {
            RiddleError::InvalidArgument(message) | RiddleError::InvalidQuestion(message) => {
                SessionError::InvalidArgument(message)
            }
        }
    }
}

/// Parse a user-entered waypoint count. Anything that isn't a positive integer is
/// rejected.
pub fn parse_waypoint_count(input: &str) -> Result<usize, SessionError> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| SessionError::InvalidArgument(format!("not a number: {input:?}")))?;

    if value <= 0 {
        return Err(SessionError::InvalidArgument(format!(
            "waypoint count must be greater than zero, got {value}"
        )));
    }

    usize::try_from(value)
        .map_err(|_| SessionError::InvalidArgument(format!("waypoint count too large: {value}")))
}
