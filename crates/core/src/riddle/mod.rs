//! Waypoints, the questions attached to them, and how they are produced and found.

pub mod generator;
pub mod proximity;
pub mod question;
pub mod waypoint;

pub use generator::WaypointGenerator;
pub use proximity::ProximityDetector;
pub use question::{FixedQuestion, Question, QuestionPool, QuestionSource};
pub use waypoint::Waypoint;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiddleError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
