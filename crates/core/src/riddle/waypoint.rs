use crate::{geodesy::Coordinate, identifiers::WaypointId, riddle::Question};

/// A spot on the map the player has to reach, and the question waiting there.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    id: WaypointId,
    location: Coordinate,
    question: Question,
    cleared: bool,
}

impl Waypoint {
    pub fn new(id: WaypointId, location: Coordinate, question: Question) -> Self {
        Self {
            id,
            location,
            question,
            cleared: false,
        }
    }

    pub fn id(&self) -> &WaypointId {
        &self.id
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub(crate) fn mark_cleared(&mut self) {
        self.cleared = true;
    }
}
