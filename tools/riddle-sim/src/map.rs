use geo_riddle_core::{Coordinate, MapSurface, MarkerId, MarkerKind};
use tracing::{debug, info};

use crate::board::SharedBoard;

/// Stands in for a real map: logs marker changes and keeps the board in sync so
/// the walker knows where to go.
pub struct LoggingMap {
    board: SharedBoard,
    next_marker: u64,
}

impl LoggingMap {
    pub fn new(board: SharedBoard) -> Self {
        Self {
            board,
            next_marker: 1,
        }
    }
}

impl MapSurface for LoggingMap {
    fn add_marker(&mut self, coordinate: Coordinate, kind: &MarkerKind) -> MarkerId {
        let id = MarkerId::new(format!("marker-{}", self.next_marker));
        self.next_marker += 1;

        match kind {
            MarkerKind::Player => {
                debug!(lat = coordinate.latitude(), lon = coordinate.longitude(), "player moved");
            }
            MarkerKind::Waypoint(waypoint) => {
                info!(
                    %waypoint,
                    lat = coordinate.latitude(),
                    lon = coordinate.longitude(),
                    "waypoint placed"
                );
                if let Ok(mut board) = self.board.lock() {
                    board.waypoints.insert(id.clone(), coordinate);
                }
            }
        }

        id
    }

    fn remove_marker(&mut self, id: &MarkerId) {
        if let Ok(mut board) = self.board.lock() {
            if board.waypoints.remove(id).is_some() {
                info!(marker = %id, "waypoint removed");
            }
        }
    }

    fn set_camera(&mut self, coordinate: Coordinate, zoom: f64) {
        debug!(
            lat = coordinate.latitude(),
            lon = coordinate.longitude(),
            zoom,
            "camera moved"
        );
    }
}
