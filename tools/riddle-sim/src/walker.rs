use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use geo_riddle_core::{
    Coordinate, FeedError, PositionFeed, PositionSample, PositionWatch, SampleOrigin, WatchId,
};
use tracing::debug;

use crate::board::{SharedBoard, step_toward};

/// A player who walks straight at the nearest waypoint marker.
pub struct SimulatedWalker {
    board: SharedBoard,
    step_m: f64,
    tick: Duration,
    origin: SampleOrigin,
    next_watch: AtomicU32,
}

impl SimulatedWalker {
    pub fn new(board: SharedBoard, step_m: f64, tick: Duration, origin: SampleOrigin) -> Self {
        Self {
            board,
            step_m,
            tick,
            origin,
            next_watch: AtomicU32::new(1),
        }
    }
}

impl PositionFeed for SimulatedWalker {
    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, FeedError>> + Send + 'a>> {
        let position = self
            .board
            .lock()
            .map(|board| board.position)
            .map_err(|_| FeedError::Unavailable("board poisoned".into()));

        Box::pin(async move { position })
    }

    fn watch(&self) -> Result<PositionWatch, FeedError> {
        let id = WatchId::new(format!(
            "walker-{}",
            self.next_watch.fetch_add(1, Ordering::Relaxed)
        ));
        let (watch, mut handle) = PositionWatch::channel(id, 1);

        let board = self.board.clone();
        let step_m = self.step_m;
        let origin = self.origin;
        let tick = self.tick;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                tokio::select! {
                    _ = &mut handle.shutdown => break,
                    _ = interval.tick() => {}
                }

                let next = {
                    let Ok(mut board) = board.lock() else {
                        break;
                    };
                    if let Some(target) = board.nearest_waypoint() {
                        board.position = step_toward(board.position, target, step_m);
                    }
                    board.position
                };

                let sample = PositionSample {
                    coordinate: next,
                    origin,
                };
                if handle.samples.send(Ok(sample)).await.is_err() {
                    break;
                }
            }

            debug!(watch = %handle.id, "walker stopped");
        });

        Ok(watch)
    }

    fn clear_watch(&self, id: &WatchId) {
        debug!(watch = %id, "watch cleared");
    }
}
