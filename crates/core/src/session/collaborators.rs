//! Seams to the outside world: where positions come from, where markers go, and
//! who answers questions.
//!
//! Platform layers implement these; the engine never talks to a device directly.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::{mpsc, oneshot};

use crate::{
    geodesy::Coordinate,
    identifiers::{MarkerId, WatchId, WaypointId},
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),

    #[error("Position feed closed")]
    Closed,
}

/// Where a position sample came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOrigin {
    Gps,
    /// The player dragged their own marker
    Drag,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub origin: SampleOrigin,
}

impl PositionSample {
    pub fn gps(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            origin: SampleOrigin::Gps,
        }
    }

    pub fn drag(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            origin: SampleOrigin::Drag,
        }
    }
}

/// A live position subscription.
///
/// Dropping the watch tells the producer to stop, so a subscription can never
/// outlive the session that asked for it.
pub struct PositionWatch {
    id: WatchId,
    samples: mpsc::Receiver<Result<PositionSample, FeedError>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

/// Producer half of a [`PositionWatch`].
pub struct WatchHandle {
    pub id: WatchId,
    pub samples: mpsc::Sender<Result<PositionSample, FeedError>>,
    /// Resolves once the subscriber has let go
    pub shutdown: oneshot::Receiver<()>,
}

impl PositionWatch {
    pub fn channel(id: WatchId, buffer: usize) -> (PositionWatch, WatchHandle) {
        let (samples_tx, samples_rx) = mpsc::channel(buffer.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let watch = PositionWatch {
            id: id.clone(),
            samples: samples_rx,
            shutdown_tx: Some(shutdown_tx),
        };
        let handle = WatchHandle {
            id,
            samples: samples_tx,
            shutdown: shutdown_rx,
        };

        (watch, handle)
    }

    pub fn id(&self) -> &WatchId {
        &self.id
    }
}

impl Stream for PositionWatch {
    type Item = Result<PositionSample, FeedError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.samples.poll_recv(cx)
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Device location, either a one-shot fix or a continuous watch.
pub trait PositionFeed: Send + Sync {
    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Coordinate, FeedError>> + Send + 'a>>;

    fn watch(&self) -> Result<PositionWatch, FeedError>;

    /// Release a subscription explicitly. Dropping the watch has the same effect;
    /// this lets platform layers free native callbacks eagerly.
    fn clear_watch(&self, id: &WatchId);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    Player,
    Waypoint(WaypointId),
}

pub trait MapSurface: Send {
    fn add_marker(&mut self, coordinate: Coordinate, kind: &MarkerKind) -> MarkerId;
    fn remove_marker(&mut self, id: &MarkerId);
    fn set_camera(&mut self, coordinate: Coordinate, zoom: f64);
}

/// Dialogs. Each call suspends until the player picks something or dismisses the
/// dialog, which resolves to `None`.
pub trait Prompt: Send + Sync {
    fn ask<'a>(
        &'a self,
        header: &'a str,
        message: &'a str,
        choices: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Option<usize>> + Send + 'a>>;

    fn ask_text<'a>(
        &'a self,
        header: &'a str,
        message: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;
}
