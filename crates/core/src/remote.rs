//! Optional waypoint server client.
//!
//! The engine never needs this; it is an alternative to local generation for
//! deployments that serve curated questions.

use std::collections::HashSet;

use geo_riddle_api_types::{POINT_PATH, PointDto, PointQuery};
use reqwest::Url;
use tracing::debug;

use crate::{
    geodesy::{Coordinate, GeoError},
    identifiers::WaypointId,
    riddle::{Question, RiddleError, Waypoint},
};

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Invalid base url: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Point {id} has an invalid location: {source}")]
    InvalidLocation { id: String, source: GeoError },

    #[error("Point {id} has an invalid question: {source}")]
    InvalidQuestion { id: String, source: RiddleError },

    #[error("Server returned {returned} points, expected {expected}")]
    WrongCount { expected: usize, returned: usize },

    #[error("Point {0} appears more than once")]
    DuplicateId(String),
}

#[derive(Clone, Debug)]
pub struct RemoteWaypointSource {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteWaypointSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn points_url(&self, origin: Coordinate, count: usize) -> Result<Url, RemoteError> {
        let endpoint = format!("{}{}", self.base_url.trim_end_matches('/'), POINT_PATH);

        let query = PointQuery {
            latitude: origin.latitude(),
            longitude: origin.longitude(),
            count,
        };

        Url::parse_with_params(&endpoint, query.pairs())
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))
    }

    /// Fetch `count` waypoints around `origin`. Either every point converts or the
    /// whole batch is rejected.
    pub async fn fetch(
        &self,
        origin: Coordinate,
        count: usize,
    ) -> Result<Vec<Waypoint>, RemoteError> {
        let url = self.points_url(origin, count)?;
        debug!(%url, "fetching waypoints");

        let points: Vec<PointDto> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        waypoints_from_dtos(points, count)
    }
}

/// Convert a server response into waypoints. The batch is rejected as a whole if
/// it has the wrong size, repeats an id or contains any invalid point.
pub fn waypoints_from_dtos(
    points: Vec<PointDto>,
    expected: usize,
) -> Result<Vec<Waypoint>, RemoteError> {
    if points.len() != expected {
        return Err(RemoteError::WrongCount {
            expected,
            returned: points.len(),
        });
    }

    let mut seen = HashSet::with_capacity(points.len());
    if let Some(point) = points.iter().find(|p| !seen.insert(p.id.as_str())) {
        return Err(RemoteError::DuplicateId(point.id.clone()));
    }

    points.into_iter().map(waypoint_from_dto).collect()
}

pub fn waypoint_from_dto(point: PointDto) -> Result<Waypoint, RemoteError> {
    let location = Coordinate::new(point.latitude, point.longitude).map_err(|source| {
        RemoteError::InvalidLocation {
            id: point.id.clone(),
            source,
        }
    })?;

    let question = Question::new(
        &point.question.text,
        point.question.answers,
        point.question.correct_index,
    )
    .map_err(|source| RemoteError::InvalidQuestion {
        id: point.id.clone(),
        source,
    })?;

    Ok(Waypoint::new(WaypointId::new(point.id), location, question))
}
