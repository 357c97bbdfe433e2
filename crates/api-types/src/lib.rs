//! Wire types for the waypoint endpoint.
//!
//! `GET /api/Point?latitude=..&longitude=..&count=..` answers with a JSON array
//! of [`PointDto`].

use serde::{Deserialize, Serialize};

/// Path of the waypoint endpoint, relative to the server base url.
pub const POINT_PATH: &str = "/api/Point";

/// Query parameters accepted by [`POINT_PATH`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

impl PointQuery {
    /// Query-string pairs in the order the server documents them.
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("count", self.count.to_string()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub text: String,
    pub answers: Vec<String>,
    pub correct_index: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointDto {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub question: QuestionDto,
}
