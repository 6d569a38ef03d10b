//! Data models for the face gateway

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Bounding box of a detected face, in pixel coordinates.
///
/// `left`/`top` is the upper-left corner; the box extends to
/// `(left + width, top + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// A single detected face.
///
/// The detection API returns more per-face fields (tokens, attributes);
/// only the rectangle is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub face_rectangle: FaceRectangle,
}

/// Result of a successful detection call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Identifier for the image, assigned by the detection service or
    /// generated locally when the service omits it
    pub image_id: String,

    /// Upstream request identifier
    pub request_id: String,

    /// Upstream processing time in milliseconds
    pub time_used: u64,

    /// Detected faces, in upstream order
    pub faces: Vec<Face>,
}

/// Persisted detection record, keyed by `image_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Primary key, immutable once created
    pub image_id: String,

    /// Detected faces, replaced wholesale on update
    pub faces: Vec<Face>,

    /// Upstream request identifier of the detection that produced `faces`
    pub request_id: String,

    /// Upstream processing time in milliseconds
    pub time_used: u64,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Create a new record from a detection result
    pub fn from_detection(detection: &Detection) -> Self {
        let now = Utc::now();
        Self {
            image_id: detection.image_id.clone(),
            faces: detection.faces.clone(),
            request_id: detection.request_id.clone(),
            time_used: detection.time_used,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place, refreshing `updated_at` and leaving
    /// `image_id` and `created_at` untouched
    pub fn apply(&mut self, update: &RecordUpdate) {
        self.faces = update.faces.clone();
        self.request_id = update.request_id.clone();
        self.time_used = update.time_used;
        self.updated_at = Utc::now();
    }
}

/// The replaceable field subset of an [`ImageRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub faces: Vec<Face>,
    pub request_id: String,
    pub time_used: u64,
}

impl From<&Detection> for RecordUpdate {
    fn from(detection: &Detection) -> Self {
        Self {
            faces: detection.faces.clone(),
            request_id: detection.request_id.clone(),
            time_used: detection.time_used,
        }
    }
}

/// Supported annotation colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxColor {
    Red,
    Green,
    Blue,
}

impl FromStr for BoxColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(BoxColor::Red),
            "green" => Ok(BoxColor::Green),
            "blue" => Ok(BoxColor::Blue),
            other => Err(Error::InvalidArgument(format!(
                "unsupported color '{other}', expected red, green or blue"
            ))),
        }
    }
}

impl fmt::Display for BoxColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoxColor::Red => "red",
            BoxColor::Green => "green",
            BoxColor::Blue => "blue",
        };
        f.write_str(name)
    }
}
