//! Wire records returned by the JAAQ API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Creator metadata attached to a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Creator {
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
}

/// A single answer video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Video {
    /// API identifier
    pub id: String,
    /// External (hosting) video identifier
    pub video_id: String,
    pub question_id: Option<String>,
    /// Question text, used as the video title
    pub question: String,
    pub status: Option<i64>,
    pub transcription: Option<String>,
    /// Raw caption payload (WebVTT or SRT text)
    pub subtitles: Option<String>,
    /// Raw creation timestamp; see [`Video::created`]
    pub created_at: Option<String>,
    pub modified_at: Option<String>,
    /// Playable media URL, either a direct file or an HLS playlist
    pub video_url: String,
    pub published: bool,
    pub tags: Vec<String>,
    pub severity: Option<i64>,
    /// Duration in seconds
    pub duration: f64,
    pub sub_topics: Vec<String>,
    pub description: String,
    pub creator: Option<Creator>,
}

impl Video {
    /// Display title for the video
    pub fn title(&self) -> &str {
        &self.question
    }

    /// Whether the video carries a non-empty caption payload
    pub fn has_captions(&self) -> bool {
        self.subtitles
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    /// Creator name, if any
    pub fn author(&self) -> Option<&str> {
        self.creator.as_ref().and_then(|c| c.name.as_deref())
    }

    /// Creation time, when the raw value is RFC 3339
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified_at.as_deref().and_then(parse_timestamp)
    }
}

/// An ordered, named group of videos
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub created_at: Option<String>,
    pub videos: Vec<Video>,
}

impl Collection {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Error body returned by the API on non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub description: String,
}
