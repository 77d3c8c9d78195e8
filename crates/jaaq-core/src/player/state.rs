//! Player state machine and observable state

use crate::types::Video;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Player state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackPhase {
    /// Nothing loaded yet
    Idle,
    /// Fetching the video record or waiting for the stream manifest
    Loading,
    /// Source attached, playback not started
    Ready,
    Playing,
    Paused,
    Ended,
    /// Load or playback failed; a fresh load recovers
    Error,
    /// Torn down, terminal
    Destroyed,
}

impl PlaybackPhase {
    /// Check if transition to target phase is valid
    pub fn can_transition_to(&self, target: PlaybackPhase) -> bool {
        use PlaybackPhase::*;
        match (self, target) {
            (Destroyed, _) => false,
            // Teardown and fresh loads are reachable from anywhere else
            (_, Destroyed) | (_, Loading) => true,
            _ => matches!(
                (self, target),
                (Loading, Ready) | (Loading, Error) |
                (Ready, Playing) | (Ready, Paused) | (Ready, Error) |
                (Playing, Paused) | (Playing, Ended) | (Playing, Error) |
                (Paused, Playing) | (Paused, Ended) | (Paused, Error) |
                (Ended, Playing) | (Ended, Paused)
            ),
        }
    }

    /// True once a source is attached and playback controls apply
    pub fn has_source(&self) -> bool {
        matches!(
            self,
            PlaybackPhase::Ready
                | PlaybackPhase::Playing
                | PlaybackPhase::Paused
                | PlaybackPhase::Ended
        )
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackPhase::Idle => write!(f, "idle"),
            PlaybackPhase::Loading => write!(f, "loading"),
            PlaybackPhase::Ready => write!(f, "ready"),
            PlaybackPhase::Playing => write!(f, "playing"),
            PlaybackPhase::Paused => write!(f, "paused"),
            PlaybackPhase::Ended => write!(f, "ended"),
            PlaybackPhase::Error => write!(f, "error"),
            PlaybackPhase::Destroyed => write!(f, "destroyed"),
        }
    }
}

/// Snapshot of everything a UI needs to render the player
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub phase: PlaybackPhase,
    pub is_playing: bool,
    /// Playback position in seconds
    pub current_time: f64,
    /// Duration in seconds, 0 until known
    pub duration: f64,
    /// Volume between 0 and 1
    pub volume: f64,
    pub is_muted: bool,
    pub is_fullscreen: bool,
    pub is_loading: bool,
    pub error: Option<String>,
    /// The loaded video record
    pub video: Option<Arc<Video>>,
    pub captions_enabled: bool,
    /// Caption currently on screen
    pub caption_text: Option<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            volume: 1.0,
            is_muted: false,
            is_fullscreen: false,
            is_loading: false,
            error: None,
            video: None,
            captions_enabled: false,
            caption_text: None,
        }
    }
}
