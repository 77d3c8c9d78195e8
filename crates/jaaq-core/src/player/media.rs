//! Host seams: the media element, adaptive-streaming backend and view
//!
//! The engine never talks to a platform directly. Hosts implement these
//! traits and feed element and stream notifications back through
//! [`VideoPlayer::handle_media_event`](super::VideoPlayer::handle_media_event)
//! and [`VideoPlayer::handle_stream_event`](super::VideoPlayer::handle_stream_event).

use super::config::PlayerFeatures;
use crate::types::Video;
use crate::Result;

/// Platform media element (a `<video>` tag, a native decoder, a test fake)
pub trait MediaElement {
    /// Point the element at a URL, or detach it with `None`
    fn set_source(&mut self, url: Option<&str>);

    /// Start playback. Hosts report autoplay refusals as errors.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn set_current_time(&mut self, seconds: f64);

    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    /// Whether the element can play the MIME type natively
    fn can_play_type(&self, mime: &str) -> bool;

    /// Release platform resources after the player is destroyed
    fn release(&mut self) {}
}

/// Factory for adaptive-streaming attachments
pub trait StreamBackend {
    /// Whether adaptive streaming works in this environment
    fn is_supported(&self) -> bool;

    fn create(&self) -> Box<dyn StreamAttachment>;
}

/// A live adaptive-streaming session bound to the media element
pub trait StreamAttachment {
    fn load_source(&mut self, url: &str);

    fn attach_media(&mut self, media: &mut dyn MediaElement) -> Result<()>;

    fn destroy(&mut self);
}

/// Notifications from a stream attachment
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Manifest fetched and parsed, playback can start
    ManifestParsed,
    Error {
        fatal: bool,
        kind: String,
        details: String,
    },
}

/// Notifications from the media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    Play,
    Pause,
    TimeUpdate(f64),
    DurationChange(f64),
    VolumeChange { volume: f64, muted: bool },
    Ended,
    Error(String),
}

/// Rendering surface. Every method defaults to a no-op so headless hosts
/// implement nothing.
pub trait PlayerView {
    fn set_loading(&mut self, _loading: bool) {}

    fn show_error(&mut self, _message: &str) {}

    /// Display a caption, or hide the caption area with `None`
    fn show_caption(&mut self, _text: Option<&str>) {}

    /// Re-render chrome after a feature toggle
    fn apply_features(&mut self, _features: &PlayerFeatures) {}

    /// Render title, author and description for a freshly loaded video
    fn render_video(&mut self, _video: &Video, _features: &PlayerFeatures) {}

    /// Ask the host to enter or leave fullscreen. The outcome arrives
    /// through `handle_fullscreen_change`.
    fn request_fullscreen(&mut self, _enter: bool) {}
}

/// View that renders nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessView;

impl PlayerView for HeadlessView {}
