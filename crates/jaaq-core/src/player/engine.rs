//! Video player engine - orchestrates loading, playback and captions
//!
//! Coordinates:
//! - Video record resolution through the API
//! - Source attachment (adaptive stream or direct)
//! - State machine transitions
//! - Caption cue selection
//! - Event emission

use super::{
    config::{FeatureUpdate, PlayerConfig, PlayerFeatures, PlayerSource},
    events::{EventBus, PlayerEvent, PlayerEventKind, Subscription},
    media::{
        HeadlessView, MediaElement, MediaEvent, PlayerView, StreamAttachment, StreamBackend,
        StreamEvent,
    },
    state::{PlaybackPhase, PlayerState},
};
use crate::{
    captions::{active_cue, parse_captions, CaptionCue},
    manifest::{classify_source, HLS_MIME_TYPE},
    resources::VideoLookup,
    types::Video,
    Error, Result,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Message shown when neither an attachment nor the element can play HLS
pub const HLS_UNSUPPORTED: &str = "HLS is not supported in this environment";

/// Token identifying one load request.
///
/// Only the ticket from the most recent [`VideoPlayer::begin_load`] is
/// accepted by [`VideoPlayer::complete_load`]; earlier ones are stale.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    source: PlayerSource,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn video_id(&self) -> &str {
        self.source.video_id()
    }

    /// Fetch the video record this ticket refers to
    pub async fn resolve(&self, videos: Option<&dyn VideoLookup>) -> Result<Video> {
        match (&self.source, videos) {
            (PlayerSource::Video(video), _) => Ok(video.clone()),
            (PlayerSource::Id(id), Some(videos)) => videos.get_by_id(id).await,
            (PlayerSource::Id(_), None) => Err(no_lookup()),
        }
    }
}

/// Result of completing a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Source attached directly, player is ready
    Ready,
    /// Adaptive stream attached, waiting for [`StreamEvent::ManifestParsed`]
    AwaitingManifest,
    /// A newer load superseded this one, or the player was destroyed
    Stale,
}

/// Single-owner video player bound to one media element
pub struct VideoPlayer {
    config: PlayerConfig,
    videos: Option<Arc<dyn VideoLookup>>,
    media: Box<dyn MediaElement>,
    stream_backend: Option<Box<dyn StreamBackend>>,
    attachment: Option<Box<dyn StreamAttachment>>,
    view: Box<dyn PlayerView>,
    state: PlayerState,
    cues: Vec<CaptionCue>,
    events: EventBus,
    /// Incremented on every load and on destroy
    generation: u64,
}

impl VideoPlayer {
    pub fn new(config: PlayerConfig, media: impl MediaElement + 'static) -> Self {
        Self {
            config,
            videos: None,
            media: Box::new(media),
            stream_backend: None,
            attachment: None,
            view: Box::new(HeadlessView),
            state: PlayerState::default(),
            cues: Vec::new(),
            events: EventBus::new(),
            generation: 0,
        }
    }

    /// Resolve video ids through this lookup (usually `client.videos`)
    pub fn with_videos(mut self, videos: Arc<dyn VideoLookup>) -> Self {
        self.videos = Some(videos);
        self
    }

    pub fn with_stream_backend(mut self, backend: impl StreamBackend + 'static) -> Self {
        self.stream_backend = Some(Box::new(backend));
        self
    }

    pub fn with_view(mut self, view: impl PlayerView + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    /// Snapshot of the observable state
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn features(&self) -> &PlayerFeatures {
        &self.config.features
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Parsed caption cues of the loaded video
    pub fn cues(&self) -> &[CaptionCue] {
        &self.cues
    }

    /// Current load generation, passed back with stream events
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn video_lookup(&self) -> Option<Arc<dyn VideoLookup>> {
        self.videos.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.phase == PlaybackPhase::Destroyed
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Fetch and load a video in one step
    #[instrument(skip(self, source))]
    pub async fn load(&mut self, source: impl Into<PlayerSource>) -> Result<LoadOutcome> {
        let ticket = self.begin_load(source)?;
        let videos = self.videos.clone();
        let result = ticket.resolve(videos.as_deref()).await;
        self.complete_load(ticket, result)
    }

    /// Start a load: tear down the previous source and enter the loading phase.
    ///
    /// Resolve the returned ticket and hand the result to
    /// [`complete_load`](Self::complete_load).
    pub fn begin_load(&mut self, source: impl Into<PlayerSource>) -> Result<LoadTicket> {
        self.ensure_alive()?;
        let source = source.into();
        if matches!(source, PlayerSource::Id(_)) && self.videos.is_none() {
            return Err(no_lookup());
        }

        self.generation += 1;
        self.teardown_attachment();
        if self.state.is_playing {
            self.media.pause();
        }

        self.cues.clear();
        self.state = PlayerState {
            phase: self.state.phase,
            volume: self.state.volume,
            is_muted: self.state.is_muted,
            is_fullscreen: self.state.is_fullscreen,
            captions_enabled: self.state.captions_enabled,
            is_loading: true,
            ..PlayerState::default()
        };
        self.set_phase(PlaybackPhase::Loading)?;
        self.view.set_loading(true);
        self.view.show_caption(None);

        info!(video_id = source.video_id(), generation = self.generation, "Loading video");

        Ok(LoadTicket {
            generation: self.generation,
            source,
        })
    }

    /// Apply a resolved video record. Results for superseded tickets are
    /// discarded without touching state.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Video>,
    ) -> Result<LoadOutcome> {
        if self.is_destroyed() || ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "Discarding stale load result"
            );
            return Ok(LoadOutcome::Stale);
        }

        let video = match result {
            Ok(video) => Arc::new(video),
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        self.cues = video.subtitles.as_deref().map(parse_captions).unwrap_or_default();
        if video.duration.is_finite() && video.duration > 0.0 {
            self.state.duration = video.duration;
        }
        self.state.video = Some(Arc::clone(&video));
        self.view.render_video(&video, &self.config.features);

        debug!(video_id = %video.id, cues = self.cues.len(), "Video record applied");
        self.events.emit(&PlayerEvent::Loaded(Arc::clone(&video)));

        match self.attach_source(&video.video_url) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn attach_source(&mut self, url: &str) -> Result<LoadOutcome> {
        if !classify_source(url).is_adaptive() {
            self.media.set_source(Some(url));
            self.mark_ready();
            return Ok(LoadOutcome::Ready);
        }

        let attachment = self
            .stream_backend
            .as_ref()
            .filter(|backend| backend.is_supported())
            .map(|backend| backend.create());

        if let Some(mut attachment) = attachment {
            self.teardown_attachment();
            attachment.load_source(url);
            if let Err(e) = attachment.attach_media(self.media.as_mut()) {
                attachment.destroy();
                return Err(e);
            }
            self.attachment = Some(attachment);
            debug!(url, "Stream attachment created");
            Ok(LoadOutcome::AwaitingManifest)
        } else if self.media.can_play_type(HLS_MIME_TYPE) {
            self.media.set_source(Some(url));
            self.mark_ready();
            Ok(LoadOutcome::Ready)
        } else {
            Err(Error::UnsupportedFormat(HLS_UNSUPPORTED.to_string()))
        }
    }

    fn mark_ready(&mut self) {
        self.state.is_loading = false;
        self.view.set_loading(false);
        if let Err(e) = self.set_phase(PlaybackPhase::Ready) {
            debug!(error = %e, "Skipping ready transition");
            return;
        }

        if self.config.autoplay {
            if let Err(e) = self.play() {
                warn!(error = %e, "Autoplay failed");
            }
        }
    }

    fn teardown_attachment(&mut self) {
        if let Some(mut attachment) = self.attachment.take() {
            attachment.destroy();
            debug!("Stream attachment destroyed");
        }
    }

    fn fail(&mut self, err: &Error) {
        let message = err.to_string();
        warn!(code = err.error_code(), error = %message, "Player error");

        self.state.error = Some(message.clone());
        self.state.is_loading = false;
        if let Err(e) = self.set_phase(PlaybackPhase::Error) {
            debug!(error = %e, "Skipping error transition");
        }
        self.view.set_loading(false);
        self.view.show_error(&message);
        self.events.emit(&PlayerEvent::Error {
            code: err.error_code(),
            message,
        });
    }

    // ========================================================================
    // Host notifications
    // ========================================================================

    /// Feed a stream attachment notification. `generation` is the value of
    /// [`generation`](Self::generation) when the attachment was created.
    pub fn handle_stream_event(&mut self, generation: u64, event: StreamEvent) {
        if self.is_destroyed() || generation != self.generation || self.attachment.is_none() {
            debug!(generation, current = self.generation, ?event, "Ignoring stream event");
            return;
        }

        match event {
            StreamEvent::ManifestParsed => {
                if self.state.phase == PlaybackPhase::Loading {
                    self.mark_ready();
                }
            }
            StreamEvent::Error { fatal: true, kind, details } => {
                self.fail(&Error::Stream { kind, details });
            }
            StreamEvent::Error { fatal: false, kind, details } => {
                warn!(kind = %kind, details = %details, "Non-fatal stream error");
            }
        }
    }

    /// Feed a media element notification
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.is_destroyed() {
            return;
        }

        match event {
            MediaEvent::Play => {
                self.state.is_playing = true;
                self.follow_phase(PlaybackPhase::Playing);
                self.events.emit(&PlayerEvent::Play);
            }
            MediaEvent::Pause => {
                self.state.is_playing = false;
                self.follow_phase(PlaybackPhase::Paused);
                self.events.emit(&PlayerEvent::Pause);
            }
            MediaEvent::TimeUpdate(time) => {
                self.state.current_time = time;
                self.update_caption();
                self.events.emit(&PlayerEvent::TimeUpdate(time));
            }
            MediaEvent::DurationChange(duration) => {
                if duration.is_finite() && duration >= 0.0 {
                    self.state.duration = duration;
                }
            }
            MediaEvent::VolumeChange { volume, muted } => {
                self.state.volume = volume;
                self.state.is_muted = muted;
                self.events.emit(&PlayerEvent::VolumeChange(volume));
            }
            MediaEvent::Ended => {
                self.state.is_playing = false;
                self.follow_phase(PlaybackPhase::Ended);
                self.events.emit(&PlayerEvent::Ended);
            }
            MediaEvent::Error(message) => self.fail(&Error::Media(message)),
        }
    }

    /// Record the outcome of a fullscreen request
    pub fn handle_fullscreen_change(&mut self, is_fullscreen: bool) {
        if self.is_destroyed() {
            return;
        }
        self.state.is_fullscreen = is_fullscreen;
        self.events.emit(&PlayerEvent::FullscreenChange(is_fullscreen));
    }

    // ========================================================================
    // Controls
    // ========================================================================

    pub fn play(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.state.video.is_none() {
            return Err(Error::InvalidStateTransition {
                from: self.state.phase.to_string(),
                to: PlaybackPhase::Playing.to_string(),
            });
        }

        if self.config.features.start_muted && !self.media.is_muted() {
            self.media.set_muted(true);
            self.state.is_muted = true;
        }
        self.media.play()
    }

    pub fn pause(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.media.pause();
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<()> {
        if self.state.is_playing {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek to `time`, clamped to `[0, duration]`. Returns the applied time.
    pub fn seek(&mut self, time: f64) -> Result<f64> {
        self.ensure_alive()?;
        let max = if self.state.duration.is_finite() {
            self.state.duration.max(0.0)
        } else {
            0.0
        };
        let target = if time.is_nan() { 0.0 } else { time.clamp(0.0, max) };

        self.media.set_current_time(target);
        self.state.current_time = target;
        if self.state.phase == PlaybackPhase::Ended && target < max {
            self.follow_phase(PlaybackPhase::Paused);
        }
        self.update_caption();
        Ok(target)
    }

    /// Set volume, clamped to `[0, 1]`. Zero mutes.
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.ensure_alive()?;
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let muted = volume == 0.0;

        self.media.set_volume(volume);
        self.media.set_muted(muted);
        self.state.volume = volume;
        self.state.is_muted = muted;
        Ok(())
    }

    pub fn toggle_mute(&mut self) -> Result<bool> {
        self.ensure_alive()?;
        let muted = !self.media.is_muted();
        self.media.set_muted(muted);
        self.state.is_muted = muted;
        Ok(muted)
    }

    /// Flip caption display, returning the new setting
    pub fn toggle_captions(&mut self) -> Result<bool> {
        self.ensure_alive()?;
        self.state.captions_enabled = !self.state.captions_enabled;
        if self.state.captions_enabled {
            self.update_caption();
        } else if self.state.caption_text.take().is_some() {
            self.view.show_caption(None);
        }
        Ok(self.state.captions_enabled)
    }

    /// Ask the view to enter or leave fullscreen
    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.view.request_fullscreen(!self.state.is_fullscreen);
        Ok(())
    }

    /// Update UI features. Playback, position and the loaded video are untouched.
    pub fn set_features(&mut self, update: FeatureUpdate) -> Result<()> {
        self.ensure_alive()?;
        if update.apply_to(&mut self.config.features) {
            debug!(features = ?self.config.features, "Features updated");
            self.view.apply_features(&self.config.features);
        }
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn on(
        &self,
        kind: PlayerEventKind,
        listener: impl Fn(&PlayerEvent) + 'static,
    ) -> Subscription {
        self.events.subscribe(kind, listener)
    }

    pub fn off(&self, subscription: &Subscription) -> bool {
        self.events.unsubscribe(subscription)
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Tear down the attachment, release the element and drop all listeners.
    /// Calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }

        self.generation += 1;
        self.teardown_attachment();
        self.media.pause();
        self.media.set_source(None);
        self.media.release();
        self.events.clear();
        self.cues.clear();

        let from = self.state.phase;
        self.state.phase = PlaybackPhase::Destroyed;
        self.state.is_playing = false;
        self.state.is_loading = false;
        self.state.caption_text = None;

        info!(from = %from, "Player destroyed");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            Err(Error::PlayerDestroyed)
        } else {
            Ok(())
        }
    }

    fn set_phase(&mut self, next: PlaybackPhase) -> Result<()> {
        let current = self.state.phase;
        if current == next {
            return Ok(());
        }
        if !current.can_transition_to(next) {
            return Err(Error::InvalidStateTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        self.state.phase = next;
        info!(from = %current, to = %next, "State transition");
        Ok(())
    }

    /// Follow a phase reported by the element, ignoring impossible ones
    fn follow_phase(&mut self, next: PlaybackPhase) {
        if let Err(e) = self.set_phase(next) {
            debug!(error = %e, "Ignoring element-reported transition");
        }
    }

    fn update_caption(&mut self) {
        if !self.state.captions_enabled {
            return;
        }

        let text = active_cue(&self.cues, self.state.current_time).map(|cue| cue.text.clone());
        if text != self.state.caption_text {
            self.view.show_caption(text.as_deref());
            self.state.caption_text = text;
        }
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cues", &self.cues.len())
            .field("attachment", &self.attachment.is_some())
            .field("generation", &self.generation)
            .field("events", &self.events)
            .finish()
    }
}

fn no_lookup() -> Error {
    Error::InvalidConfig("loading by id requires a video lookup; call with_videos".into())
}
