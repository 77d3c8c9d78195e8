//! Integration tests for the video player engine

use async_trait::async_trait;
use jaaq_core::player::{
    FeatureUpdate, LoadOutcome, MediaElement, MediaEvent, PlaybackPhase, PlayerConfig, PlayerEvent,
    PlayerEventKind, PlayerFeatures, PlayerSource, PlayerView, StreamAttachment, StreamBackend,
    StreamEvent, VideoPlayer, HLS_UNSUPPORTED,
};
use jaaq_core::{Error, Result, Video, VideoLookup};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

const CAPTIONS: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:03.000\nHello\n";

// =============================================================================
// Fakes
// =============================================================================

#[derive(Debug, Default)]
struct MediaLog {
    source: Option<String>,
    plays: usize,
    pauses: usize,
    current_time: f64,
    volume: f64,
    muted: bool,
    muted_at_play: Option<bool>,
    released: bool,
    native_hls: bool,
}

#[derive(Clone, Default)]
struct FakeMedia(Rc<RefCell<MediaLog>>);

impl FakeMedia {
    fn native_hls() -> Self {
        let media = Self::default();
        media.0.borrow_mut().native_hls = true;
        media
    }
}

impl MediaElement for FakeMedia {
    fn set_source(&mut self, url: Option<&str>) {
        self.0.borrow_mut().source = url.map(str::to_string);
    }

    fn play(&mut self) -> Result<()> {
        let mut log = self.0.borrow_mut();
        log.plays += 1;
        log.muted_at_play = Some(log.muted);
        Ok(())
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.0.borrow_mut().current_time = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.0.borrow_mut().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.borrow_mut().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.0.borrow().muted
    }

    fn can_play_type(&self, mime: &str) -> bool {
        self.0.borrow().native_hls && mime == "application/vnd.apple.mpegurl"
    }

    fn release(&mut self) {
        self.0.borrow_mut().released = true;
    }
}

#[derive(Debug, Default)]
struct StreamLog {
    created: usize,
    destroyed: usize,
    sources: Vec<String>,
    attached: usize,
}

#[derive(Clone, Default)]
struct FakeBackend(Rc<RefCell<StreamLog>>);

struct FakeAttachment(Rc<RefCell<StreamLog>>);

impl StreamBackend for FakeBackend {
    fn is_supported(&self) -> bool {
        true
    }

    fn create(&self) -> Box<dyn StreamAttachment> {
        self.0.borrow_mut().created += 1;
        Box::new(FakeAttachment(Rc::clone(&self.0)))
    }
}

impl StreamAttachment for FakeAttachment {
    fn load_source(&mut self, url: &str) {
        self.0.borrow_mut().sources.push(url.to_string());
    }

    fn attach_media(&mut self, _media: &mut dyn MediaElement) -> Result<()> {
        self.0.borrow_mut().attached += 1;
        Ok(())
    }

    fn destroy(&mut self) {
        self.0.borrow_mut().destroyed += 1;
    }
}

#[derive(Debug, Default)]
struct ViewLog {
    loading: Vec<bool>,
    errors: Vec<String>,
    captions: Vec<Option<String>>,
    features: Vec<PlayerFeatures>,
    rendered: Vec<String>,
    fullscreen_requests: Vec<bool>,
}

#[derive(Clone, Default)]
struct FakeView(Rc<RefCell<ViewLog>>);

impl PlayerView for FakeView {
    fn set_loading(&mut self, loading: bool) {
        self.0.borrow_mut().loading.push(loading);
    }

    fn show_error(&mut self, message: &str) {
        self.0.borrow_mut().errors.push(message.to_string());
    }

    fn show_caption(&mut self, text: Option<&str>) {
        self.0.borrow_mut().captions.push(text.map(str::to_string));
    }

    fn apply_features(&mut self, features: &PlayerFeatures) {
        self.0.borrow_mut().features.push(*features);
    }

    fn render_video(&mut self, video: &Video, _features: &PlayerFeatures) {
        self.0.borrow_mut().rendered.push(video.id.clone());
    }

    fn request_fullscreen(&mut self, enter: bool) {
        self.0.borrow_mut().fullscreen_requests.push(enter);
    }
}

struct StaticLookup(HashMap<String, Video>);

#[async_trait]
impl VideoLookup for StaticLookup {
    async fn get_by_id(&self, id: &str) -> Result<Video> {
        self.0
            .get(id)
            .cloned()
            .ok_or_else(|| Error::http(404, "", "Not Found"))
    }
}

fn video(id: &str, url: &str) -> Video {
    Video {
        id: id.to_string(),
        question: format!("Question {id}"),
        video_url: url.to_string(),
        subtitles: Some(CAPTIONS.to_string()),
        duration: 42.5,
        ..Default::default()
    }
}

fn mp4(id: &str) -> Video {
    video(id, &format!("https://cdn.example.com/{id}.mp4"))
}

fn hls(id: &str) -> Video {
    video(id, &format!("https://cdn.example.com/{id}/master.m3u8"))
}

struct Harness {
    player: VideoPlayer,
    media: FakeMedia,
    stream: FakeBackend,
    view: FakeView,
}

fn harness(config: PlayerConfig) -> Harness {
    harness_with_media(config, FakeMedia::default())
}

fn harness_with_media(config: PlayerConfig, media: FakeMedia) -> Harness {
    let stream = FakeBackend::default();
    let view = FakeView::default();
    let player = VideoPlayer::new(config, media.clone())
        .with_stream_backend(stream.clone())
        .with_view(view.clone());
    Harness {
        player,
        media,
        stream,
        view,
    }
}

fn load_now(player: &mut VideoPlayer, video: Video) -> Result<LoadOutcome> {
    let ticket = player.begin_load(video.clone())?;
    player.complete_load(ticket, Ok(video))
}

fn record_events(player: &VideoPlayer, kind: PlayerEventKind) -> Rc<RefCell<Vec<PlayerEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    player.on(kind, move |event| sink.borrow_mut().push(event.clone()));
    seen
}

// =============================================================================
// Loading Tests
// =============================================================================

#[test]
fn test_direct_source_is_ready_immediately() {
    let mut h = harness(PlayerConfig::default());
    let loaded = record_events(&h.player, PlayerEventKind::Loaded);

    let outcome = load_now(&mut h.player, mp4("abc")).unwrap();

    assert_eq!(outcome, LoadOutcome::Ready);
    assert_eq!(h.player.state().phase, PlaybackPhase::Ready);
    assert!(!h.player.state().is_loading);
    assert_eq!(h.player.state().duration, 42.5);
    assert_eq!(h.media.0.borrow().source.as_deref(), Some("https://cdn.example.com/abc.mp4"));
    assert_eq!(h.view.0.borrow().rendered, vec!["abc".to_string()]);
    assert_eq!(h.view.0.borrow().loading, vec![true, false]);
    assert_eq!(h.player.cues().len(), 1);
    assert_eq!(h.stream.0.borrow().created, 0);

    let loaded = loaded.borrow();
    assert!(matches!(&loaded[..], [PlayerEvent::Loaded(v)] if v.id == "abc"));
}

#[test]
fn test_hls_source_waits_for_manifest() {
    let mut h = harness(PlayerConfig::default());

    let outcome = load_now(&mut h.player, hls("abc")).unwrap();
    assert_eq!(outcome, LoadOutcome::AwaitingManifest);
    assert_eq!(h.player.state().phase, PlaybackPhase::Loading);
    assert!(h.player.has_attachment());
    {
        let stream = h.stream.0.borrow();
        assert_eq!(stream.sources, vec!["https://cdn.example.com/abc/master.m3u8".to_string()]);
        assert_eq!(stream.attached, 1);
    }

    let generation = h.player.generation();
    h.player.handle_stream_event(generation, StreamEvent::ManifestParsed);

    assert_eq!(h.player.state().phase, PlaybackPhase::Ready);
    assert!(!h.player.state().is_loading);
}

#[test]
fn test_native_hls_fallback() {
    let media = FakeMedia::native_hls();
    let mut player = VideoPlayer::new(PlayerConfig::default(), media.clone());

    let outcome = load_now(&mut player, hls("abc")).unwrap();

    assert_eq!(outcome, LoadOutcome::Ready);
    assert_eq!(
        media.0.borrow().source.as_deref(),
        Some("https://cdn.example.com/abc/master.m3u8")
    );
}

#[test]
fn test_hls_unsupported_everywhere() {
    let view = FakeView::default();
    let mut player =
        VideoPlayer::new(PlayerConfig::default(), FakeMedia::default()).with_view(view.clone());
    let errors = record_events(&player, PlayerEventKind::Error);

    let err = load_now(&mut player, hls("abc")).unwrap_err();

    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert_eq!(err.to_string(), HLS_UNSUPPORTED);
    assert_eq!(player.state().phase, PlaybackPhase::Error);
    assert_eq!(player.state().error.as_deref(), Some(HLS_UNSUPPORTED));
    assert_eq!(view.0.borrow().errors, vec![HLS_UNSUPPORTED.to_string()]);
    assert_eq!(errors.borrow().len(), 1);
}

#[test]
fn test_reload_replaces_attachment() {
    let mut h = harness(PlayerConfig::default());

    load_now(&mut h.player, hls("first")).unwrap();
    load_now(&mut h.player, hls("second")).unwrap();

    let stream = h.stream.0.borrow();
    assert_eq!(stream.created, 2);
    assert_eq!(stream.destroyed, 1);
    assert!(h.player.has_attachment());
}

#[test]
fn test_stale_load_is_discarded() {
    let mut h = harness(PlayerConfig::default());

    let first = h.player.begin_load(mp4("first")).unwrap();
    let second = h.player.begin_load(mp4("second")).unwrap();
    assert!(second.generation() > first.generation());

    let outcome = h.player.complete_load(first, Ok(mp4("first"))).unwrap();
    assert_eq!(outcome, LoadOutcome::Stale);
    assert!(h.player.state().video.is_none());
    assert_eq!(h.player.state().phase, PlaybackPhase::Loading);

    let outcome = h.player.complete_load(second, Ok(mp4("second"))).unwrap();
    assert_eq!(outcome, LoadOutcome::Ready);
    assert_eq!(h.player.state().video.as_ref().map(|v| v.id.as_str()), Some("second"));
    assert_eq!(h.view.0.borrow().rendered, vec!["second".to_string()]);
}

#[test]
fn test_stale_stream_events_are_ignored() {
    let mut h = harness(PlayerConfig::default());

    load_now(&mut h.player, hls("first")).unwrap();
    let old_generation = h.player.generation();
    load_now(&mut h.player, hls("second")).unwrap();

    h.player.handle_stream_event(old_generation, StreamEvent::ManifestParsed);
    assert_eq!(h.player.state().phase, PlaybackPhase::Loading);

    let fatal = StreamEvent::Error {
        fatal: true,
        kind: "networkError".into(),
        details: "manifestLoadError".into(),
    };
    h.player.handle_stream_event(old_generation, fatal);
    assert!(h.player.state().error.is_none());
}

#[tokio::test]
async fn test_load_by_id_through_lookup() {
    let lookup = StaticLookup(HashMap::from([("abc".to_string(), mp4("abc"))]));
    let mut player = VideoPlayer::new(PlayerConfig::default(), FakeMedia::default())
        .with_videos(Arc::new(lookup));

    assert_eq!(player.load("abc").await.unwrap(), LoadOutcome::Ready);
    assert_eq!(player.state().video.as_ref().map(|v| v.title()), Some("Question abc"));

    let err = player.load(PlayerSource::from("missing")).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(player.state().phase, PlaybackPhase::Error);
    assert_eq!(player.state().error.as_deref(), Some("HTTP 404: Not Found"));

    // A fresh load recovers from the error
    assert_eq!(player.load("abc").await.unwrap(), LoadOutcome::Ready);
    assert!(player.state().error.is_none());
}

#[test]
fn test_load_by_id_requires_lookup() {
    let mut player = VideoPlayer::new(PlayerConfig::default(), FakeMedia::default());
    let err = player.begin_load("abc").unwrap_err();
    assert!(matches!(err, Error::InvalidConfig(_)));
    assert_eq!(player.state().phase, PlaybackPhase::Idle);
}

#[test]
fn test_autoplay_starts_when_ready() {
    let mut h = harness(PlayerConfig::default().with_autoplay(true));

    load_now(&mut h.player, hls("abc")).unwrap();
    assert_eq!(h.media.0.borrow().plays, 0);

    let generation = h.player.generation();
    h.player.handle_stream_event(generation, StreamEvent::ManifestParsed);
    assert_eq!(h.media.0.borrow().plays, 1);
}

// =============================================================================
// Stream Error Tests
// =============================================================================

#[test]
fn test_fatal_stream_error() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, hls("abc")).unwrap();

    let generation = h.player.generation();
    h.player.handle_stream_event(
        generation,
        StreamEvent::Error {
            fatal: true,
            kind: "networkError".into(),
            details: "manifestLoadError".into(),
        },
    );

    assert_eq!(h.player.state().phase, PlaybackPhase::Error);
    assert_eq!(
        h.player.state().error.as_deref(),
        Some("HLS Error: networkError - manifestLoadError")
    );
}

#[test]
fn test_non_fatal_stream_error_is_only_logged() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, hls("abc")).unwrap();

    let generation = h.player.generation();
    h.player.handle_stream_event(
        generation,
        StreamEvent::Error {
            fatal: false,
            kind: "mediaError".into(),
            details: "bufferStalledError".into(),
        },
    );

    assert_eq!(h.player.state().phase, PlaybackPhase::Loading);
    assert!(h.player.state().error.is_none());
    assert!(h.view.0.borrow().errors.is_empty());
}

// =============================================================================
// Control Tests
// =============================================================================

#[test]
fn test_play_requires_a_loaded_video() {
    let mut h = harness(PlayerConfig::default());
    assert!(matches!(
        h.player.play(),
        Err(Error::InvalidStateTransition { .. })
    ));
    assert_eq!(h.media.0.borrow().plays, 0);
}

#[test]
fn test_media_events_drive_state() {
    let mut h = harness(PlayerConfig::default());
    let plays = record_events(&h.player, PlayerEventKind::Play);
    load_now(&mut h.player, mp4("abc")).unwrap();

    h.player.play().unwrap();
    h.player.handle_media_event(MediaEvent::Play);
    assert!(h.player.state().is_playing);
    assert_eq!(h.player.state().phase, PlaybackPhase::Playing);

    h.player.toggle_play().unwrap();
    assert_eq!(h.media.0.borrow().pauses, 1);
    h.player.handle_media_event(MediaEvent::Pause);
    assert_eq!(h.player.state().phase, PlaybackPhase::Paused);

    h.player.handle_media_event(MediaEvent::Play);
    h.player.handle_media_event(MediaEvent::Ended);
    assert_eq!(h.player.state().phase, PlaybackPhase::Ended);
    assert!(!h.player.state().is_playing);
    assert_eq!(plays.borrow().len(), 2);
}

#[test]
fn test_seek_clamps_to_duration() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, mp4("abc")).unwrap();

    assert_eq!(h.player.seek(100.0).unwrap(), 42.5);
    assert_eq!(h.media.0.borrow().current_time, 42.5);

    assert_eq!(h.player.seek(-5.0).unwrap(), 0.0);
    assert_eq!(h.player.seek(f64::NAN).unwrap(), 0.0);

    h.player.handle_media_event(MediaEvent::DurationChange(60.0));
    assert_eq!(h.player.seek(55.0).unwrap(), 55.0);
    assert_eq!(h.player.state().current_time, 55.0);
}

#[test]
fn test_seek_after_end_pauses() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, mp4("abc")).unwrap();
    h.player.handle_media_event(MediaEvent::Play);
    h.player.handle_media_event(MediaEvent::Ended);

    h.player.seek(10.0).unwrap();
    assert_eq!(h.player.state().phase, PlaybackPhase::Paused);
}

#[test]
fn test_volume_is_clamped_and_zero_mutes() {
    let mut h = harness(PlayerConfig::default());

    h.player.set_volume(1.5).unwrap();
    assert_eq!(h.media.0.borrow().volume, 1.0);
    assert!(!h.player.state().is_muted);

    h.player.set_volume(0.0).unwrap();
    assert!(h.media.0.borrow().muted);
    assert!(h.player.state().is_muted);

    h.player.set_volume(0.4).unwrap();
    assert_eq!(h.player.state().volume, 0.4);
    assert!(!h.player.state().is_muted);

    assert!(h.player.toggle_mute().unwrap());
    assert!(h.media.0.borrow().muted);
    assert!(!h.player.toggle_mute().unwrap());
}

#[test]
fn test_start_muted_mutes_before_play() {
    let features = PlayerFeatures {
        start_muted: true,
        ..Default::default()
    };
    let mut h = harness(PlayerConfig::default().with_features(features));
    load_now(&mut h.player, mp4("abc")).unwrap();

    h.player.play().unwrap();

    assert_eq!(h.media.0.borrow().muted_at_play, Some(true));
    assert!(h.player.state().is_muted);
}

#[test]
fn test_captions_follow_playback_time() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, mp4("abc")).unwrap();

    h.player.handle_media_event(MediaEvent::TimeUpdate(2.0));
    assert!(h.player.state().caption_text.is_none());

    assert!(h.player.toggle_captions().unwrap());
    assert_eq!(h.player.state().caption_text.as_deref(), Some("Hello"));

    h.player.handle_media_event(MediaEvent::TimeUpdate(3.5));
    assert!(h.player.state().caption_text.is_none());

    h.player.handle_media_event(MediaEvent::TimeUpdate(2.5));
    assert!(!h.player.toggle_captions().unwrap());
    assert!(h.player.state().caption_text.is_none());

    let view = h.view.0.borrow();
    let captions = &view.captions;
    assert_eq!(
        captions[captions.len() - 4..],
        [Some("Hello".to_string()), None, Some("Hello".to_string()), None]
    );
}

#[test]
fn test_set_features_leaves_playback_alone() {
    let mut h = harness(PlayerConfig::default());
    load_now(&mut h.player, mp4("abc")).unwrap();
    h.player.play().unwrap();
    h.player.handle_media_event(MediaEvent::Play);
    h.player.handle_media_event(MediaEvent::TimeUpdate(10.0));

    let before = h.player.state().clone();
    let plays_before = h.media.0.borrow().plays;

    h.player
        .set_features(FeatureUpdate {
            show_logo: Some(false),
            controls: Some(false),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(*h.player.state(), before);
    let (Some(now), Some(then)) = (&h.player.state().video, &before.video) else {
        panic!("video should stay loaded");
    };
    assert!(Arc::ptr_eq(now, then));
    assert_eq!(h.media.0.borrow().plays, plays_before);
    assert!(!h.player.features().show_logo);
    assert!(!h.player.features().controls);
    assert!(h.player.features().show_title);
    assert_eq!(h.view.0.borrow().features.len(), 1);

    // Unchanged flags do not re-render
    h.player
        .set_features(FeatureUpdate {
            show_logo: Some(false),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(h.view.0.borrow().features.len(), 1);
}

#[test]
fn test_fullscreen_round_trip() {
    let mut h = harness(PlayerConfig::default());
    let changes = record_events(&h.player, PlayerEventKind::FullscreenChange);

    h.player.toggle_fullscreen().unwrap();
    assert_eq!(h.view.0.borrow().fullscreen_requests, vec![true]);
    assert!(!h.player.state().is_fullscreen);

    h.player.handle_fullscreen_change(true);
    assert!(h.player.state().is_fullscreen);

    h.player.toggle_fullscreen().unwrap();
    assert_eq!(h.view.0.borrow().fullscreen_requests, vec![true, false]);
    assert_eq!(*changes.borrow(), vec![PlayerEvent::FullscreenChange(true)]);
}

// =============================================================================
// Event Tests
// =============================================================================

#[test]
fn test_off_stops_delivery() {
    let mut h = harness(PlayerConfig::default());
    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    let subscription = h.player.on(PlayerEventKind::TimeUpdate, move |event| {
        if let PlayerEvent::TimeUpdate(t) = event {
            sink.borrow_mut().push(*t);
        }
    });

    h.player.handle_media_event(MediaEvent::TimeUpdate(1.0));
    assert!(h.player.off(&subscription));
    h.player.handle_media_event(MediaEvent::TimeUpdate(2.0));

    assert_eq!(*updates.borrow(), vec![1.0]);
    assert!(!subscription.unsubscribe());
}

#[test]
fn test_volume_events_report_element_state() {
    let mut h = harness(PlayerConfig::default());
    let changes = record_events(&h.player, PlayerEventKind::VolumeChange);

    h.player.handle_media_event(MediaEvent::VolumeChange {
        volume: 0.25,
        muted: true,
    });

    assert_eq!(h.player.state().volume, 0.25);
    assert!(h.player.state().is_muted);
    assert_eq!(*changes.borrow(), vec![PlayerEvent::VolumeChange(0.25)]);
}

// =============================================================================
// Teardown Tests
// =============================================================================

#[test]
fn test_destroy_is_idempotent() {
    let mut h = harness(PlayerConfig::default());
    let plays = record_events(&h.player, PlayerEventKind::Play);
    load_now(&mut h.player, hls("abc")).unwrap();

    h.player.destroy();
    h.player.destroy();

    assert!(h.player.is_destroyed());
    assert!(!h.player.has_attachment());
    assert_eq!(h.stream.0.borrow().destroyed, 1);
    {
        let media = h.media.0.borrow();
        assert!(media.released);
        assert!(media.source.is_none());
    }

    h.player.handle_media_event(MediaEvent::Play);
    assert!(plays.borrow().is_empty());
    assert!(matches!(h.player.play(), Err(Error::PlayerDestroyed)));
    assert!(matches!(h.player.seek(1.0), Err(Error::PlayerDestroyed)));
    assert!(matches!(h.player.begin_load(mp4("x")), Err(Error::PlayerDestroyed)));
}

#[test]
fn test_load_resolving_after_destroy_is_stale() {
    let mut h = harness(PlayerConfig::default());
    let ticket = h.player.begin_load(mp4("abc")).unwrap();
    h.player.destroy();

    let outcome = h.player.complete_load(ticket, Ok(mp4("abc"))).unwrap();
    assert_eq!(outcome, LoadOutcome::Stale);
    assert!(h.media.0.borrow().source.is_none());
}

#[test]
fn test_drop_tears_down_attachment() {
    let stream = FakeBackend::default();
    {
        let mut player = VideoPlayer::new(PlayerConfig::default(), FakeMedia::default())
            .with_stream_backend(stream.clone());
        load_now(&mut player, hls("abc")).unwrap();
    }
    assert_eq!(stream.0.borrow().destroyed, 1);
}
