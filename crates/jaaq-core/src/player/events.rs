//! Player events and the listener registry

use crate::types::Video;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Video record fetched and applied
    Loaded(Arc<Video>),
    Play,
    Pause,
    /// Playback position in seconds
    TimeUpdate(f64),
    /// New volume between 0 and 1
    VolumeChange(f64),
    Ended,
    Error { code: &'static str, message: String },
    FullscreenChange(bool),
}

impl PlayerEvent {
    pub fn kind(&self) -> PlayerEventKind {
        match self {
            PlayerEvent::Loaded(_) => PlayerEventKind::Loaded,
            PlayerEvent::Play => PlayerEventKind::Play,
            PlayerEvent::Pause => PlayerEventKind::Pause,
            PlayerEvent::TimeUpdate(_) => PlayerEventKind::TimeUpdate,
            PlayerEvent::VolumeChange(_) => PlayerEventKind::VolumeChange,
            PlayerEvent::Ended => PlayerEventKind::Ended,
            PlayerEvent::Error { .. } => PlayerEventKind::Error,
            PlayerEvent::FullscreenChange(_) => PlayerEventKind::FullscreenChange,
        }
    }
}

/// Event names listeners subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerEventKind {
    Loaded,
    Play,
    Pause,
    TimeUpdate,
    VolumeChange,
    Ended,
    Error,
    FullscreenChange,
}

impl PlayerEventKind {
    pub const ALL: [PlayerEventKind; 8] = [
        PlayerEventKind::Loaded,
        PlayerEventKind::Play,
        PlayerEventKind::Pause,
        PlayerEventKind::TimeUpdate,
        PlayerEventKind::VolumeChange,
        PlayerEventKind::Ended,
        PlayerEventKind::Error,
        PlayerEventKind::FullscreenChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventKind::Loaded => "loaded",
            PlayerEventKind::Play => "play",
            PlayerEventKind::Pause => "pause",
            PlayerEventKind::TimeUpdate => "timeupdate",
            PlayerEventKind::VolumeChange => "volumechange",
            PlayerEventKind::Ended => "ended",
            PlayerEventKind::Error => "error",
            PlayerEventKind::FullscreenChange => "fullscreenchange",
        }
    }

    /// Look up a kind by its event name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for PlayerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Listener = Rc<dyn Fn(&PlayerEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<PlayerEventKind, Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&mut self, kind: PlayerEventKind, id: u64) -> bool {
        let Some(entries) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        before != entries.len()
    }
}

/// Per-player listener registry.
///
/// Emission iterates a snapshot of the listener list, so listeners may
/// subscribe or unsubscribe while an event is being delivered.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        kind: PlayerEventKind,
        listener: impl Fn(&PlayerEvent) + 'static,
    ) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .listeners
            .entry(kind)
            .or_default()
            .push((id, Rc::new(listener)));

        Subscription {
            id,
            kind,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Remove a listener; false if it was already gone
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.inner.borrow_mut().remove(subscription.kind, subscription.id)
    }

    pub fn emit(&self, event: &PlayerEvent) {
        let snapshot: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .get(&event.kind())
            .map(|entries| entries.iter().map(|(_, l)| Rc::clone(l)).collect())
            .unwrap_or_default();

        for listener in snapshot {
            listener(event);
        }
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    pub fn listener_count(&self, kind: PlayerEventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        let counts: HashMap<_, _> = registry
            .listeners
            .iter()
            .map(|(kind, entries)| (kind.as_str(), entries.len()))
            .collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

/// Handle returned by [`EventBus::subscribe`]; does not keep the player alive
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    kind: PlayerEventKind,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> PlayerEventKind {
        self.kind
    }

    /// Remove the listener; false if it or its player is gone
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow_mut().remove(self.kind, self.id))
    }
}
