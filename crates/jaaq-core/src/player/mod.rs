//! Embeddable video player engine
//!
//! ```text
//!   host ──MediaEvent──────▶ ┌─────────────┐ ──PlayerEvent──▶ listeners
//!   host ──StreamEvent─────▶ │ VideoPlayer │ ──render──────▶ PlayerView
//!   API  ◀──VideoLookup───── └─────────────┘ ──control─────▶ MediaElement
//!                                   │
//!                                   └──attach──▶ StreamAttachment (HLS)
//! ```
//!
//! The engine is single-threaded: it owns its element, attachment and view,
//! and hosts deliver notifications by calling its `handle_*` methods.

mod config;
mod engine;
mod events;
mod media;
mod state;

pub use config::{FeatureUpdate, PlayerConfig, PlayerFeatures, PlayerSource};
pub use engine::{LoadOutcome, LoadTicket, VideoPlayer, HLS_UNSUPPORTED};
pub use events::{EventBus, PlayerEvent, PlayerEventKind, Subscription};
pub use media::{
    HeadlessView, MediaElement, MediaEvent, PlayerView, StreamAttachment, StreamBackend,
    StreamEvent,
};
pub use state::{PlaybackPhase, PlayerState};
