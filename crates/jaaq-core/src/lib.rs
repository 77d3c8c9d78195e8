//! JAAQ Core - API client and video player engine for JAAQ
//!
//! This crate provides:
//! - An HTTP request core with pluggable transports
//! - Typed accessors for videos and collections
//! - A client facade built from [`SdkConfig`]
//! - A caption parser for WebVTT and SRT-style payloads
//! - A host-agnostic video player engine
//! - A declarative embedding adapter
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           JAAQ Core                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  SdkConfig   │─▶│  JaaqClient  │─▶│  Resources   │           │
//! │  └──────────────┘  └──────────────┘  │ videos/colls │           │
//! │                                      └──────┬───────┘           │
//! │                                             │                   │
//! │                                      ┌──────┴───────┐           │
//! │                                      │  HttpClient  │           │
//! │                                      │  Transport   │           │
//! │                                      └──────────────┘           │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Embed     │─▶│ VideoPlayer  │◀─│   Captions   │           │
//! │  │   Adapter    │  │    Engine    │  │    Parser    │           │
//! │  └──────────────┘  └──────┬───────┘  └──────────────┘           │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │  Manifest   │                              │
//! │                    │  (HLS sniff)│                              │
//! │                    └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod http;
pub mod resources;
pub mod client;
pub mod captions;
pub mod manifest;
pub mod player;
pub mod embed;

pub use error::{Error, Result};
pub use types::*;
pub use http::{HttpClient, HttpClientConfig, Transport};
pub use resources::{Collections, VideoLookup, Videos};
pub use client::{create_client, JaaqClient, SdkConfig};
pub use captions::{parse_captions, CaptionCue};
pub use player::{
    PlayerConfig, PlayerEvent, PlayerEventKind, PlayerFeatures, PlayerState, VideoPlayer,
};
pub use embed::{AttributeAction, PlayerAttributes, PlayerRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version once at startup
pub fn init() {
    tracing::info!(version = VERSION, "JAAQ Core initialized");
}
