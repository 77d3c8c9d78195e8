//! Declarative embedding adapter
//!
//! Maps element attributes (`video-id`, `api-key`, `show-logo`, ...) onto
//! [`SdkConfig`] and [`PlayerConfig`], classifies attribute changes after
//! mount, and keeps mounted players in an explicit [`PlayerRegistry`].

use crate::{
    client::SdkConfig,
    player::{FeatureUpdate, PlayerConfig, PlayerFeatures, VideoPlayer},
    Error, Result,
};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Attributes read from an embedding element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerAttributes {
    pub video_id: Option<String>,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub base_url: Option<String>,
    pub autoplay: bool,
    pub controls: bool,
    pub show_logo: bool,
    pub show_title: bool,
    pub show_author: bool,
    pub show_description: bool,
    pub show_captions: bool,
    pub start_muted: bool,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl PlayerAttributes {
    /// Read attributes from `(name, value)` pairs. Names may carry the
    /// `data-` prefix used by auto-initialised markup.
    pub fn from_attributes<I, N, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let values: HashMap<String, String> = attributes
            .into_iter()
            .map(|(name, value)| {
                (normalize_name(name.as_ref()).to_string(), value.as_ref().to_string())
            })
            .collect();
        let text = |name: &str| values.get(name).filter(|v| !v.is_empty()).cloned();
        let on_unless_false = |name: &str| values.get(name).map_or(true, |v| v != "false");
        let on_when_present = |name: &str| values.get(name).is_some_and(|v| v != "false");

        Self {
            video_id: text("video-id"),
            api_key: text("api-key"),
            client_id: text("client-id"),
            base_url: text("base-url"),
            autoplay: on_when_present("autoplay"),
            controls: on_unless_false("controls"),
            show_logo: on_unless_false("show-logo"),
            show_title: on_unless_false("show-title"),
            show_author: on_unless_false("show-author"),
            show_description: on_unless_false("show-description"),
            show_captions: on_unless_false("show-captions"),
            start_muted: on_when_present("start-muted"),
            width: text("width"),
            height: text("height"),
        }
    }

    /// The required video id
    pub fn video_id(&self) -> Result<&str> {
        self.video_id
            .as_deref()
            .ok_or_else(|| Error::InvalidConfig("missing required attribute video-id".into()))
    }

    /// SDK configuration; fails when credentials are missing
    pub fn sdk_config(&self) -> Result<SdkConfig> {
        let (Some(api_key), Some(client_id)) = (&self.api_key, &self.client_id) else {
            return Err(Error::InvalidConfig(
                "missing required attributes api-key and client-id".into(),
            ));
        };

        let config = SdkConfig::new(api_key.as_str(), client_id.as_str());
        Ok(match &self.base_url {
            Some(base_url) => config.with_base_url(base_url.as_str()),
            None => config,
        })
    }

    pub fn features(&self) -> PlayerFeatures {
        PlayerFeatures {
            controls: self.controls,
            show_logo: self.show_logo,
            show_title: self.show_title,
            show_author: self.show_author,
            show_description: self.show_description,
            show_captions: self.show_captions,
            start_muted: self.start_muted,
        }
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig::default()
            .with_autoplay(self.autoplay)
            .with_features(self.features())
    }

    /// Container size, defaulting to `100%` by `auto`
    pub fn dimensions(&self) -> (&str, &str) {
        (
            self.width.as_deref().unwrap_or("100%"),
            self.height.as_deref().unwrap_or("auto"),
        )
    }
}

/// What a mounted player should do after an attribute changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeAction {
    /// Destroy and re-create the player
    Reload,
    /// Apply a live feature update
    SetFeatures(FeatureUpdate),
    /// Restyle the container
    Resize,
    Ignore,
}

/// Decide how to react to an attribute change. `new` is `None` when the
/// attribute was removed.
pub fn classify_attribute_change(
    name: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> AttributeAction {
    if old == new {
        return AttributeAction::Ignore;
    }

    let flag = new.map_or(true, |v| v != "false");
    let update = |set: fn(&mut FeatureUpdate, bool)| {
        let mut update = FeatureUpdate::default();
        set(&mut update, flag);
        AttributeAction::SetFeatures(update)
    };

    let action = match normalize_name(name) {
        "video-id" | "api-key" | "client-id" | "base-url" => AttributeAction::Reload,
        "width" | "height" => AttributeAction::Resize,
        "controls" => update(|u, v| u.controls = Some(v)),
        "show-logo" => update(|u, v| u.show_logo = Some(v)),
        "show-title" => update(|u, v| u.show_title = Some(v)),
        "show-author" => update(|u, v| u.show_author = Some(v)),
        "show-description" => update(|u, v| u.show_description = Some(v)),
        "show-captions" => update(|u, v| u.show_captions = Some(v)),
        "start-muted" => AttributeAction::SetFeatures(FeatureUpdate {
            start_muted: Some(new.is_some_and(|v| v != "false")),
            ..Default::default()
        }),
        _ => AttributeAction::Ignore,
    };

    debug!(attribute = name, ?action, "Attribute changed");
    action
}

fn normalize_name(name: &str) -> &str {
    name.strip_prefix("data-").unwrap_or(name)
}

/// Players keyed by mount identity
#[derive(Debug)]
pub struct PlayerRegistry<K> {
    players: HashMap<K, VideoPlayer>,
}

impl<K: Eq + Hash> Default for PlayerRegistry<K> {
    fn default() -> Self {
        Self {
            players: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> PlayerRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player, destroying any player it replaces
    pub fn insert(&mut self, key: K, player: VideoPlayer) {
        if let Some(mut previous) = self.players.insert(key, player) {
            previous.destroy();
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.players.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&VideoPlayer> {
        self.players.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut VideoPlayer> {
        self.players.get_mut(key)
    }

    /// Unregister and destroy a player; false if none was mounted
    pub fn remove(&mut self, key: &K) -> bool {
        match self.players.remove(key) {
            Some(mut player) => {
                player.destroy();
                true
            }
            None => false,
        }
    }

    pub fn destroy_all(&mut self) {
        for (_, mut player) in self.players.drain() {
            player.destroy();
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
