//! Player configuration

use crate::types::Video;
use serde::{Deserialize, Serialize};

/// Toggleable UI features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerFeatures {
    pub controls: bool,
    pub show_logo: bool,
    pub show_title: bool,
    pub show_author: bool,
    pub show_description: bool,
    pub show_captions: bool,
    /// Mute before playback starts
    pub start_muted: bool,
}

impl Default for PlayerFeatures {
    fn default() -> Self {
        Self {
            controls: true,
            show_logo: true,
            show_title: true,
            show_author: true,
            show_description: true,
            show_captions: true,
            start_muted: false,
        }
    }
}

/// Partial feature update; `None` leaves a flag unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureUpdate {
    pub controls: Option<bool>,
    pub show_logo: Option<bool>,
    pub show_title: Option<bool>,
    pub show_author: Option<bool>,
    pub show_description: Option<bool>,
    pub show_captions: Option<bool>,
    pub start_muted: Option<bool>,
}

impl FeatureUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `features`, returning true if anything changed
    pub fn apply_to(&self, features: &mut PlayerFeatures) -> bool {
        let before = *features;
        let fields = [
            (self.controls, &mut features.controls),
            (self.show_logo, &mut features.show_logo),
            (self.show_title, &mut features.show_title),
            (self.show_author, &mut features.show_author),
            (self.show_description, &mut features.show_description),
            (self.show_captions, &mut features.show_captions),
            (self.start_muted, &mut features.start_muted),
        ];
        for (update, flag) in fields {
            if let Some(value) = update {
                *flag = value;
            }
        }
        before != *features
    }
}

/// Player configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Start playback as soon as the source is ready
    pub autoplay: bool,
    pub features: PlayerFeatures,
}

impl PlayerConfig {
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_features(mut self, features: PlayerFeatures) -> Self {
        self.features = features;
        self
    }
}

/// What to load: an id fetched through the API, or a record already in hand
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerSource {
    Id(String),
    Video(Video),
}

impl PlayerSource {
    pub fn video_id(&self) -> &str {
        match self {
            PlayerSource::Id(id) => id,
            PlayerSource::Video(video) => &video.id,
        }
    }
}

impl From<&str> for PlayerSource {
    fn from(id: &str) -> Self {
        PlayerSource::Id(id.to_string())
    }
}

impl From<String> for PlayerSource {
    fn from(id: String) -> Self {
        PlayerSource::Id(id)
    }
}

impl From<Video> for PlayerSource {
    fn from(video: Video) -> Self {
        PlayerSource::Video(video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_defaults() {
        let features = PlayerFeatures::default();
        assert!(features.controls && features.show_captions);
        assert!(!features.start_muted);
    }

    #[test]
    fn test_feature_update_is_partial() {
        let mut features = PlayerFeatures::default();
        let update = FeatureUpdate {
            show_logo: Some(false),
            ..Default::default()
        };

        assert!(update.apply_to(&mut features));
        assert!(!features.show_logo);
        assert!(features.show_title);

        // Re-applying is a no-op
        assert!(!update.apply_to(&mut features));
        assert!(FeatureUpdate::default().is_empty());
    }

    #[test]
    fn test_config_deserializes_partial_features() {
        let config: PlayerConfig =
            serde_json::from_str(r#"{"autoplay":true,"features":{"showLogo":false}}"#).unwrap();
        assert!(config.autoplay);
        assert!(!config.features.show_logo);
        assert!(config.features.controls);
    }
}
