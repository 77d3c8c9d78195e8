//! Playback source classification and HLS playlist summaries

use crate::{Error, Result};
use serde::Serialize;
use url::Url;

/// MIME type probed on media elements for native HLS playback
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// How a media URL has to be played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    /// HLS playlist, needs an adaptive-streaming attachment
    Hls,
    /// DASH manifest
    Dash,
    /// Plain file the media element can play directly
    Direct,
}

impl SourceKind {
    /// Whether the source needs an adaptive-streaming attachment
    pub fn is_adaptive(&self) -> bool {
        matches!(self, SourceKind::Hls)
    }
}

/// Classify a media URL by extension.
///
/// `.m3u8` anywhere in the URL marks an HLS source; other extensions are
/// matched against the path only.
pub fn classify_source(url: &str) -> SourceKind {
    let lower = url.to_lowercase();
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_else(|_| lower.clone());

    if lower.contains(".m3u8") || path.ends_with(".m3u") {
        SourceKind::Hls
    } else if path.ends_with(".mpd") {
        SourceKind::Dash
    } else {
        SourceKind::Direct
    }
}

/// One entry of an HLS master playlist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantInfo {
    pub uri: String,
    pub bandwidth: u64,
    pub resolution: Option<(u64, u64)>,
    pub codecs: Option<String>,
    pub frame_rate: Option<f64>,
}

impl VariantInfo {
    /// Quality tier name derived from the vertical resolution
    pub fn quality_name(&self) -> &'static str {
        match self.resolution.map(|(_, h)| h) {
            None => "audio",
            Some(0..=240) => "240p",
            Some(241..=360) => "360p",
            Some(361..=480) => "480p",
            Some(481..=720) => "720p",
            Some(721..=1080) => "1080p",
            Some(1081..=1440) => "1440p",
            Some(_) => "4K",
        }
    }
}

/// Summary of a parsed HLS playlist
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaylistSummary {
    /// Multivariant playlist, variants sorted by bandwidth
    Master { variants: Vec<VariantInfo> },
    /// Media playlist
    Media {
        segments: usize,
        duration: f64,
        is_live: bool,
    },
}

impl PlaylistSummary {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let playlist = m3u8_rs::parse_playlist_res(content)
            .map_err(|e| Error::ManifestParse(format!("{:?}", e)))?;

        Ok(match playlist {
            m3u8_rs::Playlist::MasterPlaylist(master) => {
                let mut variants: Vec<VariantInfo> = master
                    .variants
                    .iter()
                    .filter(|v| !v.is_i_frame)
                    .map(|v| VariantInfo {
                        uri: v.uri.clone(),
                        bandwidth: v.bandwidth,
                        resolution: v.resolution.as_ref().map(|r| (r.width, r.height)),
                        codecs: v.codecs.clone(),
                        frame_rate: v.frame_rate,
                    })
                    .collect();
                variants.sort_by_key(|v| v.bandwidth);
                PlaylistSummary::Master { variants }
            }
            m3u8_rs::Playlist::MediaPlaylist(media) => PlaylistSummary::Media {
                segments: media.segments.len(),
                duration: media.segments.iter().map(|s| s.duration as f64).sum(),
                is_live: !media.end_list,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_hls() {
        assert_eq!(classify_source("https://cdn.example.com/v/master.m3u8"), SourceKind::Hls);
        assert_eq!(
            classify_source("https://cdn.example.com/v/master.M3U8?token=1"),
            SourceKind::Hls
        );
        assert!(classify_source("/relative/index.m3u8").is_adaptive());
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify_source("https://cdn.example.com/manifest.mpd"), SourceKind::Dash);
        assert_eq!(classify_source("https://cdn.example.com/clip.mp4"), SourceKind::Direct);
        assert_eq!(classify_source("https://cdn.example.com/clip.mp4?f=.mpd"), SourceKind::Direct);
        assert_eq!(classify_source("https://cdn.example.com/play?src=a.m3u8"), SourceKind::Hls);
    }

    #[test]
    fn test_parse_master_playlist() {
        let master = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=2800000,RESOLUTION=1280x720,CODECS=\"avc1.4d401f,mp4a.40.2\"\n\
720p.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
360p.m3u8\n";

        let summary = PlaylistSummary::parse(master.as_bytes()).unwrap();
        match summary {
            PlaylistSummary::Master { variants } => {
                assert_eq!(variants.len(), 2);
                assert_eq!(variants[0].bandwidth, 800_000);
                assert_eq!(variants[0].quality_name(), "360p");
                assert_eq!(variants[1].resolution, Some((1280, 720)));
            }
            other => panic!("expected master playlist, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_media_playlist() {
        let media = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:6\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:6.0,\n\
seg0.ts\n\
#EXTINF:4.0,\n\
seg1.ts\n\
#EXT-X-ENDLIST\n";

        let summary = PlaylistSummary::parse(media.as_bytes()).unwrap();
        assert_eq!(
            summary,
            PlaylistSummary::Media {
                segments: 2,
                duration: 10.0,
                is_live: false
            }
        );
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(
            PlaylistSummary::parse(b"<html></html>"),
            Err(Error::ManifestParse(_))
        ));
    }
}
