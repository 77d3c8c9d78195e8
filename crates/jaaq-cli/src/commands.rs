//! CLI command implementations

use crate::output::{self, CollectionRow, CueRow, OutputFormat, VariantRow, VideoRow};
use anyhow::Context;
use jaaq_core::{
    captions::{active_cue, parse_captions},
    manifest::{classify_source, PlaylistSummary, SourceKind},
    JaaqClient, Video,
};
use serde::Serialize;
use tracing::debug;

async fn fetch_video(client: &JaaqClient, id: &str) -> anyhow::Result<Video> {
    let spinner = output::spinner(format!("Fetching video {id}"));
    let result = client.videos.get_by_id(id).await;
    spinner.finish_and_clear();
    result.with_context(|| format!("failed to fetch video {id}"))
}

/// Show a video record
pub async fn video(client: &JaaqClient, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let video = fetch_video(client, id).await?;

    match format {
        OutputFormat::Json => output::print_json(&video),
        OutputFormat::Text => {
            output::print_video(&video);
            Ok(())
        }
    }
}

/// List collections
pub async fn collections(client: &JaaqClient, format: OutputFormat) -> anyhow::Result<()> {
    let spinner = output::spinner("Fetching collections");
    let result = client.collections.list().await;
    spinner.finish_and_clear();
    let collections = result.context("failed to list collections")?;

    match format {
        OutputFormat::Json => output::print_json(&collections),
        OutputFormat::Text => {
            output::heading(&format!("{} collections", collections.len()));
            output::print_table(collections.iter().map(CollectionRow::from).collect());
            Ok(())
        }
    }
}

/// Show a collection and its videos
pub async fn collection(client: &JaaqClient, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let spinner = output::spinner(format!("Fetching collection {id}"));
    let result = client.collections.get_by_id(id).await;
    spinner.finish_and_clear();
    let collection = result.with_context(|| format!("failed to fetch collection {id}"))?;

    match format {
        OutputFormat::Json => output::print_json(&collection),
        OutputFormat::Text => {
            output::heading(&collection.name);
            if !collection.description.is_empty() {
                println!("{}\n", collection.description);
            }
            output::print_table(collection.videos.iter().map(VideoRow::from).collect());
            Ok(())
        }
    }
}

/// Print caption cues, or the single cue active at `at`
pub async fn captions(
    client: &JaaqClient,
    id: &str,
    at: Option<f64>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let video = fetch_video(client, id).await?;
    let cues = video.subtitles.as_deref().map(parse_captions).unwrap_or_default();
    debug!(video_id = %video.id, cues = cues.len(), "Parsed captions");

    let selected = match at {
        Some(time) => active_cue(&cues, time).into_iter().collect(),
        None => cues.iter().collect::<Vec<_>>(),
    };

    match format {
        OutputFormat::Json => output::print_json(&selected),
        OutputFormat::Text => {
            if cues.is_empty() {
                println!("Video {} has no captions", video.id);
                return Ok(());
            }
            match at {
                Some(time) => output::heading(&format!("Caption at {time:.3}s")),
                None => output::heading(&format!("{} cues", cues.len())),
            }
            output::print_table(selected.into_iter().map(CueRow::from).collect());
            Ok(())
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Inspection {
    video_id: String,
    url: String,
    kind: SourceKind,
    playlist: Option<PlaylistSummary>,
}

/// Classify the media source and summarize HLS playlists
pub async fn inspect(client: &JaaqClient, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let video = fetch_video(client, id).await?;
    let kind = classify_source(&video.video_url);

    let playlist = if kind.is_adaptive() {
        let spinner = output::spinner("Fetching playlist");
        let result = fetch_playlist(&video.video_url).await;
        spinner.finish_and_clear();
        Some(result?)
    } else {
        None
    };

    let inspection = Inspection {
        video_id: video.id,
        url: video.video_url,
        kind,
        playlist,
    };

    match format {
        OutputFormat::Json => output::print_json(&inspection),
        OutputFormat::Text => {
            output::heading(&format!("Video {}", inspection.video_id));
            output::field("url", &inspection.url);
            output::field("kind", format!("{:?}", inspection.kind));

            match &inspection.playlist {
                Some(PlaylistSummary::Master { variants }) => {
                    output::field("variants", variants.len());
                    println!();
                    output::print_table(variants.iter().map(VariantRow::from).collect());
                }
                Some(PlaylistSummary::Media {
                    segments,
                    duration,
                    is_live,
                }) => {
                    output::field("segments", segments);
                    output::field("duration", format!("{duration:.1}s"));
                    output::field("live", is_live);
                }
                None => {}
            }
            Ok(())
        }
    }
}

async fn fetch_playlist(url: &str) -> anyhow::Result<PlaylistSummary> {
    let body = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes()
        .await
        .with_context(|| format!("failed to read playlist {url}"))?;
    Ok(PlaylistSummary::parse(&body)?)
}
