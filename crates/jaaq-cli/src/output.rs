//! Output formatting for CLI

use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use jaaq_core::{
    captions::{format_time, strip_tags, CaptionCue},
    manifest::VariantInfo,
    Collection, Video,
};
use serde::Serialize;
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Spinner shown on stderr while a request is in flight
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(template);
    }
    bar.set_message(message.into());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

pub fn heading(text: &str) {
    println!("{}", style(text).bold().cyan());
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {}", style(label).dim(), value);
}

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("  {}", style("(none)").dim());
        return;
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

pub fn print_video(video: &Video) {
    heading(video.title());
    field("id", &video.id);
    field("author", video.author().unwrap_or("-"));
    field("duration", format_time(video.duration));
    field("published", video.published);
    field("captions", if video.has_captions() { "yes" } else { "no" });
    field("url", &video.video_url);
    if !video.tags.is_empty() {
        field("tags", video.tags.join(", "));
    }
    if !video.description.is_empty() {
        println!();
        println!("{}", video.description);
    }
}

#[derive(Tabled)]
pub struct VideoRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Duration")]
    duration: String,
}

impl From<&Video> for VideoRow {
    fn from(video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            question: video.title().to_string(),
            author: video.author().unwrap_or("-").to_string(),
            duration: format_time(video.duration),
        }
    }
}

#[derive(Tabled)]
pub struct CollectionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Videos")]
    videos: usize,
}

impl From<&Collection> for CollectionRow {
    fn from(collection: &Collection) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            videos: collection.videos.len(),
        }
    }
}

#[derive(Tabled)]
pub struct CueRow {
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Text")]
    text: String,
}

impl From<&CaptionCue> for CueRow {
    fn from(cue: &CaptionCue) -> Self {
        Self {
            start: format!("{:.3}", cue.start),
            end: format!("{:.3}", cue.end),
            text: strip_tags(&cue.text).replace('\n', " "),
        }
    }
}

#[derive(Tabled)]
pub struct VariantRow {
    #[tabled(rename = "Quality")]
    quality: &'static str,
    #[tabled(rename = "Bandwidth")]
    bandwidth: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "URI")]
    uri: String,
}

impl From<&VariantInfo> for VariantRow {
    fn from(variant: &VariantInfo) -> Self {
        Self {
            quality: variant.quality_name(),
            bandwidth: format!("{:.2} Mbps", variant.bandwidth as f64 / 1_000_000.0),
            resolution: variant
                .resolution
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_else(|| "-".to_string()),
            uri: variant.uri.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_row() {
        let row = VariantRow::from(&VariantInfo {
            uri: "720p.m3u8".into(),
            bandwidth: 2_800_000,
            resolution: Some((1280, 720)),
            codecs: None,
            frame_rate: None,
        });
        assert_eq!(row.quality, "720p");
        assert_eq!(row.bandwidth, "2.80 Mbps");
        assert_eq!(row.resolution, "1280x720");
    }

    #[test]
    fn test_cue_row_strips_markup() {
        let row = CueRow::from(&CaptionCue::new(1.0, 3.5, "<v Sam>Hello\nthere</v>"));
        assert_eq!(row.text, "Hello there");
        assert_eq!(row.end, "3.500");
    }
}
