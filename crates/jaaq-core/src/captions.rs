//! Caption parsing
//!
//! Parses the caption payload attached to a video into time-ranged cues.
//! The parser is lenient: it accepts WebVTT with or without the `WEBVTT`
//! header and SRT-style numbered cues, and it never fails.
//!
//! # Example
//!
//! ```rust
//! use jaaq_core::captions::{active_cue, parse_captions};
//!
//! let cues = parse_captions("00:00:01.000 --> 00:00:03.000\nHello");
//! assert_eq!(cues.len(), 1);
//! assert_eq!(active_cue(&cues, 2.0).map(|c| c.text.as_str()), Some("Hello"));
//! assert!(active_cue(&cues, 3.5).is_none());
//! ```

use serde::{Deserialize, Serialize};

/// A caption displayed between `start` and `end` (seconds, both inclusive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionCue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Check if the cue should be displayed at the given time
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Parse a caption payload into cues.
///
/// Each block is an optional identifier line, a `start --> end` timing line
/// and one or more text lines, terminated by a blank line. Malformed
/// timestamp components count as zero; blocks without text are dropped.
pub fn parse_captions(input: &str) -> Vec<CaptionCue> {
    let mut cues = Vec::new();
    let mut lines = input.lines().map(|l| l.trim_end_matches('\r')).peekable();

    // Header metadata runs until the first blank line
    if lines.peek().is_some_and(|l| l.trim_start_matches('\u{feff}').starts_with("WEBVTT")) {
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
        }
    }

    while lines.peek().is_some() {
        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }

        let Some(first_line) = lines.next() else {
            break;
        };

        if is_skipped_block(first_line) {
            for line in lines.by_ref() {
                if line.trim().is_empty() {
                    break;
                }
            }
            continue;
        }

        // Optional cue identifier before the timing line
        let timing_line = if first_line.contains("-->") {
            first_line
        } else {
            match lines.peek() {
                Some(next) if next.contains("-->") => lines.next().unwrap_or_default(),
                _ => {
                    skip_block(&mut lines);
                    continue;
                }
            }
        };

        let (start, end) = parse_timing_line(timing_line);

        let mut text = String::new();
        while let Some(line) = lines.next_if(|l| !l.trim().is_empty()) {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(line.trim());
        }

        if !text.is_empty() {
            cues.push(CaptionCue { start, end, text });
        }
    }

    cues
}

fn is_skipped_block(line: &str) -> bool {
    line.starts_with("NOTE") || line.starts_with("STYLE") || line.starts_with("REGION")
}

fn skip_block<'a>(lines: &mut impl Iterator<Item = &'a str>) {
    for line in lines {
        if line.trim().is_empty() {
            break;
        }
    }
}

/// Parse "00:00:01.000 --> 00:00:04.000 align:center", ignoring settings
fn parse_timing_line(line: &str) -> (f64, f64) {
    let (start, rest) = line.split_once("-->").unwrap_or((line, ""));
    let end = rest.split_whitespace().next().unwrap_or("");
    (parse_timestamp(start.trim()), parse_timestamp(end))
}

/// Parse `H:MM:SS.mmm` or `MM:SS.mmm` into seconds.
///
/// Components that fail to parse count as zero.
pub fn parse_timestamp(ts: &str) -> f64 {
    let component = |s: &str| -> f64 {
        s.trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    };

    let parts: Vec<&str> = ts.split(':').collect();
    match parts.as_slice() {
        [hours, minutes, seconds] => {
            component(hours) * 3600.0 + component(minutes) * 60.0 + component(seconds)
        }
        [minutes, seconds] => component(minutes) * 60.0 + component(seconds),
        [seconds] => component(seconds),
        _ => 0.0,
    }
}

/// First cue whose window contains `time`
pub fn active_cue(cues: &[CaptionCue], time: f64) -> Option<&CaptionCue> {
    cues.iter().find(|c| c.contains(time))
}

/// Strip `<...>` markup tags from cue text
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }

    result
}

/// Format seconds as `M:SS` for time displays
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
