//! Caption parsing example
//!
//! Demonstrates parsing a caption payload and selecting cues by time.
//!
//! Run with: cargo run -p jaaq-core --example captions

use jaaq_core::captions::{active_cue, format_time, parse_captions, strip_tags};

fn main() {
    println!("JAAQ Core - Caption Parsing Example");
    println!("===================================\n");

    let webvtt = r#"WEBVTT

NOTE Captions attached to a JAAQ answer video

intro
00:00:00.000 --> 00:00:03.000
Great question!

00:00:03.500 --> 00:00:07.000 align:center
Let's walk through
how pensions work.

00:00:08.000 --> 00:00:12.000
<v Sam>Start with your employer scheme.</v>
"#;

    let cues = parse_captions(webvtt);
    println!("Found {} cues:\n", cues.len());

    for (i, cue) in cues.iter().enumerate() {
        println!("Cue {}", i + 1);
        println!("  Time: {:.3}s -> {:.3}s", cue.start, cue.end);
        println!("  Text: {}", strip_tags(&cue.text).replace('\n', " | "));
    }

    println!("\nFinding cues at specific times:");
    for time in [0.5, 3.2, 5.0, 10.0] {
        match active_cue(&cues, time) {
            Some(cue) => println!(
                "  At {}: \"{}\"",
                format_time(time),
                strip_tags(&cue.text).replace('\n', " ")
            ),
            None => println!("  At {}: (no caption)", format_time(time)),
        }
    }

    // SRT-style payloads parse the same way
    let srt = "1\n00:00:00,000 --> 00:00:02,500\nHello\n\n\
               2\n00:00:03,000 --> 00:00:05,000\nWorld\n";
    let srt_cues = parse_captions(srt);
    println!("\nSRT payload: {} cues, first ends at {:.1}s", srt_cues.len(), srt_cues[0].end);
}
