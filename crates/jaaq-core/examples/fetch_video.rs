//! Fetch a video record with credentials from the environment
//!
//! Run with: JAAQ_API_KEY=... JAAQ_CLIENT_ID=... cargo run -p jaaq-core --example fetch_video -- <video-id>

use jaaq_core::{create_client, SdkConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("jaaq_core=debug").init();

    let video_id = std::env::args().nth(1).ok_or("usage: fetch_video <video-id>")?;
    let client = create_client(SdkConfig::from_env()?)?;

    let video = client.videos.get_by_id(&video_id).await?;
    println!("{} ({:.0}s)", video.title(), video.duration);
    println!("  url: {}", video.video_url);
    println!("  captions: {}", if video.has_captions() { "yes" } else { "no" });

    Ok(())
}
