use super::encode_path_segment;
use crate::{http::HttpClient, types::Video, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Deserialize)]
struct VideoEnvelope {
    video: Video,
}

/// Anything that can resolve a video id into a [`Video`] record.
///
/// The player depends on this trait rather than on [`Videos`] directly.
#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn get_by_id(&self, id: &str) -> Result<Video>;
}

/// Accessor for `/videos`
#[derive(Debug, Clone)]
pub struct Videos {
    http: Arc<HttpClient>,
}

impl Videos {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch a single video by id
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Video> {
        let path = format!("/videos/{}", encode_path_segment(id));
        let envelope: VideoEnvelope = self.http.get(&path).await?;
        Ok(envelope.video)
    }
}

#[async_trait]
impl VideoLookup for Videos {
    async fn get_by_id(&self, id: &str) -> Result<Video> {
        Videos::get_by_id(self, id).await
    }
}
