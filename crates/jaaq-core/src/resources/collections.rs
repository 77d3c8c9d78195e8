use super::encode_path_segment;
use crate::{http::HttpClient, types::Collection, Result};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

#[derive(Deserialize)]
struct CollectionEnvelope {
    collection: Collection,
}

#[derive(Deserialize)]
struct CollectionsEnvelope {
    collections: Vec<Collection>,
}

/// Accessor for `/collections`
#[derive(Debug, Clone)]
pub struct Collections {
    http: Arc<HttpClient>,
}

impl Collections {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// List every collection visible to the client
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Collection>> {
        let envelope: CollectionsEnvelope = self.http.get("/collections").await?;
        Ok(envelope.collections)
    }

    /// Fetch a single collection, including its videos
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Collection> {
        let path = format!("/collections/{}", encode_path_segment(id));
        let envelope: CollectionEnvelope = self.http.get(&path).await?;
        Ok(envelope.collection)
    }
}
