use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use trail_core::model::{NodeId, Roadmap, RoadmapId, RoadmapNode};

use super::{BuiltinCatalog, RoadmapCatalog, sort_nodes};
use crate::error::CatalogError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Catalog backed by the roadmap HTTP API, with the builtin roadmaps as fallback.
///
/// Builtin roadmaps are answered locally; everything else goes to
/// `{base_url}/api/v1/...`. Any remote failure is logged and treated as
/// "no data", after which the builtin catalog answers.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
    fallback: BuiltinCatalog,
}

impl HttpCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidUrl` if `base_url` is not an absolute
    /// http(s) URL, or `CatalogError::Http` if the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed =
            Url::parse(trimmed).map_err(|_| CatalogError::InvalidUrl(base_url.to_owned()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidUrl(base_url.to_owned()));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: parsed,
            fallback: BuiltinCatalog::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `{base_url}/api/v1/` followed by `segments`, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CatalogError> {
        let url = self.endpoint(segments)?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CatalogError::Empty);
        }
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn fetch_or_log<T: DeserializeOwned>(&self, segments: &[&str]) -> Option<T> {
        match self.fetch(segments).await {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(path = %segments.join("/"), error = %err, "catalog request failed; using builtin data");
                None
            }
        }
    }
}

#[async_trait]
impl RoadmapCatalog for HttpCatalog {
    async fn list_roadmaps(&self) -> Vec<Roadmap> {
        match self.fetch_or_log::<Vec<Roadmap>>(&["roadmaps"]).await {
            Some(roadmaps) if !roadmaps.is_empty() => roadmaps,
            _ => self.fallback.list_roadmaps().await,
        }
    }

    async fn get_roadmap(&self, id: &RoadmapId) -> Option<Roadmap> {
        if let Some(roadmap) = self.fallback.get_roadmap(id).await {
            return Some(roadmap);
        }
        self.fetch_or_log(&["roadmaps", id.as_str()]).await
    }

    async fn list_nodes(&self, roadmap_id: &RoadmapId) -> Vec<RoadmapNode> {
        let builtin = self.fallback.list_nodes(roadmap_id).await;
        if !builtin.is_empty() {
            return builtin;
        }
        self.fetch_or_log(&["roadmaps", roadmap_id.as_str(), "nodes"])
            .await
            .map(sort_nodes)
            .unwrap_or_default()
    }

    async fn get_node(&self, id: &NodeId) -> Option<RoadmapNode> {
        if let Some(node) = self.fallback.get_node(id).await {
            return Some(node);
        }
        self.fetch_or_log(&["nodes", id.as_str()]).await
    }
}
