//! Release catalog fetching

use crate::feed::{parse_catalog, SOURCE_NAME};
use async_trait::async_trait;
use lifeline_core::types::{CatalogConfig, NetworkConfig};
use lifeline_core::{Error, Release, ReleaseSource, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Fetches and parses the published release catalog
pub struct CatalogClient {
    /// HTTP client
    client: reqwest::Client,

    /// Catalog document URL
    url: String,

    /// Top-level key holding the release list
    releases_key: String,
}

impl CatalogClient {
    /// Create a catalog client from configuration
    pub fn new(catalog: &CatalogConfig, network: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .timeout(Duration::from_secs(network.http_timeout_secs))
            .build()
            .map_err(|e| {
                Error::source_unavailable(SOURCE_NAME, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            url: catalog.url.clone(),
            releases_key: catalog.releases_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the raw catalog document
    pub async fn fetch_document(&self) -> Result<String> {
        debug!("Fetching release catalog from: {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::source_unavailable(
                SOURCE_NAME,
                format!("failed to fetch {}: {}", self.url, e),
            )
        })?;

        if !response.status().is_success() {
            return Err(Error::source_unavailable(
                SOURCE_NAME,
                format!("{} returned {}", self.url, response.status()),
            ));
        }

        response.text().await.map_err(|e| {
            Error::source_unavailable(
                SOURCE_NAME,
                format!("failed to read body of {}: {}", self.url, e),
            )
        })
    }

    /// Fetch and parse every release in the catalog
    pub async fn list_releases(&self) -> Result<Vec<Release>> {
        let content = self.fetch_document().await?;
        let releases = parse_catalog(&content, &self.releases_key)?;
        info!("Release catalog lists {} releases", releases.len());
        Ok(releases)
    }
}

#[async_trait]
impl ReleaseSource for CatalogClient {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_releases(&self) -> Result<Vec<Release>> {
        self.list_releases().await
    }
}
