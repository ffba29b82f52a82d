use async_trait::async_trait;
use lifeline_core::types::{NetworkConfig, TagListingFormat};
use lifeline_core::{Error, Result, TagSource};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK};
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const SOURCE_NAME: &str = "registry tag listing";

/// Upper bound on followed `Link: rel="next"` pages
const MAX_PAGES: usize = 1000;

/// Client for reading the tag listing of a container registry repository
pub struct RegistryClient {
    client: reqwest::Client,
    tags_url: String,
    format: TagListingFormat,
    /// Bearer token sent with every listing request
    auth_token: Option<String>,
}

impl RegistryClient {
    /// Create a new registry client for a tag listing URL
    pub fn new(
        tags_url: impl Into<String>,
        format: TagListingFormat,
        network: &NetworkConfig,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .timeout(Duration::from_secs(network.http_timeout_secs))
            .build()
            .map_err(|e| {
                Error::source_unavailable(SOURCE_NAME, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            tags_url: tags_url.into(),
            format,
            auth_token: None,
        })
    }

    /// Set a bearer token for registries that require authentication
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn tags_url(&self) -> &str {
        &self.tags_url
    }

    pub fn format(&self) -> TagListingFormat {
        self.format
    }

    /// List every tag the registry hosts for the repository
    pub async fn list_tags(&self) -> Result<BTreeSet<String>> {
        let tags = match self.format {
            TagListingFormat::KeyMap => self.list_key_map_tags().await?,
            TagListingFormat::Distribution => self.list_distribution_tags().await?,
        };

        debug!("Registry lists {} tags at {}", tags.len(), self.tags_url);
        Ok(tags)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                Error::invalid_config("Registry token contains invalid header characters")
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("Listing tags from: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| {
                Error::source_unavailable(
                    SOURCE_NAME,
                    format!("failed to connect to registry at {}: {}", url, e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::source_unavailable(
                SOURCE_NAME,
                format!(
                    "registry returned {} for {}: {}",
                    status,
                    url,
                    if body.is_empty() {
                        "(no response body)".to_string()
                    } else {
                        body
                    }
                ),
            ));
        }

        Ok(response)
    }

    /// A single document mapping tag name to content hash
    async fn list_key_map_tags(&self) -> Result<BTreeSet<String>> {
        let body = self
            .get(&self.tags_url)
            .await?
            .text()
            .await
            .map_err(|e| Error::source_unavailable(SOURCE_NAME, e.to_string()))?;

        parse_key_map(&body)
    }

    /// OCI distribution `tags/list`, following `Link` pagination
    async fn list_distribution_tags(&self) -> Result<BTreeSet<String>> {
        let mut all_tags = BTreeSet::new();
        let mut url = self.tags_url.clone();

        for _ in 0..MAX_PAGES {
            let response = self.get(&url).await?;

            let next_url = response
                .headers()
                .get(LINK)
                .and_then(|h| h.to_str().ok())
                .and_then(|link| parse_link_header(link, &url));

            let page: TagsResponse = response.json().await.map_err(|e| {
                Error::source_unavailable(
                    SOURCE_NAME,
                    format!("failed to parse tags response from {}: {}", url, e),
                )
            })?;

            trace!("Page {} carried {} tags", url, page.tags.len());
            all_tags.extend(page.tags);

            match next_url {
                Some(next) => url = next,
                None => return Ok(all_tags),
            }
        }

        Err(Error::source_unavailable(
            SOURCE_NAME,
            format!("more than {} pages of tags at {}", MAX_PAGES, self.tags_url),
        ))
    }
}

#[async_trait]
impl TagSource for RegistryClient {
    fn describe(&self) -> String {
        format!("{} ({})", self.tags_url, self.format)
    }

    async fn fetch_tags(&self) -> Result<BTreeSet<String>> {
        self.list_tags().await
    }
}

/// Keys of a JSON/YAML mapping of tag name to content hash
///
/// Keys must be strings (JSON keys, or quoted YAML keys). An unquoted YAML
/// key such as `2.10` reads as a number and would no longer name the tag, so
/// the listing is rejected as malformed.
pub fn parse_key_map(body: &str) -> Result<BTreeSet<String>> {
    let document: Value = serde_yaml_ng::from_str(body).map_err(|e| {
        Error::source_unavailable(SOURCE_NAME, format!("malformed tag listing: {}", e))
    })?;

    let mapping = match document {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(BTreeSet::new()),
        _ => {
            return Err(Error::source_unavailable(
                SOURCE_NAME,
                "malformed tag listing: expected a mapping of tag to digest",
            ))
        }
    };

    mapping
        .into_iter()
        .map(|(key, _)| match key {
            Value::String(tag) => Ok(tag),
            other => Err(Error::source_unavailable(
                SOURCE_NAME,
                format!("malformed tag listing: non-string tag key {:?}", other),
            )),
        })
        .collect()
}

/// Parse Link header for pagination
/// Format: <https://registry.example.com/v2/repo/tags/list?n=100&last=tag>; rel="next"
fn parse_link_header(link: &str, current_url: &str) -> Option<String> {
    for part in link.split(',') {
        let part = part.trim();
        if part.contains("rel=\"next\"") {
            // Extract URL from <...>
            let start = part.find('<')?;
            let end = part.find('>')?;
            let target = &part[start + 1..end];
            // URL might be relative, resolve it against the current page
            return Url::parse(current_url)
                .and_then(|base| base.join(target))
                .map(|u| u.to_string())
                .ok();
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}
