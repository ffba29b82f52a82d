use lifeline_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container image reference with registry, repository, and tag/digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry hostname (e.g., "quay.io", "localhost:5000")
    pub registry: String,
    /// Repository path (e.g., "astronomer/ap-airflow")
    pub repository: String,
    /// Tag (e.g., "2.3.0-4") - mutually exclusive with digest
    pub tag: Option<String>,
    /// Digest (e.g., "sha256:abc123...") - mutually exclusive with tag
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parse an image reference string like "quay.io/astronomer/ap-airflow:2.3.0-4"
    ///
    /// A reference without a tag or digest stays untagged; it names the
    /// repository that tags are appended to.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::invalid_config("Image reference must not be empty"));
        }

        // Split by @ for digest references
        let (image_part, digest) = match s.split_once('@') {
            Some((before, after)) => (before, Some(after.to_string())),
            None => (s, None),
        };

        // A ':' after the last '/' separates the tag; earlier ones belong to a registry port
        let last_slash = image_part.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (name, tag) = match image_part[last_slash..].rfind(':') {
            Some(idx) if digest.is_none() => {
                let split = last_slash + idx;
                (&image_part[..split], Some(image_part[split + 1..].to_string()))
            }
            _ => (image_part, None),
        };

        // The first component is a registry host if it looks like one
        let (registry, repository) = match name.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (first.to_string(), rest.to_string())
            }
            _ => ("docker.io".to_string(), name.to_string()),
        };

        if repository.is_empty() || tag.as_deref() == Some("") || digest.as_deref() == Some("") {
            return Err(Error::invalid_config(format!(
                "Invalid image reference: {}",
                s
            )));
        }

        Ok(Self {
            registry,
            repository,
            tag,
            digest,
        })
    }

    /// The same repository pinned to `tag`
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        Self {
            registry: self.registry.clone(),
            repository: self.repository.clone(),
            tag: Some(tag.into()),
            digest: None,
        }
    }

    /// `registry/repository` without tag or digest
    pub fn name(&self) -> String {
        format!("{}/{}", self.registry, self.repository)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = self.name();
        if let Some(digest) = &self.digest {
            write!(f, "{}@{}", base, digest)
        } else if let Some(tag) = &self.tag {
            write!(f, "{}:{}", base, tag)
        } else {
            write!(f, "{}", base)
        }
    }
}
