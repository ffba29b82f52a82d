//! Resolution pipeline
//!
//! fetch catalog → fetch registry listing → resolve → validate → format.
//! Both remote inputs are injected as trait objects and the end-of-life
//! table is an owned value, so a run is a pure function of its inputs and
//! `now`. Any failure aborts the run with no partial result.

use crate::graph::ReleaseGraph;
use chrono::{DateTime, Utc};
use lifeline_core::{MinorLine, ReleaseSource, Result, TagSource};
use lifeline_policy::{EolTable, SupportPolicy};
use lifeline_registry::{missing_tags, validate, ImageReference};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a resolution run
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    /// Fully-qualified image references, one per tag, sorted by tag
    pub images: Vec<String>,
    /// Resolved tags, sorted and de-duplicated
    pub tags: Vec<String>,
    /// Minor lines currently in support
    pub supported_lines: Vec<MinorLine>,
    /// Number of releases in the catalog
    pub catalog_size: usize,
    /// Number of immutable releases the resolution considered
    pub immutable_releases: usize,
    /// Whether the tags were cross-checked against the registry
    pub registry_checked: bool,
}

/// Orchestrates one resolution run
pub struct ResolutionPipeline {
    releases: Box<dyn ReleaseSource>,
    registry: Option<Box<dyn TagSource>>,
    eol_table: EolTable,
    policy: SupportPolicy,
    image: ImageReference,
}

impl ResolutionPipeline {
    /// Create a pipeline emitting references to `image`
    ///
    /// Without a tag source the registry cross-check is skipped; call
    /// [`ResolutionPipeline::with_registry`] to enable it.
    pub fn new(releases: Box<dyn ReleaseSource>, image: ImageReference) -> Self {
        Self {
            releases,
            registry: None,
            eol_table: EolTable::empty(),
            policy: SupportPolicy::default(),
            image,
        }
    }

    pub fn with_registry(mut self, registry: Box<dyn TagSource>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_eol_table(mut self, eol_table: EolTable) -> Self {
        self.eol_table = eol_table;
        self
    }

    pub fn with_policy(mut self, policy: SupportPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SupportPolicy {
        &self.policy
    }

    pub fn eol_table(&self) -> &EolTable {
        &self.eol_table
    }

    /// Fetch the catalog and build the release graph without touching the registry
    pub async fn graph(&self) -> Result<(ReleaseGraph, usize)> {
        debug!("Fetching releases from {}", self.releases.describe());
        let releases = self.releases.fetch_releases().await?;
        let catalog_size = releases.len();
        Ok((ReleaseGraph::build(releases), catalog_size))
    }

    /// Run the pipeline as of `now`
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Resolution> {
        debug!("Fetching releases from {}", self.releases.describe());
        let releases = self.releases.fetch_releases().await?;
        let catalog_size = releases.len();

        let registry_tags = match &self.registry {
            Some(registry) => {
                debug!("Fetching registry tags from {}", registry.describe());
                Some(registry.fetch_tags().await?)
            }
            None => {
                warn!("Registry cross-check disabled; resolved tags are not verified to exist");
                None
            }
        };

        let graph = ReleaseGraph::build(releases);
        let supported_lines = graph.supported_lines(&self.policy, &self.eol_table, now);
        let tags = graph.supported_tags(&self.policy, &self.eol_table, now);

        info!(
            "Resolved {} tags across {} supported lines ({} immutable of {} releases)",
            tags.len(),
            supported_lines.len(),
            graph.immutable_count(),
            catalog_size
        );

        if let Some(registry_tags) = &registry_tags {
            let missing = missing_tags(&tags, registry_tags);
            if missing.len() > 1 {
                warn!(
                    "{} resolved tags are missing from the registry: {}",
                    missing.len(),
                    missing.join(", ")
                );
            }
            validate(&tags, registry_tags)?;
        }

        let images = tags
            .iter()
            .map(|tag| self.image.with_tag(tag.as_str()).to_string())
            .collect();

        Ok(Resolution {
            images,
            tags,
            supported_lines,
            catalog_size,
            immutable_releases: graph.immutable_count(),
            registry_checked: registry_tags.is_some(),
        })
    }
}
