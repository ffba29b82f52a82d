//! Command implementations

pub mod resolve;
pub mod status;
pub mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use lifeline_catalog::CatalogClient;
use lifeline_core::config::validate;
use lifeline_core::time::parse_timestamp;
use lifeline_core::{HierarchicalConfigLoader, RuntimeConfig};
use lifeline_policy::{EolTable, SupportPolicy};
use lifeline_registry::ImageReference;
use lifeline_resolver::ResolutionPipeline;
use tracing::debug;

use crate::cli::SourceArgs;

/// Load the layered configuration and apply the shared CLI overrides
pub(crate) fn load_config(
    config_path: Option<&Utf8Path>,
    source: &SourceArgs,
) -> Result<RuntimeConfig> {
    let mut config = match config_path {
        Some(path) => HierarchicalConfigLoader::new()
            .and_then(|loader| loader.load_runtime_config_from(path))
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => HierarchicalConfigLoader::new()
            .and_then(|loader| loader.load_runtime_config())
            .context("Failed to load configuration")?,
    };

    if let Some(url) = &source.catalog_url {
        config.catalog.url = url.clone();
    }
    if let Some(path) = &source.eol_table {
        config.policy.eol_table = path.to_string();
    }
    if let Some(days) = source.minimum_support_days {
        config.policy.minimum_support_days = days;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// The instant support is evaluated at
pub(crate) fn evaluation_time(source: &SourceArgs) -> Result<DateTime<Utc>> {
    match &source.now {
        Some(raw) => parse_timestamp(raw).with_context(|| format!("Invalid --now value: {}", raw)),
        None => Ok(Utc::now()),
    }
}

/// Build a pipeline for the configured catalog, EOL table and policy
///
/// The registry tag source is left off; `resolve` attaches it unless the
/// cross-check is disabled.
pub(crate) fn build_pipeline(config: &RuntimeConfig) -> Result<ResolutionPipeline> {
    let eol_table = EolTable::load(Utf8Path::new(&config.policy.eol_table))
        .with_context(|| format!("Failed to load end-of-life table {}", config.policy.eol_table))?;
    debug!("Using {} published end-of-life dates", eol_table.len());

    let catalog = CatalogClient::new(&config.catalog, &config.network)
        .context("Failed to create release catalog client")?;
    let image = ImageReference::parse(&config.registry.image)
        .with_context(|| format!("Invalid image {}", config.registry.image))?;

    Ok(ResolutionPipeline::new(Box::new(catalog), image)
        .with_eol_table(eol_table)
        .with_policy(SupportPolicy::from_days(config.policy.minimum_support_days)))
}
