//! Seams for the two remote inputs of a resolution run

use crate::error::Result;
use crate::types::Release;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Supplies the published release catalog
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;

    /// Fetch every release in the catalog, floating ones included
    async fn fetch_releases(&self) -> Result<Vec<Release>>;
}

/// Supplies the set of tags a registry actually hosts
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;

    /// Fetch every tag name hosted for the mirrored image
    async fn fetch_tags(&self) -> Result<BTreeSet<String>>;
}
