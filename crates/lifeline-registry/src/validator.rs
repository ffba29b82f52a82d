//! Cross-check resolved tags against what the registry hosts
//!
//! The release catalog and the registry can drift apart. A resolved tag the
//! registry does not host cannot be mirrored, so it blocks the whole run.

use lifeline_core::{Error, Result};
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Fail with `TagNotFound` for the first tag absent from `registry_tags`
pub fn validate<I, S>(tags: I, registry_tags: &BTreeSet<String>) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut checked = 0usize;
    for tag in tags {
        let tag = tag.as_ref();
        if !registry_tags.contains(tag) {
            error!("Resolved tag {} is missing from the registry", tag);
            return Err(Error::tag_not_found(tag));
        }
        checked += 1;
    }

    debug!(
        "All {} resolved tags exist among {} registry tags",
        checked,
        registry_tags.len()
    );
    Ok(())
}

/// Every tag absent from `registry_tags`, in input order
pub fn missing_tags<'a, I>(tags: I, registry_tags: &BTreeSet<String>) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(String::as_str)
        .filter(|tag| !registry_tags.contains(*tag))
        .collect()
}
