//! Release support resolution for lifeline
//!
//! - [`graph`]: groups immutable releases by minor line and selects each
//!   line's initial and latest builds
//! - [`pipeline`]: fetches the catalog and registry listing, resolves the
//!   supported tags and cross-checks them before emitting image references

pub mod graph;
pub mod pipeline;

pub use graph::{resolve_tags, LineBuilds, LineReport, ReleaseGraph};
pub use pipeline::{Resolution, ResolutionPipeline};
