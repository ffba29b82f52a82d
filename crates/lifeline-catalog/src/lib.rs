//! Release catalog access for lifeline
//!
//! Provides:
//! - Fetching the published release catalog over HTTP
//! - Parsing catalog documents into validated releases

pub mod client;
pub mod feed;

pub use client::CatalogClient;
pub use feed::{parse_catalog, CatalogEntry};
