//! Registry access for lifeline
//!
//! This crate provides functionality for:
//! - Reading the tag listing of a registry repository (tag → digest maps or
//!   paginated OCI distribution `tags/list` responses)
//! - Cross-checking resolved tags against the hosted tag set
//! - Formatting fully-qualified image references
//!
//! # Example
//!
//! ```no_run
//! use lifeline_core::types::{NetworkConfig, TagListingFormat};
//! use lifeline_registry::{validate, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> lifeline_core::Result<()> {
//!     let client = RegistryClient::new(
//!         "https://quay.io/v1/repositories/astronomer/ap-airflow/tags",
//!         TagListingFormat::KeyMap,
//!         &NetworkConfig::default(),
//!     )?;
//!
//!     let hosted = client.list_tags().await?;
//!     validate(["2.3.0-4"], &hosted)?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod types;
pub mod validator;

pub use client::RegistryClient;
pub use types::ImageReference;
pub use validator::{missing_tags, validate};
