//! Configuration loading and management

mod loader;

pub use loader::{validate, HierarchicalConfigLoader};
