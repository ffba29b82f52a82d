//! Support policy evaluation for lifeline
//!
//! Decides whether a release is within its support window, given a
//! minimum support duration and the published end-of-life table.

pub mod eol;
pub mod evaluator;

pub use eol::EolTable;
pub use evaluator::{is_in_support, SupportPolicy, SupportWindow, DEFAULT_MINIMUM_SUPPORT_DAYS};
