//! State module for tracking resolution progress
//!
//! # Components
//!
//! - `Phase`: where the controller is in the fetch/scan/redirect cycle
//! - `ResolutionState`: current and original URLs, escaped-fragment override,
//!   redirect budget and request settings for one scrape

mod phase;
mod resolution;

// Re-export main types
pub use phase::Phase;
pub use resolution::{ResolutionState, DEFAULT_LANGUAGE};
