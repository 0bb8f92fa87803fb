//! URL handling module for Sumi-Lens
//!
//! This module provides the escaped-fragment rewriting used for AJAX-crawlable
//! pages and the helpers that resolve relative references found in markup.

mod fragment;
mod resolve;

// Re-export main functions
pub use fragment::{
    encode_fragment, has_escaped_fragment, has_hashbang, query_unescape, to_fragment_url,
    ESCAPED_FRAGMENT,
};
pub use resolve::{absolutize, default_icon, host_with_port, origin_of, parse_url};
