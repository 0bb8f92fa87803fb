//! Integration tests for Sumi-Lens
//!
//! These tests use wiremock to serve documents and exercise the full
//! fetch/scan/redirect loop end-to-end.

mod scrape_tests;
