//! Per-call resolution state
//!
//! A [`ResolutionState`] is created for every scrape and owned by the
//! controller. The fetcher and scanner read it; only the controller and the
//! fetcher mutate it.

use crate::state::Phase;
use crate::url::host_with_port;
use url::Url;

/// `Accept-Language` sent when the caller did not ask for a language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Mutable state carried across fetch/scan iterations
#[derive(Debug, Clone)]
pub struct ResolutionState {
    url: Url,
    target: Url,
    escaped_fragment: Option<Url>,
    budget: i32,
    fetches: u32,
    language: String,
    authorization: Option<String>,
    phase: Phase,
}

impl ResolutionState {
    /// Creates the state for resolving `target`
    ///
    /// An empty `authorization` is treated as no credential.
    pub fn new(target: Url, max_redirect: i32, language: &str, authorization: &str) -> Self {
        Self {
            url: target.clone(),
            target,
            escaped_fragment: None,
            budget: max_redirect,
            fetches: 0,
            language: language.to_string(),
            authorization: (!authorization.is_empty()).then(|| authorization.to_string()),
            phase: Phase::Fetching,
        }
    }

    /// The URL currently being resolved
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The URL the caller asked for; never changed by redirects
    pub fn target(&self) -> &Url {
        &self.target
    }

    /// The escaped-fragment URL that overrides [`Self::url`] for requests
    pub fn escaped_fragment(&self) -> Option<&Url> {
        self.escaped_fragment.as_ref()
    }

    /// The URL a request should be sent to
    pub fn request_url(&self) -> &Url {
        self.escaped_fragment.as_ref().unwrap_or(&self.url)
    }

    /// Remaining redirect budget; may go negative after the last fetch
    pub fn budget(&self) -> i32 {
        self.budget
    }

    /// Returns true while another redirect may still be followed
    pub fn has_budget(&self) -> bool {
        self.budget > 0
    }

    /// Number of fetch attempts made so far
    pub fn fetches(&self) -> u32 {
        self.fetches
    }

    /// Value for the `Accept-Language` header
    pub fn accept_language(&self) -> &str {
        if self.language.is_empty() {
            DEFAULT_LANGUAGE
        } else {
            &self.language
        }
    }

    /// The opaque authorization credential, if any
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Current phase of the resolution
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns true if the current URL is served by the target's host
    pub fn on_target_host(&self) -> bool {
        host_with_port(&self.url) == host_with_port(&self.target)
    }

    /// Charges one fetch attempt against the budget
    pub(crate) fn charge_fetch(&mut self) {
        self.budget = self.budget.saturating_sub(1);
        self.fetches += 1;
    }

    pub(crate) fn set_escaped_fragment(&mut self, url: Url) {
        self.escaped_fragment = Some(url);
    }

    /// Replaces the current URL with the address that actually served the
    /// document, dropping any escaped-fragment override
    pub(crate) fn adopt_effective_url(&mut self, url: Url) {
        self.escaped_fragment = None;
        self.url = url;
    }

    /// Moves to a canonical URL declared by the document
    pub(crate) fn follow_canonical(&mut self, url: Url) {
        self.escaped_fragment = None;
        self.url = url;
    }

    pub(crate) fn enter(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid phase transition: {} -> {}",
            self.phase,
            next
        );
        self.phase = next;
    }
}
