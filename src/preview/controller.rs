//! Resolution controller - the fetch/scan/redirect loop
//!
//! The controller drives a [`ResolutionState`] through its phases:
//!
//! ```text
//! Fetching -> Scanning -> Done
//!                      -> RedirectCanonical -> Fetching
//!                      -> RedirectFragment  -> Fetching
//! (any)    -> Error
//! ```
//!
//! Each fetch charges the redirect budget once, and redirects are only taken
//! while budget remains, so a resolution makes at most `max(1, max_redirect)`
//! requests whatever the documents declare.

use crate::preview::fetcher::fetch_document;
use crate::preview::scanner::{scan, ScanOutcome};
use crate::preview::{Document, Scraper};
use crate::state::{Phase, ResolutionState};
use crate::url::to_fragment_url;
use crate::ScrapeError;
use tracing::debug;

/// Runs one resolution to completion
pub struct ResolutionController<'a> {
    scraper: &'a Scraper,
    state: ResolutionState,
}

impl<'a> ResolutionController<'a> {
    pub fn new(scraper: &'a Scraper, state: ResolutionState) -> Self {
        Self { scraper, state }
    }

    /// The resolution state, as left by the last step
    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub fn into_state(self) -> ResolutionState {
        self.state
    }

    /// Fetches and scans until a preview is final
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The last fetched document and its preview. Running
    ///   out of budget is not an error: the preview of the last document is
    ///   returned as is.
    /// * `Err(ScrapeError)` - The first URL, transport or charset error
    pub async fn run(&mut self) -> Result<Document, ScrapeError> {
        loop {
            let document = fetch_document(
                &self.scraper.client,
                self.scraper.credentials.as_ref(),
                &mut self.state,
            )
            .await
            .map_err(|error| self.fail(error))?;

            self.state.enter(Phase::Scanning);
            let outcome = scan(&self.state, document).map_err(|error| self.fail(error.into()))?;

            match outcome {
                ScanOutcome::Complete(document) => {
                    self.state.enter(Phase::Done);
                    debug!(
                        url = %self.state.url(),
                        fetches = self.state.fetches(),
                        "Preview resolved"
                    );
                    return Ok(document);
                }
                ScanOutcome::Canonical { document, url } => {
                    self.state.enter(Phase::RedirectCanonical);
                    if !self.state.has_budget() {
                        self.state.enter(Phase::Done);
                        return Ok(document);
                    }
                    debug!(
                        from = %self.state.url(),
                        to = %url,
                        budget = self.state.budget(),
                        "Following canonical link"
                    );
                    self.state.follow_canonical(url);
                }
                ScanOutcome::Fragment(document) => {
                    self.state.enter(Phase::RedirectFragment);
                    if !self.state.has_budget() {
                        self.state.enter(Phase::Done);
                        return Ok(document);
                    }
                    let escaped =
                        to_fragment_url(self.state.url()).map_err(|error| self.fail(error.into()))?;
                    debug!(
                        url = %escaped,
                        budget = self.state.budget(),
                        "Following escaped fragment"
                    );
                    self.state.set_escaped_fragment(escaped);
                }
            }

            self.state.enter(Phase::Fetching);
        }
    }

    fn fail(&mut self, error: ScrapeError) -> ScrapeError {
        debug!(url = %self.state.url(), error = %error, "Resolution failed");
        self.state.enter(Phase::Error);
        error
    }
}
