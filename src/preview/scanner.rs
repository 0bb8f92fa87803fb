//! Preview scanner
//!
//! Makes one forward pass over the token stream of a fetched document,
//! filling a [`PreviewRecord`] and watching for the two signals that make
//! the current document the wrong one to preview: a canonical link to a
//! different address, and a `<meta name="fragment" content="!">` asking for
//! the escaped-fragment version of the page.
//!
//! # Field Rules
//!
//! | Field | Source |
//! |-------|--------|
//! | `title` | first `og:title`; `<title>` text only while no title is set |
//! | `description` | first `og:description`; `name=description` only while empty |
//! | `images` | first `og:image` replaces everything; else `<img src>` in order |
//! | `link` | `og:url`; defaults to the fetched URL |
//! | `name` | `og:site_name`; defaults to the host of the fetched URL |
//! | `icon` | `rel=icon` while still on the target host; defaults to `/favicon.ico` |
//!
//! Once title, description and an `og:image` are known and the head has
//! ended, the scan stops. `og:site_name`, `og:url` and icon links placed
//! after that point are not read.

use crate::preview::tokenizer::{Tag, Token, TokenStream};
use crate::preview::{Document, PreviewRecord};
use crate::state::ResolutionState;
use crate::url::{absolutize, default_icon, host_with_port};
use crate::UrlResult;
use std::iter::Peekable;
use tracing::trace;
use url::Url;

/// Result of scanning one document
#[derive(Debug)]
pub enum ScanOutcome {
    /// The preview is final for this document
    Complete(Document),

    /// The document declares a different canonical address
    Canonical { document: Document, url: Url },

    /// The document asks to be fetched through its escaped fragment
    Fragment(Document),
}

impl ScanOutcome {
    /// The document the outcome was reached on
    pub fn document(&self) -> &Document {
        match self {
            Self::Complete(document)
            | Self::Canonical { document, .. }
            | Self::Fragment(document) => document,
        }
    }
}

/// Trims and lowercases an attribute key or value for comparison
///
/// Every attribute check in the scanner goes through this function.
pub fn clean_str(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Scans `document` for preview metadata
///
/// Tokens are consumed until one of:
///
/// 1. A redirect signal is pending once the head has been passed and the
///    budget allows another fetch (canonical takes priority over fragment)
/// 2. Title, description, an Open Graph image and the end of the head have
///    all been seen
/// 3. The token stream ends
///
/// # Errors
///
/// Fails if an `og:image`, `<img src>` or canonical reference cannot be
/// resolved to a URL.
pub fn scan(state: &ResolutionState, document: Document) -> UrlResult<ScanOutcome> {
    let Document { body, preview } = document;
    let text = String::from_utf8_lossy(&body);
    let mut tokens = TokenStream::new(&text).peekable();

    let mut scanner = PreviewScanner::new(state, preview);
    let signal = loop {
        let Some(token) = tokens.next() else {
            break None;
        };

        match &token {
            Token::StartTag(tag) => scanner.visit_start(tag, &mut tokens)?,
            Token::SelfClosingTag(tag) => scanner.visit_start(tag, &mut tokens)?,
            Token::EndTag(tag) => scanner.visit_end(tag),
            Token::Text(_) => continue,
        }

        if let Some(signal) = scanner.redirect_signal() {
            break Some(signal);
        }
        if scanner.is_complete() {
            trace!("Preview complete before end of document");
            break None;
        }
    };
    let preview = scanner.preview;
    drop(tokens);
    drop(text);

    let document = Document { body, preview };
    Ok(match signal {
        None => ScanOutcome::Complete(document),
        Some(Signal::Canonical(url)) => ScanOutcome::Canonical { document, url },
        Some(Signal::Fragment) => ScanOutcome::Fragment(document),
    })
}

enum Signal {
    Canonical(Url),
    Fragment,
}

struct PreviewScanner<'a> {
    state: &'a ResolutionState,
    preview: PreviewRecord,
    /// The fetched address, before any `og:url` overwrote `preview.link`
    fetched_link: String,
    head_passed: bool,
    og_title: bool,
    og_description: bool,
    og_image: bool,
    canonical: Option<Url>,
    fragment: bool,
}

impl<'a> PreviewScanner<'a> {
    fn new(state: &'a ResolutionState, mut preview: PreviewRecord) -> Self {
        preview.images.clear();
        preview.name = host_with_port(state.url());
        preview.icon = default_icon(state.target());

        Self {
            state,
            fetched_link: preview.link.clone(),
            preview,
            head_passed: false,
            og_title: false,
            og_description: false,
            og_image: false,
            canonical: None,
            fragment: false,
        }
    }

    fn visit_start<I>(&mut self, tag: &Tag, tokens: &mut Peekable<I>) -> UrlResult<()>
    where
        I: Iterator<Item = Token>,
    {
        match tag.name.as_str() {
            "body" => self.head_passed = true,
            "link" => self.visit_link(tag)?,
            "meta" => self.visit_meta(tag)?,
            "title" => {
                if let Some(Token::Text(text)) =
                    tokens.next_if(|token| matches!(token, Token::Text(_)))
                {
                    if self.preview.title.is_empty() {
                        self.preview.title = text.trim().to_string();
                    }
                }
            }
            "img" => self.visit_img(tag)?,
            _ => {}
        }
        Ok(())
    }

    fn visit_end(&mut self, tag: &Tag) {
        if matches!(tag.name.as_str(), "head" | "body") {
            self.head_passed = true;
        }
    }

    fn visit_link(&mut self, tag: &Tag) -> UrlResult<()> {
        let rel = attr(tag, "rel").map(clean_str).unwrap_or_default();
        let href = attr(tag, "href");

        match rel.as_str() {
            "canonical" => {
                let Some(href) = href.filter(|href| !href.trim().is_empty()) else {
                    return Ok(());
                };
                let url = absolutize(href, self.state.url())?;
                if url.as_str() != self.fetched_link {
                    trace!(canonical = %url, "Found canonical link");
                    self.canonical = Some(url);
                }
            }
            "icon" | "shortcut icon" if self.state.on_target_host() => {
                if let Some(icon) = href.and_then(|href| resolve_icon(href, self.state.url())) {
                    self.preview.icon = icon;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_meta(&mut self, tag: &Tag) -> UrlResult<()> {
        // Only the plain `key + content` form is considered
        if tag.attrs.len() != 2 {
            return Ok(());
        }

        let name = attr(tag, "name");
        let content = attr(tag, "content").unwrap_or_default();
        let property = attr(tag, "property").or(name).map(clean_str).unwrap_or_default();

        if name.map(clean_str).as_deref() == Some("fragment")
            && content.trim() == "!"
            && self.state.escaped_fragment().is_none()
        {
            trace!("Document requests its escaped fragment");
            self.fragment = true;
        }

        match property.as_str() {
            "og:site_name" => self.preview.name = content.to_string(),
            "og:title" if !self.og_title => {
                self.og_title = true;
                self.preview.title = content.to_string();
            }
            "og:description" if !self.og_description => {
                self.og_description = true;
                self.preview.description = content.to_string();
            }
            "description" if self.preview.description.is_empty() => {
                self.preview.description = content.to_string();
            }
            "og:url" => self.preview.link = content.to_string(),
            "og:image" if !self.og_image && !content.trim().is_empty() => {
                let url = absolutize(content, self.state.url())?;
                self.og_image = true;
                self.preview.images = vec![url.into()];
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_img(&mut self, tag: &Tag) -> UrlResult<()> {
        if self.og_image {
            return Ok(());
        }
        for (key, value) in &tag.attrs {
            if clean_str(key) == "src" && !value.trim().is_empty() {
                let url = absolutize(value, self.state.url())?;
                self.preview.images.push(url.into());
            }
        }
        Ok(())
    }

    fn redirect_signal(&self) -> Option<Signal> {
        if !self.head_passed || !self.state.has_budget() {
            return None;
        }
        if let Some(url) = &self.canonical {
            return Some(Signal::Canonical(url.clone()));
        }
        self.fragment.then_some(Signal::Fragment)
    }

    fn is_complete(&self) -> bool {
        !self.preview.title.is_empty()
            && !self.preview.description.is_empty()
            && self.og_image
            && self.head_passed
    }
}

/// First attribute whose normalized key is `key`
fn attr<'t>(tag: &'t Tag, key: &str) -> Option<&'t str> {
    tag.attrs
        .iter()
        .find(|(k, _)| clean_str(k) == key)
        .map(|(_, v)| v.as_str())
}

/// Resolves a favicon `href`
///
/// Absolute URLs are kept as written; root-relative and relative references
/// are resolved against the scheme and host of `base`. An unresolvable
/// reference yields `None` so the current icon is kept.
fn resolve_icon(href: &str, base: &Url) -> Option<String> {
    if !href.starts_with('/') {
        if let Ok(url) = Url::parse(href) {
            return Some(url.into());
        }
    }
    absolutize(href, base).ok().map(Into::into)
}
