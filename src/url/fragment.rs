//! Escaped-fragment rewriting for AJAX-crawlable URLs
//!
//! A `#!` fragment is moved into the `_escaped_fragment_` query parameter so
//! the server can return a pre-rendered document.

use crate::url::resolve::parse_url;
use crate::{UrlError, UrlResult};
use regex::bytes::Regex;
use std::fmt::Write;
use std::sync::LazyLock;
use url::Url;

/// Query parameter marker of an escaped-fragment URL
pub const ESCAPED_FRAGMENT: &str = "_escaped_fragment_=";

static HASHBANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s-u)#!.*").expect("hashbang pattern is valid"));

/// Rewrites `url` into its escaped-fragment form
///
/// # Rules
///
/// 1. The URL is query-unescaped first
/// 2. A `#!payload` fragment becomes `?_escaped_fragment_=payload` (or `&...`
///    when the URL has query parameters), with the payload re-encoded by
///    [`encode_fragment`]
/// 3. Without a `#!` fragment, a URL that already carries
///    `_escaped_fragment_=` is returned unchanged
/// 4. Otherwise an empty `_escaped_fragment_=` is appended
///
/// # Examples
///
/// ```
/// use sumi_lens::url::to_fragment_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/app?lang=en#!/photos/12").unwrap();
/// let escaped = to_fragment_url(&url).unwrap();
/// assert_eq!(
///     escaped.as_str(),
///     "https://example.com/app?lang=en&_escaped_fragment_=/photos/12"
/// );
/// ```
pub fn to_fragment_url(url: &Url) -> UrlResult<Url> {
    let unescaped = query_unescape(url.as_str())?;

    // Only the real fragment counts; a `%23!` inside the query is payload
    let hashbang = if has_hashbang(url) {
        let mut base = url.clone();
        base.set_fragment(None);
        let fragment_start = query_unescape(base.as_str())?.len();
        HASHBANG.find_at(&unescaped, fragment_start)
    } else {
        None
    };

    if hashbang.is_none() && contains(&unescaped, ESCAPED_FRAGMENT.as_bytes()) {
        return Ok(url.clone());
    }

    let separator = if url.query_pairs().next().is_some() {
        b'&'
    } else {
        b'?'
    };

    let mut rebuilt = match hashbang {
        Some(found) => unescaped[..found.start()].to_vec(),
        None => unescaped.clone(),
    };
    rebuilt.push(separator);
    rebuilt.extend_from_slice(ESCAPED_FRAGMENT.as_bytes());
    if let Some(found) = hashbang {
        rebuilt.extend_from_slice(encode_fragment(&found.as_bytes()[2..]).as_bytes());
    }

    let rebuilt = String::from_utf8(rebuilt).map_err(|_| UrlError::InvalidUtf8)?;
    parse_url(&rebuilt)
}

/// Returns true if the URL carries a `#!` fragment
pub fn has_hashbang(url: &Url) -> bool {
    url.fragment().is_some_and(|fragment| fragment.starts_with('!'))
}

/// Returns true if the URL already contains the escaped-fragment marker
pub fn has_escaped_fragment(url: &Url) -> bool {
    match query_unescape(url.as_str()) {
        Ok(unescaped) => contains(&unescaped, ESCAPED_FRAGMENT.as_bytes()),
        Err(_) => url.as_str().contains(ESCAPED_FRAGMENT),
    }
}

/// Encodes a fragment payload for the `_escaped_fragment_` parameter
///
/// Control bytes (0-31, 127) are dropped. Space, `#`, `%`, `&`, `+` and bytes
/// 128-255 are percent-encoded. Everything else passes through.
pub fn encode_fragment(payload: &[u8]) -> String {
    let mut encoded = String::with_capacity(payload.len());
    for &byte in payload {
        if is_control(byte) {
            continue;
        }
        if needs_escape(byte) {
            let _ = write!(encoded, "%{:02X}", byte);
        } else {
            encoded.push(char::from(byte));
        }
    }
    encoded
}

/// Decodes `%XX` escapes and `+` as a space, like a query component
pub fn query_unescape(input: &str) -> UrlResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let high = bytes.get(i + 1).and_then(|b| hex_value(*b));
                let low = bytes.get(i + 2).and_then(|b| hex_value(*b));
                match (high, low) {
                    (Some(high), Some(low)) => decoded.push(high << 4 | low),
                    _ => {
                        let end = (i + 3).min(bytes.len());
                        return Err(UrlError::InvalidEscape(
                            String::from_utf8_lossy(&bytes[i..end]).into_owned(),
                        ));
                    }
                }
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }
    Ok(decoded)
}

fn is_control(byte: u8) -> bool {
    byte <= 31 || byte == 127
}

fn needs_escape(byte: u8) -> bool {
    matches!(byte, b' ' | b'#' | b'%' | b'&' | b'+') || byte >= 127
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
