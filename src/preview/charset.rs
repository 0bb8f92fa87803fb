//! Charset conversion for fetched documents
//!
//! The encoding is chosen the way browsers do before parsing: byte order
//! mark, then the `Content-Type` charset, then a `charset=` declaration in
//! the first 1024 bytes, then UTF-8 if the prefix is valid UTF-8, and
//! finally windows-1252.

use crate::CharsetError;
use encoding_rs::{Encoding, REPLACEMENT, UTF_8, WINDOWS_1252};

/// Bytes inspected for an in-document charset declaration
const PRESCAN_LEN: usize = 1024;

/// Converts `content` to UTF-8 using the encoding chosen by [`determine_encoding`]
///
/// Malformed sequences are replaced with U+FFFD. Encodings that cannot be
/// decoded at all (the WHATWG "replacement" encoding) are an error.
pub fn convert_utf8(content: &[u8], content_type: &str) -> Result<Vec<u8>, CharsetError> {
    let encoding = determine_encoding(content, content_type);
    if encoding == REPLACEMENT {
        return Err(CharsetError::Unsupported(
            charset_from_content_type(content_type).unwrap_or_else(|| encoding.name().to_string()),
        ));
    }

    let (decoded, _, _) = encoding.decode(content);
    Ok(decoded.into_owned().into_bytes())
}

/// Chooses the encoding of a document
pub fn determine_encoding(content: &[u8], content_type: &str) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(content) {
        return encoding;
    }

    if let Some(encoding) = charset_from_content_type(content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return encoding;
    }

    let prefix = &content[..content.len().min(PRESCAN_LEN)];

    if let Some(encoding) =
        prescan_charset(prefix).and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        // A document cannot declare itself UTF-16 from inside ASCII-compatible bytes
        return encoding.output_encoding();
    }

    match std::str::from_utf8(prefix) {
        Ok(_) => UTF_8,
        // Truncated final sequence at the prefix boundary
        Err(error) if error.error_len().is_none() => UTF_8,
        Err(_) => WINDOWS_1252,
    }
}

/// Extracts the `charset` parameter of a `Content-Type` value
fn charset_from_content_type(content_type: &str) -> Option<String> {
    for part in content_type.split(';').skip(1) {
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("charset") {
            continue;
        }

        let label = value.trim().trim_matches('"').trim_matches('\'');
        if !label.is_empty() {
            return Some(label.to_owned());
        }
    }

    None
}

/// Finds a `charset=` declaration in the document prefix
fn prescan_charset(prefix: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(prefix);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let charset_start = search_start + relative + "charset=".len();
        if let Some(label) = parse_charset_label(&prefix[charset_start..]) {
            return Some(label);
        }
        search_start = charset_start;
    }

    None
}

fn parse_charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        let end = rest.find(first)?;
        let label = rest[..end].trim();
        return (!label.is_empty()).then(|| label.to_owned());
    }

    let end = trimmed
        .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
        .unwrap_or(trimmed.len());
    let label = trimmed[..end].trim();
    (!label.is_empty()).then(|| label.to_owned())
}
