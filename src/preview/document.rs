use serde::Serialize;
use std::borrow::Cow;

/// Link preview metadata extracted from a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewRecord {
    /// `og:title`, else the `<title>` text
    pub title: String,

    /// `og:description`, else `<meta name="description">`
    pub description: String,

    /// A single `og:image`, else every `<img src>` in document order
    pub images: Vec<String>,

    /// `og:url`, else the URL that was fetched
    pub link: String,

    /// `og:site_name`, else the host of the fetched URL
    pub name: String,

    /// Favicon declared on the target host, else `/favicon.ico` of the target
    pub icon: String,
}

/// A fetched document and the preview scanned from it
#[derive(Debug, Clone)]
pub struct Document {
    /// Response body, converted to UTF-8
    pub body: Vec<u8>,

    pub preview: PreviewRecord,
}

impl Document {
    /// Creates a document whose preview links back to `link`
    pub fn new(body: Vec<u8>, link: &str) -> Self {
        Self {
            body,
            preview: PreviewRecord {
                link: link.to_string(),
                ..PreviewRecord::default()
            },
        }
    }

    /// The body as text
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
