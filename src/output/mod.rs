//! Output module for presenting resolved previews
//!
//! This module handles:
//! - A human-readable text summary of a preview
//! - JSON export of a preview

use crate::preview::PreviewRecord;
use std::fmt::Write;

/// Output formats supported by the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders a preview in the requested format
pub fn render(preview: &PreviewRecord, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(render_text(preview)),
        OutputFormat::Json => render_json(preview),
    }
}

/// Renders a preview as aligned `Field: value` lines
///
/// Empty fields are shown as `-`; each image gets its own line.
pub fn render_text(preview: &PreviewRecord) -> String {
    let mut out = String::new();
    let field = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    let _ = writeln!(out, "Title:       {}", field(&preview.title));
    let _ = writeln!(out, "Description: {}", field(&preview.description));
    let _ = writeln!(out, "Link:        {}", field(&preview.link));
    let _ = writeln!(out, "Name:        {}", field(&preview.name));
    let _ = writeln!(out, "Icon:        {}", field(&preview.icon));

    if preview.images.is_empty() {
        let _ = writeln!(out, "Images:      -");
    } else {
        let _ = writeln!(out, "Images:      {}", preview.images.len());
        for image in &preview.images {
            let _ = writeln!(out, "  - {}", image);
        }
    }

    out
}

/// Renders a preview as pretty-printed JSON
pub fn render_json(preview: &PreviewRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(preview)
}
