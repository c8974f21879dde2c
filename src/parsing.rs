//! HTML extraction helpers shared by the album sources.
//!
//! Listing pages are semi-structured; these helpers keep the per-source
//! parsers down to a list of selectors.

use crate::{PlaylistError, Result};
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, reporting failures as parse errors.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PlaylistError::Parse(format!("Bad selector '{css}': {e}")))
}

/// Trimmed text of an element with inner whitespace collapsed.
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match for `css` inside `element`.
pub fn select_text(element: &ElementRef, css: &str) -> Result<String> {
    let sel = selector(css)?;
    element
        .select(&sel)
        .next()
        .map(|e| element_text(&e))
        .ok_or_else(|| PlaylistError::Parse(format!("Missing '{css}'")))
}

/// Attribute of the first match for `css` inside `element`, if any.
pub fn select_attr(element: &ElementRef, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(element
        .select(&sel)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(|v| v.trim().to_string()))
}

/// Parse a critic score. Placeholders such as "tbd" score 0; numbers outside
/// 0-100 are clamped.
pub fn parse_rating(text: &str) -> u8 {
    match text.trim().parse::<i64>() {
        Ok(value) => value.clamp(0, 100) as u8,
        Err(_) => {
            log::debug!("Unrated score '{}', using 0", text.trim());
            0
        }
    }
}

/// Remove a listing label such as "Release Date:" from the front of a value.
pub fn strip_label<'a>(text: &'a str, label: &str) -> &'a str {
    text.trim().strip_prefix(label).unwrap_or(text).trim()
}

/// Remove the decorations some listings put in front of artist names
/// ("- Artist", "by Artist").
pub fn clean_artist(text: &str) -> String {
    let trimmed = text.trim();
    let stripped = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("by "))
        .unwrap_or(trimmed);
    stripped.trim().to_string()
}
