// src/utils/mod.rs
//! Utility functions and helpers.
//!
//! This module contains general-purpose utilities used across
//! the application.

pub mod logging;
pub mod security;
pub mod system;

/// Timestamp prefix used when naming received files
pub fn file_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Cap `text` at `max_chars` characters, appending a notice with the original size.
///
/// Cuts on a character boundary so multi-byte output never splits.
pub fn truncate_output(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push_str(&format!(
                "\n\n[OUTPUT TRUNCATED - Original size: {} bytes]",
                text.len()
            ));
            truncated
        }
    }
}
