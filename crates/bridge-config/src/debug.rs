//! Parsing for the diagnostic detail toggle.
//!
//! The toggle accepts `1`, `true`, `yes`, and `on` in any letter case. Every
//! other value, including the empty string, leaves diagnostics disabled.

use std::convert::Infallible;

const TRUTHY_VALUES: [&str; 4] = ["1", "true", "yes", "on"];

/// Returns `true` when `value` is one of the recognised truthy spellings.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    let trimmed = value.trim();
    TRUTHY_VALUES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(trimmed))
}

/// `clap` value parser wrapping [`is_truthy`].
///
/// # Errors
///
/// Never fails; unrecognised values disable the toggle.
pub fn parse_toggle(value: &str) -> Result<bool, Infallible> {
    Ok(is_truthy(value))
}
