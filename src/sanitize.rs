//! File and folder name sanitizing.
//!
//! Some roster exports carry decomposed kana (voicing marks as separate code
//! points), which yields names that look identical on screen but differ on
//! disk. Names are therefore NFC-composed before anything else.

use unicode_normalization::UnicodeNormalization;

/// Characters that are illegal in names on at least one supported platform
const ILLEGAL_NAME_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Replacement used when sanitizing leaves nothing behind
pub const FALLBACK_NAME: &str = "unnamed";

/// Normalize `raw` into a name that is safe to create on disk.
///
/// NFC-composes, replaces illegal characters with `_`, then trims whitespace
/// and `.` from both ends. Never returns an empty string.
pub fn sanitize_name(raw: &str) -> String {
    let replaced: String = raw
        .nfc()
        .map(|c| if ILLEGAL_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}
