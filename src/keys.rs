//! Match-key derivation.
//!
//! Two items match when their keys are byte-for-byte equal. Keys are never
//! case-folded or normalized here; names are expected to have gone through
//! [`crate::sanitize::sanitize_name`] upstream when that matters.
//!
//! Prefix matching is collision-prone (two accounts sharing the first eight
//! characters land in the same folder). The prefix length is left to the
//! caller for that reason.

use crate::error::DistributionError;

/// Portion of an account identifier before the first `@`.
///
/// Identifiers without `@` are returned unchanged.
pub fn account_key(identifier: &str) -> &str {
    match identifier.find('@') {
        Some(idx) => &identifier[..idx],
        None => identifier,
    }
}

/// First `length` characters of `name`, or the whole name when shorter.
///
/// Counts Unicode scalar values, not bytes.
pub fn prefix_key(name: &str, length: usize) -> Result<&str, DistributionError> {
    if length < 1 {
        return Err(DistributionError::InvalidArgument(format!(
            "prefix length must be at least 1, got {}",
            length
        )));
    }

    Ok(match name.char_indices().nth(length) {
        Some((idx, _)) => &name[..idx],
        None => name,
    })
}

/// Like [`prefix_key`], but only yields a key when `name` has at least
/// `length` characters.
///
/// Used for distribution targets: a folder shorter than the match length
/// never receives files.
pub fn full_prefix_key(name: &str, length: usize) -> Result<Option<&str>, DistributionError> {
    let key = prefix_key(name, length)?;
    if key.chars().count() < length {
        return Ok(None);
    }
    Ok(Some(key))
}
