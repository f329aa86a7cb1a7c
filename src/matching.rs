//! First-match pairing of sources against targets by derived key.
//!
//! Every source resolves to at most one target: the first target, in the
//! order given, whose key equals the source key. Targets are never consumed,
//! so many sources may land in the same target. Inputs are scanned in full
//! for every source; roster-sized inputs keep this cheap.

use serde::{Deserialize, Serialize};

/// Anything that exposes a precomputed match key.
///
/// `None` means the item can never match (e.g. a folder whose name is
/// shorter than the prefix length).
pub trait Keyed {
    fn match_key(&self) -> Option<&str>;
}

/// An item paired with its derived key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedItem<T> {
    pub item: T,
    pub key: Option<String>,
}

impl<T> KeyedItem<T> {
    pub fn new(item: T, key: Option<String>) -> Self {
        Self { item, key }
    }
}

impl<T> Keyed for KeyedItem<T> {
    fn match_key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl Keyed for String {
    fn match_key(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl Keyed for &str {
    fn match_key(&self) -> Option<&str> {
        Some(*self)
    }
}

/// Resolution of a single source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchResult {
    /// Index into the target sequence
    Matched { target: usize },
    Unmatched,
}

impl MatchResult {
    /// Look up the matched target, if any
    pub fn resolve<'t, T>(&self, targets: &'t [T]) -> Option<&'t T> {
        match self {
            MatchResult::Matched { target } => targets.get(*target),
            MatchResult::Unmatched => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// A source whose key equals the key of more than one target.
///
/// Routing still goes to the first target; this only records that the
/// choice was ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCollision {
    pub source: usize,
    pub key: String,
    /// Every matching target index, in target order; the first one wins
    pub targets: Vec<usize>,
}

/// Pair each source with the first target sharing its key
pub fn match_first<S: Keyed, T: Keyed>(sources: &[S], targets: &[T]) -> Vec<MatchResult> {
    sources
        .iter()
        .map(|source| {
            let Some(key) = source.match_key() else {
                return MatchResult::Unmatched;
            };
            targets
                .iter()
                .position(|target| target.match_key() == Some(key))
                .map(|target| MatchResult::Matched { target })
                .unwrap_or(MatchResult::Unmatched)
        })
        .collect()
}

/// Sources whose key is shared by two or more targets
pub fn find_collisions<S: Keyed, T: Keyed>(sources: &[S], targets: &[T]) -> Vec<KeyCollision> {
    sources
        .iter()
        .enumerate()
        .filter_map(|(source, item)| {
            let key = item.match_key()?;
            let hits: Vec<usize> = targets
                .iter()
                .enumerate()
                .filter(|(_, target)| target.match_key() == Some(key))
                .map(|(idx, _)| idx)
                .collect();
            (hits.len() > 1).then(|| KeyCollision {
                source,
                key: key.to_string(),
                targets: hits,
            })
        })
        .collect()
}
