//! Keyed diff between two ordered key sequences.
//!
//! One pass over the new keys after indexing the old ones: every new key is either
//! `added` or `moved`, every old key that was not visited is `removed`. Moves are
//! reported unconditionally, including keys whose index did not change; the animator
//! turns those into no-ops.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::model::GridError;

/// A key that is present in the new sequence but not the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added<K> {
    /// The new key.
    pub key: K,
    /// Position in the new sequence.
    pub new_index: usize,
}

/// A key present in both sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moved<K> {
    /// The surviving key.
    pub key: K,
    /// Position in the old sequence.
    pub old_index: usize,
    /// Position in the new sequence.
    pub new_index: usize,
}

impl<K> Moved<K> {
    /// True when the key kept its absolute position.
    pub fn is_in_place(&self) -> bool {
        self.old_index == self.new_index
    }
}

/// Result of diffing two keyed sequences.
///
/// `added` and `moved` are in ascending `new_index` order; `removed` is in old order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult<K> {
    /// Keys entering the collection.
    pub added: Vec<Added<K>>,
    /// Keys leaving the collection.
    pub removed: Vec<K>,
    /// Keys surviving, with their old and new positions.
    pub moved: Vec<Moved<K>>,
}

impl<K> Default for DiffResult<K> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl<K> DiffResult<K> {
    /// No insertions, no removals, and every survivor kept its index.
    pub fn is_effectively_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.iter().all(Moved::is_in_place)
    }

    /// Number of survivors whose index changed.
    pub fn relocated_count(&self) -> usize {
        self.moved.iter().filter(|m| !m.is_in_place()).count()
    }
}

/// Diff `old_keys` against `new_keys`.
///
/// # Errors
///
/// Returns [`GridError::DuplicateKey`] when a key occurs twice in `new_keys`. Duplicates
/// in `old_keys` cannot occur because the old sequence is read back from a registry that
/// holds one view per key.
pub fn diff<K>(old_keys: &[K], new_keys: &[K]) -> Result<DiffResult<K>, GridError>
where
    K: Clone + Eq + Hash + Debug,
{
    let old_index: HashMap<&K, usize> = old_keys
        .iter()
        .enumerate()
        .map(|(index, key)| (key, index))
        .collect();

    // new position of every visited key, also used for duplicate detection
    let mut seen: HashMap<&K, usize> = HashMap::with_capacity(new_keys.len());
    let mut result = DiffResult::default();

    for (new_index, key) in new_keys.iter().enumerate() {
        if let Some(first_index) = seen.insert(key, new_index) {
            return Err(GridError::duplicate_key(key, first_index, new_index));
        }
        match old_index.get(key) {
            Some(&previous) => result.moved.push(Moved {
                key: key.clone(),
                old_index: previous,
                new_index,
            }),
            None => result.added.push(Added {
                key: key.clone(),
                new_index,
            }),
        }
    }

    result.removed = old_keys
        .iter()
        .filter(|key| !seen.contains_key(key))
        .cloned()
        .collect();

    Ok(result)
}

/// Check that no key occurs twice in `keys`.
///
/// # Errors
///
/// [`GridError::DuplicateKey`] naming the first repeated key and both of its positions.
pub fn ensure_unique_keys<K>(keys: &[K]) -> Result<(), GridError>
where
    K: Eq + Hash + Debug,
{
    let mut seen: HashMap<&K, usize> = HashMap::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        if let Some(first_index) = seen.insert(key, index) {
            return Err(GridError::duplicate_key(key, first_index, index));
        }
    }
    Ok(())
}
