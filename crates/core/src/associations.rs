//! Set-replacement diff for join-table rows.
//!
//! An update submits the complete association set for a parent row. The
//! diff turns "this is the new set" into the minimal list of row-level
//! changes against what is currently stored.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A join-table row identified (within its parent) by a single key.
pub trait Association: Clone + PartialEq {
    type Key: Copy + Eq + Hash;

    fn key(&self) -> Self::Key;
}

/// One row-level change produced by [`diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationChange<A: Association> {
    Insert(A),
    /// The key is retained but its attributes differ.
    Update(A),
    Delete(A::Key),
}

/// Compute the changes that turn `existing` into exactly `submitted`.
///
/// Deletes come first (in `existing` order), followed by inserts and
/// updates in `submitted` order. Rows present in both with equal attributes
/// produce no change. `submitted` is expected to have unique keys; if a key
/// repeats, the first occurrence wins.
pub fn diff<A: Association>(existing: &[A], submitted: &[A]) -> Vec<AssociationChange<A>> {
    let current: HashMap<A::Key, &A> = existing.iter().map(|a| (a.key(), a)).collect();
    let wanted: HashSet<A::Key> = submitted.iter().map(Association::key).collect();

    let mut changes: Vec<AssociationChange<A>> = existing
        .iter()
        .filter(|a| !wanted.contains(&a.key()))
        .map(|a| AssociationChange::Delete(a.key()))
        .collect();

    let mut seen = HashSet::with_capacity(submitted.len());
    for item in submitted {
        let key = item.key();
        if !seen.insert(key) {
            continue;
        }
        match current.get(&key) {
            None => changes.push(AssociationChange::Insert(item.clone())),
            Some(old) if *old != item => changes.push(AssociationChange::Update(item.clone())),
            Some(_) => {}
        }
    }

    changes
}

/// Drop repeated keys, keeping the first occurrence of each.
pub fn dedup_by_key<A: Association>(items: Vec<A>) -> Vec<A> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|a| seen.insert(a.key())).collect()
}

/// Return the first key that appears more than once, if any.
pub fn first_duplicate_key<A: Association>(items: &[A]) -> Option<A::Key> {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().map(Association::key).find(|k| !seen.insert(*k))
}
