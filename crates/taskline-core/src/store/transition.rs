//! Deterministic list transitions
//!
//! Each variant is a change the backend has already confirmed. Applying one
//! never fails; a transition that names an absent entry is a no-op.

use crate::models::{Entry, EntryId};

/// A server-confirmed change to the entry list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Replace the whole list with a backend snapshot
    Refreshed(Vec<Entry>),
    /// A new entry was created
    Added(Entry),
    /// An existing entry changed
    Updated(Entry),
    /// An entry was removed
    Deleted(EntryId),
}

impl Transition {
    /// Id of the single entry this transition touches, if any
    pub fn entry_id(&self) -> Option<&EntryId> {
        match self {
            Transition::Refreshed(_) => None,
            Transition::Added(entry) | Transition::Updated(entry) => Some(&entry.id),
            Transition::Deleted(id) => Some(id),
        }
    }

    /// Apply this transition to the list
    ///
    /// Returns whether the list changed.
    pub fn apply(self, entries: &mut Vec<Entry>) -> bool {
        match self {
            Transition::Refreshed(snapshot) => {
                let changed = *entries != snapshot;
                *entries = snapshot;
                changed
            }
            Transition::Added(entry) => {
                // A refresh may already have delivered it; keep ids unique
                match entries.iter_mut().find(|e| e.id == entry.id) {
                    Some(existing) => replace(existing, entry),
                    None => {
                        entries.push(entry);
                        true
                    }
                }
            }
            Transition::Updated(entry) => match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => replace(existing, entry),
                None => false,
            },
            Transition::Deleted(id) => match entries.iter().position(|e| e.id == id) {
                Some(pos) => {
                    entries.remove(pos);
                    true
                }
                None => false,
            },
        }
    }
}

fn replace(existing: &mut Entry, entry: Entry) -> bool {
    if *existing == entry {
        return false;
    }
    *existing = entry;
    true
}
