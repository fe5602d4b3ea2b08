//! The client's copy of one account's ledger.

use crate::ledger::{
    entry::{ExpenseEntry, Position},
    remote::RemoteEntry,
};

/// The entries of the active account as of the last successful fetch.
///
/// A projection is only ever built from a complete fetch and is replaced as a whole. It
/// is never patched to anticipate a mutation, so it cannot drift from the remote ledger
/// except by lagging behind it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerProjection {
    entries: Vec<ExpenseEntry>,
    stale: bool,
}

impl LedgerProjection {
    /// Build a projection from a fetch, numbering the entries in the order received.
    pub fn from_remote(records: Vec<RemoteEntry>) -> Self {
        let entries = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| ExpenseEntry {
                position: Position::new(index),
                amount: record.amount,
                occurred_at: record.occurred_at,
                category: record.category,
                description: record.description,
                canceled: record.canceled,
            })
            .collect();

        Self {
            entries,
            stale: false,
        }
    }

    /// The entries in ledger order.
    pub fn entries(&self) -> &[ExpenseEntry] {
        &self.entries
    }

    /// The entry at `position`, if the last fetch had one there.
    pub fn get(&self, position: Position) -> Option<&ExpenseEntry> {
        self.entries
            .get(position.index())
            .filter(|entry| entry.position == position)
    }

    /// The number of entries, cancelled entries included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the account has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the last refresh failed, meaning the remote ledger may hold changes
    /// that this projection does not show.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }
}
