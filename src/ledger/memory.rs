//! An in-process ledger with the same semantics as the remote ledger service.
//!
//! Used by the demo mode of the server and as the backing store of the test ledger.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::ledger::{
    entry::Position,
    input::ExpenseDraft,
    remote::{AccountId, RemoteEntry, RemoteError, RemoteLedger},
};

/// Append-only expense ledgers keyed by account, held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    ledgers: Mutex<HashMap<AccountId, Vec<RemoteEntry>>>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger where `account` already holds `entries`.
    pub fn with_entries(account: &AccountId, entries: Vec<RemoteEntry>) -> Self {
        let ledger = Self::new();
        ledger.replace_entries(account, entries);

        ledger
    }

    /// Overwrite everything `account` holds with `entries`.
    pub fn replace_entries(&self, account: &AccountId, entries: Vec<RemoteEntry>) {
        self.ledgers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(account.clone(), entries);
    }

    /// A copy of the entries `account` currently holds.
    pub fn entries(&self, account: &AccountId) -> Vec<RemoteEntry> {
        self.ledgers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<AccountId, Vec<RemoteEntry>>>, RemoteError> {
        self.ledgers.lock().map_err(|error| {
            tracing::error!("could not acquire the in-memory ledger lock: {error}");
            RemoteError::Network("the ledger is unavailable".to_owned())
        })
    }
}

fn missing_position(position: Position) -> RemoteError {
    RemoteError::Rejected {
        status: 404,
        message: format!("there is no expense at position {position}"),
    }
}

#[async_trait::async_trait]
impl RemoteLedger for InMemoryLedger {
    async fn fetch_entries(&self, account: &AccountId) -> Result<Vec<RemoteEntry>, RemoteError> {
        Ok(self.lock()?.get(account).cloned().unwrap_or_default())
    }

    async fn submit_add(
        &self,
        account: &AccountId,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        self.lock()?
            .entry(account.clone())
            .or_default()
            .push(RemoteEntry::from_draft(draft));

        Ok(())
    }

    async fn submit_modify(
        &self,
        account: &AccountId,
        position: Position,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        let mut ledgers = self.lock()?;
        let entry = ledgers
            .get_mut(account)
            .and_then(|entries| entries.get_mut(position.index()))
            .ok_or_else(|| missing_position(position))?;

        entry.amount = draft.amount.value();
        entry.occurred_at = draft.occurred_at();
        entry.category = draft.category.clone();
        entry.description = draft.description.clone();

        Ok(())
    }

    async fn submit_cancel(
        &self,
        account: &AccountId,
        position: Position,
    ) -> Result<(), RemoteError> {
        let mut ledgers = self.lock()?;
        let entry = ledgers
            .get_mut(account)
            .and_then(|entries| entries.get_mut(position.index()))
            .ok_or_else(|| missing_position(position))?;

        entry.canceled = true;

        Ok(())
    }
}
