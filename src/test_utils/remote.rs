//! A [RemoteLedger] for tests that records its calls and can be told to fail, lag or
//! hold a call in flight.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::Notify;

use crate::ledger::{
    AccountId, ExpenseDraft, InMemoryLedger, Position, RemoteEntry, RemoteError, RemoteLedger,
};

/// A call received by a [ScriptedLedger].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Fetch(AccountId),
    SubmitAdd(AccountId),
    SubmitModify(AccountId, Position),
    SubmitCancel(AccountId, Position),
}

/// Holds the next call of one kind until released.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    entered: Notify,
    released: Notify,
}

impl Gate {
    /// Wait until a call has reached the gate.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the held call continue.
    pub(crate) fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.released.notified().await;
    }
}

#[derive(Debug, Default)]
struct Script {
    calls: Vec<Call>,
    submit_error: Option<RemoteError>,
    fetch_error: Option<RemoteError>,
    lagging: Option<HashMap<AccountId, Vec<RemoteEntry>>>,
    submit_gate: Option<Arc<Gate>>,
    fetch_gate: Option<Arc<Gate>>,
}

/// Wraps an [InMemoryLedger] with scriptable failures.
#[derive(Debug)]
pub(crate) struct ScriptedLedger {
    inner: InMemoryLedger,
    script: Mutex<Script>,
}

impl ScriptedLedger {
    pub(crate) fn new(inner: InMemoryLedger) -> Self {
        Self {
            inner,
            script: Mutex::new(Script::default()),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("test ledger lock poisoned")
    }

    /// The calls received since creation or the last [ScriptedLedger::reset_calls].
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    pub(crate) fn reset_calls(&self) {
        self.script().calls.clear();
    }

    /// Make every mutating call fail with `error`, or succeed again with `None`.
    pub(crate) fn fail_submits_with(&self, error: Option<RemoteError>) {
        self.script().submit_error = error;
    }

    /// Make every fetch fail with `error`, or succeed again with `None`.
    pub(crate) fn fail_fetches_with(&self, error: Option<RemoteError>) {
        self.script().fetch_error = error;
    }

    /// Make fetches of `account` return what it holds now, while mutations still apply.
    pub(crate) fn lag_behind(&self, account: &AccountId) {
        let entries = self.inner.entries(account);
        self.script()
            .lagging
            .get_or_insert_with(HashMap::new)
            .insert(account.clone(), entries);
    }

    /// Make fetches return the current entries again.
    pub(crate) fn catch_up(&self) {
        self.script().lagging = None;
    }

    /// Overwrite `account`'s entries, as if another client had changed them.
    pub(crate) fn replace_entries(&self, account: &AccountId, entries: Vec<RemoteEntry>) {
        self.inner.replace_entries(account, entries);
    }

    /// Hold the next mutating call until the returned gate is released.
    pub(crate) fn hold_submits(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.script().submit_gate = Some(gate.clone());
        gate
    }

    /// Hold the next fetch until the returned gate is released.
    pub(crate) fn hold_fetches(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.script().fetch_gate = Some(gate.clone());
        gate
    }

    async fn before_submit(&self, call: Call) -> Result<(), RemoteError> {
        let gate = {
            let mut script = self.script();
            script.calls.push(call);
            script.submit_gate.take()
        };

        if let Some(gate) = gate {
            gate.pass().await;
        }

        match self.script().submit_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl RemoteLedger for ScriptedLedger {
    async fn fetch_entries(&self, account: &AccountId) -> Result<Vec<RemoteEntry>, RemoteError> {
        let gate = {
            let mut script = self.script();
            script.calls.push(Call::Fetch(account.clone()));
            script.fetch_gate.take()
        };

        if let Some(gate) = gate {
            gate.pass().await;
        }

        {
            let script = self.script();

            if let Some(error) = script.fetch_error.clone() {
                return Err(error);
            }

            if let Some(entries) = script
                .lagging
                .as_ref()
                .and_then(|snapshot| snapshot.get(account))
            {
                return Ok(entries.clone());
            }
        }

        self.inner.fetch_entries(account).await
    }

    async fn submit_add(
        &self,
        account: &AccountId,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        self.before_submit(Call::SubmitAdd(account.clone())).await?;
        self.inner.submit_add(account, draft).await
    }

    async fn submit_modify(
        &self,
        account: &AccountId,
        position: Position,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        self.before_submit(Call::SubmitModify(account.clone(), position))
            .await?;
        self.inner.submit_modify(account, position, draft).await
    }

    async fn submit_cancel(
        &self,
        account: &AccountId,
        position: Position,
    ) -> Result<(), RemoteError> {
        self.before_submit(Call::SubmitCancel(account.clone(), position))
            .await?;
        self.inner.submit_cancel(account, position).await
    }
}
