//! The sync engine: applies the user's changes to the remote ledger and keeps the
//! session's projection in step with it.
//!
//! Every mutation is sent to the remote ledger and followed by a complete re-fetch of the
//! account's entries. The projection is only ever replaced with the result of a fetch,
//! never patched locally.
//!
//! At most one remote operation runs per session at a time. Switching the active account
//! starts a new session generation, and responses that belong to an older generation are
//! dropped instead of being applied to the new account.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Error,
    ledger::{
        entry::{ExpenseEntry, Position},
        input::ExpenseForm,
        projection::LedgerProjection,
        remote::{AccountId, RemoteEntry, RemoteError, RemoteLedger},
        status::{EditTarget, Operation, OperationStatus},
        view::{CategoryAggregate, DerivedView, SortKey},
    },
};

/// The state of one client session.
#[derive(Debug, Default)]
struct SessionState {
    account: Option<AccountId>,
    /// Incremented every time the active account is set.
    generation: u64,
    projection: LedgerProjection,
    sort_key: SortKey,
    view: DerivedView,
    status: OperationStatus,
    edit_target: EditTarget,
    form: ExpenseForm,
}

/// Identifies the account and session generation an operation was started for.
#[derive(Debug, Clone)]
struct Ticket {
    account: AccountId,
    generation: u64,
    operation: Operation,
}

impl SessionState {
    /// Check that a remote operation may start now.
    fn start(&self, operation: Operation) -> Result<Ticket, Error> {
        let account = self.account.clone().ok_or(Error::NoActiveAccount)?;

        if self.status.is_in_flight() {
            tracing::warn!("Rejected {operation} for {account}: {:?} is in flight", self.status);
            return Err(Error::Busy);
        }

        Ok(Ticket {
            account,
            generation: self.generation,
            operation,
        })
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.generation == ticket.generation
    }

    fn fail(&mut self, operation: Operation, error: Error) -> Error {
        self.status = OperationStatus::Failed {
            operation,
            error: error.clone(),
        };

        error
    }

    fn replace_projection(&mut self, projection: LedgerProjection) {
        self.projection = projection;
        self.rederive();
    }

    fn rederive(&mut self) {
        self.view = DerivedView::derive(self.projection.entries(), self.sort_key);
    }

    fn reset(&mut self, account: AccountId) {
        *self = SessionState {
            account: Some(account),
            generation: self.generation.wrapping_add(1),
            sort_key: self.sort_key,
            ..Default::default()
        };
    }

    fn clear_form(&mut self) {
        self.form = ExpenseForm::default();
        self.edit_target = EditTarget::None;
    }
}

/// Everything the presentation needs to render the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// The account the session shows, if one has been selected.
    pub account: Option<AccountId>,
    /// The projection's entries ordered by `sort_key`.
    pub entries: Vec<ExpenseEntry>,
    /// The number of entries per category, cancelled entries included.
    pub category_counts: CategoryAggregate,
    /// The order of `entries`.
    pub sort_key: SortKey,
    /// The progress or outcome of the last operation.
    pub status: OperationStatus,
    /// The entry the form overwrites on submit.
    pub edit_target: EditTarget,
    /// The expense form as last submitted or seeded.
    pub form: ExpenseForm,
    /// Whether the last refresh failed.
    pub stale: bool,
}

/// A handle to a client session and the remote ledger it syncs with.
///
/// Clones share the same session.
#[derive(Clone)]
pub struct SyncEngine {
    remote: Arc<dyn RemoteLedger>,
    state: Arc<Mutex<SessionState>>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Create a session with no active account.
    pub fn new(remote: Arc<dyn RemoteLedger>) -> Self {
        Self {
            remote,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, Error> {
        self.state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire the session lock: {error}"))
            .map_err(|_| Error::SessionLockError)
    }

    /// Get the current state of the session for rendering.
    pub fn snapshot(&self) -> Result<SessionSnapshot, Error> {
        let state = self.lock()?;

        Ok(SessionSnapshot {
            account: state.account.clone(),
            entries: state.view.entries.clone(),
            category_counts: state.view.category_counts.clone(),
            sort_key: state.sort_key,
            status: state.status.clone(),
            edit_target: state.edit_target,
            form: state.form.clone(),
            stale: state.projection.is_stale(),
        })
    }

    /// Make `account` the active account and load its entries.
    ///
    /// The previous account's projection, edit target and form are discarded. An
    /// operation still in flight for the previous account will not touch the new session.
    ///
    /// # Errors
    ///
    /// Returns [Error::RemoteFetch] if the entries could not be fetched. The account
    /// stays active with an empty, stale projection.
    pub async fn set_active_account(&self, account: AccountId) -> Result<(), Error> {
        let ticket = {
            let mut state = self.lock()?;
            state.reset(account.clone());
            state.status = OperationStatus::Refreshing(Operation::Refresh);

            Ticket {
                account,
                generation: state.generation,
                operation: Operation::Refresh,
            }
        };

        tracing::info!("Switched to account {}", ticket.account);
        self.fetch_and_replace(ticket, |_| {}).await
    }

    /// Order the entries by `sort_key`.
    pub fn set_sort_key(&self, sort_key: SortKey) -> Result<(), Error> {
        let mut state = self.lock()?;

        if state.sort_key != sort_key {
            state.sort_key = sort_key;
            state.rederive();
        }

        Ok(())
    }

    /// Fetch the active account's entries again and replace the projection.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::NoActiveAccount] if no account has been selected,
    /// - [Error::Busy] if another operation is in flight,
    /// - or [Error::RemoteFetch] if the fetch failed.
    pub async fn refresh(&self) -> Result<(), Error> {
        let ticket = {
            let mut state = self.lock()?;
            let ticket = state.start(Operation::Refresh)?;
            state.status = OperationStatus::Refreshing(Operation::Refresh);
            ticket
        };

        self.fetch_and_replace(ticket, |_| {}).await
    }

    /// Submit the expense form: modify the entry being edited, or add a new entry if no
    /// entry is being edited.
    ///
    /// # Errors
    ///
    /// See [SyncEngine::add] and [SyncEngine::submit_modify].
    pub async fn submit(&self, form: ExpenseForm) -> Result<(), Error> {
        let edit_target = self.lock()?.edit_target;

        match edit_target {
            EditTarget::Editing(position) => self.submit_modify(position, form).await,
            EditTarget::None => self.add(form).await,
        }
    }

    /// Add a new expense to the active account's ledger.
    ///
    /// On success the projection is replaced by a fresh fetch and the form is cleared.
    /// On failure the form keeps the user's input and the projection is left as it was.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::NoActiveAccount] if no account has been selected,
    /// - [Error::Busy] if another operation is in flight,
    /// - [Error::Validation] if the amount or date is malformed,
    /// - [Error::RemoteSubmit] if the ledger did not accept the new entry,
    /// - or [Error::RemoteFetch] if the entry was submitted but the refresh failed.
    pub async fn add(&self, form: ExpenseForm) -> Result<(), Error> {
        let (ticket, draft) = {
            let mut state = self.lock()?;
            let ticket = state.start(Operation::Add)?;
            state.form = form;

            let draft = match state.form.validate() {
                Ok(draft) => draft,
                Err(error) => return Err(state.fail(Operation::Add, error.into())),
            };

            state.status = OperationStatus::Submitting(Operation::Add);
            (ticket, draft)
        };

        tracing::info!(
            "Adding expense of {} in \"{}\" to {}",
            draft.amount,
            draft.category,
            ticket.account
        );
        let submitted = self.remote.submit_add(&ticket.account, &draft).await;

        self.settle(ticket, submitted, SessionState::clear_form)
            .await
    }

    /// Load the entry at `position` into the form and make it the edit target.
    ///
    /// No remote call is made.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::Busy] if an operation is in flight,
    /// - or [Error::NotFound] if the projection has no entry at `position`.
    pub fn begin_modify(&self, position: Position) -> Result<ExpenseForm, Error> {
        let mut state = self.lock()?;

        if state.status.is_in_flight() {
            tracing::warn!("Rejected editing expense {position}: an operation is in flight");
            return Err(Error::Busy);
        }

        let form = match state.projection.get(position) {
            Some(entry) => ExpenseForm::from_entry(entry),
            None => {
                tracing::warn!("Cannot edit expense {position}: not in the projection");
                return Err(state.fail(Operation::Modify, Error::NotFound(position)));
            }
        };

        state.form = form.clone();
        state.edit_target = EditTarget::Editing(position);
        state.status = OperationStatus::Idle;

        Ok(form)
    }

    /// Stop editing and clear the form.
    ///
    /// # Errors
    ///
    /// Returns [Error::Busy] if an operation is in flight.
    pub fn discard_edit(&self) -> Result<(), Error> {
        let mut state = self.lock()?;

        if state.status.is_in_flight() {
            return Err(Error::Busy);
        }

        state.clear_form();

        Ok(())
    }

    /// Overwrite the entry at `position` with the values in `form`.
    ///
    /// Whether `position` still exists is decided by the remote ledger, a rejection is
    /// reported as [Error::RemoteSubmit]. On success the projection is replaced by a
    /// fresh fetch, and the edit target and the form are cleared.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::NoActiveAccount] if no account has been selected,
    /// - [Error::Busy] if another operation is in flight,
    /// - [Error::Validation] if the amount or date is malformed,
    /// - [Error::RemoteSubmit] if the ledger did not accept the change,
    /// - or [Error::RemoteFetch] if the change was submitted but the refresh failed.
    pub async fn submit_modify(&self, position: Position, form: ExpenseForm) -> Result<(), Error> {
        let (ticket, draft) = {
            let mut state = self.lock()?;
            let ticket = state.start(Operation::Modify)?;
            state.form = form;

            let draft = match state.form.validate() {
                Ok(draft) => draft,
                Err(error) => return Err(state.fail(Operation::Modify, error.into())),
            };

            state.status = OperationStatus::Submitting(Operation::Modify);
            (ticket, draft)
        };

        tracing::info!("Modifying expense {position} of {}", ticket.account);
        let submitted = self
            .remote
            .submit_modify(&ticket.account, position, &draft)
            .await;

        self.settle(ticket, submitted, SessionState::clear_form)
            .await
    }

    /// Mark the entry at `position` as cancelled.
    ///
    /// The entry stays in the ledger and keeps its position. Cancelling an entry that is
    /// already cancelled is accepted.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [Error::NoActiveAccount] if no account has been selected,
    /// - [Error::Busy] if another operation is in flight,
    /// - [Error::NotFound] if the projection has no entry at `position`,
    /// - [Error::RemoteSubmit] if the ledger did not accept the cancellation,
    /// - or [Error::RemoteFetch] if it was submitted but the refresh failed.
    pub async fn cancel(&self, position: Position) -> Result<(), Error> {
        let ticket = {
            let mut state = self.lock()?;
            let ticket = state.start(Operation::Cancel)?;

            if state.projection.get(position).is_none() {
                tracing::warn!("Cannot cancel expense {position}: not in the projection");
                return Err(state.fail(Operation::Cancel, Error::NotFound(position)));
            }

            state.status = OperationStatus::Submitting(Operation::Cancel);
            ticket
        };

        tracing::info!("Cancelling expense {position} of {}", ticket.account);
        let submitted = self.remote.submit_cancel(&ticket.account, position).await;

        self.settle(ticket, submitted, |_| {}).await
    }

    /// Record the outcome of a mutating call and, if it succeeded, refresh.
    async fn settle(
        &self,
        ticket: Ticket,
        submitted: Result<(), RemoteError>,
        on_success: impl FnOnce(&mut SessionState),
    ) -> Result<(), Error> {
        {
            let mut state = self.lock()?;

            if !state.is_current(&ticket) {
                tracing::warn!(
                    "Discarding the result of {} for {}: the active account changed",
                    ticket.operation,
                    ticket.account
                );
                return submitted.map_err(Error::RemoteSubmit);
            }

            if let Err(error) = submitted {
                tracing::error!(
                    "Could not {} for {}: {error}",
                    ticket.operation,
                    ticket.account
                );
                return Err(state.fail(ticket.operation, Error::RemoteSubmit(error)));
            }

            state.status = OperationStatus::Refreshing(ticket.operation);
        }

        self.fetch_and_replace(ticket, on_success).await
    }

    /// Fetch the ticket's account and, if the session still belongs to it, replace the
    /// projection.
    async fn fetch_and_replace(
        &self,
        ticket: Ticket,
        on_success: impl FnOnce(&mut SessionState),
    ) -> Result<(), Error> {
        let fetched = self.remote.fetch_entries(&ticket.account).await;

        let mut state = self.lock()?;

        if !state.is_current(&ticket) {
            tracing::warn!(
                "Discarding entries fetched for {}: the active account changed",
                ticket.account
            );
            return fetched.map(|_| ()).map_err(Error::RemoteFetch);
        }

        match fetched {
            Ok(records) => {
                apply_fetch(&mut state, records);
                on_success(&mut state);
                state.status = OperationStatus::Idle;
                tracing::info!(
                    "Loaded {} expenses for {}",
                    state.projection.len(),
                    ticket.account
                );

                Ok(())
            }
            Err(error) => {
                tracing::error!(
                    "Could not refresh the expenses of {} after {}, the view may be out of date: {error}",
                    ticket.account,
                    ticket.operation
                );
                state.projection.mark_stale();

                Err(state.fail(ticket.operation, Error::RemoteFetch(error)))
            }
        }
    }
}

fn apply_fetch(state: &mut SessionState, records: Vec<RemoteEntry>) {
    state.replace_projection(LedgerProjection::from_remote(records));

    // The entry being edited may have disappeared in a refresh triggered elsewhere.
    if let EditTarget::Editing(position) = state.edit_target
        && state.projection.get(position).is_none()
    {
        tracing::warn!("Expense {position} is no longer in the ledger, stopping the edit");
        state.edit_target = EditTarget::None;
    }
}
