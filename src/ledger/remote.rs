//! The contract of the remote ledger service that holds the authoritative expense entries.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    ledger::{entry::Position, input::ExpenseDraft},
};

/// Identifies the account whose ledger is being read and written, e.g. a wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account ID.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidAccount] if `account` is empty,
    /// contains whitespace or URL path characters (`/`, `\`, `?`, `#`), or is a dot
    /// segment (`.` or `..`).
    pub fn new(account: &str) -> Result<Self, Error> {
        let account = account.trim();

        if account.is_empty()
            || account == "."
            || account == ".."
            || account
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '/' | '\\' | '?' | '#'))
        {
            Err(Error::InvalidAccount(account.to_owned()))
        } else {
            Ok(Self(account.to_owned()))
        }
    }

    /// Create an account ID without validation.
    ///
    /// The caller should ensure that the string is not empty and has no whitespace.
    pub fn new_unchecked(account: &str) -> Self {
        Self(account.to_owned())
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::new(s)
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry as returned by the remote ledger, in ledger order.
///
/// The ledger calls the epoch-second timestamp `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// How much was spent.
    pub amount: f64,
    /// When the money was spent, in seconds since the Unix epoch.
    #[serde(rename = "date")]
    pub occurred_at: i64,
    /// What kind of expense this is.
    pub category: String,
    /// Notes about the expense.
    #[serde(default)]
    pub description: String,
    /// Whether the entry has been cancelled.
    #[serde(default)]
    pub canceled: bool,
}

impl RemoteEntry {
    /// A new, not cancelled entry with the values of `draft`.
    pub fn from_draft(draft: &ExpenseDraft) -> Self {
        Self {
            amount: draft.amount.value(),
            occurred_at: draft.occurred_at(),
            category: draft.category.clone(),
            description: draft.description.clone(),
            canceled: false,
        }
    }
}

/// The ways a call to the remote ledger can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    /// The ledger could not be reached, or the call did not complete.
    #[error("could not reach the ledger: {0}")]
    Network(String),

    /// The user declined to authorize the call.
    #[error("the request was not authorized")]
    Declined,

    /// The ledger refused the call, e.g. because the position does not exist.
    #[error("the ledger rejected the request ({status}): {message}")]
    Rejected {
        /// The status code reported by the ledger.
        status: u16,
        /// The reason given by the ledger.
        message: String,
    },

    /// The ledger answered with something that could not be understood.
    #[error("could not understand the ledger response: {0}")]
    Parse(String),
}

/// Read and write access to the ledger of an account.
///
/// Every call may be slow and may fail for reasons outside the client's control. A
/// mutation that settled successfully is not guaranteed to be visible in the very next
/// [RemoteLedger::fetch_entries].
#[async_trait::async_trait]
pub trait RemoteLedger: Send + Sync {
    /// Get every entry of `account`'s ledger, ordered by position.
    async fn fetch_entries(&self, account: &AccountId) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Append a new entry to `account`'s ledger.
    async fn submit_add(&self, account: &AccountId, draft: &ExpenseDraft)
    -> Result<(), RemoteError>;

    /// Overwrite the entry at `position` in `account`'s ledger.
    async fn submit_modify(
        &self,
        account: &AccountId,
        position: Position,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError>;

    /// Mark the entry at `position` in `account`'s ledger as cancelled.
    async fn submit_cancel(&self, account: &AccountId, position: Position)
    -> Result<(), RemoteError>;
}
