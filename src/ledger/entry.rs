//! Defines the expense entry as the client knows it and the position that identifies it.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

/// The index of an entry within an account's ledger, as assigned by the remote ledger.
///
/// Positions stay valid for as long as no entry is physically removed from the ledger.
/// Cancelling an entry only sets a flag, so it keeps its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position(usize);

impl Position {
    /// Create a position from a raw ledger index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw ledger index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Position {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One expense record of the active account's ledger.
///
/// Entries are only ever created from a fetch of the remote ledger, see
/// [crate::ledger::LedgerProjection].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    /// Where the entry sits in the remote ledger.
    pub position: Position,
    /// The amount of money spent, never negative.
    pub amount: f64,
    /// When the expense happened, in seconds since the Unix epoch.
    pub occurred_at: i64,
    /// A free-text label used for grouping and sorting.
    pub category: String,
    /// A free-text description, may be empty.
    pub description: String,
    /// Whether the entry has been voided.
    pub canceled: bool,
}

impl ExpenseEntry {
    /// The calendar date the expense occurred on in the timezone `offset`.
    ///
    /// Returns `None` if `occurred_at` is outside the range `time` can represent.
    pub fn occurred_on(&self, offset: UtcOffset) -> Option<Date> {
        date_from_epoch(self.occurred_at, offset)
    }
}

/// Convert seconds since the Unix epoch to a calendar date in the timezone `offset`.
pub fn date_from_epoch(epoch_seconds: i64, offset: UtcOffset) -> Option<Date> {
    OffsetDateTime::from_unix_timestamp(epoch_seconds)
        .ok()
        .map(|date_time| date_time.to_offset(offset).date())
}

/// Convert a calendar date to the epoch second of midnight UTC on that date.
pub fn epoch_from_date(date: Date) -> i64 {
    date.midnight().assume_utc().unix_timestamp()
}
