//! The progress of the session's current operation and the entry being edited.

use std::fmt::Display;

use crate::{Error, ledger::entry::Position};

/// The user-facing operations of the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Append a new entry.
    Add,
    /// Overwrite an entry in place.
    Modify,
    /// Mark an entry as cancelled.
    Cancel,
    /// Fetch the entries without changing them.
    Refresh,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Add => "add expense",
            Operation::Modify => "modify expense",
            Operation::Cancel => "cancel expense",
            Operation::Refresh => "refresh expenses",
        };

        write!(f, "{name}")
    }
}

/// Where the current operation is in its life cycle.
///
/// A mutation moves through `Idle → Submitting → Refreshing → Idle`. If the mutating
/// call fails it stops at [OperationStatus::Failed] after `Submitting`; if the refresh
/// after it fails it stops at [OperationStatus::Failed] after `Refreshing`. The next
/// operation starts from a failed status as if it were idle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OperationStatus {
    /// Nothing is in flight.
    #[default]
    Idle,
    /// The mutating call has been sent and has not settled yet.
    Submitting(Operation),
    /// The entries are being fetched again.
    Refreshing(Operation),
    /// The last operation failed.
    #[allow(missing_docs)]
    Failed { operation: Operation, error: Error },
}

impl OperationStatus {
    /// Whether a remote call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            OperationStatus::Submitting(_) | OperationStatus::Refreshing(_)
        )
    }

    /// The error of the last operation, if it failed.
    pub fn failure(&self) -> Option<(Operation, &Error)> {
        match self {
            OperationStatus::Failed { operation, error } => Some((*operation, error)),
            _ => None,
        }
    }
}

/// The entry that the expense form currently modifies, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditTarget {
    /// The form adds a new entry.
    #[default]
    None,
    /// The form overwrites the entry at this position.
    Editing(Position),
}

impl EditTarget {
    /// The position being edited.
    pub fn position(self) -> Option<Position> {
        match self {
            EditTarget::None => None,
            EditTarget::Editing(position) => Some(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        ledger::{
            entry::Position,
            status::{EditTarget, Operation, OperationStatus},
        },
    };

    #[test]
    fn only_submitting_and_refreshing_are_in_flight() {
        assert!(!OperationStatus::Idle.is_in_flight());
        assert!(OperationStatus::Submitting(Operation::Add).is_in_flight());
        assert!(OperationStatus::Refreshing(Operation::Cancel).is_in_flight());

        let failed = OperationStatus::Failed {
            operation: Operation::Add,
            error: Error::Busy,
        };
        assert!(!failed.is_in_flight());
        assert_eq!(failed.failure(), Some((Operation::Add, &Error::Busy)));
    }

    #[test]
    fn edit_target_position() {
        assert_eq!(EditTarget::None.position(), None);
        assert_eq!(
            EditTarget::Editing(Position::new(2)).position(),
            Some(Position::new(2))
        );
    }
}
