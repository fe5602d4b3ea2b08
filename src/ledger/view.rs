//! Views derived from a projection: the sorted list and the per-category counts.
//!
//! Both are pure functions of their inputs and are recomputed from scratch whenever the
//! projection or the sort key changes.

use std::{cmp::Ordering, collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, ledger::entry::ExpenseEntry};

/// The field the expense list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ledger order.
    #[default]
    None,
    /// Smallest amount first.
    Amount,
    /// Oldest first.
    #[serde(alias = "occurredAt")]
    Date,
    /// Alphabetical by category.
    Category,
}

impl SortKey {
    /// Every sort key, in the order they are offered to the user.
    pub const ALL: [SortKey; 4] = [
        SortKey::None,
        SortKey::Amount,
        SortKey::Date,
        SortKey::Category,
    ];

    /// The value used in forms and query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Amount => "amount",
            SortKey::Date => "date",
            SortKey::Category => "category",
        }
    }

    /// A human readable name.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "Ledger order",
            SortKey::Amount => "Amount",
            SortKey::Date => "Date",
            SortKey::Category => "Category",
        }
    }

    fn compare(self, a: &ExpenseEntry, b: &ExpenseEntry) -> Ordering {
        match self {
            SortKey::None => Ordering::Equal,
            SortKey::Amount => a.amount.total_cmp(&b.amount),
            SortKey::Date => a.occurred_at.cmp(&b.occurred_at),
            SortKey::Category => a.category.cmp(&b.category),
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(SortKey::None),
            "amount" => Ok(SortKey::Amount),
            "date" | "occurredAt" => Ok(SortKey::Date),
            "category" => Ok(SortKey::Category),
            other => Err(Error::InvalidSortKey(other.to_owned())),
        }
    }
}

/// The number of entries per category label.
pub type CategoryAggregate = HashMap<String, u32>;

/// Order `entries` by `key`, ascending.
///
/// The sort is stable, so entries that compare equal keep their relative order and
/// sorting an already sorted list changes nothing. [SortKey::None] keeps the input order.
pub fn sorted_view(entries: &[ExpenseEntry], key: SortKey) -> Vec<ExpenseEntry> {
    let mut sorted = entries.to_vec();

    if key != SortKey::None {
        sorted.sort_by(|a, b| key.compare(a, b));
    }

    sorted
}

/// Count the entries of each category, cancelled entries included.
pub fn category_aggregate(entries: &[ExpenseEntry]) -> CategoryAggregate {
    let mut counts = HashMap::new();

    for entry in entries {
        *counts.entry(entry.category.clone()).or_insert(0) += 1;
    }

    counts
}

/// The sorted list and category counts computed from one projection and sort key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedView {
    /// The entries in display order.
    pub entries: Vec<ExpenseEntry>,
    /// The number of entries per category.
    pub category_counts: CategoryAggregate,
}

impl DerivedView {
    /// Derive both views from `entries`.
    pub fn derive(entries: &[ExpenseEntry], key: SortKey) -> Self {
        Self {
            entries: sorted_view(entries, key),
            category_counts: category_aggregate(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::{
        Error,
        ledger::{
            entry::{ExpenseEntry, Position},
            view::{SortKey, category_aggregate, sorted_view},
        },
    };

    fn entry(position: usize, amount: f64, occurred_at: i64, category: &str) -> ExpenseEntry {
        ExpenseEntry {
            position: Position::new(position),
            amount,
            occurred_at,
            category: category.to_owned(),
            description: String::new(),
            canceled: false,
        }
    }

    fn positions(entries: &[ExpenseEntry]) -> Vec<usize> {
        entries.iter().map(|e| e.position.index()).collect()
    }

    fn sample() -> Vec<ExpenseEntry> {
        vec![
            entry(0, 30.0, 300, "food"),
            entry(1, 10.0, 100, "auto"),
            entry(2, 20.0, 200, "food"),
            entry(3, 10.0, 50, "Rent"),
        ]
    }

    #[test]
    fn none_keeps_ledger_order() {
        assert_eq!(positions(&sorted_view(&sample(), SortKey::None)), [0, 1, 2, 3]);
    }

    #[test]
    fn sorts_by_amount_stably() {
        // Positions 1 and 3 have the same amount and keep their order.
        assert_eq!(positions(&sorted_view(&sample(), SortKey::Amount)), [1, 3, 2, 0]);
    }

    #[test]
    fn sorts_by_date() {
        assert_eq!(positions(&sorted_view(&sample(), SortKey::Date)), [3, 1, 2, 0]);
    }

    #[test]
    fn sorts_by_category_case_sensitively() {
        // Uppercase letters sort before lowercase ones.
        assert_eq!(
            positions(&sorted_view(&sample(), SortKey::Category)),
            [3, 1, 0, 2]
        );
    }

    #[test]
    fn category_sort_keeps_relative_order_of_equal_labels() {
        let entries = vec![
            entry(0, 1.0, 0, "food"),
            entry(1, 1.0, 0, "auto"),
            entry(2, 1.0, 0, "food"),
        ];

        let sorted = sorted_view(&entries, SortKey::Category);

        let categories: Vec<_> = sorted.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, ["auto", "food", "food"]);
        assert_eq!(positions(&sorted), [1, 0, 2]);
    }

    #[test]
    fn sorting_is_idempotent() {
        for key in SortKey::ALL {
            let once = sorted_view(&sample(), key);
            let twice = sorted_view(&once, key);

            assert_eq!(once, twice, "sorting by {key} twice changed the order");
        }
    }

    #[test]
    fn aggregate_counts_canceled_entries() {
        let mut entries = sample();
        entries[0].canceled = true;

        let counts = category_aggregate(&entries);

        assert_eq!(
            counts,
            HashMap::from([
                ("food".to_owned(), 2),
                ("auto".to_owned(), 1),
                ("Rent".to_owned(), 1),
            ])
        );
    }

    #[test]
    fn aggregate_is_order_independent() {
        let entries = sample();
        let mut reversed = entries.clone();
        reversed.reverse();
        let mut rotated = entries.clone();
        rotated.rotate_left(2);

        let want = category_aggregate(&entries);
        assert_eq!(category_aggregate(&reversed), want);
        assert_eq!(category_aggregate(&rotated), want);
    }

    #[test]
    fn aggregate_of_empty_projection_is_empty() {
        assert!(category_aggregate(&[]).is_empty());
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("".parse::<SortKey>(), Ok(SortKey::None));
        assert_eq!("amount".parse::<SortKey>(), Ok(SortKey::Amount));
        assert_eq!("occurredAt".parse::<SortKey>(), Ok(SortKey::Date));
        assert_eq!(
            "colour".parse::<SortKey>(),
            Err(Error::InvalidSortKey("colour".to_owned()))
        );

        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>(), Ok(key));
        }
    }
}
