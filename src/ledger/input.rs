//! Validation of the raw expense form at the client boundary.
//!
//! Nothing reaches the remote ledger until it has been turned into an [ExpenseDraft].

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::ledger::entry::{ExpenseEntry, date_from_epoch, epoch_from_date};

/// The format of the date inputs, e.g. "2025-01-31".
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// The reasons an expense form can be rejected before anything is sent to the ledger.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The amount is empty or is not a finite number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The amount is a number below zero.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(f64),

    /// The date is empty or not a valid calendar date.
    #[error("\"{0}\" is not a valid date, use the format YYYY-MM-DD")]
    InvalidDate(String),
}

/// A non-negative, finite amount of money.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    /// Parse an amount from user input.
    ///
    /// # Errors
    ///
    /// This function will return a:
    /// - [ValidationError::InvalidAmount] if `text` is not a finite number,
    /// - or [ValidationError::NegativeAmount] if the number is below zero.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();

        let amount: f64 = trimmed
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(text.to_owned()))?;

        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(text.to_owned()));
        }

        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount(amount));
        }

        // Normalise negative zero so it displays as "0".
        Ok(Self(amount.abs()))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `amount` is finite and not negative.
    pub fn new_unchecked(amount: f64) -> Self {
        Self(amount)
    }

    /// The amount as a float.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a calendar date in the format "YYYY-MM-DD".
///
/// # Errors
///
/// Returns [ValidationError::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, ValidationError> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(text.to_owned()))
}

/// Format a date the way the date inputs expect it.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// The raw values of the expense form, exactly as the user typed them.
///
/// The session keeps the form around so that inputs survive a failed submission and can
/// be pre-filled when modifying an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    /// A non-negative decimal number.
    pub amount: String,
    /// A calendar date in the format YYYY-MM-DD.
    pub date: String,
    /// Free text, may be empty.
    pub category: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
}

impl ExpenseForm {
    /// Fill the form with the current values of `entry`.
    ///
    /// The date is the entry's UTC calendar date, the inverse of how dates are sent to
    /// the ledger.
    pub fn from_entry(entry: &ExpenseEntry) -> Self {
        let date = date_from_epoch(entry.occurred_at, UtcOffset::UTC)
            .map(format_date)
            .unwrap_or_default();

        Self {
            amount: entry.amount.to_string(),
            date,
            category: entry.category.clone(),
            description: entry.description.clone(),
        }
    }

    /// Whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.amount.is_empty()
            && self.date.is_empty()
            && self.category.is_empty()
            && self.description.is_empty()
    }

    /// Check the form and convert it into a draft that can be sent to the ledger.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] if the amount or the date is malformed.
    pub fn validate(&self) -> Result<ExpenseDraft, ValidationError> {
        let amount = Amount::parse(&self.amount)?;
        let date = parse_date(&self.date)?;

        Ok(ExpenseDraft {
            amount,
            date,
            category: self.category.clone(),
            description: self.description.clone(),
        })
    }
}

/// A validated expense, ready to be written to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    /// How much was spent.
    pub amount: Amount,
    /// The day the money was spent.
    pub date: Date,
    /// What kind of expense this is, e.g. "food".
    pub category: String,
    /// Notes about the expense.
    pub description: String,
}

impl ExpenseDraft {
    /// The date of the expense as seconds since the Unix epoch.
    pub fn occurred_at(&self) -> i64 {
        epoch_from_date(self.date)
    }
}
