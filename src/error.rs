//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    internal_server_error::InternalServerError,
    ledger::{Position, RemoteError, ValidationError},
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The expense form has a malformed amount or date.
    ///
    /// Nothing was sent to the ledger and the user's input is kept.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The ledger did not accept a mutation, or the user declined to authorize it.
    ///
    /// The projection was not touched, so the user can fix the input and try again.
    #[error("the change was not saved: {0}")]
    RemoteSubmit(RemoteError),

    /// The entries could not be fetched.
    ///
    /// If this happened after a mutation, the mutation may or may not have been applied
    /// and the projection is flagged as stale.
    #[error("the expenses could not be loaded: {0}")]
    RemoteFetch(RemoteError),

    /// The projection has no entry at the position.
    #[error("there is no expense at position {0}")]
    NotFound(Position),

    /// Another operation is still in flight for the active account.
    #[error("another change is still being saved")]
    Busy,

    /// An operation that needs an account was started before one was selected.
    #[error("no account has been selected")]
    NoActiveAccount,

    /// The account ID was empty or contained whitespace.
    #[error("\"{0}\" is not a valid account")]
    InvalidAccount(String),

    /// The sort key is not one of the supported keys.
    #[error("cannot sort by \"{0}\"")]
    InvalidSortKey(String),

    /// Could not acquire the session lock.
    #[error("could not acquire the session lock")]
    SessionLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound(_) => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::SessionLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::NoActiveAccount
            | Error::InvalidAccount(_)
            | Error::InvalidSortKey(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Busy => StatusCode::CONFLICT,
            Error::RemoteSubmit(_) => StatusCode::BAD_GATEWAY,
            Error::RemoteFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::SessionLockError | Error::InvalidTimezoneError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::Validation(error) => Alert::Error {
                message: "Invalid expense".to_owned(),
                details: format!("{error}. Check the form and try again."),
            },
            Error::RemoteSubmit(RemoteError::Declined) => Alert::Error {
                message: "Change not authorized".to_owned(),
                details: "The ledger did not receive your approval, so nothing was saved."
                    .to_owned(),
            },
            Error::RemoteSubmit(error) => Alert::Error {
                message: "Could not save the change".to_owned(),
                details: format!(
                    "{error}. Your expenses were not changed, try again once the ledger is available."
                ),
            },
            Error::RemoteFetch(error) => Alert::Error {
                message: "Could not load your expenses".to_owned(),
                details: format!(
                    "{error}. The list may be out of date. \
                    Refresh to see whether your last change was saved."
                ),
            },
            Error::NotFound(position) => Alert::Error {
                message: "Expense not found".to_owned(),
                details: format!(
                    "There is no expense at position {position}. \
                    Try refreshing the page to see the latest expenses."
                ),
            },
            Error::Busy => Alert::Error {
                message: "Please wait".to_owned(),
                details: "Another change is still being saved. Try again when it has finished."
                    .to_owned(),
            },
            Error::NoActiveAccount => Alert::Error {
                message: "No account selected".to_owned(),
                details: "Choose an account before adding or changing expenses.".to_owned(),
            },
            Error::InvalidAccount(account) => Alert::Error {
                message: "Invalid account".to_owned(),
                details: format!(
                    "\"{account}\" is not a valid account. \
                    An account cannot be empty or contain spaces."
                ),
            },
            Error::InvalidSortKey(key) => Alert::Error {
                message: "Invalid sort order".to_owned(),
                details: format!(
                    "Cannot sort by \"{key}\". Sort by amount, date or category instead."
                ),
            },
            Error::InvalidTimezoneError(timezone) => Alert::Error {
                message: "Invalid Timezone Settings".to_owned(),
                details: format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            },
            Error::SessionLockError => Alert::Error {
                message: "Something went wrong".to_owned(),
                details: "An unexpected error occurred, check the server logs for more details."
                    .to_owned(),
            },
        };

        (status_code, alert.into_html()).into_response()
    }
}
