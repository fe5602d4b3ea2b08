//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{position}', use [format_endpoint].

use std::fmt::Display;

/// The root route which redirects to the expenses page.
pub const ROOT: &str = "/";
/// The page for displaying and editing the active account's expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to submit the expense form, adding an expense or modifying the one being edited.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to modify a single expense.
pub const EXPENSE: &str = "/api/expenses/{position}";
/// The route to load an expense into the form for editing.
pub const EDIT_EXPENSE: &str = "/api/expenses/{position}/edit";
/// The route to cancel an expense.
pub const CANCEL_EXPENSE: &str = "/api/expenses/{position}/cancel";
/// The route to stop editing an expense.
pub const DISCARD_EDIT: &str = "/api/edit/discard";
/// The route to fetch the expenses from the ledger again.
pub const REFRESH: &str = "/api/refresh";
/// The route to change the order of the expense list.
pub const SORT: &str = "/api/sort";
/// The route to switch to another account.
pub const ACCOUNT: &str = "/api/account";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{position}', '{position}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
