//! The pages and endpoints for viewing and changing the active account's expenses.

mod cancel;
mod create;
mod edit;
mod form;
mod list;
mod session;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::endpoints;

pub use cancel::cancel_expense_endpoint;
pub use create::submit_expense_endpoint;
pub use edit::{begin_edit_endpoint, discard_edit_endpoint, update_expense_endpoint};
pub use list::get_expenses_page;
pub use session::{refresh_endpoint, set_account_endpoint, set_sort_endpoint};

/// Tell htmx to reload the expenses page so it renders the new session state.
fn redirect_to_expenses() -> Response {
    (
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
