//! The endpoint behind the expense form.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    expense::{form::expense_form_view, redirect_to_expenses},
    ledger::{ExpenseForm, SyncEngine},
};

/// Handle the expense form submission.
///
/// Adds a new expense, or modifies the expense being edited if there is one. Invalid
/// input re-renders the form with an error message and the user's input.
pub async fn submit_expense_endpoint(
    State(engine): State<SyncEngine>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    match engine.submit(form.clone()).await {
        Ok(()) => redirect_to_expenses(),
        Err(Error::Validation(error)) => {
            let edit_target = match engine.snapshot() {
                Ok(snapshot) => snapshot.edit_target,
                Err(error) => return error.into_alert_response(),
            };

            expense_form_view(&form, edit_target, &format!("Error: {error}")).into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}
