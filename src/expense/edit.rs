//! Endpoints for modifying an existing expense.

use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    expense::{form::expense_form_view, redirect_to_expenses},
    ledger::{EditTarget, ExpenseForm, Position, SyncEngine},
};

/// Load the expense at `position` into the form.
pub async fn begin_edit_endpoint(
    Path(position): Path<Position>,
    State(engine): State<SyncEngine>,
) -> Response {
    match engine.begin_modify(position) {
        Ok(_) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}

/// Overwrite the expense at `position` with the submitted form.
pub async fn update_expense_endpoint(
    Path(position): Path<Position>,
    State(engine): State<SyncEngine>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    match engine.submit_modify(position, form.clone()).await {
        Ok(()) => redirect_to_expenses(),
        Err(Error::Validation(error)) => expense_form_view(
            &form,
            EditTarget::Editing(position),
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Stop editing and clear the form.
pub async fn discard_edit_endpoint(State(engine): State<SyncEngine>) -> Response {
    match engine.discard_edit() {
        Ok(()) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}
