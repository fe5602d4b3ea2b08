//! Endpoints that change what the expenses page shows without changing the ledger.

use axum::{Form, extract::State, response::Response};
use serde::Deserialize;

use crate::{
    expense::redirect_to_expenses,
    ledger::{AccountId, SortKey, SyncEngine},
};

/// The form data for changing the sort order.
#[derive(Debug, Deserialize)]
pub struct SortForm {
    pub sort: String,
}

/// The form data for switching accounts.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub account: String,
}

/// Fetch the active account's expenses again.
pub async fn refresh_endpoint(State(engine): State<SyncEngine>) -> Response {
    match engine.refresh().await {
        Ok(()) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}

/// Change the order of the expense list.
pub async fn set_sort_endpoint(
    State(engine): State<SyncEngine>,
    Form(form): Form<SortForm>,
) -> Response {
    let result = form
        .sort
        .parse::<SortKey>()
        .and_then(|sort_key| engine.set_sort_key(sort_key));

    match result {
        Ok(()) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}

/// Make another account the active account.
pub async fn set_account_endpoint(
    State(engine): State<SyncEngine>,
    Form(form): Form<AccountForm>,
) -> Response {
    let account = match AccountId::new(&form.account) {
        Ok(account) => account,
        Err(error) => return error.into_alert_response(),
    };

    match engine.set_active_account(account).await {
        Ok(()) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}
