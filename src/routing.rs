//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    expense::{
        begin_edit_endpoint, cancel_expense_endpoint, discard_edit_endpoint, get_expenses_page,
        refresh_endpoint, set_account_endpoint, set_sort_endpoint, submit_expense_endpoint,
        update_expense_endpoint,
    },
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page));

    let ledger_routes = Router::new()
        .route(endpoints::EXPENSES_API, post(submit_expense_endpoint))
        .route(endpoints::EXPENSE, put(update_expense_endpoint))
        .route(endpoints::EDIT_EXPENSE, post(begin_edit_endpoint))
        .route(endpoints::CANCEL_EXPENSE, post(cancel_expense_endpoint));

    let session_routes = Router::new()
        .route(endpoints::DISCARD_EDIT, post(discard_edit_endpoint))
        .route(endpoints::REFRESH, post(refresh_endpoint))
        .route(endpoints::SORT, put(set_sort_endpoint))
        .route(endpoints::ACCOUNT, put(set_account_endpoint));

    page_routes
        .merge(ledger_routes)
        .merge(session_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::EXPENSES_VIEW)
}
