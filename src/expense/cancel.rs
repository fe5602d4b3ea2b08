use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::{
    expense::redirect_to_expenses,
    ledger::{Position, SyncEngine},
};

/// Mark the expense at `position` as cancelled.
pub async fn cancel_expense_endpoint(
    Path(position): Path<Position>,
    State(engine): State<SyncEngine>,
) -> Response {
    match engine.cancel(position).await {
        Ok(()) => redirect_to_expenses(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        endpoints,
        expense::cancel::cancel_expense_endpoint,
        ledger::{AccountId, InMemoryLedger, Position, RemoteEntry, SyncEngine},
        test_utils::{
            Call, ScriptedLedger, assert_hx_redirect, assert_valid_html, parse_html_fragment,
        },
    };

    async fn engine_with_one_entry() -> (SyncEngine, Arc<ScriptedLedger>) {
        let account = AccountId::new_unchecked("0xalice");
        let ledger = Arc::new(ScriptedLedger::new(InMemoryLedger::with_entries(
            &account,
            vec![RemoteEntry {
                amount: 12.5,
                occurred_at: 1_700_000_000,
                category: "food".to_owned(),
                description: String::new(),
                canceled: false,
            }],
        )));
        let engine = SyncEngine::new(ledger.clone());
        engine.set_active_account(account).await.unwrap();
        ledger.reset_calls();

        (engine, ledger)
    }

    #[tokio::test]
    async fn cancels_and_redirects() {
        let (engine, _) = engine_with_one_entry().await;

        let response = cancel_expense_endpoint(Path(Position::new(0)), State(engine.clone())).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.entries.len(), 1);
        assert!(snapshot.entries[0].canceled);
    }

    #[tokio::test]
    async fn missing_position_is_not_found_without_calling_ledger() {
        let (engine, ledger) = engine_with_one_entry().await;

        let response = cancel_expense_endpoint(Path(Position::new(1)), State(engine)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn busy_engine_returns_conflict() {
        let (engine, ledger) = engine_with_one_entry().await;
        let gate = ledger.hold_submits();
        let in_flight = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.cancel(Position::new(0)).await })
        };
        gate.entered().await;

        let response = cancel_expense_endpoint(Path(Position::new(0)), State(engine)).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            ledger.calls(),
            [Call::SubmitCancel(
                AccountId::new_unchecked("0xalice"),
                Position::new(0)
            )]
        );

        gate.release();
        in_flight.await.unwrap().unwrap();
    }
}
