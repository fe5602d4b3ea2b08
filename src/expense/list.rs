//! The expenses page: the account switcher, the expense form, the category analysis and
//! the sorted list of expenses.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error, endpoints,
    expense::form::expense_form_view,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CANCELLED_BADGE_STYLE, ERROR_BANNER_STYLE,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, INFO_BANNER_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        WARNING_BANNER_STYLE, base, dollar_input_styles, format_currency,
    },
    ledger::{
        CategoryAggregate, ExpenseEntry, OperationStatus, SessionSnapshot, SortKey, SyncEngine,
        format_date,
    },
    timezone::local_offset_or_error,
};

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub engine: SyncEngine,
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            engine: state.engine.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the expenses page from the current session.
pub async fn get_expenses_page(State(state): State<ExpensesPageState>) -> Result<Response, Error> {
    let local_offset = local_offset_or_error(&state.local_timezone)?;
    let snapshot = state.engine.snapshot()?;

    Ok(expenses_view(&snapshot, local_offset).into_response())
}

fn expenses_view(snapshot: &SessionSnapshot, local_offset: UtcOffset) -> Markup {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            header class="w-full max-w-4xl flex flex-wrap items-center justify-between gap-4 mb-6"
            {
                h1 class="text-2xl font-bold" { "Cost Tracker" }

                (account_form_view(snapshot))
            }

            (status_banner_view(snapshot))

            @if snapshot.account.is_some() {
                div class=(FORM_CONTAINER_STYLE)
                {
                    (expense_form_view(&snapshot.form, snapshot.edit_target, ""))
                }

                section class="w-full max-w-4xl mt-8"
                {
                    div class="flex flex-wrap items-end justify-between gap-4 mb-4"
                    {
                        h2 class="text-xl font-bold" { "Expenses" }

                        div class="flex items-end gap-4"
                        {
                            (sort_select_view(snapshot.sort_key))

                            button
                                type="button"
                                hx-post=(endpoints::REFRESH)
                                hx-target-error="#alert-container"
                                class=(BUTTON_SECONDARY_STYLE)
                            {
                                "Refresh"
                            }
                        }
                    }

                    (expense_table_view(&snapshot.entries, local_offset))
                }

                section class="w-full max-w-4xl mt-8"
                {
                    h2 class="text-xl font-bold mb-4" { "Expenses per Category" }

                    (category_analysis_view(&snapshot.category_counts))
                }
            } @else {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "Enter an account above to see its expenses."
                }
            }
        }
    };

    base("Expenses", &[dollar_input_styles()], &content)
}

fn account_form_view(snapshot: &SessionSnapshot) -> Markup {
    let account = snapshot
        .account
        .as_ref()
        .map(|account| -> &str { account.as_ref() })
        .unwrap_or_default();

    html! {
        form
            id="account-form"
            hx-put=(endpoints::ACCOUNT)
            hx-target-error="#alert-container"
            class="flex items-end gap-2"
        {
            div
            {
                label for="account" class=(FORM_LABEL_STYLE) { "Account" }

                input
                    id="account"
                    type="text"
                    name="account"
                    placeholder="0x…"
                    value=(account)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Switch" }
        }
    }
}

fn status_banner_view(snapshot: &SessionSnapshot) -> Markup {
    html! {
        @match &snapshot.status {
            OperationStatus::Submitting(operation) => {
                div class=(INFO_BANNER_STYLE) role="status"
                {
                    "Waiting for the ledger to " (operation) "…"
                }
            }
            OperationStatus::Refreshing(_) => {
                div class=(INFO_BANNER_STYLE) role="status" { "Loading the latest expenses…" }
            }
            OperationStatus::Failed { operation, error } => {
                div id="status-error" class=(ERROR_BANNER_STYLE) role="alert"
                {
                    "Could not " (operation) ": " (error)
                }
            }
            OperationStatus::Idle => {}
        }

        @if snapshot.stale {
            div id="stale-warning" class=(WARNING_BANNER_STYLE) role="alert"
            {
                "The expenses below may be out of date because the last refresh failed. "
                a href="#" hx-post=(endpoints::REFRESH) class=(LINK_STYLE) { "Try again" }
            }
        }
    }
}

fn sort_select_view(sort_key: SortKey) -> Markup {
    html! {
        div
        {
            label for="sort" class=(FORM_LABEL_STYLE) { "Sort by" }

            select
                id="sort"
                name="sort"
                hx-put=(endpoints::SORT)
                hx-trigger="change"
                hx-target-error="#alert-container"
                class=(FORM_TEXT_INPUT_STYLE)
            {
                @for key in SortKey::ALL {
                    option value=(key.as_str()) selected[key == sort_key] { (key.label()) }
                }
            }
        }
    }
}

fn expense_table_view(entries: &[ExpenseEntry], local_offset: UtcOffset) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded-lg"
        {
            table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "#" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for entry in entries {
                        (expense_row_view(entry, local_offset))
                    }

                    @if entries.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="6" class=(TABLE_CELL_STYLE) { "No expenses yet." }
                        }
                    }
                }
            }
        }
    }
}

fn expense_row_view(entry: &ExpenseEntry, local_offset: UtcOffset) -> Markup {
    let date = entry
        .occurred_on(local_offset)
        .map(format_date)
        .unwrap_or_else(|| "Unknown date".to_owned());
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE, entry.position);
    let cancel_endpoint = endpoints::format_endpoint(endpoints::CANCEL_EXPENSE, entry.position);

    html! {
        tr class=(TABLE_ROW_STYLE) data-position=(entry.position)
        {
            td class=(TABLE_CELL_STYLE) { (entry.position) }
            td class=(TABLE_CELL_STYLE) { (format_currency(entry.amount)) }
            td class=(TABLE_CELL_STYLE) { (date) }
            td class=(TABLE_CELL_STYLE) { (entry.category) }
            td class=(TABLE_CELL_STYLE)
            {
                (entry.description)

                @if entry.canceled {
                    " "
                    span class=(CANCELLED_BADGE_STYLE) { "CANCELLED" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    button
                        type="button"
                        hx-post=(edit_endpoint)
                        hx-target-error="#alert-container"
                        class=(LINK_STYLE)
                    {
                        "Modify"
                    }

                    button
                        type="button"
                        hx-post=(cancel_endpoint)
                        hx-confirm={ "Cancel expense #" (entry.position) "? It will stay in the ledger marked as cancelled." }
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Cancel"
                    }
                }
            }
        }
    }
}

fn category_analysis_view(category_counts: &CategoryAggregate) -> Markup {
    let mut counts: Vec<_> = category_counts.iter().collect();
    counts.sort_by(|(a, _), (b, _)| a.cmp(b));

    html! {
        @if counts.is_empty() {
            p class="text-gray-500 dark:text-gray-400" { "No categories yet." }
        } @else {
            table id="category-analysis" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                    }
                }

                tbody
                {
                    @for (category, count) in counts {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (category) }
                            td class=(TABLE_CELL_STYLE) { (count) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use scraper::{ElementRef, Html, Selector};

    use crate::{
        Error, endpoints,
        expense::list::{ExpensesPageState, get_expenses_page},
        html::format_currency,
        ledger::{
            AccountId, ExpenseForm, InMemoryLedger, Position, RemoteEntry, RemoteError, SortKey,
            SyncEngine,
        },
        test_utils::{
            ScriptedLedger, assert_content_type, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, parse_html_document,
        },
    };

    fn entry(amount: f64, occurred_at: i64, category: &str, canceled: bool) -> RemoteEntry {
        RemoteEntry {
            amount,
            occurred_at,
            category: category.to_owned(),
            description: format!("{category} expense"),
            canceled,
        }
    }

    async fn page_state(entries: Vec<RemoteEntry>, local_timezone: &str) -> ExpensesPageState {
        let account = AccountId::new_unchecked("0xalice");
        let engine = SyncEngine::new(Arc::new(InMemoryLedger::with_entries(&account, entries)));
        engine
            .set_active_account(account)
            .await
            .expect("could not load test account");

        ExpensesPageState {
            engine,
            local_timezone: local_timezone.to_owned(),
        }
    }

    async fn render(state: ExpensesPageState) -> Html {
        let response = get_expenses_page(State(state))
            .await
            .expect("could not render expenses page");

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        html
    }

    fn rows(html: &Html) -> Vec<ElementRef<'_>> {
        html.select(&Selector::parse("#expenses tbody tr[data-position]").unwrap())
            .collect()
    }

    fn cell_texts(row: &ElementRef<'_>) -> Vec<String> {
        row.select(&Selector::parse("td").unwrap())
            .map(|cell| cell.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn lists_entries_with_all_fields() {
        let state = page_state(
            vec![
                entry(12.5, 1_700_000_000, "food", false),
                entry(40.0, 1_700_086_400, "auto", true),
            ],
            "Etc/UTC",
        )
        .await;

        let html = render(state).await;

        let rows = rows(&html);
        assert_eq!(rows.len(), 2);

        let first = cell_texts(&rows[0]);
        assert_eq!(first[0], "0");
        assert_eq!(first[1], format_currency(12.5));
        assert_eq!(first[2], "2023-11-14");
        assert_eq!(first[3], "food");
        assert_eq!(first[4], "food expense");

        let second = cell_texts(&rows[1]);
        assert_eq!(second[0], "1");
        assert!(second[4].contains("CANCELLED"), "got {:?}", second[4]);

        let buttons: Vec<_> = rows[1]
            .select(&Selector::parse("button").unwrap())
            .collect();
        assert_hx_endpoint(&buttons[0], "/api/expenses/1/edit", "hx-post");
        assert_hx_endpoint(&buttons[1], "/api/expenses/1/cancel", "hx-post");
    }

    #[tokio::test]
    async fn list_dates_use_local_timezone() {
        // 2023-11-14 22:13:20 UTC is already the 15th in Auckland.
        let state = page_state(
            vec![entry(12.5, 1_700_000_000, "food", false)],
            "Pacific/Auckland",
        )
        .await;

        let html = render(state).await;

        assert_eq!(cell_texts(&rows(&html)[0])[2], "2023-11-15");
    }

    #[tokio::test]
    async fn list_follows_sort_key() {
        let state = page_state(
            vec![
                entry(30.0, 300, "food", false),
                entry(10.0, 100, "auto", false),
                entry(20.0, 200, "rent", false),
            ],
            "Etc/UTC",
        )
        .await;
        state.engine.set_sort_key(SortKey::Amount).unwrap();

        let html = render(state).await;

        let positions: Vec<_> = rows(&html)
            .iter()
            .map(|row| row.value().attr("data-position").unwrap().to_owned())
            .collect();
        assert_eq!(positions, ["1", "2", "0"]);

        let selected = html
            .select(&Selector::parse("#sort option[selected]").unwrap())
            .next()
            .expect("no sort option selected");
        assert_eq!(selected.value().attr("value"), Some("amount"));
    }

    #[tokio::test]
    async fn shows_category_counts_including_cancelled() {
        let state = page_state(
            vec![
                entry(1.0, 0, "food", false),
                entry(2.0, 0, "auto", false),
                entry(3.0, 0, "food", true),
            ],
            "Etc/UTC",
        )
        .await;

        let html = render(state).await;

        let counts: Vec<_> = html
            .select(&Selector::parse("#category-analysis tbody tr").unwrap())
            .map(|row| cell_texts(&row))
            .collect();
        assert_eq!(
            counts,
            [
                vec!["auto".to_owned(), "1".to_owned()],
                vec!["food".to_owned(), "2".to_owned()],
            ]
        );
    }

    #[tokio::test]
    async fn form_is_seeded_while_editing() {
        let state = page_state(vec![entry(12.5, 1_700_000_000, "food", false)], "Etc/UTC").await;
        state.engine.begin_modify(Position::new(0)).unwrap();

        let html = render(state).await;

        let form = html
            .select(&Selector::parse("#expense-form").unwrap())
            .next()
            .expect("expense form missing");
        assert_hx_endpoint(&form, "/api/expenses/0", "hx-put");
        let amount = form
            .select(&Selector::parse("input[name=amount]").unwrap())
            .next()
            .unwrap();
        assert_eq!(amount.value().attr("value"), Some("12.5"));
    }

    #[tokio::test]
    async fn without_account_only_the_account_form_is_shown() {
        let state = ExpensesPageState {
            engine: SyncEngine::new(Arc::new(InMemoryLedger::new())),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let html = render(state).await;

        let account_form = html
            .select(&Selector::parse("#account-form").unwrap())
            .next()
            .expect("account form missing");
        assert_hx_endpoint(&account_form, endpoints::ACCOUNT, "hx-put");
        assert!(
            html.select(&Selector::parse("#expense-form").unwrap())
                .next()
                .is_none()
        );
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let state = page_state(vec![], "Nowhere/Special").await;

        let result = get_expenses_page(State(state)).await;

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }

    #[tokio::test]
    async fn stale_projection_shows_warning() {
        let account = AccountId::new_unchecked("0xalice");
        let ledger = Arc::new(ScriptedLedger::new(InMemoryLedger::new()));
        let engine = SyncEngine::new(ledger.clone());
        engine.set_active_account(account).await.unwrap();
        ledger.fail_fetches_with(Some(RemoteError::Network("offline".to_owned())));
        engine
            .add(ExpenseForm {
                amount: "1".to_owned(),
                date: "2025-01-01".to_owned(),
                category: "misc".to_owned(),
                description: String::new(),
            })
            .await
            .unwrap_err();

        let html = render(ExpensesPageState {
            engine,
            local_timezone: "Etc/UTC".to_owned(),
        })
        .await;

        assert!(
            html.select(&Selector::parse("#stale-warning").unwrap())
                .next()
                .is_some()
        );
        let error = html
            .select(&Selector::parse("#status-error").unwrap())
            .next()
            .expect("failure banner missing")
            .text()
            .collect::<String>();
        assert!(error.contains("Could not add expense"), "{error}");
        assert!(error.contains("offline"), "{error}");
    }
}
