//! A [RemoteLedger] that talks JSON over HTTP to a ledger gateway.
//!
//! The gateway exposes one resource per account:
//! - `GET  {base}/accounts/{account}/expenses`
//! - `POST {base}/accounts/{account}/expenses`
//! - `PUT  {base}/accounts/{account}/expenses/{position}`
//! - `POST {base}/accounts/{account}/expenses/{position}/cancel`

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;

use crate::ledger::{
    entry::Position,
    input::ExpenseDraft,
    remote::{AccountId, RemoteEntry, RemoteError, RemoteLedger},
};

/// The request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for a ledger gateway at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: Client,
    base_url: Url,
}

/// The body sent when adding or modifying an entry.
#[derive(Debug, Serialize)]
struct ExpenseBody<'a> {
    amount: f64,
    date: i64,
    category: &'a str,
    description: &'a str,
}

impl<'a> From<&'a ExpenseDraft> for ExpenseBody<'a> {
    fn from(draft: &'a ExpenseDraft) -> Self {
        Self {
            amount: draft.amount.value(),
            date: draft.occurred_at(),
            category: &draft.category,
            description: &draft.description,
        }
    }
}

impl HttpLedgerClient {
    /// Create a client for the gateway at `base_url` where every request gives up after
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [RemoteError::Network] if `base_url` is not an absolute HTTP URL or the
    /// HTTP client cannot be built, e.g. because no TLS backend is available.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url)
            .map_err(|error| RemoteError::Network(format!("invalid URL {base_url:?}: {error}")))?;
        if parsed.cannot_be_a_base() {
            return Err(RemoteError::Network(format!(
                "invalid URL {base_url:?}: cannot be used as a base URL"
            )));
        }

        let http = Client::builder()
            .user_agent(format!("cost_tracker/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|error| RemoteError::Network(error.to_string()))?;

        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// Append `segments` to the base URL, percent-encoding each one so that it stays a
    /// single path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteError::Network(format!("{} cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn expenses_url(&self, account: &AccountId) -> Result<Url, RemoteError> {
        self.url(&["accounts", account.as_ref(), "expenses"])
    }

    fn expense_url(&self, account: &AccountId, position: Position) -> Result<Url, RemoteError> {
        self.url(&[
            "accounts",
            account.as_ref(),
            "expenses",
            &position.to_string(),
        ])
    }

    fn cancel_url(&self, account: &AccountId, position: Position) -> Result<Url, RemoteError> {
        self.url(&[
            "accounts",
            account.as_ref(),
            "expenses",
            &position.to_string(),
            "cancel",
        ])
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Declined);
        }

        let message = response.text().await.unwrap_or_default();
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_decode() {
        RemoteError::Parse(error.to_string())
    } else {
        RemoteError::Network(error.to_string())
    }
}

#[async_trait::async_trait]
impl RemoteLedger for HttpLedgerClient {
    async fn fetch_entries(&self, account: &AccountId) -> Result<Vec<RemoteEntry>, RemoteError> {
        let response = Self::send(self.http.get(self.expenses_url(account)?)).await?;

        response
            .json::<Vec<RemoteEntry>>()
            .await
            .map_err(|error| RemoteError::Parse(error.to_string()))
    }

    async fn submit_add(
        &self,
        account: &AccountId,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        let request = self
            .http
            .post(self.expenses_url(account)?)
            .json(&ExpenseBody::from(draft));
        Self::send(request).await?;

        Ok(())
    }

    async fn submit_modify(
        &self,
        account: &AccountId,
        position: Position,
        draft: &ExpenseDraft,
    ) -> Result<(), RemoteError> {
        let request = self
            .http
            .put(self.expense_url(account, position)?)
            .json(&ExpenseBody::from(draft));
        Self::send(request).await?;

        Ok(())
    }

    async fn submit_cancel(
        &self,
        account: &AccountId,
        position: Position,
    ) -> Result<(), RemoteError> {
        Self::send(self.http.post(self.cancel_url(account, position)?)).await?;

        Ok(())
    }
}
