//! Implements a struct that holds the state of the server.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    Error,
    ledger::{RemoteLedger, SyncEngine},
    timezone::local_offset_or_error,
};

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The session that the pages render and the endpoints act on.
    pub engine: SyncEngine,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with a session backed by `remote`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an [Error::InvalidTimezoneError] if `local_timezone` is not a known timezone.
    pub fn new(remote: Arc<dyn RemoteLedger>, local_timezone: &str) -> Result<Self, Error> {
        local_offset_or_error(local_timezone)?;

        Ok(Self {
            engine: SyncEngine::new(remote),
            local_timezone: local_timezone.to_owned(),
        })
    }
}

impl FromRef<AppState> for SyncEngine {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}
