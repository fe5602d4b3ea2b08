use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cost_tracker::{
    AppState, build_router, graceful_shutdown,
    ledger::{
        AccountId, DEFAULT_REQUEST_TIMEOUT, HttpLedgerClient, InMemoryLedger, RemoteLedger,
    },
};

/// The web server for cost_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Base URL of the ledger gateway. An in-memory ledger is used when omitted.
    #[arg(long)]
    ledger_url: Option<String>,

    /// The account to load when the server starts.
    #[arg(long)]
    account: Option<String>,

    /// Canonical timezone used to display expense dates, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// How long to wait for the ledger gateway before giving up on a request.
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging() {
        eprintln!("Could not set up logging: {error}");
        return ExitCode::FAILURE;
    }

    let remote: Arc<dyn RemoteLedger> = match &args.ledger_url {
        Some(url) => {
            match HttpLedgerClient::new(url, Duration::from_secs(args.request_timeout_secs)) {
                Ok(client) => {
                    tracing::info!("Using the ledger gateway at {url}");
                    Arc::new(client)
                }
                Err(error) => {
                    tracing::error!("Could not create the ledger client for {url}: {error}");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => {
            tracing::warn!("No ledger URL given, expenses are kept in memory only");
            Arc::new(InMemoryLedger::new())
        }
    };

    let state = match AppState::new(remote, &args.timezone) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(account) = &args.account {
        let loaded = match AccountId::new(account) {
            Ok(account) => state.engine.set_active_account(account).await,
            Err(error) => Err(error),
        };

        // The page shows the failure and the user can refresh or pick another account.
        if let Err(error) = loaded {
            tracing::error!("Could not load the account {account}: {error}");
        }
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state));

    #[cfg(debug_assertions)]
    let router = router
        .layer(axum::middleware::from_fn(cost_tracker::logging_middleware))
        .layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
