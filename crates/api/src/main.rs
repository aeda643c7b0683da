use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden_api::auth::AuthService;
use warden_api::config::ServerConfig;
use warden_api::router::build_app_router;
use warden_api::state::AppState;
use warden_db::store::PgCredentialStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warden_api=debug,warden_db=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Shutdown signal ---
    // Cancels the database bootstrap if it is still retrying, and drains the
    // HTTP server once it is running.
    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    // --- Database ---
    let pool = warden_db::create_pool(&config.database.url, config.database.max_connections)
        .expect("DATABASE_URL must be a valid PostgreSQL connection string");

    let bootstrap = config.database.bootstrap.clone();
    let connected = match warden_db::connect(pool, bootstrap, &shutdown).await {
        Ok(connected) => connected,
        Err(warden_db::BootstrapError::Cancelled { attempts }) => {
            tracing::info!(attempts, "Shutdown requested before database became reachable");
            return;
        }
        Err(e) => panic!("Failed to connect to database: {e}"),
    };
    tracing::info!("Database connection established");

    warden_db::run_migrations(&connected)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- App state ---
    let pool = connected.pool().clone();
    let store = Arc::new(PgCredentialStore::new(connected));
    let state = AppState {
        auth: AuthService::new(store, config.jwt.clone()),
    };

    let app = build_app_router(state, Duration::from_secs(config.request_timeout_secs));

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .expect("Server error");

    tracing::info!("Server stopped accepting connections, closing database pool");
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

/// Cancel `token` on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn watch_signals(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    token.cancel();
}
