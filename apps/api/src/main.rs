//! # Stockbook API server
//!
//! ```text
//! Admin console ───► HTTP (3001) ───► handlers ───► SQLite
//!                                        │
//!                                        ▼
//!                                   SMTP (OTP email)
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stockbook_api::clock::SystemClock;
use stockbook_api::config::ApiConfig;
use stockbook_api::mailer::{LogNotifier, OtpNotifier, SmtpMailer};
use stockbook_api::{router, AppState};
use stockbook_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();

    let config = ApiConfig::load()?;
    init_tracing(config.log_json);

    info!("Starting Stockbook API server...");
    info!(
        port = config.port,
        database = %config.database_path,
        origins = config.allowed_origins.len(),
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;

    let notifier: Arc<dyn OtpNotifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            warn!("SMTP not configured, OTP codes will not be emailed");
            Arc::new(LogNotifier)
        }
    };

    let state = AppState::new(&config, db.clone(), notifier, Arc::new(SystemClock));
    let app = router(state, &config.allowed_origins);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the built-in default filter.
fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stockbook_api=info,stockbook_db=info,tower_http=info".into());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
