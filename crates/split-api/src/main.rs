//! # split-pay
//!
//! Callable endpoints for marketplace payments.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_API_KEY=sk_test_...
//! export CALLER_JWT_SECRET=...
//!
//! # Run the server
//! split-pay
//! ```

use split_api::{routes, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }

    let addr = config.socket_addr()?;
    let state = AppState::from_config(config)?;

    info!("Environment: {}", state.config.environment);
    info!("Payment processor: {}", state.provider);

    let app = routes::create_router(state);

    info!("split-pay {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("split-pay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
