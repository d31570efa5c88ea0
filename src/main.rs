// region:    --- Imports
use bidconnect::app::router;
use bidconnect::config::Config;
use bidconnect::database::DatabaseManager;
use bidconnect::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .with_target(false)
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> configuration error: {}", "Main", e);
            return Err(e.into());
        }
    };

    let db_manager = Arc::new(DatabaseManager::new(&config).await?);

    if let Err(e) = db_manager.initialize_database(config.database_reset).await {
        error!("{:<12} --> database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> database ready", "Main");

    let port = config.port;
    let state = AppState::from_config(Arc::clone(&db_manager), config)?;
    let app = router(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    db_manager.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("{:<12} --> ctrl-c handler failed: {}", "Main", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!("{:<12} --> SIGTERM handler failed: {}", "Main", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("{:<12} --> shutting down", "Main");
}
// endregion: --- Main
