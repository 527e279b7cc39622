// src/main.rs
use habit_backend::config::AppConfig;
use habit_backend::logging::init_tracing;
use habit_backend::{AppContext, StartupError};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    init_tracing("habit_backend=info,tower_http=info");

    tracing::info!("Starting Habit Backend server...");

    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.server_addr(),
        run_migrations = app_config.run_migrations,
        "Configuration loaded"
    );
    if app_config.is_production() && !app_config.security.cookie_secure {
        tracing::warn!("COOKIE_SECURE is disabled in production");
    }

    let context = AppContext::connect(app_config).await?;
    let app_router = context.router();

    let listener = TcpListener::bind(context.config().server_addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    // 配信を先に止めないと、開いたままのSSE接続で終了待ちが終わらない
    let session_bus = context.session_bus();
    axum::serve(listener, app_router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            session_bus.close();
        })
        .await?;

    context.shutdown().await?;
    tracing::info!("Server stopped");

    Ok(())
}

/// Ctrl+C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
