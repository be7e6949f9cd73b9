use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gabinete_core::error::AppError;
use gabinete_core::observability::{init_tracing, shutdown_tracing};
use gabinete_service::{
    build_router,
    config::{Environment, GabineteConfig, StorageBackend},
    maintenance::{KeyValueStore, MemoryStore, RedisStore},
    scheduler::StatusScheduler,
    services::JwtIdentityProvider,
    AppState,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load configuration - fail fast if invalid
    let config = GabineteConfig::load()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    )?;

    gabinete_service::services::metrics::init_metrics()
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to init metrics: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        storage = ?config.storage.backend,
        "Starting gabinete service"
    );

    let cancel = CancellationToken::new();

    let storage: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Redis => {
            let url = config.storage.redis_url.as_deref().unwrap_or_default();
            let store = RedisStore::connect(url, cancel.clone())
                .await
                .map_err(AppError::StorageError)?;
            Arc::new(store)
        }
    };

    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid server address: {}", e)))?;
    let scheduler_interval = Duration::from_secs(config.scheduler.interval_seconds);

    let state = AppState::new(config.clone(), storage).await?;

    if config.environment == Environment::Dev {
        if let Some(admin) = state.users.find_by_email(&config.bootstrap_admin.email) {
            let token = JwtIdentityProvider::new(&config.auth, state.users.clone())
                .issue_token(&admin)?;
            tracing::info!(email = %admin.email, token = %token, "Development session token for bootstrap administrator");
        }
    }

    let sync_handle = state.maintenance.clone().spawn_sync(cancel.clone());
    let scheduler_handle =
        StatusScheduler::new(state.registry.clone(), scheduler_interval).spawn(cancel.clone());

    let app = build_router(state);

    let service_span = tracing::info_span!(
        "service",
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cancel.cancel();
    for (name, handle) in [("maintenance sync", sync_handle), ("status scheduler", scheduler_handle)] {
        if let Err(e) = handle.await {
            tracing::warn!(task = name, error = %e, "Background task ended abnormally");
        }
    }

    tracing::info!("Service shutdown complete");
    shutdown_tracing();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
