//! Tollgate Server — Single Sign-On Ticketing Authority
//!
//! Main entry point that wires the ticket stack together and runs the
//! cleanup schedule until shutdown.

use std::sync::Arc;

use tokio::sync::watch;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use tollgate_cleaner::{CleanerRunner, TicketCleaner, build_cluster_lock};
use tollgate_core::config::TollgateConfig;
use tollgate_core::error::AppError;
use tollgate_logout::{DefaultLogoutManager, SingleLogoutTicketRegistry};
use tollgate_registry::{RegistryManager, TicketRegistry};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<TollgateConfig, AppError> {
    let env = std::env::var("TOLLGATE_ENV").unwrap_or_else(|_| "development".to_string());
    TollgateConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &TollgateConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: TollgateConfig) -> Result<(), AppError> {
    tracing::info!("Starting Tollgate v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Ticket registry backend ──────────────────────────
    tracing::info!(
        "Initializing ticket registry (provider: {})...",
        config.registry.provider
    );
    let registry_manager = RegistryManager::new(&config.registry).await?;
    tracing::info!("Ticket registry initialized");

    // ── Step 2: Single logout orchestration ──────────────────────
    let (logout_manager, _front_channel) = DefaultLogoutManager::from_config(&config.logout);
    // The daemon carries no fronting surface; staged front-channel
    // requests stay with the handler until a surface drains them.
    let registry: Arc<dyn TicketRegistry> = Arc::new(SingleLogoutTicketRegistry::new(
        registry_manager.shared(),
        Arc::new(logout_manager),
        config.logout.dispatch_order,
    ));
    tracing::info!("Single logout orchestration initialized");

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Cleanup schedule ─────────────────────────────────
    let cleaner_handle = if config.cleaner.enabled {
        let lock = build_cluster_lock(&config.cleaner.lock, &config.registry.redis).await?;
        let cleaner = Arc::new(TicketCleaner::new(
            Arc::clone(&registry),
            lock,
            &config.cleaner,
        ));
        let runner = CleanerRunner::new(cleaner, &config.cleaner);

        let cleaner_cancel = shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            runner.run(cleaner_cancel).await;
        });

        tracing::info!("Ticket cleanup schedule started");
        Some(handle)
    } else {
        tracing::info!("Ticket cleanup disabled");
        None
    };

    // ── Step 5: Wait for shutdown ────────────────────────────────
    tracing::info!("Tollgate is up");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = cleaner_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(30), handle).await;
    }

    tracing::info!("Tollgate shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
