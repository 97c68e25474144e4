mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use stashd_pipeline::{Dispatcher, IngestGate, PipelineContext};
use stashd_summarizer::SummarizerClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(stashd_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = stashd_db::PoolConfig::from_app_config(&config);
    let pool = stashd_db::connect_pool(&config.database_url, pool_config).await?;
    stashd_db::run_migrations(&pool).await?;

    let store = Arc::new(stashd_db::PgStore::new(pool.clone()));
    let summarizer = SummarizerClient::from_config(&config)?;
    let ctx = Arc::new(PipelineContext {
        store: store.clone(),
        interests: store,
        summarizer,
    });
    let dispatcher = Dispatcher::start(
        Arc::clone(&ctx),
        config.dispatch_workers,
        config.dispatch_queue_capacity,
    );
    let gate = Arc::new(IngestGate::new(Arc::clone(&ctx), dispatcher.handle()));

    let _scheduler = scheduler::build_scheduler(pool, Arc::clone(&config)).await?;

    let app = build_app(AppState {
        store: Arc::clone(&ctx.store),
        gate,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let in-progress summarizations reach a terminal state before exit.
    dispatcher.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
