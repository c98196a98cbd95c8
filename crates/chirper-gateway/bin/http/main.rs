mod cli;

use crate::cli::{LogFormat, StorageBackendArg, CLI};
use anyhow::Context;
use chirper_core::{ChirpRepository, InMemoryRepository};
use chirper_gateway::{App, AppState};
use chirper_storage::PostgresRepository;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn build_repository(config: &CLI) -> anyhow::Result<Arc<dyn ChirpRepository>> {
    let repository: Arc<dyn ChirpRepository> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(InMemoryRepository::new()),
        StorageBackendArg::Postgres => {
            let database = config
                .database_config()
                .context("db host, user and name are required when storage backend is postgres")?;
            let repository = PostgresRepository::connect(&database)
                .await
                .context("failed to connect to postgres")?;
            Arc::new(repository)
        }
    };

    repository
        .ensure_schema()
        .await
        .context("failed to create schema")?;
    Ok(repository)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    init_tracing(config.log_format);

    info!(
        listen_addr = %config.listen_addr,
        deployment = %config.deployment,
        storage_backend = %config.storage,
        "starting chirper http server"
    );

    let repository = build_repository(&config).await?;
    let router = App::router(AppState::new(repository), config.deployment);
    for (method, path) in config.deployment.routes() {
        info!(method, path = %path, "route mounted");
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
