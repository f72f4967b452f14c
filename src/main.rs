// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use keyed_tags_server::{
    api::router,
    config::AppConfig,
    logging,
    state::AppState,
    storage::{PartitionedStore, TagDatabase},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            // The subscriber depends on the config, so this one goes to stderr
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let database = match &config.db_path {
        Some(path) => TagDatabase::open(path)?,
        None => {
            tracing::warn!("DB_PATH not set; tags are kept in memory only");
            TagDatabase::in_memory()?
        }
    };
    let store: Arc<dyn PartitionedStore> = Arc::new(database);

    let state = AppState::new(store)
        .with_codec(config.codec)
        .with_key_derivation(config.key_derivation);
    let app = router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        cipher = config.codec.cipher.as_str(),
        nonce = config.codec.nonce.as_str(),
        key_derivation = config.key_derivation.as_str(),
        "Keyed tags server listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
