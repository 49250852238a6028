use std::{process::ExitCode, sync::Arc};

use chess_persistence_file::FileGameRepository;
use chess_rules_engine::ChessRulesEngine;
use chess_session_app::{build_application, ports::color::CoinFlipColorPicker};
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

mod config;
mod logs;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine, the environment may be set directly.
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logs::init_logger(config.log_file.as_ref()) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let game_repository = match FileGameRepository::new(&config.games_dir).await {
        Ok(repository) => Arc::new(repository),
        Err(e) => {
            error!("Cannot open game store: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    let app = match build_application(
        game_repository,
        Arc::new(ChessRulesEngine),
        Arc::new(CoinFlipColorPicker),
        config.session.clone(),
        shutdown.clone(),
    )
    .await
    {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to restore games: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Chess session manager started (games in {}, {} ms per side)",
        config.games_dir.display(),
        config.session.time_control.initial_ms()
    );

    shutdown_signal().await;
    shutdown.cancel();
    if let Err(e) = app.jobs.await {
        error!("Background jobs ended abnormally: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Shutdown complete");
    ExitCode::SUCCESS
}
