use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use attendance_checkin::api::{AppState, create_router};
use attendance_checkin::config::{ConfigLoader, validate};

#[derive(Parser)]
#[command(
    name = "attendance-checkin",
    about = "Attendance check-in service with face verification"
)]
struct Cli {
    /// YAML configuration file; defaults plus CHECKIN_* variables when omitted
    #[arg(short, long, env = "CHECKIN_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration (e.g. "127.0.0.1:8000")
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::from_env().context("invalid CHECKIN_* environment configuration")?,
    };
    let mut config = loader.into_config();
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
        validate(&config).context("invalid --bind address")?;
    }

    let state = AppState::bootstrap(&config).context("failed to initialise service")?;
    let router = create_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    info!(
        bind = %config.server.bind,
        provider = %config.verification.provider,
        threshold = config.verification.similarity_threshold,
        "attendance-checkin listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c, running until killed");
                std::future::pending::<()>().await;
            }
            info!("attendance-checkin shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
