//! denidom-api - estimating service
//!
//! Zero-config startup: the root folder, database and token secret are
//! created on first run. Listens on 127.0.0.1:5730 unless configured.

use anyhow::{Context, Result};
use clap::Parser;
use denidom_api::ai::AiClient;
use denidom_api::{build_router, AppState};
use denidom_common::config::ServiceConfig;
use denidom_common::db::{init_database, load_or_create_jwt_secret};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "denidom-api", version, about = "DeniDom estimating service")]
struct Args {
    /// Root folder holding denidom.db
    #[arg(long, env = "DENIDOM_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// Address to listen on (host:port)
    #[arg(long, env = "DENIDOM_BIND_ADDRESS")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(args.root_folder.as_deref(), args.bind.as_deref());

    let level = config
        .logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting DeniDom API (denidom-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config.ensure_root_folder()?;
    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("✓ Database ready");

    let jwt_secret = match &config.jwt_secret {
        Some(secret) => {
            info!("Using configured token secret");
            secret.clone()
        }
        None => load_or_create_jwt_secret(&pool).await?,
    };

    let mut state = AppState::new(pool, &jwt_secret, config.token_ttl_hours);
    match AiClient::from_config(&config.ai) {
        Ok(Some(client)) => {
            info!("AI flows enabled (model {})", client.model());
            state = state.with_ai(client);
        }
        Ok(None) => info!("No AI API key configured, AI flows use heuristic fallbacks"),
        Err(e) => warn!("AI client unavailable, using heuristic fallbacks: {}", e),
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!("denidom-api listening on http://{}", config.bind_address);
    info!("Health check: http://{}/health", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
