// src/main.rs

use anyhow::Result;
use axum::{ServiceExt, extract::Request, http::StatusCode};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

use storyloom::auth::bootstrap::{create_user, ensure_default_admin};
use storyloom::cache::SqliteCache;
use storyloom::config::{AppConfig, CacheBackend};
use storyloom::db::Database;
use storyloom::state::AppState;

/// Slack on top of the provider timeout before the server gives up on a request
const SERVER_TIMEOUT_MARGIN_SECS: u64 = 15;

#[derive(Parser)]
#[command(name = "storyloom")]
#[command(about = "Backend for AI-assisted novel writing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve {
        /// Override HOST
        #[arg(long)]
        host: Option<String>,

        /// Override PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database, apply migrations and bootstrap the default admin, then exit
    InitDb,

    /// Create a writer account
    CreateUser {
        username: String,

        password: String,

        #[arg(long)]
        email: Option<String>,

        /// Grant the account admin rights on the prompt library and user list
        #[arg(long)]
        admin: bool,
    },
}

/// Graceful shutdown on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
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
                error!("failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.logging.tracing_level(config.server.debug))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    config.validate()?;
    if config.auth.uses_dev_secret() {
        warn!("SECRET_KEY is unset; using the development signing key");
    }

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    ensure_default_admin(&db, &config.auth).await?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::InitDb => {
            info!(url = %config.database.url, "database initialized");
            Ok(())
        }
        Commands::CreateUser {
            username,
            password,
            email,
            admin,
        } => {
            let user = create_user(&db, &username, &password, email.as_deref(), admin).await?;
            info!(id = user.id, username = %user.username, is_admin = user.is_admin, "user created");
            Ok(())
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, db).await
        }
    }
}

async fn serve(config: AppConfig, db: Database) -> Result<()> {
    info!("Starting {}", config.server.app_name);
    info!(
        "AI providers: {}",
        if config.server.debug { "mock fallback enabled" } else { "live" }
    );

    if config.llm.cache.backend == CacheBackend::Sqlite {
        let cache = SqliteCache::new(db.clone(), Duration::from_secs(config.llm.cache.ttl_secs));
        match cache.purge_expired().await {
            Ok(removed) if removed > 0 => info!(removed, "purged expired LLM cache entries"),
            Ok(_) => {}
            Err(e) => warn!("failed to purge LLM cache: {}", e),
        }
    }

    let bind_address = config.bind_address();
    let timeout = Duration::from_secs(config.llm.request_timeout_secs + SERVER_TIMEOUT_MARGIN_SECS);

    let state = Arc::new(AppState::new(config, db)?);
    let router = storyloom::api::router(state)
        .layer(TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, timeout));
    // Trailing slashes are trimmed before routing so `/api/novels/` matches `/api/novels`
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("HTTP server listening on http://{}", bind_address);

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutdown complete");
    Ok(())
}
