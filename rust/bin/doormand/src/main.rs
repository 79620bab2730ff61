//! `doormand` — the Doorman server binary.
//!
//! Usage:
//!   doormand [-c <config-name-or-path>] [--listen <addr>]
//!
//! The config name resolves to `/etc/doorman/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly. Without `-c`
//! the server runs on defaults plus `DOORMAN_*` environment overrides.

mod config;
mod routes;

use std::sync::Arc;

use axum::ServiceExt;
use axum::extract::Request;
use clap::Parser;
use tower::Layer;
use tracing::{info, warn};

use doorman_core::Module;
use doorman_users::api::{SessionState, method_override};
use doorman_users::service::UsersConfig;

use config::ServerConfig;
use routes::AppState;

/// Doorman server.
#[derive(Parser, Debug)]
#[command(name = "doormand", about = "Doorman server")]
struct Cli {
    /// Config name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address (overrides the configured one).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let server_config = match &cli.config {
        Some(name) => {
            let config_path = ServerConfig::resolve_path(name);
            info!("Loading configuration from {}", config_path.display());
            ServerConfig::load(&config_path)?
        }
        None => ServerConfig::from_env(),
    };

    if server_config.uses_default_secret() {
        warn!("Session secret is the built-in default; set DOORMAN_SESSION_SECRET in production");
    }

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let sql: Arc<dyn doorman_sql::SqlStore> = Arc::new(
        doorman_sql::SqliteStore::open(&data_dir.join("doorman.sqlite"))
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    // Initialize modules.
    let users_config = UsersConfig {
        session_ttl_secs: server_config.session.ttl_secs,
    };
    let users_module = doorman_users::UsersModule::new(Arc::clone(&sql), users_config)?;
    info!("Users module initialized");

    let module_routes = vec![(users_module.name(), users_module.routes())];

    let session_state = SessionState::new(
        Arc::clone(users_module.service()),
        &server_config.session.secret,
    );

    let app_state = AppState {
        users: Arc::clone(users_module.service()),
    };

    // Build router. The method-override middleware must rewrite the
    // request before route matching, so it wraps the router as an outer
    // service instead of a router layer.
    let router = routes::build_router(app_state, session_state, module_routes);
    let app = axum::middleware::from_fn(method_override).layer(router);

    // Start server.
    let listen = cli
        .listen
        .unwrap_or_else(|| server_config.server.listen.clone());
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("Doorman server listening on {}", listen);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
