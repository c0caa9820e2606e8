//! `qisd` — the quality inspection server binary.
//!
//! Usage:
//!   qisd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/qis/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use jsonwebtoken::{DecodingKey, Validation};
use qis_core::Module;
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;

/// Quality inspection server.
#[derive(Parser, Debug)]
#[command(name = "qisd", about = "Quality inspection server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    bootstrap::verify_config(&server_config)?;

    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = qis_core::ServiceConfig {
        data_dir: Some(data_dir.clone()),
        listen: cli.listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn qis_sql::SQLStore> = Arc::new(
        qis_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let auth_config = auth::service::AuthConfig {
        jwt_secret: server_config.jwt.secret.clone(),
        access_token_ttl: server_config.jwt.expire_secs as i64,
        ..Default::default()
    };
    let auth_module = auth::AuthModule::new(Arc::clone(&sql), auth_config)?;
    info!("Auth module initialized");

    bootstrap::ensure_admin_user(auth_module.service(), &server_config)?;

    let inspect_service = inspect::service::InspectService::new(Arc::clone(&sql))?;
    let inspect_module = inspect::InspectModule::new(inspect_service);
    info!("Inspect module initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (inspect_module.name(), inspect_module.routes()),
    ];

    let jwt_state = Arc::new(JwtState {
        decoding_key: DecodingKey::from_secret(server_config.jwt.secret.as_bytes()),
        validation: Validation::default(),
    });

    let app = routes::build_router(jwt_state, module_routes);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("qisd listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
