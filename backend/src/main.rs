//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::ffi::OsString;
use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use iam_backend::inbound::http::health::HealthState;
use iam_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{AppSettings, ServerConfig, create_server};

fn load_settings() -> io::Result<AppSettings> {
    AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|error| io::Error::other(format!("invalid configuration: {error}")))
}

async fn connect(settings: &AppSettings, database_url: &str) -> io::Result<DbPool> {
    if settings.run_migrations {
        let applied = run_pending_migrations(database_url)
            .await
            .map_err(|error| io::Error::other(error.to_string()))?;
        info!(applied, "database migrations complete");
    }
    let mut pool_config = PoolConfig::new(database_url);
    if let Some(max_size) = settings.pool_max_size {
        pool_config = pool_config.with_max_size(max_size);
    }
    DbPool::new(pool_config)
        .await
        .map_err(|error| io::Error::other(error.to_string()))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings()?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    let mut config = ServerConfig::new(bind_addr);
    if let Some(database_url) = settings.database_url() {
        config = config.with_db_pool(connect(&settings, database_url).await?);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");
    let outcome = server.await;
    health_state.mark_draining();
    outcome
}
