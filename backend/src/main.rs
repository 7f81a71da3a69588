//! Customer service entry point: loads settings, wires the adapters and
//! serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use kunde::inbound::http::health::HealthState;
use kunde::outbound::persistence::{DbPool, PoolConfig};
use kunde::settings::KundeSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = KundeSettings::load().map_err(|err| eyre!("loading settings failed: {err}"))?;
    info!(?settings, "settings loaded");

    let mut config = ServerConfig::from_settings(&settings)?;
    if let Some(database_url) = settings.database_url.as_deref() {
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .wrap_err("creating database pool failed")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)
        .await
        .wrap_err("starting HTTP server failed")?;
    server.await.wrap_err("HTTP server terminated abnormally")
}
