//! Backend entry-point: configuration, migrations, and the HTTP server.

use actix_web::{HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, MIGRATIONS, PoolConfig};
use backend::server::{AppConfig, build_app, build_state};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    run_migrations(config.database_url.clone()).await?;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(std::io::Error::other)?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = build_state(&pool, &config);
    let upload_dir = config.upload_dir.clone();
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();

    info!(addr = %config.bind_addr, "starting server");
    let server = HttpServer::new(move || {
        build_app(
            state.clone(),
            server_health_state.clone(),
            upload_dir.clone(),
        )
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

/// Apply pending embedded migrations before serving traffic.
async fn run_migrations(database_url: String) -> std::io::Result<()> {
    tokio::task::spawn_blocking(move || -> Result<(), String> {
        use diesel::Connection;
        use diesel_async::AsyncPgConnection;
        use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
        use diesel_migrations::MigrationHarness;

        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)
            .map_err(|err| err.to_string())?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
    .await
    .map_err(|err| std::io::Error::other(err.to_string()))?
    .map_err(std::io::Error::other)
}
