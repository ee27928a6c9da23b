use std::sync::Arc;

use kindred_api::config::AppConfig;
use kindred_api::{build_router, db, AppState};
use kindred_shared::clients::db::{create_pool, is_in_memory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kindred_shared::middleware::init_tracing("kindred-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let pool_size = if is_in_memory(&config.database_url) { 1 } else { config.db_pool_size };
    let pool = create_pool(&config.database_url, pool_size)?;
    {
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
    }

    let metrics_handle = kindred_shared::middleware::init_metrics()?;
    let state = Arc::new(AppState::new(pool, config).with_metrics(metrics_handle));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "kindred-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
