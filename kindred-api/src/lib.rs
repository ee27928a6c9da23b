use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use kindred_shared::clients::db::DbPool;
use kindred_shared::errors::{AppError, AppResult};
use kindred_shared::middleware::{metrics_middleware, SessionResolver};

pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use config::AppConfig;
use services::token_service;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(db: DbPool, config: AppConfig) -> Self {
        Self { db, config, metrics: None }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn conn(&self) -> AppResult<PooledConnection<ConnectionManager<SqliteConnection>>> {
        self.db
            .get()
            .map_err(|e| AppError::internal(format!("database connection error: {e}")))
    }
}

impl SessionResolver for AppState {
    fn resolve_session(&self, token: &str) -> AppResult<Option<i32>> {
        let mut conn = self.conn()?;
        let user = token_service::resolve_session(&mut conn, token, &self.config.jwt_secret)?;
        Ok(user.map(|u| u.id))
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    use routes::{auth, feed, health, profile, settings};

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/profile/me", get(profile::get_my_profile).put(profile::update_my_profile))
        .route("/profile/profiles/:user_id", get(profile::get_public_profile))
        .route("/likes/feed", get(feed::get_feed))
        .route("/likes/matches", get(feed::matches))
        .route("/likes/:target_id", post(feed::like))
        .route("/feed", get(feed::get_feed))
        .route("/feed/matches", get(feed::matches))
        .route("/feed/:target_id/like", post(feed::like))
        .route("/feed/:target_id/skip", post(feed::skip))
        .route("/settings/close-profile", post(settings::close_profile))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
