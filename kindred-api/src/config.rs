use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db")]
    pub database_url: String,
    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: u32,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: i64,
}

fn default_port() -> u16 { 8000 }
fn default_db() -> String { "data/kindred.db".into() }
fn default_db_pool_size() -> u32 { 8 }
fn default_jwt_secret() -> String { "development-secret-change-in-production".into() }
fn default_session_ttl() -> i64 { 7 * 24 * 60 * 60 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            database_url: default_db(),
            db_pool_size: default_db_pool_size(),
            jwt_secret: default_jwt_secret(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl AppConfig {
    /// Reads `KINDRED_*` environment variables (e.g. `KINDRED_JWT_SECRET`).
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("KINDRED")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let app_config: Self = config.try_deserialize()?;

        if app_config.jwt_secret == default_jwt_secret() {
            tracing::warn!("using the development JWT secret; set KINDRED_JWT_SECRET in production");
        }
        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_week_long_sessions() {
        let config = AppConfig::default();
        assert_eq!(config.session_ttl_secs, 604_800);
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn empty_source_deserializes_to_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.database_url, "data/kindred.db");
        assert_eq!(config.db_pool_size, 8);
    }
}
