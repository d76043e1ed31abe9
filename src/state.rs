use crate::config::AppConfig;
use crate::db;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Loads config from the environment, opens the store and ensures the schema.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_path, config.database_max_connections).await?;
        db::init_schema(&db).await?;
        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// In-memory store with a fixed test secret.
    #[cfg(test)]
    pub async fn fake() -> Self {
        use crate::config::SessionConfig;

        let db = db::connect_in_memory().await.expect("in-memory sqlite");
        db::init_schema(&db).await.expect("schema");
        let config = Arc::new(AppConfig {
            addr: "127.0.0.1:0".parse().expect("addr"),
            database_path: ":memory:".into(),
            database_max_connections: 1,
            session: SessionConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_hours: 24,
                cookie_secure: false,
            },
        });
        Self { db, config }
    }
}
