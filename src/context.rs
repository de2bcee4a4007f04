/// Application context and dependency injection
use crate::{
    account::AccountManager,
    config::ServerConfig,
    db,
    directory::ProfileDirectory,
    error::ApiResult,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub account_manager: Arc<AccountManager>,
    pub directory: Arc<ProfileDirectory>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        let db =
            db::create_pool(&config.storage.directory_db, db::DatabaseOptions::default()).await?;

        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let config = Arc::new(config);
        let account_manager = Arc::new(AccountManager::new(db.clone(), Arc::clone(&config)));
        let directory = Arc::new(ProfileDirectory::new(db.clone(), Arc::clone(&config)));

        // Bootstrap admin, when configured. Idempotent across restarts.
        if let Some(seed) = &config.seed {
            account_manager
                .ensure_seed_admin(&seed.admin_email, &seed.admin_password)
                .await?;
        }

        Ok(Self {
            config,
            db,
            account_manager,
            directory,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!("http://{}:{}", self.config.service.host, self.config.service.port)
    }
}
