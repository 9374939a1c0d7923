use std::sync::Arc;

use anyhow::Context;
use roster_config::{AppConfig, StoreBackend};
use roster_db::{init_db_pool, run_migrations};
use tracing::info;

use crate::modules::students::{MemoryStudentRepository, PgStudentRepository, StudentRepository};

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(students: Arc<dyn StudentRepository>, config: AppConfig) -> Self {
        Self {
            students,
            config: Arc::new(config),
        }
    }
}

/// Builds the shared state for the configured store. The PostgreSQL store
/// connects (and migrates, unless disabled) before the server starts.
pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let students: Arc<dyn StudentRepository> = match config.server.store {
        StoreBackend::Postgres => {
            let pool = init_db_pool(&config.database)
                .await
                .context("Failed to connect to database")?;
            if config.database.run_migrations {
                run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
            }
            Arc::new(PgStudentRepository::new(pool))
        }
        StoreBackend::Memory => {
            info!("Using in-memory student store");
            Arc::new(MemoryStudentRepository::new())
        }
    };

    Ok(AppState::new(students, config))
}
