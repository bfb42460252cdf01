use quiz_core::store::{MemoryQuizStore, PgQuizStore, QuizStore, StoreError};
use sqlx::postgres::PgConnectOptions;
use tracing::info;

use crate::config::{DbSettings, QuizConfig, StoreSettings};

/// The store selected at startup.
pub enum QuizBackend {
    Postgres(PgQuizStore),
    Memory(MemoryQuizStore),
}

/// Builds the store named by the configuration.
///
/// The service key is passed as the connection password so the URL does not
/// have to carry it. In-memory mode seeds the configured creator.
pub async fn build_store(config: &QuizConfig) -> Result<QuizBackend, StoreError> {
    match &config.store {
        StoreSettings::Postgres(db) => {
            let store = connect_postgres(db).await?;
            if db.bootstrap_schema {
                store.ensure_schema().await?;
            }
            info!(max_connections = db.max_connections, "connected to quiz database");
            Ok(QuizBackend::Postgres(store))
        }
        StoreSettings::InMemory => {
            let store = MemoryQuizStore::new();
            let creator_id = store.seed_user(&config.creator_email).await;
            info!(%creator_id, email = %config.creator_email, "using in-memory quiz store");
            Ok(QuizBackend::Memory(store))
        }
    }
}

async fn connect_postgres(db: &DbSettings) -> Result<PgQuizStore, StoreError> {
    let options = db
        .url
        .parse::<PgConnectOptions>()
        .map_err(StoreError::from)?
        .password(&db.service_key);
    PgQuizStore::connect(options, db.max_connections).await
}
