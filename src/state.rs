use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::{AppConfig, BlobBackend};
use crate::db;
use crate::storage::{BlobStore, LocalBlobStore, S3BlobStore};
use crate::walks::services::WalkIngestor;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub ingestor: WalkIngestor,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let db = db::connect(&config.database_url).await?;

        let storage = match &config.blob_backend {
            BlobBackend::Local => Arc::new(
                LocalBlobStore::new(&config.images_dir, &config.images_public_prefix).await?,
            ) as Arc<dyn BlobStore>,
            BlobBackend::S3(s3) => {
                Arc::new(S3BlobStore::new(s3, &config.images_public_prefix).await?)
                    as Arc<dyn BlobStore>
            }
        };

        Ok(Self::from_parts(db, config, storage))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, storage: Arc<dyn BlobStore>) -> Self {
        let ingestor = WalkIngestor::new(db.clone(), storage);
        Self {
            db,
            config,
            ingestor,
        }
    }

    #[cfg(test)]
    pub async fn fake(config: AppConfig) -> Self {
        use crate::storage::fake::MemoryBlobStore;

        let db = db::memory_pool().await.expect("in-memory database");
        let storage = Arc::new(MemoryBlobStore::default()) as Arc<dyn BlobStore>;
        Self::from_parts(db, Arc::new(config), storage)
    }
}

#[cfg(test)]
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        images_dir: "./images/walks".into(),
        images_public_prefix: "./images/walks".into(),
        blob_backend: BlobBackend::Local,
        debug_dump_path: None,
        ingest_timeout: None,
    }
}
