use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Where decoded walk photos are written.
#[derive(Debug, Clone, Deserialize)]
pub enum BlobBackend {
    Local,
    S3(S3Config),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub images_dir: PathBuf,
    pub images_public_prefix: String,
    pub blob_backend: BlobBackend,
    pub debug_dump_path: Option<PathBuf>,
    pub ingest_timeout: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://walks.db?mode=rwc".into());
        let images_dir = std::env::var("IMAGES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./images/walks"));
        let images_public_prefix = std::env::var("IMAGES_PUBLIC_PREFIX")
            .unwrap_or_else(|_| "./images/walks".into());

        let blob_backend = match std::env::var("BLOB_BACKEND").as_deref() {
            Ok("s3") => BlobBackend::S3(S3Config {
                endpoint: std::env::var("MINIO_ENDPOINT").context("MINIO_ENDPOINT")?,
                bucket: std::env::var("MINIO_BUCKET").context("MINIO_BUCKET")?,
                access_key: std::env::var("MINIO_ACCESS_KEY").context("MINIO_ACCESS_KEY")?,
                secret_key: std::env::var("MINIO_SECRET_KEY").context("MINIO_SECRET_KEY")?,
                region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            Ok("local") | Err(_) => BlobBackend::Local,
            Ok(other) => anyhow::bail!("unknown BLOB_BACKEND {other:?}, expected local or s3"),
        };

        let debug_dump_path = std::env::var("DEBUG_DUMP_PATH").ok().map(PathBuf::from);
        let ingest_timeout = std::env::var("INGEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            database_url,
            images_dir,
            images_public_prefix,
            blob_backend,
            debug_dump_path,
            ingest_timeout,
        })
    }
}
