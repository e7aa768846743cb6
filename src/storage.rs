use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::config::S3Config;

const PHOTO_CONTENT_TYPE: &str = "image/jpeg";
const S3_KEY_PREFIX: &str = "images/walks";

/// Byte storage for decoded walk photos.
///
/// `put` stores the bytes under `name` and returns the reference path that gets
/// recorded in `photousage.photoName`. `delete` takes that same reference path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, name: &str, body: Bytes) -> anyhow::Result<String>;
    async fn delete(&self, reference: &str) -> anyhow::Result<()>;
}

/// Unique photo file name: `IMG` followed by 32 hex characters and `.jpg`.
pub fn generate_photo_name() -> String {
    format!("IMG{}.jpg", Uuid::new_v4().simple())
}

fn join_reference(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

fn file_name_of(reference: &str) -> anyhow::Result<&str> {
    reference
        .rsplit('/')
        .next()
        .filter(|n| !n.is_empty())
        .with_context(|| format!("invalid blob reference {reference}"))
}

/// Writes photos into a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub async fn new(dir: impl AsRef<Path>, public_prefix: &str) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create images dir {}", dir.display()))?;
        Ok(Self {
            dir,
            public_prefix: public_prefix.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, name: &str, body: Bytes) -> anyhow::Result<String> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write photo {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
                .await
                .with_context(|| format!("chmod photo {}", path.display()))?;
        }

        debug!(path = %path.display(), bytes = body.len(), "photo written");
        Ok(join_reference(&self.public_prefix, name))
    }

    async fn delete(&self, reference: &str) -> anyhow::Result<()> {
        let path = self.dir.join(file_name_of(reference)?);
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("remove photo {}", path.display()))?;
        Ok(())
    }
}

/// Writes photos into an S3-compatible bucket (MinIO in deployments).
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_prefix: String,
}

impl S3BlobStore {
    pub async fn new(cfg: &S3Config, public_prefix: &str) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_prefix: public_prefix.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, name: &str, body: Bytes) -> anyhow::Result<String> {
        let key = join_reference(S3_KEY_PREFIX, name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(PHOTO_CONTENT_TYPE)
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        Ok(join_reference(&self.public_prefix, name))
    }

    async fn delete(&self, reference: &str) -> anyhow::Result<()> {
        let key = join_reference(S3_KEY_PREFIX, file_name_of(reference)?);
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .with_context(|| format!("s3 delete_object {key}"))?;
        Ok(())
    }
}
