use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::IngestError;
use crate::storage::{generate_photo_name, BlobStore};

/// Decode one base64 photo blob. Empty or whitespace-only blobs yield `None`.
///
/// Line breaks and other whitespace inside the blob are ignored.
pub fn decode_photo(encoded: &str) -> Result<Option<Bytes>, IngestError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Ok(None);
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .context("decode base64 photo")
        .map_err(IngestError::BlobStore)?;
    Ok(Some(Bytes::from(bytes)))
}

/// Decode a sample's photos and write them to the blob store.
///
/// Writes run concurrently; the returned reference paths keep the order of
/// `encoded`, empty blobs skipped. If any write fails, the ones that succeeded
/// are removed again before the error is returned.
pub async fn store_photos(
    store: &dyn BlobStore,
    encoded: &[String],
) -> Result<Vec<String>, IngestError> {
    let mut decoded = Vec::with_capacity(encoded.len());
    for blob in encoded {
        if let Some(bytes) = decode_photo(blob)? {
            decoded.push(bytes);
        }
    }

    let results = join_all(decoded.into_iter().map(|body| async move {
        let name = generate_photo_name();
        store
            .put(&name, body)
            .await
            .with_context(|| format!("store photo {name}"))
    }))
    .await;

    let mut stored = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(reference) => stored.push(reference),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => warn!(error = %e, "additional photo write failed"),
        }
    }

    if let Some(e) = first_error {
        discard_photos(store, &stored).await;
        return Err(IngestError::BlobStore(e));
    }

    debug!(count = stored.len(), "photos stored");
    Ok(stored)
}

/// Best-effort removal of photos whose database rows will not be committed.
pub async fn discard_photos(store: &dyn BlobStore, references: &[String]) {
    for reference in references {
        if let Err(e) = store.delete(reference).await {
            warn!(error = %e, %reference, "failed to remove orphaned photo");
        }
    }
}

#[cfg(test)]
mod photo_tests {
    use super::*;
    use crate::storage::fake::MemoryBlobStore;

    #[test]
    fn blank_blobs_are_skipped() {
        assert_eq!(decode_photo("").unwrap(), None);
        assert_eq!(decode_photo(" ").unwrap(), None);
        assert_eq!(decode_photo("\n\t").unwrap(), None);
    }

    #[test]
    fn decodes_wrapped_base64() {
        let bytes = decode_photo("aGVs\nbG8=").unwrap().unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[test]
    fn invalid_base64_is_a_blob_store_error() {
        let err = decode_photo("not base64!!").unwrap_err();
        assert!(matches!(err, IngestError::BlobStore(_)));
    }

    #[tokio::test]
    async fn stores_in_order_and_skips_blanks() {
        let store = MemoryBlobStore::default();
        let refs = store_photos(
            &store,
            &["aGVsbG8=".to_string(), " ".to_string(), "d29ybGQ=".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(refs.len(), 2);
        assert!(refs
            .iter()
            .all(|r| r.starts_with("./images/walks/IMG") && r.ends_with(".jpg")));

        let objects = store.objects.lock().unwrap();
        assert_eq!(&objects[&refs[0]][..], b"hello");
        assert_eq!(&objects[&refs[1]][..], b"world");
    }

    #[tokio::test]
    async fn failed_write_surfaces_and_leaves_nothing() {
        let store = MemoryBlobStore::failing();
        let err = store_photos(&store, &["aGVsbG8=".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::BlobStore(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn discard_removes_stored_photos() {
        let store = MemoryBlobStore::default();
        let refs = store_photos(&store, &["aGVsbG8=".to_string()])
            .await
            .unwrap();
        discard_photos(&store, &refs).await;
        assert_eq!(store.len(), 0);
    }
}
