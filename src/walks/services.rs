use std::sync::Arc;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, instrument, warn};

use crate::error::IngestError;
use crate::photos;
use crate::storage::BlobStore;
use crate::walks::distance::total_distance;
use crate::walks::dto::{LocationSample, WalkSubmission};
use crate::walks::parser::parse_document;
use crate::walks::repo;
use crate::walks::repo_types::NewLocation;
use crate::walks::timing::{duration_hours, parse_timestamp};

/// Persists walk submissions and derives their duration and distance.
///
/// One ingestion is one transaction: the walk, its locations, places and photo
/// usages are either all committed or all rolled back. Photos written to the
/// blob store for a rolled back ingestion are removed again.
#[derive(Clone)]
pub struct WalkIngestor {
    db: SqlitePool,
    blobs: Arc<dyn BlobStore>,
}

impl WalkIngestor {
    pub fn new(db: SqlitePool, blobs: Arc<dyn BlobStore>) -> Self {
        Self { db, blobs }
    }

    /// Store `walk` and return the new walk id.
    #[instrument(skip(self, walk), fields(title = %walk.title, samples = walk.locations.len()))]
    pub async fn ingest(&self, walk: &WalkSubmission) -> Result<i64, IngestError> {
        let mut tx = self.db.begin().await?;
        let mut stored_photos = Vec::new();

        match self.write_walk(&mut tx, walk, &mut stored_photos).await {
            Ok(walk_id) => {
                tx.commit().await?;
                info!(
                    walk_id,
                    photos = stored_photos.len(),
                    "walk {} ingested",
                    walk_id
                );
                Ok(walk_id)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                photos::services::discard_photos(self.blobs.as_ref(), &stored_photos).await;
                warn!(error = %e, "walk ingestion aborted");
                Err(e)
            }
        }
    }

    async fn write_walk(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        walk: &WalkSubmission,
        stored_photos: &mut Vec<String>,
    ) -> Result<i64, IngestError> {
        let walk_id = repo::insert_walk_tx(
            tx,
            &walk.title,
            &walk.short_description,
            &walk.long_description,
        )
        .await?;
        info!(walk_id, "Walk added");

        let mut first_timestamp = None;
        let mut last_timestamp = None;
        for sample in &walk.locations {
            let timestamp = parse_timestamp(&sample.timestamp)?;
            first_timestamp.get_or_insert(timestamp);
            last_timestamp = Some(timestamp);

            self.write_sample(tx, walk_id, sample, timestamp, stored_photos)
                .await?;
        }

        let hours = match (first_timestamp, last_timestamp) {
            (Some(first), Some(last)) => duration_hours(first, last),
            _ => 0.0,
        };
        repo::update_walk_hours_tx(tx, walk_id, hours).await?;

        // Distance comes from what was persisted, not from the submission.
        let route = repo::list_route_tx(tx, walk_id).await?;
        let distance = total_distance(&route);
        repo::update_walk_distance_tx(tx, walk_id, distance).await?;

        debug!(walk_id, hours, distance, points = route.len(), "walk metrics updated");
        Ok(walk_id)
    }

    async fn write_sample(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        walk_id: i64,
        sample: &LocationSample,
        timestamp: i64,
        stored_photos: &mut Vec<String>,
    ) -> Result<(), IngestError> {
        let location_id = sample.location_id();

        if sample.has_fix() {
            let loc = NewLocation {
                walk_id,
                location_id,
                latitude: sample.latitude,
                longitude: sample.longitude,
                timestamp,
            };
            repo::insert_location_tx(tx, &loc).await?;
            info!(walk_id, location_id, "Location {} added to walk with ID {}", location_id, walk_id);
        } else {
            debug!(walk_id, location_id, "sample without GPS fix skipped");
        }

        let Some(name) = sample.place_name() else {
            if !sample.photos.is_empty() {
                warn!(walk_id, location_id, "photos on an unnamed location ignored");
            }
            return Ok(());
        };

        let description = sample.description.as_deref().unwrap_or_default();
        let place_id = repo::insert_place_tx(tx, walk_id, location_id, name, description).await?;

        if !repo::mark_location_as_place_tx(tx, walk_id, location_id).await? {
            warn!(walk_id, location_id, place_id, "place has no location row to flag");
        }

        let references = photos::services::store_photos(self.blobs.as_ref(), &sample.photos).await?;
        stored_photos.extend(references.iter().cloned());
        for reference in &references {
            photos::repo::insert_photo_usage_tx(tx, place_id, reference).await?;
        }

        debug!(walk_id, location_id, place_id, photos = references.len(), "place added");
        Ok(())
    }
}

/// Parse a raw walk document and ingest it.
pub async fn ingest_document(ingestor: &WalkIngestor, raw: &str) -> Result<i64, IngestError> {
    let walk = parse_document(raw)?;
    ingestor.ingest(&walk).await
}
