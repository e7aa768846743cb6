use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::walks::repo_types::PhotoUsage;

/// Link a stored photo to the place it was taken at.
pub async fn insert_photo_usage_tx(
    tx: &mut Transaction<'_, Sqlite>,
    place_id: i64,
    photo_name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO photousage (placeId, photoName)
        VALUES (?, ?)
        "#,
    )
    .bind(place_id)
    .bind(photo_name)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// ---- Queries ----

/// All photo usages of a walk's places, in insertion order.
pub async fn list_photo_usages_by_walk(
    db: &SqlitePool,
    walk_id: i64,
) -> anyhow::Result<Vec<PhotoUsage>> {
    let rows = sqlx::query_as::<_, PhotoUsage>(
        r#"
        SELECT pu.placeId, pu.photoName
          FROM photousage pu
          JOIN placedescriptions pd ON pd.placeId = pu.placeId
         WHERE pd.walkId = ?
         ORDER BY pu.id ASC
        "#,
    )
    .bind(walk_id)
    .fetch_all(db)
    .await
    .context("list photo usages by walk")?;

    Ok(rows)
}
