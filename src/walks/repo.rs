use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::walks::distance::Coordinate;
use crate::walks::repo_types::{Location, NewLocation, Place, Walk};

/// Insert a walk with zeroed derived metrics; returns the generated id.
pub async fn insert_walk_tx(
    tx: &mut Transaction<'_, Sqlite>,
    title: &str,
    short_desc: &str,
    long_desc: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO walk (title, shortDesc, longDesc, hours, distance)
        VALUES (?, ?, ?, 0, 0)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(short_desc)
    .bind(long_desc)
    .fetch_one(&mut **tx)
    .await
}

pub async fn insert_location_tx(
    tx: &mut Transaction<'_, Sqlite>,
    loc: &NewLocation,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO location (walkId, locationId, latitude, longitude, timestamp, isPlace)
        VALUES (?, ?, ?, ?, ?, 0)
        "#,
    )
    .bind(loc.walk_id)
    .bind(loc.location_id)
    .bind(loc.latitude)
    .bind(loc.longitude)
    .bind(loc.timestamp)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert a place description; returns the generated place id.
pub async fn insert_place_tx(
    tx: &mut Transaction<'_, Sqlite>,
    walk_id: i64,
    location_id: i64,
    name: &str,
    description: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO placedescriptions (locationId, walkId, description, name)
        VALUES (?, ?, ?, ?)
        RETURNING placeId
        "#,
    )
    .bind(location_id)
    .bind(walk_id)
    .bind(description)
    .bind(name)
    .fetch_one(&mut **tx)
    .await
}

/// Flag a location as user-annotated. Returns false when the walk has no such
/// location, which happens for named samples without a GPS fix.
pub async fn mark_location_as_place_tx(
    tx: &mut Transaction<'_, Sqlite>,
    walk_id: i64,
    location_id: i64,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE location
           SET isPlace = 1
         WHERE walkId = ? AND locationId = ?
        "#,
    )
    .bind(walk_id)
    .bind(location_id)
    .execute(&mut **tx)
    .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn update_walk_hours_tx(
    tx: &mut Transaction<'_, Sqlite>,
    walk_id: i64,
    hours: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE walk SET hours = ? WHERE id = ?")
        .bind(hours)
        .bind(walk_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn update_walk_distance_tx(
    tx: &mut Transaction<'_, Sqlite>,
    walk_id: i64,
    distance: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE walk SET distance = ? WHERE id = ?")
        .bind(distance)
        .bind(walk_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Persisted route of a walk, in locationId order.
pub async fn list_route_tx(
    tx: &mut Transaction<'_, Sqlite>,
    walk_id: i64,
) -> Result<Vec<Coordinate>, sqlx::Error> {
    sqlx::query_as::<_, Coordinate>(
        r#"
        SELECT latitude, longitude
          FROM location
         WHERE walkId = ?
         ORDER BY locationId ASC
        "#,
    )
    .bind(walk_id)
    .fetch_all(&mut **tx)
    .await
}

// ---- Queries ----

pub async fn get_walk(db: &SqlitePool, walk_id: i64) -> Result<Option<Walk>, sqlx::Error> {
    sqlx::query_as::<_, Walk>(
        r#"
        SELECT id, title, shortDesc, longDesc, hours, distance
          FROM walk
         WHERE id = ?
        "#,
    )
    .bind(walk_id)
    .fetch_optional(db)
    .await
}

pub async fn list_locations(db: &SqlitePool, walk_id: i64) -> Result<Vec<Location>, sqlx::Error> {
    sqlx::query_as::<_, Location>(
        r#"
        SELECT walkId, locationId, latitude, longitude, timestamp, isPlace
          FROM location
         WHERE walkId = ?
         ORDER BY locationId ASC
        "#,
    )
    .bind(walk_id)
    .fetch_all(db)
    .await
}

pub async fn list_places(db: &SqlitePool, walk_id: i64) -> Result<Vec<Place>, sqlx::Error> {
    sqlx::query_as::<_, Place>(
        r#"
        SELECT placeId, locationId, walkId, name, description
          FROM placedescriptions
         WHERE walkId = ?
         ORDER BY locationId ASC, placeId ASC
        "#,
    )
    .bind(walk_id)
    .fetch_all(db)
    .await
}
