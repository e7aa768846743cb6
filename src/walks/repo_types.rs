use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Walk {
    pub id: i64,
    pub title: String,
    #[sqlx(rename = "shortDesc")]
    pub short_desc: String,
    #[sqlx(rename = "longDesc")]
    pub long_desc: String,
    pub hours: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Location {
    #[sqlx(rename = "walkId")]
    pub walk_id: i64,
    #[sqlx(rename = "locationId")]
    pub location_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
    #[sqlx(rename = "isPlace")]
    pub is_place: bool,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Place {
    #[sqlx(rename = "placeId")]
    pub place_id: i64,
    #[sqlx(rename = "locationId")]
    pub location_id: i64,
    #[sqlx(rename = "walkId")]
    pub walk_id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct PhotoUsage {
    #[sqlx(rename = "placeId")]
    pub place_id: i64,
    #[sqlx(rename = "photoName")]
    pub photo_name: String,
}

/// Row values for a new location, before it is written.
#[derive(Debug, Clone, Copy)]
pub struct NewLocation {
    pub walk_id: i64,
    pub location_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: i64,
}
