use serde::{Deserialize, Deserializer, Serialize};

use crate::walks::repo_types::{Location, PhotoUsage, Place, Walk};

/// Value of `location_name` that marks an autogenerated tracking point.
pub const UNNAMED_SENTINEL: &str = "null";

/// A walk as posted by the tracking app. Not persisted directly.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WalkSubmission {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub locations: Vec<LocationSample>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LocationSample {
    /// 0-based position assigned by the client.
    #[serde(rename = "location_ID")]
    pub position: u32,
    #[serde(rename = "location_lat", deserialize_with = "number_or_string")]
    pub latitude: f64,
    #[serde(rename = "location_lng", deserialize_with = "number_or_string")]
    pub longitude: f64,
    /// Raw text as received; see `timing::normalize_timestamp`.
    #[serde(rename = "location_timestamp", deserialize_with = "text_or_integer")]
    pub timestamp: String,
    #[serde(rename = "location_name", default)]
    pub name: Option<String>,
    #[serde(rename = "location_description", default)]
    pub description: Option<String>,
    #[serde(rename = "location_photos", default)]
    pub photos: Vec<String>,
}

impl LocationSample {
    /// Persisted locationId: locations begin from 1.
    pub fn location_id(&self) -> i64 {
        i64::from(self.position) + 1
    }

    /// Name of the place this sample marks, unless it is an autogenerated point.
    pub fn place_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| *name != UNNAMED_SENTINEL)
    }

    /// Both coordinates exactly zero means the device had no GPS fix.
    pub fn has_fix(&self) -> bool {
        !(self.latitude == 0.0 && self.longitude == 0.0)
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom(format!(
            "coordinate {value} is not a finite number"
        )));
    }
    Ok(value)
}

fn text_or_integer<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Integer(i64),
        Unsigned(u64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Integer(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

/// Form body of `POST /walks`; the app sends the whole document in `data`.
#[derive(Debug, Deserialize)]
pub struct SubmissionForm {
    pub data: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedWalkResponse {
    pub walk_id: i64,
}

#[derive(Debug, Serialize)]
pub struct PlaceDetails {
    #[serde(flatten)]
    pub place: Place,
    pub photos: Vec<PhotoUsage>,
}

#[derive(Debug, Serialize)]
pub struct WalkDetails {
    #[serde(flatten)]
    pub walk: Walk,
    pub locations: Vec<Location>,
    pub places: Vec<PlaceDetails>,
}
