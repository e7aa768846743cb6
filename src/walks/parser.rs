use tracing::debug;

use crate::error::IngestError;
use crate::walks::dto::WalkSubmission;

/// Parse a serialized walk document.
///
/// The walk is expected under a top-level `walk` key; a bare walk object is
/// accepted too. Only structural well-formedness is checked here. Coordinates,
/// timestamps and the unnamed-place sentinel are interpreted during ingestion.
pub fn parse_document(raw: &str) -> Result<WalkSubmission, IngestError> {
    let mut value: serde_json::Value = serde_json::from_str(raw)?;
    let walk_value = if value.get("walk").is_some() {
        value["walk"].take()
    } else {
        value
    };

    let walk: WalkSubmission = serde_json::from_value(walk_value)?;
    debug!(title = %walk.title, samples = walk.locations.len(), "walk document parsed");
    Ok(walk)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "walk": {
            "title": "Loop",
            "short_description": "short",
            "long_description": "long",
            "locations": [
                { "location_ID": 0, "location_lat": 52.41, "location_lng": "-4.08",
                  "location_timestamp": "1380000000", "location_name": "null",
                  "location_photos": [] },
                { "location_ID": 1, "location_lat": 52.42, "location_lng": -4.07,
                  "location_timestamp": 1380003600123, "location_name": "Cafe",
                  "location_description": "coffee", "location_photos": ["aGk="] }
            ]
        }
    }"#;

    #[test]
    fn parses_wrapped_document() {
        let walk = parse_document(DOC).unwrap();
        assert_eq!(walk.title, "Loop");
        assert_eq!(walk.short_description, "short");
        assert_eq!(walk.long_description, "long");
        assert_eq!(walk.locations.len(), 2);

        let first = &walk.locations[0];
        assert_eq!(first.location_id(), 1);
        assert_eq!(first.longitude, -4.08);
        assert_eq!(first.place_name(), None);

        let second = &walk.locations[1];
        assert_eq!(second.timestamp, "1380003600123");
        assert_eq!(second.place_name(), Some("Cafe"));
        assert_eq!(second.description.as_deref(), Some("coffee"));
        assert_eq!(second.photos, vec!["aGk=".to_string()]);
    }

    #[test]
    fn accepts_bare_walk_and_defaults() {
        let walk = parse_document(r#"{ "title": "Bare" }"#).unwrap();
        assert_eq!(walk.title, "Bare");
        assert!(walk.short_description.is_empty());
        assert!(walk.locations.is_empty());
    }

    #[test]
    fn missing_or_null_name_is_unnamed() {
        let walk = parse_document(
            r#"{ "walk": { "title": "t", "locations": [
                { "location_ID": 0, "location_lat": 1, "location_lng": 1, "location_timestamp": "1" },
                { "location_ID": 1, "location_lat": 1, "location_lng": 1, "location_timestamp": "2",
                  "location_name": null }
            ] } }"#,
        )
        .unwrap();
        assert!(walk.locations.iter().all(|l| l.place_name().is_none()));
        assert!(walk.locations.iter().all(|l| l.photos.is_empty()));
    }

    #[test]
    fn integer_timestamps_beyond_i64_are_kept_as_text() {
        let walk = parse_document(
            r#"{ "title": "t", "locations": [
                { "location_ID": 0, "location_lat": 1, "location_lng": 1,
                  "location_timestamp": 13800000009223372036 },
                { "location_ID": 1, "location_lat": 1, "location_lng": 1,
                  "location_timestamp": "13800000009223372036" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(walk.locations[0].timestamp, "13800000009223372036");
        assert_eq!(walk.locations[0].timestamp, walk.locations[1].timestamp);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        for (lat, lng) in [(r#""NaN""#, "1"), (r#""inf""#, "1"), ("1", r#""-infinity""#)] {
            let raw = format!(
                r#"{{ "title": "t", "locations": [
                    {{ "location_ID": 0, "location_lat": {lat}, "location_lng": {lng},
                      "location_timestamp": "1" }} ] }}"#
            );
            let err = parse_document(&raw).unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedDocument(_)),
                "{lat}/{lng} gave {err:?}"
            );
        }
    }

    #[test]
    fn rejects_unparseable_input() {
        for raw in [
            "",
            "<walk><title>x</title></walk>",
            r#"{ "walk": { "title": "t", "locations": [ { "location_ID": 0 } ] } }"#,
            r#"{ "walk": { "title": "t", "locations": [
                { "location_ID": 0, "location_lat": "north", "location_lng": 1,
                  "location_timestamp": "1" } ] } }"#,
            "[1, 2, 3]",
        ] {
            let err = parse_document(raw).unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedDocument(_)),
                "{raw:?} gave {err:?}"
            );
        }
    }
}
