use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    error::IngestError,
    photos,
    state::AppState,
    walks::{
        dto::{CreatedWalkResponse, PlaceDetails, SubmissionForm, WalkDetails},
        repo,
        services::ingest_document,
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/walks/:id", get(get_walk))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/walks", post(create_walk))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, photos travel inline
}

/// POST /walks, form field `data` carries the walk document.
#[instrument(skip(state, form))]
pub async fn create_walk(
    State(state): State<AppState>,
    Form(form): Form<SubmissionForm>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<CreatedWalkResponse>), (StatusCode, String)>
{
    let data = form
        .data
        .filter(|d| !d.trim().is_empty())
        .ok_or(IngestError::MissingSubmission)?;

    if let Some(path) = &state.config.debug_dump_path {
        if let Err(e) = tokio::fs::write(path, &data).await {
            warn!(error = %e, path = %path.display(), "could not dump submission");
        }
    }

    let ingest = ingest_document(&state.ingestor, &data);
    let result = match state.config.ingest_timeout {
        Some(limit) => tokio::time::timeout(limit, ingest)
            .await
            .unwrap_or(Err(IngestError::Timeout(limit))),
        None => ingest.await,
    };

    let walk_id = result.map_err(|e| {
        error!(error = %e, "walk submission failed");
        <(StatusCode, String)>::from(e)
    })?;

    info!(walk_id, "walk submission stored");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/v1/walks/{walk_id}"))],
        Json(CreatedWalkResponse { walk_id }),
    ))
}

#[instrument(skip(state))]
pub async fn get_walk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WalkDetails>, (StatusCode, String)> {
    let walk = repo::get_walk(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Walk not found".to_string()))?;

    let locations = repo::list_locations(&state.db, id).await.map_err(internal)?;
    let usages = photos::repo::list_photo_usages_by_walk(&state.db, id)
        .await
        .map_err(|e| {
            error!(error = %e, walk_id = id, "list photos failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let places = repo::list_places(&state.db, id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|place| PlaceDetails {
            photos: usages
                .iter()
                .filter(|p| p.place_id == place.place_id)
                .cloned()
                .collect(),
            place,
        })
        .collect();

    Ok(Json(WalkDetails {
        walk,
        locations,
        places,
    }))
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
