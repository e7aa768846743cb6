use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a walk ingestion. None of these are recovered locally; each one
/// aborts the ingestion and rolls back its transaction.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed walk document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("no walk submission received")]
    MissingSubmission,

    #[error("invalid walk data: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("photo storage error: {0:#}")]
    BlobStore(anyhow::Error),

    #[error("ingestion did not finish within {0:?}")]
    Timeout(std::time::Duration),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::MalformedDocument(_)
            | IngestError::MissingSubmission
            | IngestError::Validation(_) => StatusCode::BAD_REQUEST,
            IngestError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            IngestError::Persistence(_) | IngestError::BlobStore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<IngestError> for (StatusCode, String) {
    fn from(e: IngestError) -> Self {
        (e.status(), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            IngestError::from(malformed).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IngestError::MissingSubmission.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            IngestError::Validation("bad timestamp".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_errors_map_to_server_error() {
        let (status, body) = <(StatusCode, String)>::from(IngestError::BlobStore(
            anyhow::anyhow!("disk full"),
        ));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("disk full"));
        assert_eq!(
            IngestError::Persistence(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
