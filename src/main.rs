use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

mod app;
mod config;
mod db;
mod error;
mod photos;
mod state;
mod storage;
mod walks;

use crate::{config::AppConfig, state::AppState, walks::services::ingest_document};

/// Receives walks from the walking tour app and stores them.
///
/// With a FILE argument the document is ingested once and the program exits;
/// otherwise the HTTP server is started.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Walk document to ingest instead of serving HTTP.
    file: Option<PathBuf>,

    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "APP_PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "walkingtour=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config).await?;

    if let Some(file) = cli.file {
        let walk_id = run_file(&app_state, &file).await?;
        println!("{walk_id}");
        return Ok(());
    }

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    app::serve(app::build_app(app_state), addr).await
}

/// Ingest the walk document stored at `path` and return the new walk id.
async fn run_file(state: &AppState, path: &Path) -> anyhow::Result<i64> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read walk document {}", path.display()))?;
    let walk_id = ingest_document(&state.ingestor, &raw)
        .await
        .with_context(|| format!("ingest {}", path.display()))?;
    Ok(walk_id)
}

#[cfg(test)]
mod file_tests {
    use super::*;
    use crate::state::test_config;

    const DOC: &str = r#"{"walk":{"title":"From file","locations":[
        {"location_ID":0,"location_lat":1,"location_lng":1,"location_timestamp":"1380000000"},
        {"location_ID":1,"location_lat":2,"location_lng":2,"location_timestamp":"1380001800"}]}}"#;

    #[tokio::test]
    async fn ingests_walk_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk.json");
        std::fs::write(&path, DOC).unwrap();
        let state = AppState::fake(test_config()).await;

        let walk_id = run_file(&state, &path).await.unwrap();

        let (title, hours): (String, f64) =
            sqlx::query_as("SELECT title, hours FROM walk WHERE id = ?")
                .bind(walk_id)
                .fetch_one(&state.db)
                .await
                .unwrap();
        assert_eq!(title, "From file");
        assert_eq!(hours, 0.5);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let state = AppState::fake(test_config()).await;

        let err = run_file(&state, &path).await.unwrap_err();
        assert!(err.to_string().contains("absent.json"), "{err:#}");

        let walks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM walk")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(walks, 0);
    }
}
