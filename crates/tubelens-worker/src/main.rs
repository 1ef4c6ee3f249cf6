//! Command-line runner: analyze one playlist to completion.
//!
//! Usage: `tubelens-worker <playlist id or URL>`

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tubelens_models::extract_playlist_id;
use tubelens_store::open_store;
use tubelens_worker::{
    GeminiClient, PlaylistOrchestrator, TaskStore, WorkerConfig, YouTubeClient,
    YtDlpTranscriptSource,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("tubelens=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("usage: tubelens-worker <playlist id or URL>");
        std::process::exit(2);
    };

    let playlist_id = match extract_playlist_id(&input) {
        Ok(id) => id,
        Err(e) => {
            error!("Invalid playlist: {}", e);
            std::process::exit(2);
        }
    };

    let config = WorkerConfig::from_env();
    info!(playlist_id = %playlist_id, "Starting tubelens-worker");

    let database_path =
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/tubelens.db".to_string());
    let records = match open_store(&database_path).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open record store: {}", e);
            std::process::exit(1);
        }
    };

    let (lister, generator) = match (YouTubeClient::new(&config), GeminiClient::new(&config)) {
        (Ok(lister), Ok(generator)) => (lister, generator),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to create clients: {}", e);
            std::process::exit(1);
        }
    };

    let tasks = Arc::new(TaskStore::new(config.task_retention));
    let orchestrator = PlaylistOrchestrator::new(
        tasks.clone(),
        Arc::new(lister),
        Arc::new(YtDlpTranscriptSource::new(&config)),
        Arc::new(generator),
        records,
    )
    .with_config(&config);

    let task_id = tasks.create().await;
    orchestrator.run(&task_id, &playlist_id).await;

    match tasks.get(&task_id).await {
        Some(task) => match serde_json::to_string_pretty(&task) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to render task summary: {}", e),
        },
        None => info!("Task finished"),
    }
}
