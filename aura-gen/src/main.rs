//! aura-gen - AI Radio Generation Service
//!
//! Accepts generation prompts, runs them through the asynchronous job
//! pipeline and persists the resulting radio stations in the shared
//! AuraRadio database. Job status is polled via HTTP.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use aura_gen::catalog::SqliteCatalog;
use aura_gen::services::{CompletionClient, GenerationOrchestrator};
use aura_gen::AppState;

#[derive(Parser, Debug)]
#[command(name = "aura-gen", about = "AuraRadio AI radio generation service")]
struct Args {
    /// Data directory holding the shared database (overrides env/config)
    #[arg(long)]
    data_dir: Option<String>,

    /// Bind address override
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting aura-gen (AI Radio Generation) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = aura_common::config::ServiceConfig::load()?;
    let data_dir =
        aura_common::config::resolve_data_dir(args.data_dir.as_deref(), "AURA_DATA_DIR")?;

    let db_path = data_dir.join(&config.database_file);
    info!("Database: {}", db_path.display());

    let db_pool = aura_gen::db::init_service_database(&db_path).await?;
    info!("Database connection established");

    let text_client = CompletionClient::new(
        config.text_generation.endpoint.clone(),
        config.text_generation.model.clone(),
        config.text_generation.api_key.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize text-generation client: {}", e))?;

    let catalog = SqliteCatalog::new(db_pool.clone());
    let orchestrator = Arc::new(GenerationOrchestrator::new(
        db_pool.clone(),
        Arc::new(catalog),
        Arc::new(text_client),
    ));

    let state = AppState::new(db_pool, orchestrator);
    let app = aura_gen::build_router(state);

    let bind_address = args.bind.unwrap_or(config.bind_address);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
