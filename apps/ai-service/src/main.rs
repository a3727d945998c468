mod agent;
mod auth;
mod config;
mod errors;
mod llm_client;
mod models;
mod resume;
mod retrieval;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod vector;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, IndexConfig};
use crate::llm_client::GeminiClient;
use crate::resume::LatexCompiler;
use crate::retrieval::TenantRetrieval;
use crate::routes::build_router;
use crate::state::AppState;
use crate::vector::provision::{
    ensure_index, measure_dimension, IndexSpec, ProvisionOutcome, DEFAULT_METRIC,
    MAX_READY_WAIT, POLL_INTERVAL,
};
use crate::vector::{FastEmbedProvider, PineconeAdmin, PineconeIndex};

#[derive(Parser)]
#[command(name = "ai-service", version, about = "Job-search AI service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Create the vector index if it does not exist, then exit
    ProvisionIndex,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(Config::from_env()?).await,
        Command::ProvisionIndex => provision(IndexConfig::from_env()?).await,
    }
}

async fn load_embedder(config: &IndexConfig) -> Result<Arc<FastEmbedProvider>> {
    let cache_dir = config.embedding_cache_dir.clone();
    let embedder = tokio::task::spawn_blocking(move || FastEmbedProvider::new(cache_dir))
        .await
        .context("embedding model loader panicked")??;
    Ok(Arc::new(embedder))
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting AI service v{}", env!("CARGO_PKG_VERSION"));

    let embedder = load_embedder(&config.index).await?;

    let index = PineconeIndex::connect(&config.index.pinecone())
        .await
        .context("Failed to connect to the vector index")?;
    info!("Vector index '{}' at {}", config.index.index_name, index.host());

    let llm = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.llm_temperature,
    );
    info!("LLM client initialized (model: {})", llm.model());

    let mut compiler = LatexCompiler::new(config.latex_program.clone())
        .with_extra_args(config.latex_extra_args.clone());
    if let Some(root) = &config.latex_scratch_dir {
        compiler = compiler.with_scratch_root(root);
    }
    info!("LaTeX toolchain: {}", compiler.program());

    let state = AppState {
        retrieval: TenantRetrieval::new(embedder, Arc::new(index)),
        llm: Arc::new(llm),
        compiler,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Ensures the index exists with the embedding model's width. Never recreates it.
async fn provision(config: IndexConfig) -> Result<()> {
    let embedder = load_embedder(&config).await?;
    let dimension = measure_dimension(embedder.as_ref()).await?;
    info!("Embedding dimension: {dimension}");

    let admin = PineconeAdmin::new(&config.pinecone())?;
    let spec = IndexSpec {
        name: config.index_name.clone(),
        dimension,
        metric: DEFAULT_METRIC.to_string(),
        cloud: config.cloud.clone(),
        region: config.region.clone(),
    };

    match ensure_index(&admin, &spec, POLL_INTERVAL, MAX_READY_WAIT).await? {
        ProvisionOutcome::AlreadyExists => info!("Index '{}' already provisioned", spec.name),
        ProvisionOutcome::Created => info!("Index '{}' provisioned", spec.name),
    }
    Ok(())
}
