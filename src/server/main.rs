//! HTTP server for location codes, region lookup, and nearby search.
//!
//! Datasets are loaded once at startup and shared read-only across
//! handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use somgeo::config::Config;
use somgeo::dataset;
use somgeo::pip::RegionResolver;

mod handlers;
use handlers::AppState;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Somali geography API server")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!("somgeo server for {}", config.country.name);

    let regions = load_or_empty(&config.data.regions, dataset::load_regions)?;
    let roads = load_or_empty(&config.data.roads, dataset::load_roads)?;
    let points = load_or_empty(&config.data.points, dataset::load_points)?;

    let listen = config.server.listen.clone();
    let state = Arc::new(AppState {
        resolver: RegionResolver::from_regions(regions),
        roads,
        points,
        config,
    });

    let app = router(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/locationcode/generate", get(handlers::generate))
        .route("/locationcode/resolve", get(handlers::resolve))
        .route("/locationcode/shorten", get(handlers::shorten))
        .route("/locationcode/recover", get(handlers::recover))
        .route("/regions/lookup", get(handlers::region_lookup))
        .route("/roads/nearby", get(handlers::roads_nearby))
        .route("/places/nearby", get(handlers::places_nearby))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A missing snapshot leaves that dataset empty; an unreadable one is fatal
fn load_or_empty<T>(path: &Path, load: fn(&Path) -> Result<Vec<T>>) -> Result<Vec<T>> {
    if !path.exists() {
        warn!("Dataset {} not found, starting with none", path.display());
        return Ok(Vec::new());
    }
    load(path)
}
