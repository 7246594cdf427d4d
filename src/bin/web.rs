use anyhow::{Context, Result};
use cfb_pickem::api::GameResultsApiClient;
use cfb_pickem::utils::data::load_pool;
use cfb_pickem::web::{router, AppState};
use cfb_pickem::AppConfig;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let season = config.season_config().context("Failed to load season configuration")?;

    println!("Loading pool data from {}...", config.data_file.display());
    let pool = load_pool(&config.data_file)?;
    println!("Data loaded successfully");
    println!("  - {} Teams", pool.teams.len());
    println!("  - {} Games in {}", pool.season_games(season.season).count(), season.season);
    println!("  - {} Users", pool.users.len());
    println!("  - {} Picks", pool.season_picks(season.season).count());

    let mut state = AppState::new(pool, season);
    state.data_file = Some(config.data_file.clone());
    match &config.cfb_api_key {
        Some(key) => state.feed = Some(Arc::new(GameResultsApiClient::new(key.clone()))),
        None => info!("COLLEGE_FOOTBALL_DATA_API_KEY not set, feed endpoints are disabled"),
    }

    println!("\nStarting web server at http://{}", config.bind_addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    axum::serve(listener, router(state)).await?;
    Ok(())
}
