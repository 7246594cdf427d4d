use anyhow::{anyhow, bail, Context, Result};
use cfb_pickem::api::GameResultsApiClient;
use cfb_pickem::ingest::{import_picks_csv, ingest_games, ingest_teams, record_result, update_games};
use cfb_pickem::scoring::trends::standings_over_time;
use cfb_pickem::scoring::{compute_hypothetical_standings, compute_standings, rescore_picks, rescore_season, SortBy};
use cfb_pickem::utils::data::{load_pool, save_pool, save_standings_to_csv};
use cfb_pickem::{AppConfig, GameId, PoolData, SeasonConfig, Standing, TeamId};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfb-pickem", about = "Bowl season pick'em pool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the leaderboard
    Standings {
        /// Only count the first N completed games
        #[arg(long)]
        num_games: Option<usize>,
        /// "points" or "max"
        #[arg(long, default_value = "points", value_parser = parse_sort_by)]
        sort_by: SortBy,
        /// Also write the leaderboard to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Leaderboard if the given games went a certain way
    Hypothetical {
        /// GAME_ID=TEAM_NAME, repeatable
        #[arg(long = "pick")]
        picks: Vec<String>,
        /// Championship total score to settle the tiebreaker with
        #[arg(long)]
        total: Option<i32>,
        #[arg(long, default_value = "points", value_parser = parse_sort_by)]
        sort_by: SortBy,
    },
    /// Running totals after each completed game
    History,
    /// Recompute pick points from stored results
    Rescore {
        #[arg(long)]
        game: Option<GameId>,
    },
    /// Enter or correct a score by hand
    RecordResult {
        game: GameId,
        #[arg(long)]
        home: i32,
        #[arg(long)]
        away: i32,
        /// Mark the game as final
        #[arg(long = "final")]
        is_final: bool,
    },
    /// Import a pick sheet CSV
    ImportPicks { file: PathBuf },
    /// Load teams and postseason games from the game feed
    Ingest,
    /// Pull scores for stored games from the game feed and rescore
    UpdateGames,
}

fn parse_sort_by(value: &str) -> Result<SortBy, String> {
    match value.to_ascii_lowercase().as_str() {
        "points" => Ok(SortBy::Points),
        "max" => Ok(SortBy::Max),
        other => Err(format!("unknown sort \"{}\", expected points or max", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let season = config.season_config().context("Failed to load season configuration")?;
    let mut pool = load_pool(&config.data_file)?;

    println!("{} Bowl Pick'em ({})\n", season.season, config.data_file.display());

    match cli.command {
        Command::Standings { num_games, sort_by, csv } => {
            let standings = compute_standings(&pool, &season, num_games, sort_by);
            print_standings(&standings);
            if let Some(path) = csv {
                save_standings_to_csv(&standings, &path)?;
                println!("\nSaved standings to {}", path.display());
            }
        }
        Command::Hypothetical { picks, total, sort_by } => {
            let predictions = parse_predictions(&pool, &picks)?;
            let standings = compute_hypothetical_standings(&pool, &season, &predictions, total, sort_by)?;
            print_standings(&standings);
        }
        Command::History => print_history(&pool, &season),
        Command::Rescore { game } => {
            let rescored = match game {
                Some(game_id) => rescore_picks(&mut pool, season.season, game_id)?,
                None => rescore_season(&mut pool, season.season),
            };
            save_pool(&pool, &config.data_file)?;
            println!("Rescored {} picks", rescored);
        }
        Command::RecordResult { game, home, away, is_final } => {
            let rescored = record_result(&mut pool, season.season, game, Some(home), Some(away), is_final)?;
            save_pool(&pool, &config.data_file)?;
            println!("Recorded {}-{} and rescored {} picks", home, away, rescored);
        }
        Command::ImportPicks { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read pick sheet {}", file.display()))?;
            let report = import_picks_csv(&mut pool, &season, &text)?;
            save_pool(&pool, &config.data_file)?;
            println!(
                "Imported {} picks for {} users",
                report.picks_imported, report.users_imported
            );
            for rejected in &report.rejected {
                println!("  Rejected {}: {}", rejected.name, rejected.reason);
            }
        }
        Command::Ingest => {
            let client = feed_client(&config)?;
            let teams = client
                .fetch_teams(season.season)
                .await
                .context("Failed to fetch teams")?;
            let games = client
                .fetch_postseason_games(season.season)
                .await
                .context("Failed to fetch postseason games")?;
            let inserted = ingest_teams(&mut pool, &season, &teams);
            println!("{} teams inserted", inserted);
            println!("{}", ingest_games(&mut pool, &season, &games)?);
            save_pool(&pool, &config.data_file)?;
        }
        Command::UpdateGames => {
            let games = feed_client(&config)?
                .fetch_postseason_games(season.season)
                .await
                .context("Failed to fetch postseason games")?;
            println!("{}", update_games(&mut pool, &season, &games)?);
            save_pool(&pool, &config.data_file)?;
        }
    }

    Ok(())
}

fn feed_client(config: &AppConfig) -> Result<GameResultsApiClient> {
    let key = config
        .cfb_api_key
        .clone()
        .ok_or_else(|| anyhow!("COLLEGE_FOOTBALL_DATA_API_KEY not set in .env file"))?;
    Ok(GameResultsApiClient::new(key))
}

fn parse_predictions(pool: &PoolData, picks: &[String]) -> Result<HashMap<GameId, TeamId>> {
    let mut predictions = HashMap::with_capacity(picks.len());
    for pick in picks {
        let Some((game, team)) = pick.split_once('=') else {
            bail!("expected GAME_ID=TEAM_NAME, got \"{}\"", pick);
        };
        let game_id: GameId = game
            .trim()
            .parse()
            .with_context(|| format!("\"{}\" is not a game id", game))?;
        predictions.insert(game_id, pool.team_by_name(team.trim())?.id);
    }
    Ok(predictions)
}

fn print_standings(standings: &[Standing]) {
    if standings.is_empty() {
        println!("No picks have been submitted yet.");
        return;
    }
    println!(
        "{:<5} {:<24} {:>6} {:>9} {:>10} {:>5}",
        "Rank", "Name", "Points", "Correct", "Tiebreak", "Max"
    );
    for standing in standings {
        let badge = if standing.is_first_place {
            " *"
        } else if standing.is_last_place {
            " ~"
        } else {
            ""
        };
        println!(
            "{:<5} {:<24} {:>6} {:>9} {:>10} {:>5}",
            standing.rank,
            format!("{}{}", standing.name, badge),
            standing.points,
            format!("{}/{}", standing.correct_picks, standing.total_picks),
            standing
                .prediction_difference
                .map(|d| format!("off {}", d))
                .unwrap_or_else(|| "-".to_string()),
            standing
                .max_points
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn print_history(pool: &PoolData, season: &SeasonConfig) {
    let columns = standings_over_time(pool, season.season);
    if columns.is_empty() {
        println!("No completed games yet.");
        return;
    }
    for column in columns {
        println!("{}", column.game);
        for (user_id, points) in &column.points {
            let name = pool.user(*user_id).map(|u| u.name.as_str()).unwrap_or("?");
            println!("  {:<24} {:>4}", name, points);
        }
    }
}
