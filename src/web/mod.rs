use crate::api::GameResultsApiClient;
use crate::config::SeasonConfig;
use crate::error::PoolError;
use crate::ingest::{import_picks_csv, ingest_games, ingest_teams, record_result, update_games, ImportReport};
use crate::models::{Game, GameId, Pick, Standing, TeamId, UserId};
use crate::scoring::trends::{standings_over_time, TrendColumn};
use crate::scoring::{compute_hypothetical_standings, compute_standings, SortBy};
use crate::store::PoolData;
use crate::utils::data::save_pool;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tracing::error;

// Custom filters for formatting
mod filters {
    pub fn format_points(points: &i32) -> ::askama::Result<String> {
        Ok(format!("{} points", points))
    }
}

#[derive(Template)]
#[template(path = "leaderboard.html")]
struct LeaderboardTemplate {
    season: i32,
    standings: Vec<Standing>,
}

/// Shared state. Standings handlers take the read lock; anything that
/// changes games or picks holds the write lock for the whole batch.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<RwLock<PoolData>>,
    pub season: Arc<SeasonConfig>,
    pub data_file: Option<PathBuf>,
    pub feed: Option<Arc<GameResultsApiClient>>,
}

impl AppState {
    pub fn new(pool: PoolData, season: SeasonConfig) -> Self {
        Self {
            pool: Arc::new(RwLock::new(pool)),
            season: Arc::new(season),
            data_file: None,
            feed: None,
        }
    }

    fn persist(&self, pool: &PoolData) -> Result<(), PoolError> {
        match &self.data_file {
            Some(path) => save_pool(pool, path),
            None => Ok(()),
        }
    }

    fn feed(&self) -> Result<&GameResultsApiClient, PoolError> {
        self.feed
            .as_deref()
            .ok_or_else(|| PoolError::Feed("COLLEGE_FOOTBALL_DATA_API_KEY is not set".to_string()))
    }
}

impl IntoResponse for PoolError {
    fn into_response(self) -> Response {
        let (status, summary) = match &self {
            PoolError::Validation { .. } => (StatusCode::BAD_REQUEST, "Invalid picks"),
            PoolError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found"),
            PoolError::MissingData(_) => (StatusCode::CONFLICT, "Standings unavailable"),
            PoolError::Feed(_) => (StatusCode::BAD_GATEWAY, "Game feed failed"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        if status.is_server_error() {
            error!("{}: {}", summary, self);
        }
        (status, Json(json!({ "error": summary, "details": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(leaderboard))
        .route("/api/standings", get(standings))
        .route("/api/standings/hypothetical", post(hypothetical_standings))
        .route("/api/standings/all", get(standings_all))
        .route("/api/games", get(games).post(ingest_from_feed).put(update_from_feed))
        .route("/api/games/:game_id", put(update_game))
        .route("/api/picks", get(picks))
        .route("/api/picks/import", post(import_picks))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandingsQuery {
    num_games: Option<usize>,
    #[serde(default)]
    sort_by: SortBy,
}

#[derive(Debug, Serialize)]
struct StandingsResponse {
    standings: Vec<Standing>,
}

async fn leaderboard(State(state): State<AppState>) -> LeaderboardTemplate {
    let pool = state.pool.read().await;
    LeaderboardTemplate {
        season: state.season.season,
        standings: compute_standings(&pool, &state.season, None, SortBy::Points),
    }
}

async fn standings(State(state): State<AppState>, Query(query): Query<StandingsQuery>) -> Json<StandingsResponse> {
    let pool = state.pool.read().await;
    Json(StandingsResponse {
        standings: compute_standings(&pool, &state.season, query.num_games, query.sort_by),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HypotheticalRequest {
    #[serde(default)]
    predictions: HashMap<GameId, TeamId>,
    total_score_prediction: Option<i32>,
    #[serde(default)]
    sort_by: SortBy,
}

async fn hypothetical_standings(
    State(state): State<AppState>,
    Json(request): Json<HypotheticalRequest>,
) -> Result<Json<StandingsResponse>, PoolError> {
    let pool = state.pool.read().await;
    let standings = compute_hypothetical_standings(
        &pool,
        &state.season,
        &request.predictions,
        request.total_score_prediction,
        request.sort_by,
    )?;
    Ok(Json(StandingsResponse { standings }))
}

async fn standings_all(State(state): State<AppState>) -> Json<Vec<TrendColumn>> {
    let pool = state.pool.read().await;
    Json(standings_over_time(&pool, state.season.season))
}

#[derive(Debug, Serialize)]
struct GamesResponse {
    games: Vec<Game>,
}

async fn games(State(state): State<AppState>) -> Json<GamesResponse> {
    let pool = state.pool.read().await;
    let mut games: Vec<Game> = pool.season_games(state.season.season).cloned().collect();
    games.sort_by_key(|g| g.game_date);
    Json(GamesResponse { games })
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

async fn ingest_from_feed(State(state): State<AppState>) -> Result<Json<MessageResponse>, PoolError> {
    let feed = state.feed()?;
    let teams = feed.fetch_teams(state.season.season).await?;
    let games = feed.fetch_postseason_games(state.season.season).await?;

    let mut pool = state.pool.write().await;
    let inserted_teams = ingest_teams(&mut pool, &state.season, &teams);
    let message = ingest_games(&mut pool, &state.season, &games)?;
    state.persist(&pool)?;
    Ok(Json(MessageResponse {
        message: format!("{} teams inserted. {}", inserted_teams, message),
    }))
}

async fn update_from_feed(State(state): State<AppState>) -> Result<Json<MessageResponse>, PoolError> {
    let games = state.feed()?.fetch_postseason_games(state.season.season).await?;

    let mut pool = state.pool.write().await;
    let message = update_games(&mut pool, &state.season, &games)?;
    state.persist(&pool)?;
    Ok(Json(MessageResponse { message }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultRequest {
    home_score: Option<i32>,
    away_score: Option<i32>,
    is_complete: bool,
}

async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(request): Json<ResultRequest>,
) -> Result<Json<Game>, PoolError> {
    let mut pool = state.pool.write().await;
    record_result(
        &mut pool,
        state.season.season,
        game_id,
        request.home_score,
        request.away_score,
        request.is_complete,
    )?;
    state.persist(&pool)?;
    Ok(Json(pool.game(game_id)?.clone()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PicksQuery {
    user_id: Option<UserId>,
    game_id: Option<GameId>,
}

#[derive(Debug, Serialize)]
struct PicksResponse {
    picks: Vec<Pick>,
}

async fn picks(State(state): State<AppState>, Query(query): Query<PicksQuery>) -> Json<PicksResponse> {
    let pool = state.pool.read().await;
    let picks = pool
        .season_picks(state.season.season)
        .filter(|p| query.user_id.map_or(true, |u| p.user_id == u))
        .filter(|p| query.game_id.map_or(true, |g| p.game_id == g))
        .cloned()
        .collect();
    Json(PicksResponse { picks })
}

async fn import_picks(State(state): State<AppState>, body: String) -> Result<Json<ImportReport>, PoolError> {
    let mut pool = state.pool.write().await;
    let report = import_picks_csv(&mut pool, &state.season, &body)?;
    state.persist(&pool)?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;
    use crate::scoring::bracket::tests::playoff_pool;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_state() -> (AppState, GameId) {
        let (mut pool, _) = playoff_pool();
        let (duke, ole_miss) = (Team::new("Duke"), Team::new("Ole Miss"));
        let bowl = Game::new(2024, Some("Gator Bowl"), Utc::now()).with_teams(duke.id, ole_miss.id);
        let bowl_id = bowl.id;
        pool.games.push(bowl);
        pool.teams.extend([duke, ole_miss]);
        (AppState::new(pool, SeasonConfig::builtin(2024).unwrap()), bowl_id)
    }

    async fn send(state: &AppState, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn sheet() -> String {
        let cfp: Vec<String> = (1..=11).map(|n| format!("CFP Game {}", n)).collect();
        let bracket = "Notre Dame,Penn State,Texas,Ohio State,Penn State,Texas,Oregon,Georgia,Georgia,Oregon,Oregon";
        format!(
            "Name,Duke vs Ole Miss,{},Score\nAlice,Duke,{},50\nBob,Ole Miss,{},45\n",
            cfp.join(","),
            bracket,
            bracket
        )
    }

    #[tokio::test]
    async fn test_import_result_and_standings() {
        let (state, bowl_id) = test_state();

        let (status, report) = send(&state, Method::POST, "/api/picks/import", Body::from(sheet())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["usersImported"], 2);

        let (status, game) = send(
            &state,
            Method::PUT,
            &format!("/api/games/{}", bowl_id),
            Body::from(r#"{"homeScore": 17, "awayScore": 42, "isComplete": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(game["isComplete"], true);

        let (status, body) = send(&state, Method::GET, "/api/standings", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        let standings = body["standings"].as_array().unwrap();
        assert_eq!(standings[0]["name"], "Bob");
        assert_eq!(standings[0]["points"], 1);
        assert_eq!(standings[0]["rank"], 1);
        assert_eq!(standings[1]["rank"], 2);
        assert!(standings[0]["maxPoints"].is_number());

        let (_, body) = send(&state, Method::GET, "/api/standings?numGames=1", Body::empty()).await;
        assert!(body["standings"][0]["maxPoints"].is_null());

        let (status, body) = send(&state, Method::GET, "/api/standings/all", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hypothetical_does_not_change_stored_standings() {
        let (state, bowl_id) = test_state();
        send(&state, Method::POST, "/api/picks/import", Body::from(sheet())).await;
        let duke = state.pool.read().await.team_by_name("Duke").unwrap().id;

        let request = format!(r#"{{"predictions": {{"{}": "{}"}}}}"#, bowl_id, duke);
        let (status, body) = send(
            &state,
            Method::POST,
            "/api/standings/hypothetical",
            Body::from(request),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["standings"][0]["name"], "Alice");
        assert_eq!(body["standings"][0]["points"], 1);

        let (_, body) = send(&state, Method::GET, "/api/standings", Body::empty()).await;
        assert!(body["standings"].as_array().unwrap().iter().all(|s| s["points"] == 0));
    }

    #[tokio::test]
    async fn test_errors_map_to_status_codes() {
        let (state, _) = test_state();

        let (status, body) = send(
            &state,
            Method::PUT,
            &format!("/api/games/{}", uuid::Uuid::new_v4()),
            Body::from(r#"{"homeScore": 1, "awayScore": 0, "isComplete": true}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not found");

        let (status, _) = send(&state, Method::POST, "/api/picks/import", Body::from("Player,Score\n")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, Method::PUT, "/api/games", Body::empty()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_leaderboard_page_renders() {
        let (state, _) = test_state();
        send(&state, Method::POST, "/api/picks/import", Body::from(sheet())).await;

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Alice"));
        assert!(html.contains("0 points"));
    }
}
