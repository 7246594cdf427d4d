use crate::error::{PoolError, Result};
use crate::models::{Game, GameId, Pick, ScorePrediction, Team, TeamId, User, UserId};
use crate::scoring::points::is_playoff_game;
use serde::{Deserialize, Serialize};

/// In-process image of the pool's relational store.
///
/// Every query is scoped by season. Writers are expected to hold exclusive
/// access for a whole batch (see `web::AppState`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolData {
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub games: Vec<Game>,
    pub picks: Vec<Pick>,
    pub score_predictions: Vec<ScorePrediction>,
}

impl PoolData {
    pub fn game(&self, id: GameId) -> Result<&Game> {
        self.games
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| PoolError::not_found("game", id))
    }

    pub fn game_mut(&mut self, id: GameId) -> Result<&mut Game> {
        self.games
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| PoolError::not_found("game", id))
    }

    pub fn season_games(&self, season: i32) -> impl Iterator<Item = &Game> {
        self.games.iter().filter(move |g| g.season == season)
    }

    /// Playoff games of the season ordered by kickoff, which is the order
    /// bracket slots are numbered in
    pub fn playoff_games_by_date(&self, season: i32) -> Vec<&Game> {
        let mut games: Vec<&Game> = self
            .season_games(season)
            .filter(|g| is_playoff_game(g.name.as_deref()))
            .collect();
        games.sort_by_key(|g| g.game_date);
        games
    }

    /// Season game played between two teams, in either home/away order
    pub fn game_between(&self, season: i32, a: TeamId, b: TeamId) -> Option<&Game> {
        self.season_games(season)
            .find(|g| g.has_team(a) && g.has_team(b) && a != b)
    }

    pub fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| PoolError::not_found("team", id))
    }

    /// Case-insensitive lookup by display name
    pub fn team_by_name(&self, name: &str) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| PoolError::not_found("team", name))
    }

    pub fn user(&self, id: UserId) -> Result<&User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| PoolError::not_found("user", id))
    }

    pub fn get_or_create_user(&mut self, name: &str) -> UserId {
        if let Some(user) = self.users.iter().find(|u| u.name == name) {
            return user.id;
        }
        let user = User::new(name);
        let id = user.id;
        self.users.push(user);
        id
    }

    pub fn season_picks(&self, season: i32) -> impl Iterator<Item = &Pick> {
        self.picks.iter().filter(move |p| p.season == season)
    }

    pub fn user_picks(&self, season: i32, user_id: UserId) -> impl Iterator<Item = &Pick> {
        self.season_picks(season).filter(move |p| p.user_id == user_id)
    }

    /// Insert a pick, replacing any existing one for the same
    /// (user, game, season)
    pub fn upsert_pick(&mut self, pick: Pick) {
        match self.picks.iter_mut().find(|p| {
            p.user_id == pick.user_id && p.game_id == pick.game_id && p.season == pick.season
        }) {
            Some(existing) => *existing = pick,
            None => self.picks.push(pick),
        }
    }

    pub fn score_prediction(&self, season: i32, user_id: UserId) -> Option<&ScorePrediction> {
        self.score_predictions
            .iter()
            .find(|s| s.season == season && s.user_id == user_id)
    }

    pub fn season_score_predictions(&self, season: i32) -> impl Iterator<Item = &ScorePrediction> {
        self.score_predictions.iter().filter(move |s| s.season == season)
    }

    pub fn upsert_score_prediction(&mut self, prediction: ScorePrediction) {
        match self
            .score_predictions
            .iter_mut()
            .find(|s| s.season == prediction.season && s.user_id == prediction.user_id)
        {
            Some(existing) => existing.score = prediction.score,
            None => self.score_predictions.push(prediction),
        }
    }
}
