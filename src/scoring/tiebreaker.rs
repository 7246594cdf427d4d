use crate::error::{PoolError, Result};
use crate::models::{Game, ScorePrediction, UserId};
use crate::scoring::points::{is_championship_game, MAX_TIEBREAKER_POINTS};
use serde::Serialize;
use std::collections::HashMap;

/// Tiebreaker outcome for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TiebreakerResult {
    pub points: i32,
    pub difference: u32,
}

/// Award tiers by distance from the actual total. Everyone sharing the
/// closest distance gets the top award.
pub fn resolve_tiebreaker<'a>(
    predictions: impl IntoIterator<Item = &'a ScorePrediction>,
    actual_total: i32,
) -> HashMap<UserId, TiebreakerResult> {
    let differences: Vec<(UserId, u32)> = predictions
        .into_iter()
        .map(|p| (p.user_id, p.score.abs_diff(actual_total)))
        .collect();
    let Some(closest) = differences.iter().map(|(_, d)| *d).min() else {
        return HashMap::new();
    };

    differences
        .into_iter()
        .map(|(user_id, difference)| {
            let points = if difference == closest {
                MAX_TIEBREAKER_POINTS
            } else if difference <= 5 {
                3
            } else if difference <= 10 {
                2
            } else {
                0
            };
            (user_id, TiebreakerResult { points, difference })
        })
        .collect()
}

/// The season's championship game, if it has been played and scored
pub fn completed_championship<'a>(games: impl IntoIterator<Item = &'a Game>) -> Option<&'a Game> {
    games
        .into_iter()
        .find(|g| g.is_complete && is_championship_game(g.name.as_deref()) && g.total_score().is_some())
}

/// Actual combined championship score, or `MissingData` while it is unknown
pub fn championship_total<'a>(games: impl IntoIterator<Item = &'a Game>) -> Result<i32> {
    completed_championship(games)
        .and_then(Game::total_score)
        .ok_or_else(|| PoolError::MissingData("no completed championship game with scores".to_string()))
}
