use crate::models::{Game, UserId};
use crate::scoring::standings::tiebreaker_standings;
use crate::store::PoolData;
use serde::Serialize;
use std::collections::BTreeMap;

pub const TIEBREAKER_COLUMN: &str = "Tie Breaker";

/// Cumulative points of every user after one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendColumn {
    pub game: String,
    #[serde(flatten)]
    pub points: BTreeMap<UserId, i32>,
}

/// Running totals after each completed game in kickoff order, with a final
/// tiebreaker column once the championship has been scored
pub fn standings_over_time(pool: &PoolData, season: i32) -> Vec<TrendColumn> {
    let mut games: Vec<&Game> = pool.season_games(season).filter(|g| g.is_complete).collect();
    games.sort_by_key(|g| g.game_date);

    let mut running: BTreeMap<UserId, i32> = pool.season_picks(season).map(|p| (p.user_id, 0)).collect();
    let mut columns = Vec::with_capacity(games.len() + 1);

    for game in games {
        for pick in pool.season_picks(season).filter(|p| p.game_id == game.id) {
            *running.entry(pick.user_id).or_insert(0) += pick.points_earned.unwrap_or(0);
        }
        columns.push(TrendColumn {
            game: matchup_label(pool, game),
            points: running.clone(),
        });
    }

    if let Ok(tiebreakers) = tiebreaker_standings(pool, season) {
        if !tiebreakers.is_empty() {
            let points = running
                .iter()
                .map(|(user, total)| (*user, total + tiebreakers.get(user).map_or(0, |t| t.points)))
                .collect();
            columns.push(TrendColumn {
                game: TIEBREAKER_COLUMN.to_string(),
                points,
            });
        }
    }

    columns
}

/// "HOME vs AWAY" by abbreviation, falling back to names, then the round
fn matchup_label(pool: &PoolData, game: &Game) -> String {
    let label = |id| {
        pool.team(id).ok().map(|t| {
            if t.abbreviation.is_empty() {
                t.name.clone()
            } else {
                t.abbreviation.clone()
            }
        })
    };
    match (game.home_team_id.and_then(label), game.away_team_id.and_then(label)) {
        (Some(home), Some(away)) => format!("{} vs {}", home, away),
        _ => game.name.clone().unwrap_or_else(|| game.id.to_string()),
    }
}
