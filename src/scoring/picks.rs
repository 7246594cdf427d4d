use crate::error::Result;
use crate::models::{Game, GameId, Pick};
use crate::scoring::points::point_value;
use crate::store::PoolData;
use std::collections::HashMap;
use tracing::{debug, info};

/// Points a pick has earned against the current state of its game.
/// `None` means the game is not finished yet.
pub fn score_pick(pick: &Pick, game: &Game) -> Option<i32> {
    if !game.is_complete {
        return None;
    }
    if game.winning_team_id == Some(pick.winning_team_id) {
        Some(point_value(game.name.as_deref()))
    } else {
        Some(0)
    }
}

/// Recompute `points_earned` for every pick on one game after its result
/// changed. Safe to run repeatedly; returns how many picks were touched.
pub fn rescore_picks(pool: &mut PoolData, season: i32, game_id: GameId) -> Result<usize> {
    let game = pool.game(game_id)?.clone();

    let mut updated = 0;
    for pick in pool
        .picks
        .iter_mut()
        .filter(|p| p.season == season && p.game_id == game_id)
    {
        pick.points_earned = score_pick(pick, &game);
        updated += 1;
    }

    debug!(
        "Rescored {} picks for game {} ({})",
        updated,
        game_id,
        game.name.as_deref().unwrap_or("unnamed")
    );
    Ok(updated)
}

/// Rescore every pick in a season
pub fn rescore_season(pool: &mut PoolData, season: i32) -> usize {
    let games: HashMap<GameId, Game> = pool
        .season_games(season)
        .map(|g| (g.id, g.clone()))
        .collect();

    let mut updated = 0;
    for pick in pool.picks.iter_mut().filter(|p| p.season == season) {
        if let Some(game) = games.get(&pick.game_id) {
            pick.points_earned = score_pick(pick, game);
            updated += 1;
        }
    }

    info!("Rescored {} picks for season {}", updated, season);
    updated
}

/// Sum of resolved points over a set of picks (tiebreaker excluded)
pub fn realized_points<'a>(picks: impl IntoIterator<Item = &'a Pick>) -> i32 {
    picks.into_iter().filter_map(|p| p.points_earned).sum()
}
