//! Bracket-aware scoring and standings.
//!
//! Leaves first: `points` values a game, `bracket` validates pick sheets,
//! `picks` scores stored picks, `elimination` and `max_points` project the
//! best case, `tiebreaker` settles the championship score guess and
//! `standings` composes all of it into a leaderboard.

pub mod bracket;
pub mod elimination;
pub mod max_points;
pub mod picks;
pub mod points;
pub mod standings;
pub mod tiebreaker;
pub mod trends;

pub use bracket::{resolve_bracket_picks, BracketContext, ValidatedPick};
pub use picks::{rescore_picks, rescore_season};
pub use points::point_value;
pub use standings::{compute_hypothetical_standings, compute_standings, tiebreaker_standings, SortBy};
pub use tiebreaker::{resolve_tiebreaker, TiebreakerResult};

use crate::config::SeasonConfig;
use crate::error::Result;
use crate::models::{TeamId, UserId};
use crate::store::PoolData;
use std::collections::HashMap;

/// Validate one stored user's bracket for the season
pub fn resolve_user_bracket(
    pool: &PoolData,
    config: &SeasonConfig,
    user_id: UserId,
    raw_picks: &HashMap<u32, TeamId>,
) -> Result<Vec<ValidatedPick>> {
    let user = pool.user(user_id)?;
    let ctx = BracketContext::new(pool, config)?;
    resolve_bracket_picks(&ctx, &user.name, raw_picks)
}
