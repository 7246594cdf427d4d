use crate::models::{Game, Pick, TeamId};
use crate::scoring::points::{point_value, MAX_TIEBREAKER_POINTS};
use std::collections::HashSet;

/// Best total a user can still reach.
///
/// Every pick on an unfinished game pays out unless its team has already
/// been knocked out. While the tiebreaker is open the full bonus is added
/// too, since anyone could still land it.
pub fn max_points<'a>(
    current_points: i32,
    picks: impl IntoIterator<Item = (&'a Pick, &'a Game)>,
    eliminated: &HashSet<TeamId>,
    tiebreaker_open: bool,
) -> i32 {
    let remaining: i32 = picks
        .into_iter()
        .filter(|(_, game)| !game.is_complete)
        .filter(|(pick, _)| !eliminated.contains(&pick.winning_team_id))
        .map(|(_, game)| point_value(game.name.as_deref()))
        .sum();

    let bonus = if tiebreaker_open { MAX_TIEBREAKER_POINTS } else { 0 };
    current_points + remaining + bonus
}
