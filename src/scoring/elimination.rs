use crate::models::{Game, TeamId};
use crate::scoring::points::is_playoff_game;
use std::collections::HashSet;

/// Teams that lost a completed playoff game. Bowl games never eliminate
/// anyone, whatever their result.
pub fn eliminated_teams<'a>(games: impl IntoIterator<Item = &'a Game>) -> HashSet<TeamId> {
    games
        .into_iter()
        .filter(|g| g.is_complete && is_playoff_game(g.name.as_deref()))
        .filter_map(Game::losing_team_id)
        .collect()
}

/// Number of completed playoff games, i.e. eliminations decided so far
pub fn completed_playoff_games<'a>(games: impl IntoIterator<Item = &'a Game>) -> usize {
    games
        .into_iter()
        .filter(|g| g.is_complete && is_playoff_game(g.name.as_deref()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_only_completed_playoff_losers() {
        let (a, b, c, d, e, f) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let mut playoff = Game::new(2024, Some("College Football Playoff First Round Game"), Utc::now())
            .with_teams(a, b);
        playoff.set_result(Some(27), Some(17), true);

        let mut bowl = Game::new(2024, Some("Holiday Bowl"), Utc::now()).with_teams(c, d);
        bowl.set_result(Some(10), Some(35), true);

        let mut in_progress = Game::new(2024, Some("College Football Playoff Quarterfinal at the Rose Bowl"), Utc::now())
            .with_teams(e, f);
        in_progress.set_result(Some(14), Some(0), false);

        let games = [playoff, bowl, in_progress];
        let eliminated = eliminated_teams(&games);
        assert_eq!(eliminated, HashSet::from([b]));
        assert_eq!(completed_playoff_games(&games), 1);
    }
}
