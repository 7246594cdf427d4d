use crate::api::game_results_api::{FeedGame, FeedTeam};
use crate::config::SeasonConfig;
use crate::error::Result;
use crate::models::{Game, GameId, Team, TeamId};
use crate::scoring::picks::rescore_picks;
use crate::store::PoolData;
use tracing::{info, warn};

/// Add season teams that are not stored yet
pub fn ingest_teams(pool: &mut PoolData, config: &SeasonConfig, feed: &[FeedTeam]) -> usize {
    let mut inserted = 0;
    for feed_team in feed.iter().filter(|t| config.is_season_team(&t.school)) {
        if pool.team_by_name(&feed_team.school).is_ok() {
            continue;
        }
        pool.teams.push(Team {
            abbreviation: feed_team.abbreviation.clone().unwrap_or_default(),
            mascot: feed_team.mascot.clone().unwrap_or_default(),
            conference: feed_team.conference.clone().unwrap_or_default(),
            primary_color: feed_team.color.clone().unwrap_or_default(),
            secondary_color: feed_team.alternate_color.clone().unwrap_or_default(),
            logo_url: feed_team.logos.first().cloned().unwrap_or_default(),
            ..Team::new(feed_team.school.as_str())
        });
        inserted += 1;
    }
    info!("Inserted {} teams for season {}", inserted, config.season);
    inserted
}

/// Add feed games between two season teams that are not stored yet
pub fn ingest_games(pool: &mut PoolData, config: &SeasonConfig, feed: &[FeedGame]) -> Result<String> {
    let mut inserted = 0;
    let mut skipped = 0;

    for feed_game in relevant(config, feed) {
        let (home, away) = team_ids(pool, feed_game)?;
        if find_game(pool, config.season, home, away, feed_game).is_some() {
            skipped += 1;
            continue;
        }
        let mut game = Game::new(config.season, feed_game.notes.as_deref(), feed_game.start_date).with_teams(home, away);
        game.set_result(feed_game.home_points, feed_game.away_points, feed_game.completed);
        pool.games.push(game);
        inserted += 1;
    }

    let message = format!(
        "Operation complete: {} games inserted, {} games skipped (already existed)",
        inserted, skipped
    );
    info!("{}", message);
    Ok(message)
}

/// Apply feed scores to stored games and rescore the picks on each one
pub fn update_games(pool: &mut PoolData, config: &SeasonConfig, feed: &[FeedGame]) -> Result<String> {
    let mut updated = 0;
    let mut not_found = 0;

    for feed_game in relevant(config, feed) {
        let (home, away) = team_ids(pool, feed_game)?;
        let Some(game_id) = find_game(pool, config.season, home, away, feed_game) else {
            warn!(
                "No stored game for {} vs {} on {}",
                feed_game.home_team, feed_game.away_team, feed_game.start_date
            );
            not_found += 1;
            continue;
        };

        let game = pool.game_mut(game_id)?;
        if feed_game.notes.is_some() {
            game.name = feed_game.notes.clone();
        }
        game.home_team_id = Some(home);
        game.away_team_id = Some(away);
        game.game_date = feed_game.start_date;
        game.set_result(feed_game.home_points, feed_game.away_points, feed_game.completed);
        rescore_picks(pool, config.season, game_id)?;
        updated += 1;
    }

    let message = format!(
        "Operation complete: {} games updated, {} were unable to be updated (not found)",
        updated, not_found
    );
    info!("{}", message);
    Ok(message)
}

/// Record a result by hand (e.g. a correction) and rescore the game's picks
pub fn record_result(
    pool: &mut PoolData,
    season: i32,
    game_id: GameId,
    home_score: Option<i32>,
    away_score: Option<i32>,
    is_complete: bool,
) -> Result<usize> {
    pool.game_mut(game_id)?.set_result(home_score, away_score, is_complete);
    rescore_picks(pool, season, game_id)
}

fn relevant<'a>(config: &'a SeasonConfig, feed: &'a [FeedGame]) -> impl Iterator<Item = &'a FeedGame> {
    feed.iter()
        .filter(move |g| config.is_season_team(&g.home_team) && config.is_season_team(&g.away_team))
}

fn team_ids(pool: &PoolData, feed_game: &FeedGame) -> Result<(TeamId, TeamId)> {
    Ok((
        pool.team_by_name(&feed_game.home_team)?.id,
        pool.team_by_name(&feed_game.away_team)?.id,
    ))
}

/// Stored game for a feed game: same teams and kickoff, or failing that the
/// same round name and kickoff (playoff slots whose teams were not yet known)
fn find_game(
    pool: &PoolData,
    season: i32,
    home: TeamId,
    away: TeamId,
    feed_game: &FeedGame,
) -> Option<GameId> {
    let same_kickoff = |g: &&Game| g.game_date == feed_game.start_date;
    pool.season_games(season)
        .filter(same_kickoff)
        .find(|g| g.home_team_id == Some(home) && g.away_team_id == Some(away))
        .or_else(|| {
            let name = feed_game.notes.as_deref()?;
            pool.season_games(season)
                .filter(same_kickoff)
                .find(|g| g.name.as_deref() == Some(name))
        })
        .map(|g| g.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pick;
    use chrono::{TimeZone, Utc};

    fn feed_game(home: &str, away: &str, points: Option<(i32, i32)>, notes: &str) -> FeedGame {
        FeedGame {
            id: 1,
            season: 2024,
            start_date: Utc.with_ymd_and_hms(2025, 1, 1, 22, 0, 0).unwrap(),
            completed: points.is_some(),
            home_team: home.to_string(),
            home_points: points.map(|p| p.0),
            away_team: away.to_string(),
            away_points: points.map(|p| p.1),
            notes: Some(notes.to_string()),
        }
    }

    fn feed_team(school: &str) -> FeedTeam {
        FeedTeam {
            school: school.to_string(),
            mascot: Some("Mascot".to_string()),
            abbreviation: Some(school[..3].to_uppercase()),
            conference: None,
            color: Some("#000000".to_string()),
            alternate_color: None,
            logos: vec!["https://example.com/logo.png".to_string()],
        }
    }

    #[test]
    fn test_ingest_then_update_rescoring() {
        let mut pool = PoolData::default();
        let config = SeasonConfig::builtin(2024).unwrap();

        let teams = [feed_team("Oregon"), feed_team("Ohio State"), feed_team("Harvard")];
        assert_eq!(ingest_teams(&mut pool, &config, &teams), 2);
        assert_eq!(ingest_teams(&mut pool, &config, &teams), 0);
        assert_eq!(pool.team_by_name("Oregon").unwrap().abbreviation, "ORE");

        let name = "College Football Playoff Quarterfinal at the Rose Bowl";
        let scheduled = [feed_game("Oregon", "Ohio State", None, name)];
        let message = ingest_games(&mut pool, &config, &scheduled).unwrap();
        assert!(message.contains("1 games inserted"));
        let message = ingest_games(&mut pool, &config, &scheduled).unwrap();
        assert!(message.contains("1 games skipped"));

        let game_id = pool.games[0].id;
        let ohio_state = pool.team_by_name("Ohio State").unwrap().id;
        let oregon = pool.team_by_name("Oregon").unwrap().id;
        let alice = pool.get_or_create_user("Alice");
        pool.upsert_pick(Pick::new(alice, game_id, ohio_state, Some(oregon), 2024));

        let final_score = [feed_game("Oregon", "Ohio State", Some((21, 41)), name)];
        let message = update_games(&mut pool, &config, &final_score).unwrap();
        assert!(message.contains("1 games updated"));
        assert_eq!(pool.games[0].winning_team_id, Some(ohio_state));
        assert_eq!(pool.picks[0].points_earned, Some(2));

        // Hand correction flips it back
        record_result(&mut pool, 2024, game_id, Some(41), Some(21), true).unwrap();
        assert_eq!(pool.picks[0].points_earned, Some(0));
    }

    #[test]
    fn test_update_moves_teams_onto_named_slot() {
        let mut pool = PoolData::default();
        let config = SeasonConfig::builtin(2024).unwrap();
        let teams = ["Texas", "Clemson", "Penn State", "Notre Dame"].map(feed_team);
        ingest_teams(&mut pool, &config, &teams);

        let name = "College Football Playoff Semifinal at the Orange Bowl";
        ingest_games(&mut pool, &config, &[feed_game("Texas", "Clemson", None, name)]).unwrap();
        let game_id = pool.games[0].id;
        let penn_state = pool.team_by_name("Penn State").unwrap().id;
        let notre_dame = pool.team_by_name("Notre Dame").unwrap().id;
        let alice = pool.get_or_create_user("Alice");
        pool.upsert_pick(Pick::new(alice, game_id, notre_dame, Some(penn_state), 2024));

        // Same round and kickoff, different teams: still the stored game
        let message = ingest_games(&mut pool, &config, &[feed_game("Penn State", "Notre Dame", None, name)]).unwrap();
        assert!(message.contains("0 games inserted, 1 games skipped"));

        let final_score = [feed_game("Penn State", "Notre Dame", Some((24, 27)), name)];
        let message = update_games(&mut pool, &config, &final_score).unwrap();
        assert!(message.contains("1 games updated"));
        assert_eq!(pool.games.len(), 1);
        assert_eq!(pool.games[0].home_team_id, Some(penn_state));
        assert_eq!(pool.games[0].away_team_id, Some(notre_dame));
        assert_eq!(pool.games[0].winning_team_id, Some(notre_dame));
        assert_eq!(pool.picks[0].points_earned, Some(3));
    }

    #[test]
    fn test_update_counts_unknown_games() {
        let mut pool = PoolData::default();
        let config = SeasonConfig::builtin(2024).unwrap();
        ingest_teams(&mut pool, &config, &[feed_team("Texas"), feed_team("Clemson")]);

        let message = update_games(
            &mut pool,
            &config,
            &[feed_game("Texas", "Clemson", Some((38, 24)), "College Football Playoff First Round Game")],
        )
        .unwrap();
        assert!(message.contains("0 games updated, 1 were unable"));
    }
}
