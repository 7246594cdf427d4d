use crate::config::SeasonConfig;
use crate::error::{PoolError, Result};
use crate::models::{Game, GameId, Pick, Standing, TeamId, UserId};
use crate::scoring::elimination::{completed_playoff_games, eliminated_teams};
use crate::scoring::max_points::max_points;
use crate::scoring::picks::score_pick;
use crate::scoring::tiebreaker::{championship_total, completed_championship, resolve_tiebreaker, TiebreakerResult};
use crate::store::PoolData;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Points,
    /// Order and rank by max points. First/last badges still follow points.
    Max,
}

/// Per-user totals before ordering
struct Tally {
    user_id: UserId,
    name: String,
    points: i32,
    correct_picks: u32,
    total_picks: u32,
    tiebreaker: Option<TiebreakerResult>,
    max_points: Option<i32>,
}

/// Realized leaderboard. With `num_games`, only the first N completed games
/// by date count and max points are left out.
pub fn compute_standings(
    pool: &PoolData,
    config: &SeasonConfig,
    num_games: Option<usize>,
    sort_by: SortBy,
) -> Vec<Standing> {
    let season = config.season;
    let games: HashMap<GameId, &Game> = pool.season_games(season).map(|g| (g.id, g)).collect();
    let cutoff = num_games.and_then(|n| game_cutoff(pool, season, n));
    let in_scope = |game: &Game| game.is_complete && cutoff.map_or(true, |c| game.game_date <= c);

    let tiebreakers = completed_championship(games.values().copied())
        .filter(|g| in_scope(*g))
        .and_then(Game::total_score)
        .map(|total| resolve_tiebreaker(pool.season_score_predictions(season), total))
        .unwrap_or_default();

    let projection = num_games.is_none().then(|| {
        let eliminated = eliminated_teams(games.values().copied());
        let open = tiebreaker_open(games.values().copied(), config);
        (eliminated, open)
    });

    let tallies = season_users(pool, season)
        .into_iter()
        .map(|(user_id, name)| {
            let picks: Vec<(&Pick, &Game)> = paired_picks(pool, season, user_id, &games);
            let scored: Vec<&Pick> = picks
                .iter()
                .filter(|(_, g)| in_scope(*g))
                .map(|(p, _)| *p)
                .collect();

            let tiebreaker = tiebreakers.get(&user_id).copied();
            let points = scored.iter().filter_map(|p| p.points_earned).sum::<i32>()
                + tiebreaker.map_or(0, |t| t.points);
            let ceiling = projection
                .as_ref()
                .map(|(eliminated, open)| max_points(points, picks.iter().copied(), eliminated, *open));

            Tally {
                user_id,
                name,
                points,
                correct_picks: scored.iter().filter(|p| p.points_earned.unwrap_or(0) > 0).count() as u32,
                total_picks: scored.len() as u32,
                tiebreaker,
                max_points: ceiling,
            }
        })
        .collect();

    finalize(tallies, sort_by)
}

/// Standings if each predicted team won its unfinished game, and the
/// championship total came in at `total_score_prediction`.
///
/// Works on copies of the season's games; nothing stored is touched.
pub fn compute_hypothetical_standings(
    pool: &PoolData,
    config: &SeasonConfig,
    predictions: &HashMap<GameId, TeamId>,
    total_score_prediction: Option<i32>,
    sort_by: SortBy,
) -> Result<Vec<Standing>> {
    let season = config.season;

    let mut projected: HashMap<GameId, Game> = pool.season_games(season).map(|g| (g.id, g.clone())).collect();
    let mut overlaid: HashSet<GameId> = HashSet::new();
    for (&game_id, &team_id) in predictions {
        let game = projected
            .get_mut(&game_id)
            .ok_or_else(|| PoolError::not_found("game", game_id))?;
        if game.is_complete {
            debug!("Ignoring prediction for completed game {}", game_id);
            continue;
        }
        game.winning_team_id = Some(team_id);
        game.is_complete = true;
        overlaid.insert(game_id);
    }
    let games: HashMap<GameId, &Game> = projected.iter().map(|(id, g)| (*id, g)).collect();

    let total = match championship_total(pool.season_games(season)) {
        Ok(actual) => Some(actual),
        Err(PoolError::MissingData(_)) => total_score_prediction,
        Err(e) => return Err(e),
    };
    let tiebreakers = total
        .map(|t| resolve_tiebreaker(pool.season_score_predictions(season), t))
        .unwrap_or_default();

    let eliminated = eliminated_teams(games.values().copied());
    let open = total.is_none() && tiebreaker_open(games.values().copied(), config);

    let tallies = season_users(pool, season)
        .into_iter()
        .map(|(user_id, name)| {
            let picks = paired_picks(pool, season, user_id, &games);
            let earned: Vec<i32> = picks
                .iter()
                .filter(|(_, g)| g.is_complete)
                .map(|(p, g)| {
                    if overlaid.contains(&g.id) {
                        score_pick(p, g).unwrap_or(0)
                    } else {
                        p.points_earned.unwrap_or(0)
                    }
                })
                .collect();

            let tiebreaker = tiebreakers.get(&user_id).copied();
            let points = earned.iter().sum::<i32>() + tiebreaker.map_or(0, |t| t.points);

            Tally {
                user_id,
                name,
                points,
                correct_picks: earned.iter().filter(|e| **e > 0).count() as u32,
                total_picks: earned.len() as u32,
                tiebreaker,
                max_points: Some(max_points(points, picks.iter().copied(), &eliminated, open)),
            }
        })
        .collect();

    Ok(finalize(tallies, sort_by))
}

/// Tiebreaker awards for the season, once the championship has a score
pub fn tiebreaker_standings(pool: &PoolData, season: i32) -> Result<HashMap<UserId, TiebreakerResult>> {
    let total = championship_total(pool.season_games(season))?;
    Ok(resolve_tiebreaker(pool.season_score_predictions(season), total))
}

/// Inclusive date boundary for the first `num_games` completed games. One
/// second is added so games kicking off at the same instant stay in.
fn game_cutoff(pool: &PoolData, season: i32, num_games: usize) -> Option<DateTime<Utc>> {
    let mut dates: Vec<DateTime<Utc>> = pool
        .season_games(season)
        .filter(|g| g.is_complete)
        .map(|g| g.game_date)
        .collect();
    dates.sort();
    dates.truncate(num_games);
    dates.last().map(|d| *d + Duration::seconds(1))
}

/// The tiebreaker stays open until every bracket game has been decided
fn tiebreaker_open<'a>(games: impl IntoIterator<Item = &'a Game>, config: &SeasonConfig) -> bool {
    completed_playoff_games(games) < config.bracket.len()
}

/// Users with at least one pick this season, in store order
fn season_users(pool: &PoolData, season: i32) -> Vec<(UserId, String)> {
    let with_picks: HashSet<UserId> = pool.season_picks(season).map(|p| p.user_id).collect();
    pool.users
        .iter()
        .filter(|u| with_picks.contains(&u.id))
        .map(|u| (u.id, u.name.clone()))
        .collect()
}

fn paired_picks<'a>(
    pool: &'a PoolData,
    season: i32,
    user_id: UserId,
    games: &HashMap<GameId, &'a Game>,
) -> Vec<(&'a Pick, &'a Game)> {
    pool.user_picks(season, user_id)
        .filter_map(|p| games.get(&p.game_id).map(|g| (p, *g)))
        .collect()
}

/// Points descending, then closer tiebreaker guess. Users without a guess
/// sort after those with one at equal points.
fn by_points(a: &Standing, b: &Standing) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| match (a.prediction_difference, b.prediction_difference) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

/// Whether `other` outranks `standing` for display purposes. A missing
/// tiebreaker difference on either side leaves equal points tied. Max mode
/// falls back to the points ordering at equal max.
fn outranks(other: &Standing, standing: &Standing, sort_by: SortBy) -> bool {
    match sort_by {
        SortBy::Points => {
            other.points > standing.points
                || (other.points == standing.points
                    && matches!(
                        (other.prediction_difference, standing.prediction_difference),
                        (Some(x), Some(y)) if x < y
                    ))
        }
        SortBy::Max => {
            let (theirs, ours) = (ceiling(other), ceiling(standing));
            theirs > ours || (theirs == ours && outranks(other, standing, SortBy::Points))
        }
    }
}

fn ceiling(standing: &Standing) -> i32 {
    standing.max_points.unwrap_or(standing.points)
}

fn finalize(tallies: Vec<Tally>, sort_by: SortBy) -> Vec<Standing> {
    let mut standings: Vec<Standing> = tallies
        .into_iter()
        .map(|t| Standing {
            user_id: t.user_id,
            name: t.name,
            points: t.points,
            correct_picks: t.correct_picks,
            total_picks: t.total_picks,
            prediction_points: t.tiebreaker.map(|r| r.points),
            prediction_difference: t.tiebreaker.map(|r| r.difference),
            max_points: t.max_points,
            rank: 0,
            is_first_place: false,
            is_last_place: false,
        })
        .collect();

    match sort_by {
        SortBy::Points => standings.sort_by(|a, b| by_points(a, b).then_with(|| a.name.cmp(&b.name))),
        SortBy::Max => standings.sort_by(|a, b| {
            ceiling(b)
                .cmp(&ceiling(a))
                .then_with(|| by_points(a, b))
                .then_with(|| a.name.cmp(&b.name))
        }),
    }

    let highest = standings.iter().map(|s| s.points).max();
    let lowest = standings.iter().map(|s| s.points).min();
    let ranks: Vec<u32> = standings
        .iter()
        .map(|s| 1 + standings.iter().filter(|o| outranks(o, s, sort_by)).count() as u32)
        .collect();

    for (standing, rank) in standings.iter_mut().zip(ranks) {
        standing.rank = rank;
        standing.is_first_place = Some(standing.points) == highest;
        standing.is_last_place = Some(standing.points) == lowest;
    }
    standings
}
