use crate::config::SeasonConfig;
use crate::error::{PoolError, Result};
use crate::models::{GameId, Pick, ScorePrediction, TeamId};
use crate::scoring::bracket::{resolve_bracket_picks, BracketContext};
use crate::scoring::picks::score_pick;
use crate::store::PoolData;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

const NAME_COLUMN: &str = "Name";
const SCORE_COLUMN: &str = "Score";
const CFP_PREFIX: &str = "CFP Game ";
const MATCHUP_SEPARATOR: &str = " vs ";

/// Outcome of a bulk pick import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub users_imported: usize,
    pub picks_imported: usize,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub name: String,
    pub reason: String,
}

/// Column layout of the sheet, checked once before any row is read
struct Layout {
    width: usize,
    name: usize,
    score: usize,
    matchups: Vec<(usize, String, String)>,
    cfp_games: Vec<(usize, u32)>,
}

/// A row that passed validation, not yet written
struct RowPlan {
    name: String,
    picks: Vec<(GameId, TeamId, Option<TeamId>)>,
    score: i32,
}

/// Import a pick sheet: one row per user with a `Name`, one column per bowl
/// ("Team A vs Team B"), one per bracket slot ("CFP Game N") and a `Score`
/// tiebreaker guess.
///
/// Header problems fail the whole import. A bad row only rejects that user;
/// everyone else is still written. Re-importing a user replaces their sheet.
/// Picks on games that are already final are scored as they are written.
pub fn import_picks_csv(pool: &mut PoolData, config: &SeasonConfig, csv_text: &str) -> Result<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader.headers()?.clone();
    let layout = parse_layout(&headers, config)?;

    let mut plans = Vec::new();
    let mut report = ImportReport::default();
    {
        let ctx = BracketContext::new(pool, config)?;
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let name = record.get(layout.name).unwrap_or_default().to_string();
            match plan_row(pool, &ctx, &layout, config.season, &record, &name) {
                Ok(plan) => plans.push(plan),
                Err(e) => {
                    warn!("Rejected pick row {}: {}", index + 1, e);
                    report.rejected.push(RejectedRow {
                        name: if name.is_empty() { format!("row {}", index + 1) } else { name },
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    for plan in plans {
        let user_id = pool.get_or_create_user(&plan.name);
        pool.picks.retain(|p| !(p.user_id == user_id && p.season == config.season));
        for (game_id, winner, loser) in &plan.picks {
            let mut pick = Pick::new(user_id, *game_id, *winner, *loser, config.season);
            pick.points_earned = score_pick(&pick, pool.game(*game_id)?);
            pool.upsert_pick(pick);
        }
        pool.upsert_score_prediction(ScorePrediction {
            user_id,
            season: config.season,
            score: plan.score,
        });
        report.users_imported += 1;
        report.picks_imported += plan.picks.len();
    }

    info!(
        "Imported {} picks for {} users ({} rejected)",
        report.picks_imported,
        report.users_imported,
        report.rejected.len()
    );
    Ok(report)
}

fn parse_layout(headers: &csv::StringRecord, config: &SeasonConfig) -> Result<Layout> {
    let header_error = |message: String| PoolError::validation("pick sheet header", None, message);

    if headers.get(0) != Some(NAME_COLUMN) {
        return Err(header_error(format!("first column must be \"{}\"", NAME_COLUMN)));
    }
    let score = headers
        .iter()
        .position(|h| h == SCORE_COLUMN)
        .ok_or_else(|| header_error(format!("a \"{}\" column is required", SCORE_COLUMN)))?;

    let slots = config.bracket.len() as u32;
    let mut matchups = Vec::new();
    let mut cfp_games = Vec::new();
    let mut seen = HashSet::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(number) = header.strip_prefix(CFP_PREFIX) {
            let number = number
                .trim()
                .parse::<u32>()
                .map_err(|_| header_error(format!("bad bracket column \"{}\"", header)))?;
            if !(1..=slots).contains(&number) {
                return Err(header_error(format!("\"{}\" is outside the {}-game bracket", header, slots)));
            }
            if !seen.insert(number) {
                return Err(header_error(format!("\"{}\" appears more than once", header)));
            }
            cfp_games.push((index, number));
        } else if let Some((a, b)) = header.split_once(MATCHUP_SEPARATOR) {
            matchups.push((index, a.trim().to_string(), b.trim().to_string()));
        }
    }

    if cfp_games.len() != config.bracket.len() {
        return Err(header_error(format!(
            "expected exactly {} \"{}N\" columns, found {}",
            config.bracket.len(),
            CFP_PREFIX,
            cfp_games.len()
        )));
    }

    Ok(Layout {
        width: headers.len(),
        name: 0,
        score,
        matchups,
        cfp_games,
    })
}

fn plan_row(
    pool: &PoolData,
    ctx: &BracketContext<'_>,
    layout: &Layout,
    season: i32,
    record: &csv::StringRecord,
    name: &str,
) -> Result<RowPlan> {
    if name.is_empty() {
        return Err(PoolError::validation("<blank>", None, "Name cannot be empty"));
    }
    if record.len() != layout.width {
        return Err(PoolError::validation(
            name,
            None,
            format!("expected {} cells, found {}", layout.width, record.len()),
        ));
    }
    let cell = |index: usize| record.get(index).unwrap_or_default();
    let mut picks = Vec::with_capacity(layout.matchups.len() + layout.cfp_games.len());

    for (index, team_a, team_b) in &layout.matchups {
        let selected = cell(*index);
        if !selected.eq_ignore_ascii_case(team_a) && !selected.eq_ignore_ascii_case(team_b) {
            return Err(PoolError::validation(
                name,
                None,
                format!("pick for {} vs {} must be one of the two teams, got \"{}\"", team_a, team_b, selected),
            ));
        }
        let a = pool.team_by_name(team_a)?.id;
        let b = pool.team_by_name(team_b)?.id;
        let game = pool
            .game_between(season, a, b)
            .ok_or_else(|| PoolError::not_found("game", format!("{} vs {}", team_a, team_b)))?;
        let (winner, loser) = if selected.eq_ignore_ascii_case(team_a) { (a, b) } else { (b, a) };
        picks.push((game.id, winner, Some(loser)));
    }

    let mut bracket = HashMap::with_capacity(layout.cfp_games.len());
    for (index, number) in &layout.cfp_games {
        let team_name = cell(*index);
        if team_name.is_empty() {
            return Err(PoolError::validation(name, Some(*number), "missing bracket pick"));
        }
        bracket.insert(*number, pool.team_by_name(team_name)?.id);
    }
    for resolved in resolve_bracket_picks(ctx, name, &bracket)? {
        picks.push((resolved.game_id, resolved.winning_team_id, Some(resolved.losing_team_id)));
    }

    let score = cell(layout.score)
        .parse::<i32>()
        .map_err(|_| PoolError::validation(name, None, format!("invalid score \"{}\"", cell(layout.score))))?;

    Ok(RowPlan {
        name: name.to_string(),
        picks,
        score,
    })
}
