use crate::config::{BracketSlot, SeasonConfig};
use crate::error::{PoolError, Result};
use crate::models::{Game, GameId, TeamId};
use crate::store::PoolData;
use std::collections::HashMap;

/// A bracket pick that passed validation, ready to be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPick {
    pub game_number: u32,
    pub game_id: GameId,
    pub winning_team_id: TeamId,
    pub losing_team_id: TeamId,
}

/// Everything needed to check one user's bracket for a season: the slot
/// layout, the stored game behind each slot and the bye teams' ids.
pub struct BracketContext<'a> {
    slots: &'a [BracketSlot],
    slot_games: Vec<&'a Game>,
    bye_teams: HashMap<&'a str, TeamId>,
}

impl<'a> BracketContext<'a> {
    pub fn new(pool: &'a PoolData, config: &'a SeasonConfig) -> Result<Self> {
        config.validate()?;

        let slot_games = pool.playoff_games_by_date(config.season);
        if slot_games.len() != config.bracket.len() {
            return Err(PoolError::MissingData(format!(
                "expected {} playoff games for season {}, found {}",
                config.bracket.len(),
                config.season,
                slot_games.len()
            )));
        }
        for (index, slot) in config.bracket.iter().enumerate() {
            if slot.game_number as usize == 0 || slot.game_number as usize > slot_games.len() {
                return Err(PoolError::Config(format!(
                    "bracket slot {} is outside 1..={}",
                    index + 1,
                    slot_games.len()
                )));
            }
        }

        let mut bye_teams = HashMap::new();
        for name in &config.first_round_byes {
            bye_teams.insert(name.as_str(), pool.team_by_name(name)?.id);
        }

        Ok(Self {
            slots: &config.bracket,
            slot_games,
            bye_teams,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Stored game behind a 1-based slot number
    pub fn game_for_slot(&self, game_number: u32) -> Option<&'a Game> {
        let index = (game_number as usize).checked_sub(1)?;
        self.slot_games.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy)]
struct ResolvedSlot {
    winner: TeamId,
    loser: TeamId,
}

/// Turn one user's per-slot winners into (winner, loser, game) triples.
///
/// Slots are walked in configured order, so every dependency has already
/// been resolved when it is read. The first illegal pick fails the whole
/// bracket.
pub fn resolve_bracket_picks(
    ctx: &BracketContext<'_>,
    user: &str,
    raw_picks: &HashMap<u32, TeamId>,
) -> Result<Vec<ValidatedPick>> {
    let mut resolved: HashMap<u32, ResolvedSlot> = HashMap::with_capacity(ctx.slot_count());
    let mut picks = Vec::with_capacity(ctx.slot_count());

    for slot in ctx.slots {
        let number = slot.game_number;
        let game = ctx
            .game_for_slot(number)
            .ok_or_else(|| PoolError::Config(format!("no game for bracket slot {}", number)))?;
        let winner = *raw_picks
            .get(&number)
            .ok_or_else(|| PoolError::validation(user, Some(number), "missing pick"))?;

        let (first, second) = candidates(ctx, slot, game, &resolved)?;
        let loser = if winner == first {
            second
        } else if winner == second {
            first
        } else {
            return Err(PoolError::validation(
                user,
                Some(number),
                format!("team {} cannot play in this game under the submitted bracket", winner),
            ));
        };

        resolved.insert(number, ResolvedSlot { winner, loser });
        picks.push(ValidatedPick {
            game_number: number,
            game_id: game.id,
            winning_team_id: winner,
            losing_team_id: loser,
        });
    }

    Ok(picks)
}

/// The two teams that can meet in a slot given the earlier resolved picks
fn candidates(
    ctx: &BracketContext<'_>,
    slot: &BracketSlot,
    game: &Game,
    resolved: &HashMap<u32, ResolvedSlot>,
) -> Result<(TeamId, TeamId)> {
    let winner_of = |number: u32| {
        resolved.get(&number).map(|r| r.winner).ok_or_else(|| {
            PoolError::Config(format!(
                "game {} depends on unresolved game {}",
                slot.game_number, number
            ))
        })
    };

    match slot.depends_on.as_slice() {
        [] => match (game.home_team_id, game.away_team_id) {
            (Some(home), Some(away)) => Ok((home, away)),
            _ => Err(PoolError::MissingData(format!(
                "first-round game {} has no teams assigned",
                slot.game_number
            ))),
        },
        [feeder] => {
            let opponent = feeder.opponent.as_deref().ok_or_else(|| {
                PoolError::Config(format!("game {} has no fixed opponent", slot.game_number))
            })?;
            let bye_team = ctx
                .bye_teams
                .get(opponent)
                .copied()
                .ok_or_else(|| PoolError::not_found("team", opponent))?;
            Ok((winner_of(feeder.game_number)?, bye_team))
        }
        [left, right] => Ok((winner_of(left.game_number)?, winner_of(right.game_number)?)),
        _ => Err(PoolError::Config(format!(
            "game {} has more than two feeders",
            slot.game_number
        ))),
    }
}
