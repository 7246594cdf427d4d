use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TeamId = Uuid;
pub type UserId = Uuid;
pub type GameId = Uuid;

/// A team taking part in the postseason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub abbreviation: String,
    pub mascot: String,
    pub conference: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub logo_url: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: String::new(),
            mascot: String::new(),
            conference: String::new(),
            primary_color: String::new(),
            secondary_color: String::new(),
            logo_url: String::new(),
        }
    }
}

/// A member of the pool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            is_admin: false,
        }
    }
}

/// One scheduled bowl or playoff game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    /// Round label, e.g. "College Football Playoff Quarterfinal"
    pub name: Option<String>,
    pub home_team_id: Option<TeamId>,
    pub away_team_id: Option<TeamId>,
    pub game_date: DateTime<Utc>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
    pub winning_team_id: Option<TeamId>,
    pub is_complete: bool,
    pub season: i32,
}

impl Game {
    pub fn new(season: i32, name: Option<&str>, game_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.map(str::to_string),
            home_team_id: None,
            away_team_id: None,
            game_date,
            home_score: None,
            away_score: None,
            winning_team_id: None,
            is_complete: false,
            season,
        }
    }

    pub fn with_teams(mut self, home: TeamId, away: TeamId) -> Self {
        self.home_team_id = Some(home);
        self.away_team_id = Some(away);
        self
    }

    /// Record a final (or in-progress) score. The winner is the higher
    /// score; a tie or a missing score leaves the winner unset.
    pub fn set_result(&mut self, home_score: Option<i32>, away_score: Option<i32>, is_complete: bool) {
        self.home_score = home_score;
        self.away_score = away_score;
        self.winning_team_id = match (home_score, away_score) {
            (Some(h), Some(a)) if h > a => self.home_team_id,
            (Some(h), Some(a)) if h < a => self.away_team_id,
            _ => None,
        };
        self.is_complete = is_complete;
    }

    /// The team that lost, once the game has a winner
    pub fn losing_team_id(&self) -> Option<TeamId> {
        let winner = self.winning_team_id?;
        self.other_team(winner)
    }

    /// Given one participant, return the other one
    pub fn other_team(&self, team_id: TeamId) -> Option<TeamId> {
        if self.home_team_id == Some(team_id) {
            self.away_team_id
        } else if self.away_team_id == Some(team_id) {
            self.home_team_id
        } else {
            None
        }
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.home_team_id == Some(team_id) || self.away_team_id == Some(team_id)
    }

    /// Combined score, only once both sides have one
    pub fn total_score(&self) -> Option<i32> {
        Some(self.home_score? + self.away_score?)
    }
}

/// One user's predicted winner for one game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub id: Uuid,
    pub user_id: UserId,
    pub game_id: GameId,
    pub winning_team_id: TeamId,
    pub losing_team_id: Option<TeamId>,
    /// `None` until the game completes; `Some(0)` for a resolved miss
    pub points_earned: Option<i32>,
    pub submitted_at: DateTime<Utc>,
    pub season: i32,
}

impl Pick {
    pub fn new(
        user_id: UserId,
        game_id: GameId,
        winning_team_id: TeamId,
        losing_team_id: Option<TeamId>,
        season: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            game_id,
            winning_team_id,
            losing_team_id,
            points_earned: None,
            submitted_at: Utc::now(),
            season,
        }
    }
}

/// A user's guess at the combined score of the championship game
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScorePrediction {
    pub user_id: UserId,
    pub season: i32,
    pub score: i32,
}

/// One leaderboard row. Derived on every request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub user_id: UserId,
    pub name: String,
    /// Realized points including any tiebreaker bonus
    pub points: i32,
    pub correct_picks: u32,
    pub total_picks: u32,
    pub prediction_points: Option<i32>,
    pub prediction_difference: Option<u32>,
    /// Only present on the unrestricted ("all games") view
    pub max_points: Option<i32>,
    pub rank: u32,
    pub is_first_place: bool,
    pub is_last_place: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_result_derives_winner() {
        let home = Uuid::new_v4();
        let away = Uuid::new_v4();
        let mut game = Game::new(2024, Some("Rose Bowl"), Utc::now()).with_teams(home, away);

        game.set_result(Some(21), Some(28), true);
        assert_eq!(game.winning_team_id, Some(away));
        assert_eq!(game.losing_team_id(), Some(home));
        assert_eq!(game.total_score(), Some(49));

        // A tie or a missing score leaves the winner open
        game.set_result(Some(14), Some(14), false);
        assert_eq!(game.winning_team_id, None);
        game.set_result(None, Some(3), false);
        assert_eq!(game.winning_team_id, None);
        assert_eq!(game.total_score(), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let game = Game::new(2024, None, Utc::now());
        let json = serde_json::to_value(&game).unwrap();
        assert!(json.get("homeTeamId").is_some());
        assert!(json.get("isComplete").is_some());
        assert!(json.get("winningTeamId").is_some());
    }
}
