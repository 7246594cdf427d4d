use crate::error::{PoolError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_DATA_FILE: &str = "data/pool.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Process-level settings, read from the environment (and `.env`)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub season: i32,
    pub season_config_file: Option<PathBuf>,
    pub cfb_api_key: Option<String>,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let season = match std::env::var("POOL_SEASON") {
            Ok(value) => value
                .parse::<i32>()
                .map_err(|_| PoolError::Config(format!("POOL_SEASON is not a year: {}", value)))?,
            Err(_) => bowl_year(Utc::now()),
        };

        Ok(Self {
            data_file: std::env::var("POOL_DATA_FILE")
                .unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string())
                .into(),
            season,
            season_config_file: std::env::var("POOL_SEASON_CONFIG").ok().map(PathBuf::from),
            cfb_api_key: std::env::var("COLLEGE_FOOTBALL_DATA_API_KEY").ok(),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// Season configuration for the configured season, from file if one is
    /// set and from the built-in table otherwise
    pub fn season_config(&self) -> Result<SeasonConfig> {
        let config = match &self.season_config_file {
            Some(path) => SeasonConfig::from_json_file(path)?,
            None => SeasonConfig::builtin(self.season)?,
        };
        if config.season != self.season {
            return Err(PoolError::Config(format!(
                "season configuration is for {}, expected {}",
                config.season, self.season
            )));
        }
        Ok(config)
    }
}

/// The season whose bowl games are being played at `now`. Bowl season runs
/// into January, so anything before November belongs to last year's season.
pub fn bowl_year(now: DateTime<Utc>) -> i32 {
    let year = now.year();
    if now.month0() < 10 {
        year - 1
    } else {
        year
    }
}

/// Reference from a dependent bracket slot to an earlier one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotDependency {
    pub game_number: u32,
    /// Team with a first-round bye waiting for the winner of `game_number`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent: Option<String>,
}

/// One playoff game slot, in topological order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BracketSlot {
    pub game_number: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<SlotDependency>,
}

impl BracketSlot {
    fn initial(game_number: u32) -> Self {
        Self {
            game_number,
            depends_on: Vec::new(),
        }
    }

    fn against_bye(game_number: u32, feeder: u32, opponent: &str) -> Self {
        Self {
            game_number,
            depends_on: vec![SlotDependency {
                game_number: feeder,
                opponent: Some(opponent.to_string()),
            }],
        }
    }

    fn merge(game_number: u32, left: u32, right: u32) -> Self {
        Self {
            game_number,
            depends_on: vec![
                SlotDependency {
                    game_number: left,
                    opponent: None,
                },
                SlotDependency {
                    game_number: right,
                    opponent: None,
                },
            ],
        }
    }
}

/// Static per-season data: eligible teams, bye teams and the bracket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonConfig {
    pub season: i32,
    pub teams: Vec<String>,
    pub first_round_byes: Vec<String>,
    pub bracket: Vec<BracketSlot>,
}

impl SeasonConfig {
    pub fn builtin(season: i32) -> Result<Self> {
        match season {
            2024 => Ok(season_2024()),
            _ => Err(PoolError::MissingData(format!("no teams found for season {}", season))),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: SeasonConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the bracket is an ordered DAG: every dependency points at
    /// an earlier slot, single dependencies carry a bye opponent and double
    /// dependencies do not.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for slot in &self.bracket {
            for dep in &slot.depends_on {
                if !seen.contains(&dep.game_number) {
                    return Err(PoolError::Config(format!(
                        "game {} depends on game {} which does not precede it",
                        slot.game_number, dep.game_number
                    )));
                }
            }
            match slot.depends_on.as_slice() {
                [] => {}
                [single] => {
                    let Some(opponent) = &single.opponent else {
                        return Err(PoolError::Config(format!(
                            "game {} has a single feeder but no fixed opponent",
                            slot.game_number
                        )));
                    };
                    if !self.first_round_byes.contains(opponent) {
                        return Err(PoolError::Config(format!(
                            "game {} opponent {} is not a first-round bye team",
                            slot.game_number, opponent
                        )));
                    }
                }
                [left, right] => {
                    if left.opponent.is_some() || right.opponent.is_some() {
                        return Err(PoolError::Config(format!(
                            "game {} merges two feeders and cannot pin an opponent",
                            slot.game_number
                        )));
                    }
                }
                _ => {
                    return Err(PoolError::Config(format!(
                        "game {} has more than two feeders",
                        slot.game_number
                    )));
                }
            }
            if !seen.insert(slot.game_number) {
                return Err(PoolError::Config(format!(
                    "game {} appears twice in the bracket",
                    slot.game_number
                )));
            }
        }
        Ok(())
    }

    pub fn is_season_team(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t == name)
    }
}

fn season_2024() -> SeasonConfig {
    let teams = [
        "Pittsburgh", "Toledo", "Rutgers", "Kansas State", "Arkansas State", "Bowling Green",
        "Navy", "Oklahoma", "Georgia Tech", "Vanderbilt", "Arkansas", "Texas Tech", "Syracuse",
        "Washington State", "USC", "Texas A&M", "UConn", "North Carolina", "Boston College",
        "Nebraska", "TCU", "Louisiana", "Miami", "Iowa State", "Colorado State", "Miami (OH)",
        "NC State", "East Carolina", "BYU", "Colorado", "Missouri", "Iowa", "Alabama",
        "Michigan", "Louisville", "Washington", "South Carolina", "Illinois", "LSU", "Baylor",
        "Ole Miss", "Duke", "Oregon", "Penn State", "Boise State", "Ohio State", "Texas",
        "Notre Dame", "Arizona State", "Tennessee", "Georgia", "Indiana", "SMU", "Clemson",
    ];

    SeasonConfig {
        season: 2024,
        teams: teams.iter().map(|t| t.to_string()).collect(),
        first_round_byes: ["Oregon", "Georgia", "Boise State", "Arizona State"]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        bracket: vec![
            BracketSlot::initial(1),
            BracketSlot::initial(2),
            BracketSlot::initial(3),
            BracketSlot::initial(4),
            BracketSlot::against_bye(5, 2, "Boise State"),
            BracketSlot::against_bye(6, 3, "Arizona State"),
            BracketSlot::against_bye(7, 4, "Oregon"),
            BracketSlot::against_bye(8, 1, "Georgia"),
            BracketSlot::merge(9, 5, 8),
            BracketSlot::merge(10, 6, 7),
            BracketSlot::merge(11, 9, 10),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bowl_year() {
        let jan = Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap();
        assert_eq!(bowl_year(jan), 2024);
        let oct = Utc.with_ymd_and_hms(2025, 10, 31, 12, 0, 0).unwrap();
        assert_eq!(bowl_year(oct), 2024);
        let dec = Utc.with_ymd_and_hms(2024, 12, 20, 12, 0, 0).unwrap();
        assert_eq!(bowl_year(dec), 2024);
        let nov = Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap();
        assert_eq!(bowl_year(nov), 2025);
    }

    #[test]
    fn test_builtin_2024_is_valid() {
        let config = SeasonConfig::builtin(2024).unwrap();
        assert_eq!(config.bracket.len(), 11);
        assert_eq!(config.teams.len(), 54);
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_season_is_missing_data() {
        assert!(matches!(
            SeasonConfig::builtin(1999),
            Err(PoolError::MissingData(_))
        ));
    }

    #[test]
    fn test_validate_rejects_forward_dependency() {
        let mut config = SeasonConfig::builtin(2024).unwrap();
        config.bracket.swap(4, 8);
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unknown_bye_opponent() {
        let mut config = SeasonConfig::builtin(2024).unwrap();
        config.bracket[4].depends_on[0].opponent = Some("Texas".to_string());
        assert!(matches!(config.validate(), Err(PoolError::Config(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_shape() {
        let config = SeasonConfig::builtin(2024).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["bracket"][0], serde_json::json!({ "gameNumber": 1 }));
        assert_eq!(
            json["bracket"][4]["dependsOn"][0],
            serde_json::json!({ "gameNumber": 2, "opponent": "Boise State" })
        );
    }
}
