use crate::error::{PoolError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.collegefootballdata.com";

/// One postseason game as reported by the College Football Data API
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedGame {
    pub id: i32,
    pub season: i32,
    pub start_date: DateTime<Utc>,
    pub completed: bool,
    pub home_team: String,
    pub home_points: Option<i32>,
    pub away_team: String,
    pub away_points: Option<i32>,
    /// Bowl or playoff round name, e.g. "College Football Playoff National Championship"
    pub notes: Option<String>,
}

/// Team metadata from the College Football Data API
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FeedTeam {
    pub school: String,
    pub mascot: Option<String>,
    pub abbreviation: Option<String>,
    pub conference: Option<String>,
    pub color: Option<String>,
    pub alternate_color: Option<String>,
    #[serde(default)]
    pub logos: Vec<String>,
}

pub struct GameResultsApiClient {
    client: Client,
    api_key: String,
}

impl GameResultsApiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Fetch every postseason game of a season
    pub async fn fetch_postseason_games(&self, year: i32) -> Result<Vec<FeedGame>> {
        let url = format!("{}/games", BASE_URL);

        let response = self
            .client
            .get(&url)
            .query(&[("year", year.to_string().as_str()), ("seasonType", "postseason")])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PoolError::Feed(format!(
                "games request returned {}",
                response.status()
            )));
        }

        let games: Vec<FeedGame> = response.json().await?;
        Ok(games)
    }

    /// Fetch team metadata for a season
    pub async fn fetch_teams(&self, year: i32) -> Result<Vec<FeedTeam>> {
        let url = format!("{}/teams", BASE_URL);

        let response = self
            .client
            .get(&url)
            .query(&[("year", year)])
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PoolError::Feed(format!(
                "teams request returned {}",
                response.status()
            )));
        }

        let teams: Vec<FeedTeam> = response.json().await?;
        Ok(teams)
    }
}
