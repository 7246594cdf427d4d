use crate::error::Result;
use crate::models::Standing;
use crate::store::PoolData;
use std::path::Path;
use tracing::info;

/// Load the pool snapshot. A missing file is an empty pool.
pub fn load_pool(path: &Path) -> Result<PoolData> {
    if !path.exists() {
        info!("No pool file at {}, starting empty", path.display());
        return Ok(PoolData::default());
    }
    let json = std::fs::read_to_string(path)?;
    let pool: PoolData = serde_json::from_str(&json)?;
    Ok(pool)
}

/// Save the pool snapshot as pretty JSON, creating parent directories
pub fn save_pool(pool: &PoolData, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(pool)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Save standings to CSV
pub fn save_standings_to_csv(standings: &[Standing], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Rank",
        "Name",
        "Points",
        "Correct Picks",
        "Total Picks",
        "Prediction Points",
        "Prediction Difference",
        "Max Points",
    ])?;

    for standing in standings {
        writer.write_record([
            standing.rank.to_string(),
            standing.name.clone(),
            standing.points.to_string(),
            standing.correct_picks.to_string(),
            standing.total_picks.to_string(),
            optional(standing.prediction_points),
            optional(standing.prediction_difference),
            optional(standing.max_points),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Game, Team};
    use chrono::Utc;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("cfb_pickem_{}_{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_missing_file_is_empty_pool() {
        let pool = load_pool(&temp_path("missing.json")).unwrap();
        assert!(pool.games.is_empty());
        assert!(pool.users.is_empty());
    }

    #[test]
    fn test_save_then_load_pool() {
        let path = temp_path("nested").join("pool.json");
        let mut pool = PoolData::default();
        let team = Team::new("Boise State");
        pool.games.push(Game::new(2024, Some("College Football Playoff Quarterfinal at the Fiesta Bowl"), Utc::now()).with_teams(team.id, team.id));
        pool.teams.push(team);
        pool.get_or_create_user("Alice");

        save_pool(&pool, &path).unwrap();
        let loaded = load_pool(&path).unwrap();
        assert_eq!(loaded.games, pool.games);
        assert_eq!(loaded.users, pool.users);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_standings_csv_has_header_and_rows() {
        let path = temp_path("standings.csv");
        let standing = Standing {
            user_id: uuid::Uuid::new_v4(),
            name: "Alice".to_string(),
            points: 12,
            correct_picks: 9,
            total_picks: 14,
            prediction_points: None,
            prediction_difference: None,
            max_points: Some(30),
            rank: 1,
            is_first_place: true,
            is_last_place: false,
        };
        save_standings_to_csv(&[standing], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("Rank,Name,Points"));
        assert_eq!(lines.next().unwrap(), "1,Alice,12,9,14,,,30");
        std::fs::remove_file(path).ok();
    }
}
