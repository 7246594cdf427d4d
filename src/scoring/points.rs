/// Round labels in priority order. The first label contained in a game's
/// name decides its value, so "Semifinal" never shadows a championship.
const ROUND_POINTS: [(&str, i32); 3] = [
    ("National Championship", 4),
    ("Semifinal", 3),
    ("Quarterfinal", 2),
];

/// Value of any game whose name matches none of the round labels
pub const BOWL_POINTS: i32 = 1;

/// Highest tiebreaker award, also the ceiling used while it is undecided
pub const MAX_TIEBREAKER_POINTS: i32 = 4;

/// Markers that place a game in the single-elimination bracket
const PLAYOFF_MARKERS: [&str; 3] = ["College Football Playoff", "CFP", "National Championship"];

const CHAMPIONSHIP_MARKER: &str = "National Championship";

/// Point value of a correct pick, by round label
pub fn point_value(game_name: Option<&str>) -> i32 {
    let Some(name) = game_name else {
        return BOWL_POINTS;
    };
    ROUND_POINTS
        .iter()
        .find(|(label, _)| name.contains(label))
        .map(|(_, points)| *points)
        .unwrap_or(BOWL_POINTS)
}

/// Whether a game belongs to the playoff bracket (as opposed to a bowl)
pub fn is_playoff_game(game_name: Option<&str>) -> bool {
    game_name.is_some_and(|name| PLAYOFF_MARKERS.iter().any(|m| name.contains(m)))
}

pub fn is_championship_game(game_name: Option<&str>) -> bool {
    game_name.is_some_and(|name| name.contains(CHAMPIONSHIP_MARKER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_value_by_round() {
        assert_eq!(point_value(Some("College Football Playoff National Championship")), 4);
        assert_eq!(point_value(Some("College Football Playoff Semifinal at the Orange Bowl")), 3);
        assert_eq!(point_value(Some("College Football Playoff Quarterfinal at the Rose Bowl")), 2);
        assert_eq!(point_value(Some("CFP Quarterfinal: Georgia vs Oregon")), 2);
        assert_eq!(point_value(Some("College Football Playoff First Round Game")), 1);
        assert_eq!(point_value(Some("Duke's Mayo Bowl")), 1);
        assert_eq!(point_value(Some("")), 1);
        assert_eq!(point_value(None), 1);
    }

    #[test]
    fn test_point_value_precedence() {
        // Most specific label wins when several match
        assert_eq!(point_value(Some("National Championship Semifinal Quarterfinal")), 4);
        assert_eq!(point_value(Some("Quarterfinal or Semifinal")), 3);
    }

    #[test]
    fn test_point_value_is_total() {
        for name in ["semifinal", "QUARTERFINAL", "national championship", "🏈", "Bowl"] {
            let value = point_value(Some(name));
            assert!((1..=4).contains(&value), "{} scored {}", name, value);
        }
    }

    #[test]
    fn test_playoff_filter() {
        assert!(is_playoff_game(Some("College Football Playoff First Round Game")));
        assert!(is_playoff_game(Some("CFP Quarterfinal: Georgia vs Oregon")));
        assert!(is_playoff_game(Some("College Football Playoff National Championship")));
        assert!(!is_playoff_game(Some("Cheez-It Citrus Bowl")));
        assert!(!is_playoff_game(None));
        assert!(is_championship_game(Some("College Football Playoff National Championship")));
        assert!(!is_championship_game(Some("College Football Playoff Semifinal at the Cotton Bowl")));
    }
}
