pub mod games;
pub mod picks_csv;

pub use games::{ingest_games, ingest_teams, record_result, update_games};
pub use picks_csv::{import_picks_csv, ImportReport, RejectedRow};
