pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod scoring;
pub mod store;
pub mod utils;
pub mod web;

pub use config::{AppConfig, SeasonConfig};
pub use error::{PoolError, Result};
pub use models::*;
pub use scoring::{
    compute_hypothetical_standings, compute_standings, point_value, resolve_bracket_picks, resolve_tiebreaker,
    SortBy,
};
pub use store::PoolData;
