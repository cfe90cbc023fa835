pub mod memory;
pub mod sql;

use anyhow::Result;

use crate::domains::{GameRecord, HighScoreRow, PlayerHistoryRow, PlaytimeRow, SchemaStatus};

/// Persistent store of finished games.
///
/// Every row-producing method returns rows in their final display order.
#[async_trait::async_trait]
pub trait GameRepository {
    /// Best mass per player, descending; ties by player name.
    async fn high_scores(&self) -> Result<Vec<HighScoreRow>>;
    /// All games of `name`, by mass descending; ties by start time.
    async fn player_history(&self, name: &str) -> Result<Vec<PlayerHistoryRow>>;
    /// Whole minutes played per player, descending; ties by player name.
    async fn total_playtime(&self) -> Result<Vec<PlaytimeRow>>;
    async fn insert_game(&self, game: &GameRecord) -> Result<()>;
    /// Creates and seeds the games table unless it already exists.
    async fn ensure_schema(&self) -> Result<SchemaStatus>;
}

/// Sample games inserted when the table is first created.
pub fn seed_games() -> Vec<GameRecord> {
    use time::{macros::datetime, PrimitiveDateTime};

    fn game(
        player_name: &str,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        max_mass: f64,
        max_rank: i32,
    ) -> GameRecord {
        GameRecord {
            player_name: player_name.to_string(),
            start_time,
            end_time,
            max_mass,
            max_rank,
        }
    }

    vec![
        game("Draeden", datetime!(2023-04-21 13:00:00), datetime!(2023-04-21 13:00:00), 1000.0, 1),
        game("Jim", datetime!(2023-04-21 13:00:00), datetime!(2023-04-21 13:30:00), 1500.0, 1),
        game("Derek", datetime!(2023-04-21 13:00:00), datetime!(2023-04-21 13:26:00), 1750.0, 1),
        game("Draeden", datetime!(2023-04-21 13:00:00), datetime!(2023-04-21 13:45:00), 1100.0, 4),
        game("John", datetime!(2023-04-21 13:00:00), datetime!(2023-04-21 13:00:50), 500.0, 6),
        game("John", datetime!(2023-04-21 14:00:00), datetime!(2023-04-21 15:00:00), 600.0, 8),
    ]
}
