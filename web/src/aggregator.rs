use std::sync::Arc;

use crate::{
    domains::{GameRecord, HighScoreRow, PlayerHistoryRow, PlaytimeRow, SchemaStatus},
    repositories::GameRepository,
};

/// Read and write access to game data where store failures never escape:
/// a failed read is an empty table and a failed write is reported as unsaved.
#[derive(Clone)]
pub struct Aggregator {
    repository: Arc<dyn GameRepository + Send + Sync>,
}

impl Aggregator {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    pub async fn highscores(&self) -> Vec<HighScoreRow> {
        self.repository
            .high_scores()
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "failed to query high scores");
                Vec::new()
            })
    }

    pub async fn player_history(&self, name: &str) -> Vec<PlayerHistoryRow> {
        self.repository
            .player_history(name)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(%err, name, "failed to query player history");
                Vec::new()
            })
    }

    pub async fn total_playtime(&self) -> Vec<PlaytimeRow> {
        self.repository
            .total_playtime()
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "failed to query total playtime");
                Vec::new()
            })
    }

    /// Returns whether the game was saved.
    pub async fn record_game(&self, game: &GameRecord) -> bool {
        match self.repository.insert_game(game).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%err, player = %game.player_name, "failed to insert game");
                false
            }
        }
    }

    /// A store failure is reported as an existing table.
    pub async fn ensure_schema(&self) -> SchemaStatus {
        self.repository.ensure_schema().await.unwrap_or_else(|err| {
            tracing::warn!(%err, "failed to create games table");
            SchemaStatus {
                already_existed: true,
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use anyhow::{anyhow, Result};

    use super::*;
    use crate::repositories::{memory::MemoryGameRepository, seed_games};

    /// A store that is never reachable.
    pub(crate) struct UnreachableRepository;

    #[async_trait::async_trait]
    impl GameRepository for UnreachableRepository {
        async fn high_scores(&self) -> Result<Vec<HighScoreRow>> {
            Err(anyhow!("connection refused"))
        }

        async fn player_history(&self, _name: &str) -> Result<Vec<PlayerHistoryRow>> {
            Err(anyhow!("connection refused"))
        }

        async fn total_playtime(&self) -> Result<Vec<PlaytimeRow>> {
            Err(anyhow!("connection refused"))
        }

        async fn insert_game(&self, _game: &GameRecord) -> Result<()> {
            Err(anyhow!("connection refused"))
        }

        async fn ensure_schema(&self) -> Result<SchemaStatus> {
            Err(anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn store_failures_become_empty_results() {
        let aggregator = Aggregator::new(Arc::new(UnreachableRepository));

        assert!(aggregator.highscores().await.is_empty());
        assert!(aggregator.player_history("Jim").await.is_empty());
        assert!(aggregator.total_playtime().await.is_empty());
        assert!(aggregator.ensure_schema().await.already_existed);

        let game = seed_games().remove(0);
        assert!(!aggregator.record_game(&game).await);
    }

    #[tokio::test]
    async fn recorded_game_shows_up_in_history() {
        let aggregator = Aggregator::new(Arc::new(MemoryGameRepository::with_games(Vec::new())));

        let game = seed_games().remove(1);
        assert!(aggregator.record_game(&game).await);

        let history = aggregator.player_history(&game.player_name).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].max_mass, game.max_mass);
    }
}
