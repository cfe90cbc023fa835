use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};

use crate::domains::{GameRecord, HighScoreRow, PlayerHistoryRow, PlaytimeRow, SchemaStatus};

use super::{seed_games, GameRepository};

/// In-process store with the same ordering and failure behaviour as the SQL
/// one: until `ensure_schema` runs (or the store is built `with_games`) the
/// table does not exist and every operation fails.
#[derive(Default)]
pub struct MemoryGameRepository {
    games: Mutex<Option<Vec<GameRecord>>>,
}

impl MemoryGameRepository {
    pub fn with_games(games: Vec<GameRecord>) -> Self {
        Self {
            games: Mutex::new(Some(games)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec<GameRecord>>> {
        self.games.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Vec<GameRecord>) -> T) -> Result<T> {
        let mut guard = self.lock();
        let games = guard
            .as_mut()
            .ok_or_else(|| anyhow!("relation \"games\" does not exist"))?;

        Ok(f(games))
    }
}

/// Groups `games` per player in first-appearance order.
fn per_player<T>(
    games: &[GameRecord],
    value: impl Fn(&GameRecord) -> T,
    fold: impl Fn(&mut T, T),
) -> Vec<(String, T)> {
    let mut groups: Vec<(String, T)> = Vec::new();

    for game in games {
        let next = value(game);
        match groups.iter_mut().find(|(name, _)| *name == game.player_name) {
            Some((_, acc)) => fold(acc, next),
            None => groups.push((game.player_name.clone(), next)),
        }
    }

    groups
}

#[async_trait::async_trait]
impl GameRepository for MemoryGameRepository {
    async fn high_scores(&self) -> Result<Vec<HighScoreRow>> {
        self.with_table(|games| {
            let best = per_player(games, |g| g.max_mass, |acc: &mut f64, m| *acc = acc.max(m));
            let mut rows: Vec<_> = best
                .into_iter()
                .map(|(player_name, best_mass)| HighScoreRow {
                    player_name,
                    best_mass,
                })
                .collect();

            rows.sort_by(|a, b| {
                b.best_mass
                    .total_cmp(&a.best_mass)
                    .then_with(|| a.player_name.cmp(&b.player_name))
            });
            rows
        })
    }

    async fn player_history(&self, name: &str) -> Result<Vec<PlayerHistoryRow>> {
        self.with_table(|games| {
            let mut rows: Vec<_> = games
                .iter()
                .filter(|game| game.player_name == name)
                .map(|game| PlayerHistoryRow {
                    max_mass: game.max_mass,
                    max_rank: game.max_rank,
                    start_time: game.start_time,
                    end_time: game.end_time,
                })
                .collect();

            rows.sort_by(|a, b| {
                b.max_mass
                    .total_cmp(&a.max_mass)
                    .then_with(|| a.start_time.cmp(&b.start_time))
            });
            rows
        })
    }

    async fn total_playtime(&self) -> Result<Vec<PlaytimeRow>> {
        self.with_table(|games| {
            let totals = per_player(games, GameRecord::whole_minutes, |acc: &mut i64, m| *acc += m);
            let mut rows: Vec<_> = totals
                .into_iter()
                .map(|(player_name, total_minutes)| PlaytimeRow {
                    player_name,
                    total_minutes,
                })
                .collect();

            rows.sort_by(|a, b| {
                b.total_minutes
                    .cmp(&a.total_minutes)
                    .then_with(|| a.player_name.cmp(&b.player_name))
            });
            rows
        })
    }

    async fn insert_game(&self, game: &GameRecord) -> Result<()> {
        self.with_table(|games| games.push(game.clone()))
    }

    async fn ensure_schema(&self) -> Result<SchemaStatus> {
        let mut guard = self.lock();
        let already_existed = guard.is_some();
        if !already_existed {
            *guard = Some(seed_games());
        }

        Ok(SchemaStatus { already_existed })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn game(name: &str, mass: f64, minutes: i64) -> GameRecord {
        let start_time = datetime!(2023-04-21 13:00:00);
        GameRecord {
            player_name: name.to_string(),
            start_time,
            end_time: start_time + time::Duration::minutes(minutes),
            max_mass: mass,
            max_rank: 1,
        }
    }

    #[tokio::test]
    async fn missing_table_fails_every_operation() {
        let repository = MemoryGameRepository::default();

        assert!(repository.high_scores().await.is_err());
        assert!(repository.player_history("Jim").await.is_err());
        assert!(repository.total_playtime().await.is_err());
        assert!(repository.insert_game(&game("Jim", 1.0, 1)).await.is_err());
    }

    #[tokio::test]
    async fn ensure_schema_seeds_once() {
        let repository = MemoryGameRepository::default();

        let first = repository.ensure_schema().await.unwrap();
        assert!(!first.already_existed);
        repository.insert_game(&game("Ann", 10.0, 1)).await.unwrap();

        let second = repository.ensure_schema().await.unwrap();
        assert!(second.already_existed);

        let history = repository.player_history("Ann").await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn seeded_high_scores() {
        let repository = MemoryGameRepository::with_games(seed_games());
        let rows = repository.high_scores().await.unwrap();

        let rows: Vec<_> = rows
            .iter()
            .map(|row| (row.player_name.as_str(), row.best_mass))
            .collect();
        assert_eq!(
            rows,
            [
                ("Derek", 1750.0),
                ("Jim", 1500.0),
                ("Draeden", 1100.0),
                ("John", 600.0)
            ]
        );
    }

    #[tokio::test]
    async fn high_score_ties_are_broken_by_name() {
        let repository = MemoryGameRepository::with_games(vec![
            game("Zed", 100.0, 1),
            game("Amy", 100.0, 1),
            game("Bob", 200.0, 1),
        ]);

        let names: Vec<_> = repository
            .high_scores()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.player_name)
            .collect();
        assert_eq!(names, ["Bob", "Amy", "Zed"]);
    }

    #[tokio::test]
    async fn playtime_sums_whole_minutes() {
        let repository = MemoryGameRepository::with_games(vec![
            game("Ann", 1.0, 30),
            game("Bob", 1.0, 20),
            game("Ann", 1.0, 15),
        ]);

        let rows = repository.total_playtime().await.unwrap();
        assert_eq!(
            rows,
            [
                PlaytimeRow {
                    player_name: "Ann".into(),
                    total_minutes: 45
                },
                PlaytimeRow {
                    player_name: "Bob".into(),
                    total_minutes: 20
                },
            ]
        );
    }

    #[tokio::test]
    async fn seeded_playtime_truncates_per_game() {
        let repository = MemoryGameRepository::with_games(seed_games());
        let rows = repository.total_playtime().await.unwrap();

        let john = rows.iter().find(|row| row.player_name == "John").unwrap();
        assert_eq!(john.total_minutes, 60);
        assert_eq!(rows[0].player_name, "John");
    }

    #[tokio::test]
    async fn history_is_ordered_by_mass() {
        let repository = MemoryGameRepository::with_games(seed_games());
        let rows = repository.player_history("Draeden").await.unwrap();

        let masses: Vec<_> = rows.iter().map(|row| row.max_mass).collect();
        assert_eq!(masses, [1100.0, 1000.0]);
        assert!(repository.player_history("Nobody").await.unwrap().is_empty());
    }
}
