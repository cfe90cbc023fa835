use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use crate::{
    config::ConfigDatabase,
    domains::{GameRecord, HighScoreRow, PlayerHistoryRow, PlaytimeRow, SchemaStatus},
};

use super::{seed_games, GameRepository};

#[derive(Clone)]
pub struct SqlGameRepository {
    pub(super) pool: PgPool,
}

impl SqlGameRepository {
    /// Connections are opened on first use. An acquire that exceeds the
    /// timeout fails only the calling request.
    pub fn connect(config: &ConfigDatabase) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect_lazy(&config.url)?;

        Ok(Self { pool })
    }
}

fn push_games<'a>(query: &mut QueryBuilder<'a, Postgres>, games: &'a [GameRecord]) {
    query.push_values(games, |mut query, game| {
        query
            .push_bind(&game.player_name)
            .push_bind(game.start_time)
            .push_bind(game.end_time)
            .push_bind(game.max_mass)
            .push_bind(game.max_rank);
    });
}

const INSERT_GAMES: &str = "INSERT INTO games (player_name, start_time, end_time, max_mass, max_rank)";

#[async_trait::async_trait]
impl GameRepository for SqlGameRepository {
    async fn high_scores(&self) -> Result<Vec<HighScoreRow>> {
        sqlx::query_as(
            "\
SELECT \
    player_name, \
    MAX(max_mass) AS best_mass \
 FROM games \
GROUP BY player_name \
ORDER BY best_mass DESC, player_name ASC\
",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn player_history(&self, name: &str) -> Result<Vec<PlayerHistoryRow>> {
        sqlx::query_as(
            "\
SELECT \
    max_mass, \
    max_rank, \
    start_time, \
    end_time \
 FROM games \
WHERE player_name = $1 \
ORDER BY max_mass DESC, start_time ASC\
",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn total_playtime(&self) -> Result<Vec<PlaytimeRow>> {
        sqlx::query_as(
            "\
SELECT \
    player_name, \
    SUM(TRUNC(EXTRACT(EPOCH FROM (end_time - start_time)) / 60))::BIGINT AS total_minutes \
 FROM games \
GROUP BY player_name \
ORDER BY total_minutes DESC, player_name ASC\
",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn insert_game(&self, game: &GameRecord) -> Result<()> {
        let games = std::slice::from_ref(game);

        let mut query = QueryBuilder::new(INSERT_GAMES);
        push_games(&mut query, games);
        query.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn ensure_schema(&self) -> Result<SchemaStatus> {
        let mut tx = self.pool.begin().await?;

        let (already_existed,): (bool,) =
            sqlx::query_as("SELECT to_regclass('games') IS NOT NULL")
                .fetch_one(&mut *tx)
                .await?;

        if already_existed {
            tx.rollback().await?;
            return Ok(SchemaStatus { already_existed });
        }

        sqlx::query(
            "\
CREATE TABLE games ( \
    game_id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY, \
    player_name VARCHAR(50) NOT NULL, \
    start_time TIMESTAMP NOT NULL, \
    end_time TIMESTAMP NOT NULL, \
    max_mass DOUBLE PRECISION NOT NULL, \
    max_rank INTEGER NOT NULL \
)\
",
        )
        .execute(&mut *tx)
        .await?;

        let seed = seed_games();
        let mut query = QueryBuilder::new(INSERT_GAMES);
        push_games(&mut query, &seed);
        query.build().execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(SchemaStatus {
            already_existed: false,
        })
    }
}
