use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};

use super::{StoreError, StoreResult, UserStore};
use crate::{config::Config, models::User};

const CREATE_USERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS users (
    id BIGINT PRIMARY KEY,
    username TEXT NOT NULL DEFAULT '',
    count BIGINT NOT NULL DEFAULT 0
)";

pub(crate) struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Opens the pool and checks that the database answers.
    pub(crate) async fn connect(config: &Config) -> Result<Self, sqlx::Error> {
        let mut options = PgConnectOptions::from_str(&config.database_url)?;
        if config.require_tls {
            options = options.ssl_mode(PgSslMode::Require);
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    pub(crate) async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn insert_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::AlreadyExists,
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, id: i64, username: &str) -> StoreResult {
        sqlx::query("INSERT INTO users (id, username, count) VALUES ($1, $2, 0)")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(insert_error)?;
        Ok(())
    }

    async fn get(&self, id: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>("SELECT id, username, count FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: i64) -> bool {
        let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await;

        match found {
            Ok(found) => found,
            Err(err) => {
                log::error!("exists lookup for user {} failed: {}", id, err);
                false
            }
        }
    }

    async fn increment_count(&self, id: i64) -> StoreResult {
        let result = sqlx::query("UPDATE users SET count = count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, username, count FROM users")
            .fetch_all(&self.pool)
            .await?;
        log::debug!("list_all: {} users", users.len());
        Ok(users)
    }

    async fn delete(&self, id: i64) -> StoreResult {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_by_handle(&self, username: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, count FROM users WHERE username = $1 ORDER BY id LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }
}
