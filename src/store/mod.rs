use async_trait::async_trait;

use crate::models::User;

#[cfg(test)]
pub(crate) mod memory;
mod postgres;

pub(crate) use postgres::PgUserStore;

#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("user not found")]
    NotFound,
    #[error("user already exists")]
    AlreadyExists,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub(crate) type StoreResult<T = ()> = Result<T, StoreError>;

/// Persistence of [`User`] records.
#[async_trait]
pub(crate) trait UserStore: Send + Sync {
    /// Inserts a user with a zero count. Fails with `AlreadyExists` on a
    /// duplicate id.
    async fn create(&self, id: i64, username: &str) -> StoreResult;

    async fn get(&self, id: i64) -> StoreResult<User>;

    /// Lookup errors are logged and reported as `false`.
    async fn exists(&self, id: i64) -> bool;

    /// Adds one to the user's count in a single atomic step.
    async fn increment_count(&self, id: i64) -> StoreResult;

    async fn list_all(&self) -> StoreResult<Vec<User>>;

    /// Deleting a missing user is not an error.
    async fn delete(&self, id: i64) -> StoreResult;

    async fn get_by_handle(&self, username: &str) -> StoreResult<User>;
}
