use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{StoreError, StoreResult, UserStore};
use crate::models::User;

/// In-memory store used by the dispatcher tests.
#[derive(Default)]
pub(crate) struct MemoryUserStore {
    users: Mutex<HashMap<i64, User>>,
    unavailable: AtomicBool,
}

impl MemoryUserStore {
    /// While set, every call fails as if the database were down.
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    pub(crate) async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, id: i64, username: &str) -> StoreResult {
        self.check()?;
        let mut users = self.users.lock().await;
        if users.contains_key(&id) {
            return Err(StoreError::AlreadyExists);
        }
        users.insert(id, User::new(id, username));
        Ok(())
    }

    async fn get(&self, id: i64) -> StoreResult<User> {
        self.check()?;
        self.users
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: i64) -> bool {
        if self.check().is_err() {
            return false;
        }
        self.users.lock().await.contains_key(&id)
    }

    async fn increment_count(&self, id: i64) -> StoreResult {
        self.check()?;
        let mut users = self.users.lock().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.count += 1;
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        self.check()?;
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> StoreResult {
        self.check()?;
        self.users.lock().await.remove(&id);
        Ok(())
    }

    async fn get_by_handle(&self, username: &str) -> StoreResult<User> {
        self.check()?;
        self.users
            .lock()
            .await
            .values()
            .filter(|user| user.username == username)
            .min_by_key(|user| user.id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = MemoryUserStore::default();
        store.create(1, "alice").await.unwrap();

        assert!(matches!(
            store.create(1, "alice").await,
            Err(StoreError::AlreadyExists)
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn increment_and_delete() {
        let store = MemoryUserStore::default();
        store.create(1, "alice").await.unwrap();
        store.increment_count(1).await.unwrap();
        store.increment_count(1).await.unwrap();
        assert_eq!(store.get(1).await.unwrap().count, 2);

        store.delete(1).await.unwrap();
        store.delete(1).await.unwrap();
        assert!(!store.exists(1).await);
        assert!(matches!(store.get(1).await, Err(StoreError::NotFound)));
        assert!(matches!(
            store.increment_count(1).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn lookup_by_handle() {
        let store = MemoryUserStore::default();
        store.create(2, "bob").await.unwrap();
        store.create(1, "bob").await.unwrap();

        assert_eq!(store.get_by_handle("bob").await.unwrap().id, 1);
        assert!(matches!(
            store.get_by_handle("carol").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unavailable_store_fails_quietly_on_exists() {
        let store = MemoryUserStore::default();
        store.create(1, "alice").await.unwrap();
        store.set_unavailable(true);

        assert!(!store.exists(1).await);
        assert!(matches!(store.get(1).await, Err(StoreError::Database(_))));
    }
}
