//! In-process store.
//!
//! Holds users and records in hash maps behind a single async mutex. Every
//! operation takes the lock once, which makes upserts and deletes atomic in
//! the same way the `PostgreSQL` statements are.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use babytrack_core::{ClientRecordId, Email, UserId};

use super::{RecordStore, RepositoryError, UserStore};
use crate::models::{Record, RecordFields, User};

/// Store backed by in-memory maps.
///
/// Cheap to clone; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryData>>,
}

#[derive(Debug, Default)]
struct MemoryData {
    users: HashMap<Email, (User, String)>,
    records: HashMap<(UserId, ClientRecordId), Record>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(
        &self,
        email: &Email,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut data = self.inner.lock().await;
        if data.users.contains_key(email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::generate(),
            email: email.clone(),
            name: name.map(str::to_owned),
            created_at: Utc::now(),
        };
        data.users
            .insert(email.clone(), (user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let data = self.inner.lock().await;
        Ok(data.users.get(email).map(|(user, _)| user.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let data = self.inner.lock().await;
        Ok(data.users.get(email).cloned())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(
        &self,
        owner: UserId,
        id: ClientRecordId,
        fields: RecordFields,
    ) -> Result<Record, RepositoryError> {
        let mut data = self.inner.lock().await;
        let record = match data.records.entry((owner, id)) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().apply(fields);
                slot.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(Record::create(owner, id, fields)).clone(),
        };
        Ok(record)
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        let data = self.inner.lock().await;
        let mut records: Vec<Record> = data
            .records
            .values()
            .filter(|record| record.owner == owner)
            .cloned()
            .collect();
        records.sort_by_key(|record| (Reverse(record.timestamp), record.id.into_inner()));
        Ok(records)
    }

    async fn delete_by_owner_and_id(
        &self,
        owner: UserId,
        id: ClientRecordId,
    ) -> Result<Option<Record>, RepositoryError> {
        let mut data = self.inner.lock().await;
        Ok(data.records.remove(&(owner, id)))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use babytrack_core::RecordKind;

    use super::*;
    use crate::models::record::tests::{diaper, feeding};

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        store
            .create_user(&email("a@x.com"), "hash", Some("A"))
            .await
            .unwrap();

        let err = store
            .create_user(&email("a@x.com"), "other", None)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_get_password_hash_returns_stored_hash() {
        let store = MemoryStore::new();
        let user = store
            .create_user(&email("a@x.com"), "$2b$10$hash", None)
            .await
            .unwrap();

        let (found, hash) = store
            .get_password_hash(&email("a@x.com"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found, user);
        assert_eq!(hash, "$2b$10$hash");
        assert!(
            store
                .find_by_email(&email("b@x.com"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_repeated_upsert_keeps_one_record() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let id = ClientRecordId::new(1);

        for amount in [60.0, 90.0, 120.0] {
            store
                .upsert(owner, id, feeding("bottle", amount))
                .await
                .unwrap();
        }

        let records = store.list_by_owner(owner).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, Some(120.0));
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_record() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let id = ClientRecordId::new(7);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert(owner, id, feeding("bottle", f64::from(i)))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.list_by_owner(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_category_change_keeps_feeding_fields() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let id = ClientRecordId::new(3);

        store
            .upsert(owner, id, feeding("bottle", 120.0))
            .await
            .unwrap();
        let updated = store.upsert(owner, id, diaper("wet")).await.unwrap();

        assert_eq!(updated.kind, RecordKind::Diaper);
        assert_eq!(updated.diaper_type.as_deref(), Some("wet"));
        assert_eq!(updated.feeding_type.as_deref(), Some("bottle"));
        assert_eq!(updated.amount, Some(120.0));
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let store = MemoryStore::new();
        let alice = UserId::generate();
        let bob = UserId::generate();

        store
            .upsert(alice, ClientRecordId::new(1), feeding("bottle", 100.0))
            .await
            .unwrap();
        store
            .upsert(alice, ClientRecordId::new(2), diaper("wet"))
            .await
            .unwrap();
        store
            .upsert(bob, ClientRecordId::new(1), diaper("dirty"))
            .await
            .unwrap();

        let records = store.list_by_owner(alice).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id.into_inner()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(records.iter().all(|r| r.owner == alice));

        assert!(
            store
                .list_by_owner(UserId::generate())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_twice_returns_none_second_time() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let id = ClientRecordId::new(1);
        store
            .upsert(owner, id, feeding("bottle", 120.0))
            .await
            .unwrap();

        assert!(
            store
                .delete_by_owner_and_id(owner, id)
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            store
                .delete_by_owner_and_id(owner, id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_cannot_reach_other_owner() {
        let store = MemoryStore::new();
        let owner = UserId::generate();
        let id = ClientRecordId::new(1);
        store
            .upsert(owner, id, feeding("bottle", 120.0))
            .await
            .unwrap();

        let other = UserId::generate();
        assert!(
            store
                .delete_by_owner_and_id(other, id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.list_by_owner(owner).await.unwrap().len(), 1);
    }
}
