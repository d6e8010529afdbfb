use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::{RecordStore, ScanPage, StorageError, UserRecord};
use crate::services::user::Role;

/// In-memory record store. Backs unit tests and the `memory` storage backend
/// for local runs; state does not survive a restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<u64, super::UserInfo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, id: u64) -> Result<Option<UserRecord>, StorageError> {
        Ok(self
            .records
            .get(&id)
            .map(|info| UserRecord { id, info: info.clone() }))
    }

    async fn put(&self, record: &UserRecord) -> Result<(), StorageError> {
        self.records.insert(record.id, record.info.clone());
        Ok(())
    }

    async fn update(&self, record: &UserRecord) -> Result<(), StorageError> {
        self.records.insert(record.id, record.info.clone());
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        self.records.remove(&id);
        Ok(())
    }

    async fn scan_by_role(
        &self,
        role: Role,
        start_after: Option<u64>,
        limit: usize,
    ) -> Result<ScanPage, StorageError> {
        let cursor = start_after.unwrap_or(0);

        let mut ids: Vec<u64> = self
            .records
            .iter()
            .filter(|entry| entry.value().role == role && *entry.key() > cursor)
            .map(|entry| *entry.key())
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);

        let items: Vec<UserRecord> = ids
            .into_iter()
            .filter_map(|id| {
                self.records
                    .get(&id)
                    .map(|info| UserRecord { id, info: info.clone() })
            })
            .collect();

        let next = if items.len() == limit {
            items.last().map(|record| record.id)
        } else {
            None
        };

        Ok(ScanPage { items, next })
    }
}

#[cfg(test)]
mod tests {
    use super::super::UserInfo;
    use super::*;

    fn record(id: u64, role: Role) -> UserRecord {
        UserRecord {
            id,
            info: UserInfo {
                role,
                ..UserInfo::default()
            },
        }
    }

    #[tokio::test]
    async fn get_put_delete_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get(1).await.unwrap().is_none());

        store.put(&record(1, Role::User)).await.unwrap();
        assert_eq!(store.get(1).await.unwrap().unwrap().info.role, Role::User);

        store.delete(1).await.unwrap();
        assert!(store.get(1).await.unwrap().is_none());

        // deleting again is not an error
        store.delete(1).await.unwrap();
    }

    #[tokio::test]
    async fn scan_pages_are_ordered_and_resumable() {
        let store = MemoryStore::new();
        for id in 1..=7 {
            store.put(&record(id, Role::User)).await.unwrap();
        }
        store.put(&record(100, Role::Admin)).await.unwrap();

        let first = store.scan_by_role(Role::User, None, 3).await.unwrap();
        assert_eq!(
            first.items.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(first.next, Some(3));

        let second = store.scan_by_role(Role::User, first.next, 3).await.unwrap();
        assert_eq!(
            second.items.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![4, 5, 6]
        );

        let third = store.scan_by_role(Role::User, second.next, 3).await.unwrap();
        assert_eq!(third.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![7]);
        assert_eq!(third.next, None);
    }
}
