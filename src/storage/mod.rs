mod error;
mod memory;
mod turso;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use turso::TursoStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::services::user::{ChatModel, Language, Role};

fn default_name() -> String {
    "unknown".to_string()
}

/// The canonical schema-with-defaults decoder for the per-user info blob.
/// Every read path goes through this one type, so a record written by an
/// older layout still decodes with documented defaults for missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub model: ChatModel,
    #[serde(default)]
    pub budget: Decimal,
}

impl Default for UserInfo {
    fn default() -> Self {
        Self {
            name: default_name(),
            role: Role::default(),
            language: Language::default(),
            model: ChatModel::default(),
            budget: Decimal::ZERO,
        }
    }
}

/// One record per distinct external identity. The Telegram user id alone is
/// the uniqueness key; the display name is a mutable field inside the blob.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: u64,
    pub info: UserInfo,
}

/// One page of a role-filtered scan. `next` carries the id to resume after;
/// `None` means the scan is exhausted.
#[derive(Debug, Clone)]
pub struct ScanPage {
    pub items: Vec<UserRecord>,
    pub next: Option<u64>,
}

/// Keyed CRUD plus a paged role-filtered scan over user records. All writes
/// are full-blob; there is no partial update at this layer.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn get(&self, id: u64) -> Result<Option<UserRecord>, StorageError>;

    /// Inserts the record, replacing any existing one with the same id.
    async fn put(&self, record: &UserRecord) -> Result<(), StorageError>;

    /// Overwrites the info blob of an existing record.
    async fn update(&self, record: &UserRecord) -> Result<(), StorageError>;

    /// Idempotent; deleting an absent id is not an error.
    async fn delete(&self, id: u64) -> Result<(), StorageError>;

    async fn scan_by_role(
        &self,
        role: Role,
        start_after: Option<u64>,
        limit: usize,
    ) -> Result<ScanPage, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_decodes_with_defaults_for_missing_fields() {
        let info: UserInfo = serde_json::from_str("{}").unwrap();
        assert_eq!(info, UserInfo::default());
        assert_eq!(info.name, "unknown");
        assert_eq!(info.role, Role::Banned);
        assert_eq!(info.language, Language::English);
        assert_eq!(info.model, ChatModel::Gpt35Turbo);
        assert_eq!(info.budget, Decimal::ZERO);
    }

    #[test]
    fn info_decodes_partial_blob() {
        let info: UserInfo =
            serde_json::from_str(r#"{"role":"admin","budget":"0.3"}"#).unwrap();
        assert_eq!(info.role, Role::Admin);
        assert_eq!(info.budget, Decimal::new(3, 1));
        assert_eq!(info.name, "unknown");
        assert_eq!(info.model, ChatModel::Gpt35Turbo);
    }

    #[test]
    fn info_round_trips_through_json() {
        let info = UserInfo {
            name: "alice".into(),
            role: Role::User,
            language: Language::Russian,
            model: ChatModel::Gpt4,
            budget: Decimal::new(12, 1),
        };
        let blob = serde_json::to_string(&info).unwrap();
        assert_eq!(serde_json::from_str::<UserInfo>(&blob).unwrap(), info);
    }

    #[test]
    fn info_rejects_out_of_enum_values() {
        assert!(serde_json::from_str::<UserInfo>(r#"{"role":"root"}"#).is_err());
        assert!(serde_json::from_str::<UserInfo>(r#"{"language":"de"}"#).is_err());
    }
}
