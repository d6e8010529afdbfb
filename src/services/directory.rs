use rust_decimal::Decimal;
use std::sync::Arc;

use crate::error::BotResult;
use crate::services::user::{ChatModel, Language, Role};
use crate::storage::{RecordStore, UserInfo, UserRecord};

/// Maximum display name length accepted by `set_display_name`.
pub const MAX_NAME_LEN: usize = 32;

const SCAN_PAGE_SIZE: usize = 32;

fn budget_step() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetStep {
    Plus,
    Minus,
}

/// Domain wrapper over the record store: identity resolution, validated
/// field setters, role listing and deletion.
///
/// Every setter is a read-modify-write of the whole info blob. Two concurrent
/// setters for the same identity race at that granularity and the last writer
/// wins; this is a known, accepted limitation of the design.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Point lookup. An identity with no record resolves to `None`, never to
    /// an error.
    pub async fn resolve(&self, id: u64) -> BotResult<Option<UserRecord>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn language(&self, id: u64) -> BotResult<Option<Language>> {
        Ok(self.resolve(id).await?.map(|record| record.info.language))
    }

    pub async fn model(&self, id: u64) -> BotResult<Option<ChatModel>> {
        Ok(self.resolve(id).await?.map(|record| record.info.model))
    }

    /// Remaining budget; 0 for an identity with no record.
    pub async fn budget(&self, id: u64) -> BotResult<Decimal> {
        Ok(self
            .resolve(id)
            .await?
            .map(|record| record.info.budget)
            .unwrap_or(Decimal::ZERO))
    }

    async fn write_field<F>(&self, id: u64, mutate: F) -> BotResult<bool>
    where
        F: FnOnce(&mut UserInfo),
    {
        match self.store.get(id).await? {
            Some(mut record) => {
                mutate(&mut record.info);
                self.store.update(&record).await?;
            }
            None => {
                let mut info = UserInfo::default();
                mutate(&mut info);
                self.store.put(&UserRecord { id, info }).await?;
            }
        }
        Ok(true)
    }

    pub async fn set_role(&self, id: u64, role: Role) -> BotResult<bool> {
        self.write_field(id, |info| info.role = role).await
    }

    pub async fn set_language(&self, id: u64, language: Language) -> BotResult<bool> {
        self.write_field(id, |info| info.language = language).await
    }

    pub async fn set_model(&self, id: u64, model: ChatModel) -> BotResult<bool> {
        self.write_field(id, |info| info.model = model).await
    }

    /// Rejects names longer than `MAX_NAME_LEN` characters without touching
    /// storage.
    pub async fn set_display_name(&self, id: u64, name: &str) -> BotResult<bool> {
        if name.chars().count() > MAX_NAME_LEN {
            return Ok(false);
        }
        let name = name.to_string();
        self.write_field(id, |info| info.name = name).await
    }

    /// Rejects negative budgets without touching storage.
    pub async fn set_budget(&self, id: u64, budget: Decimal) -> BotResult<bool> {
        if budget < Decimal::ZERO {
            return Ok(false);
        }
        self.write_field(id, |info| info.budget = budget).await
    }

    /// Steps the budget by 0.1. Decrements clamp to exactly 0 once the
    /// balance is at or below one step. Returns the new balance.
    pub async fn adjust_budget(&self, id: u64, step: BudgetStep) -> BotResult<Decimal> {
        let current = self.budget(id).await?;
        let next = match step {
            BudgetStep::Plus => current + budget_step(),
            BudgetStep::Minus if current > budget_step() => current - budget_step(),
            BudgetStep::Minus => Decimal::ZERO,
        };
        self.set_budget(id, next).await?;
        Ok(next)
    }

    /// All records with the given role. Pages through the store until no
    /// continuation token remains; callers never see a truncated page.
    pub async fn list_by_role(&self, role: Role) -> BotResult<Vec<UserRecord>> {
        let mut records = Vec::new();
        let mut cursor = None;

        loop {
            let page = self.store.scan_by_role(role, cursor, SCAN_PAGE_SIZE).await?;
            records.extend(page.items);
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    /// Irreversible. The store's return status is trusted; absence before
    /// delete is not checked, so deleting an unknown identity succeeds.
    pub async fn delete(&self, id: u64) -> BotResult<bool> {
        self.store.delete(id).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn absent_identity_resolves_to_none() {
        let dir = directory();
        assert!(dir.resolve(42).await.unwrap().is_none());
        assert!(dir.language(42).await.unwrap().is_none());
        assert_eq!(dir.budget(42).await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn first_setter_materializes_record_with_defaults() {
        let dir = directory();
        assert!(dir.set_role(1, Role::Admin).await.unwrap());

        let record = dir.resolve(1).await.unwrap().unwrap();
        assert_eq!(record.info.role, Role::Admin);
        assert_eq!(record.info.name, "unknown");
        assert_eq!(record.info.language, Language::English);
        assert_eq!(record.info.model, ChatModel::Gpt35Turbo);
        assert_eq!(record.info.budget, Decimal::ZERO);
    }

    #[tokio::test]
    async fn setters_preserve_sibling_fields() {
        let dir = directory();
        dir.set_role(1, Role::User).await.unwrap();
        dir.set_language(1, Language::Russian).await.unwrap();
        dir.set_model(1, ChatModel::Gpt4).await.unwrap();
        dir.set_display_name(1, "alice").await.unwrap();

        let record = dir.resolve(1).await.unwrap().unwrap();
        assert_eq!(record.info.role, Role::User);
        assert_eq!(record.info.language, Language::Russian);
        assert_eq!(record.info.model, ChatModel::Gpt4);
        assert_eq!(record.info.name, "alice");
    }

    #[tokio::test]
    async fn over_length_name_is_rejected_without_mutation() {
        let dir = directory();
        dir.set_display_name(1, "bob").await.unwrap();

        let long_name = "x".repeat(40);
        assert!(!dir.set_display_name(1, &long_name).await.unwrap());
        assert_eq!(dir.resolve(1).await.unwrap().unwrap().info.name, "bob");

        // exactly 32 characters is still fine
        let edge = "y".repeat(32);
        assert!(dir.set_display_name(1, &edge).await.unwrap());
        assert_eq!(dir.resolve(1).await.unwrap().unwrap().info.name, edge);
    }

    #[tokio::test]
    async fn negative_budget_is_rejected_without_mutation() {
        let dir = directory();
        dir.set_budget(1, Decimal::new(5, 1)).await.unwrap();

        assert!(!dir.set_budget(1, Decimal::new(-1, 1)).await.unwrap());
        assert_eq!(dir.budget(1).await.unwrap(), Decimal::new(5, 1));
    }

    #[tokio::test]
    async fn budget_steps_clamp_to_zero() {
        let dir = directory();

        // increment from nothing materializes at 0.1
        assert_eq!(
            dir.adjust_budget(1, BudgetStep::Plus).await.unwrap(),
            Decimal::new(1, 1)
        );

        dir.set_budget(1, Decimal::new(5, 1)).await.unwrap();
        assert_eq!(
            dir.adjust_budget(1, BudgetStep::Minus).await.unwrap(),
            Decimal::new(4, 1)
        );

        dir.set_budget(1, Decimal::new(1, 1)).await.unwrap();
        assert_eq!(
            dir.adjust_budget(1, BudgetStep::Minus).await.unwrap(),
            Decimal::ZERO
        );

        dir.set_budget(1, Decimal::new(5, 2)).await.unwrap(); // 0.05
        assert_eq!(
            dir.adjust_budget(1, BudgetStep::Minus).await.unwrap(),
            Decimal::ZERO
        );

        assert_eq!(
            dir.adjust_budget(1, BudgetStep::Minus).await.unwrap(),
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn list_by_role_concatenates_all_pages() {
        let dir = directory();
        for id in 1..=80 {
            dir.set_role(id, Role::User).await.unwrap();
        }
        for id in 100..=104 {
            dir.set_role(id, Role::Admin).await.unwrap();
        }

        let users = dir.list_by_role(Role::User).await.unwrap();
        assert_eq!(users.len(), 80);
        let mut ids: Vec<u64> = users.iter().map(|record| record.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 80);

        let admins = dir.list_by_role(Role::Admin).await.unwrap();
        assert_eq!(admins.len(), 5);

        assert!(dir.list_by_role(Role::Owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_resolves_to_unknown() {
        let dir = directory();
        dir.set_role(1, Role::User).await.unwrap();

        assert!(dir.delete(1).await.unwrap());
        assert!(dir.resolve(1).await.unwrap().is_none());

        // deleting a non-existent identity is still a success
        assert!(dir.delete(1).await.unwrap());
        assert!(dir.delete(999).await.unwrap());
    }

    #[tokio::test]
    async fn set_role_then_resolve_round_trips() {
        let dir = directory();
        for role in [Role::Owner, Role::Admin, Role::User, Role::Banned] {
            dir.set_role(7, role).await.unwrap();
            assert_eq!(dir.resolve(7).await.unwrap().unwrap().info.role, role);
        }
    }
}
