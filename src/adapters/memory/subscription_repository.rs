//! In-memory subscription repository.
//!
//! Backs the integration tests and local runs without PostgreSQL.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::SubscriptionRecord;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    records: Arc<RwLock<HashMap<UserId, SubscriptionRecord>>>,
    fail_storage: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, replacing any existing one for the same user.
    pub async fn insert(&self, record: SubscriptionRecord) {
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record);
    }

    pub async fn get(&self, user_id: &UserId) -> Option<SubscriptionRecord> {
        self.records.read().await.get(user_id).cloned()
    }

    /// Number of successful writes (`update` + `link_stripe_ids`).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail with a database error.
    pub fn set_storage_failure(&self, fail: bool) {
        self.fail_storage.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.fail_storage.load(Ordering::SeqCst) {
            return Err(DomainError::database("storage unavailable"));
        }
        Ok(())
    }

    async fn find_where<F>(&self, predicate: F) -> Result<Option<SubscriptionRecord>, DomainError>
    where
        F: Fn(&SubscriptionRecord) -> bool,
    {
        self.check_available()?;
        let records = self.records.read().await;
        Ok(records.values().find(|r| predicate(r)).cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        self.find_where(|r| r.stripe_customer_id.as_deref() == Some(customer_id))
            .await
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        self.find_where(|r| r.stripe_subscription_id.as_deref() == Some(subscription_id))
            .await
    }

    async fn update(&self, record: &SubscriptionRecord) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        match records.get_mut(&record.user_id) {
            Some(existing) => {
                let created_at = existing.created_at;
                *existing = record.clone();
                existing.created_at = created_at;
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn link_stripe_ids(
        &self,
        user_id: &UserId,
        customer_id: &str,
        subscription_id: &str,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        let mut records = self.records.write().await;
        match records.get_mut(user_id) {
            Some(existing) => {
                existing.link_stripe(customer_id, subscription_id, Timestamp::now());
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
