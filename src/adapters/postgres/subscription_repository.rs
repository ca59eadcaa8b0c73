//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Backed by the `user_subscriptions` table. Tier and status are stored
//! as lower-case text using the same vocabulary as the API.

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{SubscriptionRecord, SubscriptionStatus, SubscriptionTier};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT user_id, subscription_tier, subscription_status,
           stripe_customer_id, stripe_subscription_id,
           current_period_start, current_period_end, cancel_at_period_end,
           canceled_at, trial_start, trial_end, created_at, updated_at
    FROM user_subscriptions
"#;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let sql = format!("{} WHERE {} = $1", SELECT_COLUMNS, column);
        let row: Option<SubscriptionRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to find subscription: {}", e))
                    .with_detail("column", column)
            })?;

        row.map(SubscriptionRecord::try_from).transpose()
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    user_id: Uuid,
    subscription_tier: String,
    subscription_status: String,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    current_period_start: Option<DateTime<Utc>>,
    current_period_end: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    canceled_at: Option<DateTime<Utc>>,
    trial_start: Option<DateTime<Utc>>,
    trial_end: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let tier: SubscriptionTier = row.subscription_tier.parse().map_err(|e| {
            DomainError::database(format!("Invalid tier value: {}", e))
        })?;
        let status: SubscriptionStatus = row.subscription_status.parse().map_err(|e| {
            DomainError::database(format!("Invalid status value: {}", e))
        })?;

        Ok(SubscriptionRecord {
            user_id: UserId::new(row.user_id.to_string())
                .map_err(|e| DomainError::database(format!("Invalid user_id: {}", e)))?,
            tier,
            status,
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            current_period_start: row.current_period_start.map(Timestamp::from_datetime),
            current_period_end: row.current_period_end.map(Timestamp::from_datetime),
            cancel_at_period_end: row.cancel_at_period_end,
            canceled_at: row.canceled_at.map(Timestamp::from_datetime),
            trial_start: row.trial_start.map(Timestamp::from_datetime),
            trial_end: row.trial_end.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// User ids that are not UUIDs cannot match a row.
fn parse_user_id_as_uuid(user_id: &UserId) -> Option<Uuid> {
    match Uuid::parse_str(user_id.as_str()) {
        Ok(uuid) => Some(uuid),
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "User id is not a UUID");
            None
        }
    }
}

fn datetime(ts: Option<Timestamp>) -> Option<DateTime<Utc>> {
    ts.map(|t| *t.as_datetime())
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        self.find_one("stripe_customer_id", customer_id).await
    }

    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        self.find_one("stripe_subscription_id", subscription_id).await
    }

    async fn update(&self, record: &SubscriptionRecord) -> Result<bool, DomainError> {
        let Some(user_uuid) = parse_user_id_as_uuid(&record.user_id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions SET
                subscription_tier = $2,
                subscription_status = $3,
                stripe_customer_id = $4,
                stripe_subscription_id = $5,
                current_period_start = $6,
                current_period_end = $7,
                cancel_at_period_end = $8,
                canceled_at = $9,
                trial_start = $10,
                trial_end = $11,
                updated_at = $12
            WHERE user_id = $1
            "#,
        )
        .bind(user_uuid)
        .bind(record.tier.as_str())
        .bind(record.status.as_str())
        .bind(&record.stripe_customer_id)
        .bind(&record.stripe_subscription_id)
        .bind(datetime(record.current_period_start))
        .bind(datetime(record.current_period_end))
        .bind(record.cancel_at_period_end)
        .bind(datetime(record.canceled_at))
        .bind(datetime(record.trial_start))
        .bind(datetime(record.trial_end))
        .bind(record.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn link_stripe_ids(
        &self,
        user_id: &UserId,
        customer_id: &str,
        subscription_id: &str,
    ) -> Result<bool, DomainError> {
        let Some(user_uuid) = parse_user_id_as_uuid(user_id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r#"
            UPDATE user_subscriptions SET
                stripe_customer_id = $2,
                stripe_subscription_id = $3,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_uuid)
        .bind(customer_id)
        .bind(subscription_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to link checkout: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
