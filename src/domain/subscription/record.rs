//! The persisted per-user subscription record.
//!
//! Records are created by the account service when a user signs up; the
//! reconciler only ever rewrites them from Stripe's view of the world.
//!
//! # Invariants
//!
//! - At most one record per `user_id`
//! - `tier` is derived from the latest price id, never set independently
//! - Applying the same snapshot twice leaves the record unchanged

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::{PriceTierTable, StripeSubscription, SubscriptionStatus, SubscriptionTier};

/// One row of `user_subscriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub user_id: UserId,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<Timestamp>,
    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SubscriptionRecord {
    /// A fresh free-tier record, as the account service creates on signup.
    pub fn new_free(user_id: UserId, now: Timestamp) -> Self {
        Self {
            user_id,
            tier: SubscriptionTier::Free,
            status: SubscriptionStatus::Active,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            current_period_start: None,
            current_period_end: None,
            cancel_at_period_end: false,
            canceled_at: None,
            trial_start: None,
            trial_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the billing fields with Stripe's latest snapshot.
    ///
    /// Period boundaries absent from the snapshot keep their stored value;
    /// nullable Stripe fields (`canceled_at`, trials) are copied as-is.
    pub fn apply_snapshot(&mut self, snapshot: &SubscriptionSnapshot, now: Timestamp) {
        self.tier = snapshot.tier;
        self.status = snapshot.status;
        self.stripe_subscription_id = Some(snapshot.subscription_id.clone());
        if let Some(start) = snapshot.current_period_start {
            self.current_period_start = Some(start);
        }
        if let Some(end) = snapshot.current_period_end {
            self.current_period_end = Some(end);
        }
        self.cancel_at_period_end = snapshot.cancel_at_period_end;
        self.canceled_at = snapshot.canceled_at;
        self.trial_start = snapshot.trial_start;
        self.trial_end = snapshot.trial_end;
        self.updated_at = now;
    }

    /// Downgrade applied when Stripe deletes the subscription.
    pub fn downgrade_to_free(&mut self, now: Timestamp) {
        self.tier = SubscriptionTier::Free;
        self.status = SubscriptionStatus::Canceled;
        self.canceled_at = Some(now);
        self.current_period_end = Some(now);
        self.updated_at = now;
    }

    /// Attaches the Stripe ids produced by a completed checkout.
    pub fn link_stripe(&mut self, customer_id: &str, subscription_id: &str, now: Timestamp) {
        self.stripe_customer_id = Some(customer_id.to_string());
        self.stripe_subscription_id = Some(subscription_id.to_string());
        self.updated_at = now;
    }
}

/// Billing state extracted from a Stripe subscription object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub subscription_id: String,
    pub customer_id: String,
    pub price_id: Option<String>,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<Timestamp>,
    pub current_period_end: Option<Timestamp>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<Timestamp>,
    pub trial_start: Option<Timestamp>,
    pub trial_end: Option<Timestamp>,
}

impl SubscriptionSnapshot {
    pub fn from_stripe(subscription: &StripeSubscription, prices: &PriceTierTable) -> Self {
        let price_id = subscription.primary_price_id().map(str::to_string);
        Self {
            subscription_id: subscription.id.clone(),
            customer_id: subscription.customer.clone(),
            tier: prices.tier_for(price_id.as_deref()),
            price_id,
            status: subscription.status,
            current_period_start: unix(subscription.period_start()),
            current_period_end: unix(subscription.period_end()),
            cancel_at_period_end: subscription.cancel_at_period_end,
            canceled_at: unix(subscription.canceled_at),
            trial_start: unix(subscription.trial_start),
            trial_end: unix(subscription.trial_end),
        }
    }
}

fn unix(secs: Option<i64>) -> Option<Timestamp> {
    secs.and_then(Timestamp::from_unix_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PLUS_MONTHLY_PRICE_ID;
    use proptest::prelude::*;
    use serde_json::json;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_unix_seconds(secs).unwrap()
    }

    fn stripe_subscription(value: serde_json::Value) -> StripeSubscription {
        serde_json::from_value(value).unwrap()
    }

    fn plus_subscription() -> StripeSubscription {
        stripe_subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "current_period_start": 1699913600,
            "current_period_end": 1702592000,
            "cancel_at_period_end": false,
            "canceled_at": null,
            "trial_start": null,
            "trial_end": null,
            "items": { "data": [{ "price": { "id": PLUS_MONTHLY_PRICE_ID } }] }
        }))
    }

    // ══════════════════════════════════════════════════════════════
    // Snapshot extraction
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn snapshot_maps_price_and_periods() {
        let snapshot = SubscriptionSnapshot::from_stripe(&plus_subscription(), &PriceTierTable::default());

        assert_eq!(snapshot.tier, SubscriptionTier::Plus);
        assert_eq!(snapshot.status, SubscriptionStatus::Active);
        assert_eq!(snapshot.current_period_end, Some(ts(1702592000)));
        assert_eq!(snapshot.customer_id, "cus_1");
    }

    #[test]
    fn snapshot_with_unknown_price_is_free() {
        let sub = stripe_subscription(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "items": { "data": [{ "price": { "id": "price_legacy" } }] }
        }));

        let snapshot = SubscriptionSnapshot::from_stripe(&sub, &PriceTierTable::default());

        assert_eq!(snapshot.tier, SubscriptionTier::Free);
        assert_eq!(snapshot.price_id.as_deref(), Some("price_legacy"));
    }

    // ══════════════════════════════════════════════════════════════
    // Record transitions
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn apply_snapshot_overwrites_billing_fields() {
        let mut record = SubscriptionRecord::new_free(user(), ts(1));
        let snapshot = SubscriptionSnapshot::from_stripe(&plus_subscription(), &PriceTierTable::default());

        record.apply_snapshot(&snapshot, ts(2));

        assert_eq!(record.tier, SubscriptionTier::Plus);
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(record.current_period_start, Some(ts(1699913600)));
        assert_eq!(record.current_period_end, Some(ts(1702592000)));
        assert_eq!(record.updated_at, ts(2));
        assert_eq!(record.created_at, ts(1));
    }

    #[test]
    fn apply_snapshot_is_idempotent() {
        let snapshot = SubscriptionSnapshot::from_stripe(&plus_subscription(), &PriceTierTable::default());
        let mut once = SubscriptionRecord::new_free(user(), ts(1));
        once.apply_snapshot(&snapshot, ts(2));

        let mut twice = once.clone();
        twice.apply_snapshot(&snapshot, ts(2));

        assert_eq!(once, twice);
    }

    #[test]
    fn apply_snapshot_keeps_periods_when_absent() {
        let mut record = SubscriptionRecord::new_free(user(), ts(1));
        record.current_period_end = Some(ts(500));
        let sub = stripe_subscription(json!({
            "id": "sub_1", "customer": "cus_1", "status": "past_due"
        }));

        record.apply_snapshot(&SubscriptionSnapshot::from_stripe(&sub, &PriceTierTable::default()), ts(2));

        assert_eq!(record.current_period_end, Some(ts(500)));
        assert_eq!(record.status, SubscriptionStatus::PastDue);
    }

    #[test]
    fn apply_snapshot_clears_canceled_at_on_reactivation() {
        let mut record = SubscriptionRecord::new_free(user(), ts(1));
        record.canceled_at = Some(ts(10));

        let snapshot = SubscriptionSnapshot::from_stripe(&plus_subscription(), &PriceTierTable::default());
        record.apply_snapshot(&snapshot, ts(2));

        assert_eq!(record.canceled_at, None);
    }

    #[test]
    fn downgrade_sets_free_canceled_and_ends_period_now() {
        let mut record = SubscriptionRecord::new_free(user(), ts(1));
        record.tier = SubscriptionTier::Max;
        record.current_period_end = Some(ts(9_999_999));

        record.downgrade_to_free(ts(42));

        assert_eq!(record.tier, SubscriptionTier::Free);
        assert_eq!(record.status, SubscriptionStatus::Canceled);
        assert_eq!(record.canceled_at, Some(ts(42)));
        assert_eq!(record.current_period_end, Some(ts(42)));
    }

    #[test]
    fn link_stripe_sets_both_ids() {
        let mut record = SubscriptionRecord::new_free(user(), ts(1));

        record.link_stripe("cus_1", "sub_1", ts(3));

        assert_eq!(record.stripe_customer_id.as_deref(), Some("cus_1"));
        assert_eq!(record.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(record.tier, SubscriptionTier::Free);
    }

    fn any_status() -> impl Strategy<Value = SubscriptionStatus> {
        prop_oneof![
            Just(SubscriptionStatus::Active),
            Just(SubscriptionStatus::Canceled),
            Just(SubscriptionStatus::Incomplete),
            Just(SubscriptionStatus::IncompleteExpired),
            Just(SubscriptionStatus::PastDue),
            Just(SubscriptionStatus::Trialing),
            Just(SubscriptionStatus::Unpaid),
            Just(SubscriptionStatus::Paused),
        ]
    }

    proptest! {
        #[test]
        fn reapplying_any_snapshot_changes_nothing(
            status in any_status(),
            start in proptest::option::of(0i64..2_000_000_000),
            end in proptest::option::of(0i64..2_000_000_000),
            cancel_at_period_end in any::<bool>(),
            plus in any::<bool>(),
        ) {
            let price = if plus { PLUS_MONTHLY_PRICE_ID } else { "price_other" };
            let sub = stripe_subscription(json!({
                "id": "sub_1",
                "customer": "cus_1",
                "status": status.as_str(),
                "current_period_start": start,
                "current_period_end": end,
                "cancel_at_period_end": cancel_at_period_end,
                "items": { "data": [{ "price": { "id": price } }] }
            }));
            let snapshot = SubscriptionSnapshot::from_stripe(&sub, &PriceTierTable::default());

            let mut once = SubscriptionRecord::new_free(user(), ts(1));
            once.apply_snapshot(&snapshot, ts(2));
            let mut twice = once.clone();
            twice.apply_snapshot(&snapshot, ts(2));

            prop_assert_eq!(once, twice);
        }
    }
}
