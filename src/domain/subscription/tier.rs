//! Subscription tier definitions and the price-to-tier lookup.
//!
//! The tier a user is on is never stored independently of Stripe: it is
//! derived from the price identifier carried by the latest subscription
//! event. Anything the table does not know about resolves to `Free`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Price identifier for the monthly Plus plan.
pub const PLUS_MONTHLY_PRICE_ID: &str = "price_1SOIx7RslRN77kT8F5nCPTkg";

/// Subscription tier sold on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    /// No paid plan.
    Free,
    /// Entry paid plan.
    Plus,
    /// Top paid plan.
    Max,
}

impl SubscriptionTier {
    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Plus => "plus",
            SubscriptionTier::Max => "max",
        }
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        SubscriptionTier::Free
    }
}

impl std::fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(SubscriptionTier::Free),
            "plus" => Ok(SubscriptionTier::Plus),
            "max" => Ok(SubscriptionTier::Max),
            other => Err(ValidationError::unknown_value("subscription_tier", other)),
        }
    }
}

/// Static lookup from Stripe price id to tier.
#[derive(Debug, Clone)]
pub struct PriceTierTable {
    entries: HashMap<String, SubscriptionTier>,
}

impl PriceTierTable {
    /// Empty table; every price resolves to `Free`.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces an entry.
    pub fn with_price(mut self, price_id: impl Into<String>, tier: SubscriptionTier) -> Self {
        self.entries.insert(price_id.into(), tier);
        self
    }

    /// Builds the table from the built-in entries plus configured price ids.
    pub fn from_price_lists<P, M>(plus_price_ids: P, max_price_ids: M) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        let mut table = Self::default();
        for id in plus_price_ids {
            table.entries.insert(id.into(), SubscriptionTier::Plus);
        }
        for id in max_price_ids {
            table.entries.insert(id.into(), SubscriptionTier::Max);
        }
        table
    }

    /// Resolves a price id. Missing or unknown ids are `Free`.
    pub fn tier_for(&self, price_id: Option<&str>) -> SubscriptionTier {
        price_id
            .and_then(|id| self.entries.get(id).copied())
            .unwrap_or(SubscriptionTier::Free)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceTierTable {
    fn default() -> Self {
        Self::empty().with_price(PLUS_MONTHLY_PRICE_ID, SubscriptionTier::Plus)
    }
}
