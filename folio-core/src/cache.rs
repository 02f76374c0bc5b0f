use std::time::Duration;

use async_trait::async_trait;
use folio_catalog::ProductType;
use folio_rules::{PricingRequest, PricingResult};
use serde::{Deserialize, Serialize};

use crate::repository::RepoResult;

/// Request shape a cached price is valid for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub product_type: ProductType,
    pub quantity: i32,
    pub user_segment: Option<String>,
    pub region: Option<String>,
    pub channel: Option<String>,
    pub customer_tier: Option<String>,
    /// Exact bit pattern of the order value, to keep the key hashable
    pub order_value_bits: Option<u64>,
    pub user_id: Option<String>,
    pub ab_test_variant: Option<String>,
}

impl CacheKey {
    /// `None` for requests pinned to an explicit timestamp; those are never cached.
    pub fn for_request(request: &PricingRequest) -> Option<Self> {
        if request.timestamp.is_some() {
            return None;
        }
        Some(Self {
            product_type: request.product_type,
            quantity: request.quantity,
            user_segment: request.user_segment.clone(),
            region: request.region.clone(),
            channel: request.channel.clone(),
            customer_tier: request.customer_tier.clone(),
            order_value_bits: request.order_value.map(f64::to_bits),
            user_id: request.user_id.clone(),
            ab_test_variant: request.ab_test_variant.clone(),
        })
    }

    /// Flat string form, e.g. for key-value stores.
    pub fn to_key_string(&self) -> String {
        let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        format!(
            "price:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.product_type,
            self.quantity,
            part(&self.user_segment),
            part(&self.region),
            part(&self.channel),
            part(&self.customer_tier),
            self.order_value_bits.map_or_else(|| "-".to_string(), |v| format!("{v:x}")),
            part(&self.user_id),
            part(&self.ab_test_variant),
        )
    }
}

/// Best-effort memo of pipeline results. Never a source of truth.
#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> RepoResult<Option<PricingResult>>;

    async fn set(&self, key: &CacheKey, result: &PricingResult, ttl: Duration) -> RepoResult<()>;

    async fn invalidate_all(&self) -> RepoResult<()>;
}
