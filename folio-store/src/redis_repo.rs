use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info};

use folio_core::cache::{CacheKey, PriceCache};
use folio_core::repository::RepoResult;
use folio_rules::PricingResult;

const KEY_PATTERN: &str = "price:*";

/// Price cache shared across instances through Redis
#[derive(Clone)]
pub struct RedisPriceCache {
    client: redis::Client,
}

impl RedisPriceCache {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis price cache configured");
        Ok(Self { client })
    }
}

#[async_trait]
impl PriceCache for RedisPriceCache {
    async fn get(&self, key: &CacheKey) -> RepoResult<Option<PricingResult>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(key.to_key_string()).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, result: &PricingResult, ttl: Duration) -> RepoResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(result)?;
        // SETEX rejects zero
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key.to_key_string(), json, seconds).await?;
        Ok(())
    }

    async fn invalidate_all(&self) -> RepoResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let keys: Vec<String> = conn.keys(KEY_PATTERN).await?;
        if !keys.is_empty() {
            conn.del::<_, ()>(&keys).await?;
        }
        debug!(keys = keys.len(), "Cleared redis price cache");
        Ok(())
    }
}
