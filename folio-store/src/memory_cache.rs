use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use folio_core::cache::{CacheKey, PriceCache};
use folio_core::repository::RepoResult;
use folio_rules::PricingResult;

/// Process-local price cache with per-entry expiry
#[derive(Default)]
pub struct InMemoryPriceCache {
    entries: RwLock<HashMap<CacheKey, (Instant, PricingResult)>>,
}

impl InMemoryPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries. Reads already ignore them and writes sweep them.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (expires_at, _)| *expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PriceCache for InMemoryPriceCache {
    async fn get(&self, key: &CacheKey) -> RepoResult<Option<PricingResult>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|(expires_at, _)| *expires_at > Instant::now())
            .map(|(_, result)| result.clone()))
    }

    async fn set(&self, key: &CacheKey, result: &PricingResult, ttl: Duration) -> RepoResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (expires_at, _)| *expires_at > now);
        entries.insert(key.clone(), (now + ttl, result.clone()));
        Ok(())
    }

    async fn invalidate_all(&self) -> RepoResult<()> {
        let mut entries = self.entries.write().await;
        debug!(entries = entries.len(), "Clearing in-memory price cache");
        entries.clear();
        Ok(())
    }
}
