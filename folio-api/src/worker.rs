use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use folio_core::PriceCache;
use folio_shared::CatalogEvent;

/// Drop every cached price whenever an admin mutation lands.
pub async fn start_cache_invalidation_worker(mut events: broadcast::Receiver<CatalogEvent>, cache: Arc<dyn PriceCache>) {
    info!("Cache invalidation worker started, listening to catalog events...");

    loop {
        match events.recv().await {
            Ok(event) => {
                info!(event = event.name(), "Catalog changed, invalidating price cache");
                invalidate(cache.as_ref()).await;
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Catalog events lagged, invalidating price cache");
                invalidate(cache.as_ref()).await;
            }
            Err(RecvError::Closed) => {
                info!("Catalog event channel closed, stopping worker");
                break;
            }
        }
    }
}

async fn invalidate(cache: &dyn PriceCache) {
    if let Err(e) = cache.invalidate_all().await {
        error!("Failed to invalidate price cache: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use folio_catalog::ProductType;
    use folio_core::CacheKey;
    use folio_rules::{PricingPipeline, PricingRequest, PricingSignals};
    use folio_shared::{event_timestamp, RuleChange, RuleChangedEvent};
    use folio_store::InMemoryPriceCache;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_event_clears_cache_and_closed_channel_stops() {
        let cache = Arc::new(InMemoryPriceCache::new());
        let request = PricingRequest::new(ProductType::Mug, 1);
        let result = PricingPipeline::new(PricingSignals::default(), "USD").calculate(&request, &[], chrono::Utc::now());
        let key = CacheKey::for_request(&request).unwrap();
        cache.set(&key, &result, Duration::from_secs(60)).await.unwrap();

        let (tx, rx) = broadcast::channel(4);
        tx.send(CatalogEvent::RuleChanged(RuleChangedEvent {
            rule_id: Uuid::new_v4(),
            rule_name: "Mug base".into(),
            change: RuleChange::Updated,
            timestamp: event_timestamp(),
        }))
        .unwrap();
        drop(tx);

        start_cache_invalidation_worker(rx, cache.clone()).await;
        assert!(cache.is_empty().await);
    }
}
