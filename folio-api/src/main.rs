use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_api::{app, worker, AppState, AuthConfig};
use folio_catalog::CustomizationCalculator;
use folio_core::{PriceCache, SupplierCostFeed};
use folio_pricing::{AdminService, PricingService};
use folio_rules::PricingPipeline;
use folio_store::app_config::Config;
use folio_store::{ConfigSignals, FileCostFeed, InMemoryPriceCache, InMemoryStore, RedisPriceCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=debug,folio_pricing=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Folio pricing API on port {}", config.server.port);

    let store = Arc::new(InMemoryStore::seeded()?);
    let signals = ConfigSignals::from_config(&config).into_signals();
    let pipeline = PricingPipeline::new(signals, config.pricing.currency.clone());

    // Admin mutations fan out to the cache invalidation worker
    let (events_tx, events_rx) = tokio::sync::broadcast::channel(100);

    let mut pricing = PricingService::new(store.clone(), store.clone(), store.clone(), pipeline)
        .with_customization_calculator(CustomizationCalculator::new(config.pricing.base_processing_days));

    if config.pricing.cache_enabled {
        let cache: Arc<dyn PriceCache> = match &config.redis {
            Some(redis) => Arc::new(RedisPriceCache::new(&redis.url)?),
            None => {
                tracing::info!("No redis configured, using in-memory price cache");
                Arc::new(InMemoryPriceCache::new())
            }
        };
        pricing = pricing.with_cache(cache.clone(), Duration::from_secs(config.pricing.cache_ttl_seconds));
        tokio::spawn(worker::start_cache_invalidation_worker(events_rx, cache));
    }

    let admin = AdminService::new(store.clone(), store.clone(), store).with_events(events_tx);
    let supplier_feed = config
        .supplier_feed
        .as_ref()
        .map(|feed| Arc::new(FileCostFeed::new(&feed.path)) as Arc<dyn SupplierCostFeed>);

    let app_state = AppState {
        pricing: Arc::new(pricing),
        admin: Arc::new(admin),
        supplier_feed,
        auth: AuthConfig { secret: config.auth.jwt_secret.clone() },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
