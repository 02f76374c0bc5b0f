pub mod app_config;
pub mod memory_repo;
pub mod memory_cache;
pub mod redis_repo;
pub mod signals;
pub mod feed;

pub use memory_repo::InMemoryStore;
pub use memory_cache::InMemoryPriceCache;
pub use redis_repo::RedisPriceCache;
pub use signals::ConfigSignals;
pub use feed::FileCostFeed;
