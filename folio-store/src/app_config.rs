use serde::Deserialize;
use std::collections::HashMap;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: Option<RedisConfig>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub pricing: PricingSettings,
    /// Keyed by region code
    #[serde(default)]
    pub regions: HashMap<String, RegionRates>,
    #[serde(default)]
    pub signals: SignalSettings,
    pub supplier_feed: Option<SupplierFeedConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    #[serde(default = "default_processing_days")]
    pub base_processing_days: u32,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            cache_enabled: true,
            cache_ttl_seconds: default_cache_ttl(),
            base_processing_days: default_processing_days(),
        }
    }
}

fn default_currency() -> String { "USD".to_string() }
fn default_true() -> bool { true }
fn default_cache_ttl() -> u64 { 300 }
fn default_processing_days() -> u32 { 3 }

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RegionRates {
    /// Percent
    pub tax_rate: Option<f64>,
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub additional_item_shipping: f64,
}

/// Static stand-ins for the demand and inventory feeds, keyed by product type
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SignalSettings {
    #[serde(default)]
    pub demand_levels: HashMap<String, f64>,
    #[serde(default)]
    pub inventory_multipliers: HashMap<String, f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupplierFeedConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Untracked local overrides
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `FOLIO__PRICING__CACHE_ENABLED=false`
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults_fill_missing_keys() {
        let s = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                port = 8080
                [auth]
                jwt_secret = "s"
                [regions.EU]
                tax_rate = 20.0
                shipping_cost = 4.99
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: Config = s.try_deserialize().unwrap();

        assert_eq!(cfg.pricing.currency, "USD");
        assert!(cfg.pricing.cache_enabled);
        assert_eq!(cfg.pricing.cache_ttl_seconds, 300);
        assert_eq!(cfg.pricing.base_processing_days, 3);
        assert!(cfg.redis.is_none());
        let eu = cfg.regions.iter().find(|(k, _)| k.eq_ignore_ascii_case("eu")).map(|(_, v)| v).unwrap();
        assert_eq!(eu.tax_rate, Some(20.0));
    }
}
