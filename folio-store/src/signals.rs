use std::collections::HashMap;
use std::sync::Arc;

use folio_catalog::ProductType;
use folio_rules::{
    DemandSignal, InventorySignal, PricingSignals, ShippingRateProvider, SignalError, TaxRateProvider,
};

use crate::app_config::{Config, RegionRates, SignalSettings};

/// Signal provider backed by static configuration.
///
/// Keys are matched case-insensitively since config sources may fold them.
#[derive(Debug, Clone, Default)]
pub struct ConfigSignals {
    regions: HashMap<String, RegionRates>,
    settings: SignalSettings,
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, key: &str) -> Option<&'a V> {
    map.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v)
}

impl ConfigSignals {
    pub fn new(regions: HashMap<String, RegionRates>, settings: SignalSettings) -> Self {
        Self { regions, settings }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.regions.clone(), config.signals.clone())
    }

    /// Use this provider for every pipeline signal.
    pub fn into_signals(self) -> PricingSignals {
        let shared = Arc::new(self);
        PricingSignals {
            tax: shared.clone(),
            shipping: shared.clone(),
            demand: shared.clone(),
            inventory: shared,
        }
    }
}

impl TaxRateProvider for ConfigSignals {
    fn tax_rate(&self, region: &str) -> Option<f64> {
        lookup(&self.regions, region).and_then(|r| r.tax_rate)
    }
}

impl ShippingRateProvider for ConfigSignals {
    fn shipping_cost(&self, region: &str, _product_type: ProductType, quantity: i32) -> Option<f64> {
        let rates = lookup(&self.regions, region)?;
        let extra_items = (quantity - 1).max(0) as f64;
        rates.shipping_cost.map(|base| base + rates.additional_item_shipping * extra_items)
    }
}

impl DemandSignal for ConfigSignals {
    fn demand_level(&self, product_type: ProductType) -> Result<Option<f64>, SignalError> {
        Ok(lookup(&self.settings.demand_levels, product_type.as_str()).copied())
    }
}

impl InventorySignal for ConfigSignals {
    fn inventory_multiplier(&self, product_type: ProductType) -> Result<Option<f64>, SignalError> {
        Ok(lookup(&self.settings.inventory_multipliers, product_type.as_str()).copied())
    }
}
