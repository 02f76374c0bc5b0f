//! Ports for the external inputs of the pipeline.
//!
//! All lookups are short and synchronous. `Ok(None)` means "not configured";
//! either way the pipeline skips the effect instead of failing.

use std::sync::Arc;

use folio_catalog::ProductType;

#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("Signal unavailable: {0}")]
    Unavailable(String),

    #[error("Signal timed out after {0}ms")]
    Timeout(u64),
}

pub trait TaxRateProvider: Send + Sync {
    /// Tax rate for the region, in percent
    fn tax_rate(&self, region: &str) -> Option<f64>;
}

pub trait ShippingRateProvider: Send + Sync {
    fn shipping_cost(&self, region: &str, product_type: ProductType, quantity: i32) -> Option<f64>;
}

pub trait DemandSignal: Send + Sync {
    /// Current demand level, expected in `0.0..=0.2`
    fn demand_level(&self, product_type: ProductType) -> Result<Option<f64>, SignalError>;
}

pub trait InventorySignal: Send + Sync {
    fn inventory_multiplier(&self, product_type: ProductType) -> Result<Option<f64>, SignalError>;
}

/// Provider with nothing configured
pub struct NoSignals;

impl TaxRateProvider for NoSignals {
    fn tax_rate(&self, _region: &str) -> Option<f64> {
        None
    }
}

impl ShippingRateProvider for NoSignals {
    fn shipping_cost(&self, _region: &str, _product_type: ProductType, _quantity: i32) -> Option<f64> {
        None
    }
}

impl DemandSignal for NoSignals {
    fn demand_level(&self, _product_type: ProductType) -> Result<Option<f64>, SignalError> {
        Ok(None)
    }
}

impl InventorySignal for NoSignals {
    fn inventory_multiplier(&self, _product_type: ProductType) -> Result<Option<f64>, SignalError> {
        Ok(None)
    }
}

#[derive(Clone)]
pub struct PricingSignals {
    pub tax: Arc<dyn TaxRateProvider>,
    pub shipping: Arc<dyn ShippingRateProvider>,
    pub demand: Arc<dyn DemandSignal>,
    pub inventory: Arc<dyn InventorySignal>,
}

impl Default for PricingSignals {
    fn default() -> Self {
        let none = Arc::new(NoSignals);
        Self {
            tax: none.clone(),
            shipping: none.clone(),
            demand: none.clone(),
            inventory: none,
        }
    }
}
