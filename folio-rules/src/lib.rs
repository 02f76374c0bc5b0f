pub mod models;
pub mod request;
pub mod signals;
pub mod matcher;
pub mod pipeline;
pub mod defaults;

pub use models::{
    AbTesting, AbVariant, DynamicPricing, PriceTier, PricingRule, RuleConditions, RuleDiscount,
    RulePricing, RuleScope, RuleType, TimeRange,
};
pub use request::{
    AppliedDiscount, AppliedTax, PriceAdjustment, PriceBreakdown, PricingRequest, PricingResult,
    ResultMetadata, ShippingCharge,
};
pub use signals::{DemandSignal, InventorySignal, NoSignals, PricingSignals, ShippingRateProvider, SignalError, TaxRateProvider};
pub use matcher::RuleMatcher;
pub use pipeline::{PricingPipeline, PRICING_ENGINE_VERSION};
pub use defaults::default_rules;

/// Rule and request validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RuleError {
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(i32),

    #[error("Order value must not be negative, got {0}")]
    InvalidOrderValue(f64),

    #[error("Invalid pricing rule: {0}")]
    InvalidRule(String),
}

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
