pub mod product;
pub mod tiers;
pub mod markup;
pub mod customization;
pub mod cost_model;
pub mod supplier;
pub mod seed;

pub use product::{CatalogError, ProductType};
pub use tiers::{select_tier, QuantityTier};
pub use markup::{Markup, MarkupCalculator, MarkupQuote, PriceCalculation, SupplierProduct, VolumePrice};
pub use customization::{
    AppliedCustomization, CustomizationCalculator, CustomizationDependencies, CustomizationItem,
    CustomizationLimits, CustomizationPricing, CustomizationRequest, CustomizationResult,
    CustomizationTier, CustomizationType, PricingModel, ProcessingTime, SupplierInfo,
};
pub use cost_model::{CostModel, CostTier};
pub use supplier::{compare_suppliers, ComparisonTag, SupplierComparison};

#[cfg(test)]
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
