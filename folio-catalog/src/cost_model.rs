use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markup::{Markup, MarkupCalculator, MarkupQuote};
use crate::product::{CatalogError, ProductType};
use crate::tiers::{select_tier, QuantityTier};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostTier {
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    /// Replaces `supplier_cost` inside the bracket
    pub unit_cost: f64,
}

impl QuantityTier for CostTier {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }

    fn max_quantity(&self) -> Option<i32> {
        self.max_quantity
    }
}

/// Per-unit cost structure of a product we produce ourselves
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostModel {
    pub id: Uuid,
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub supplier_cost: f64,
    pub handling_cost: f64,
    pub shipping_cost: f64,
    pub packaging_cost: f64,
    #[serde(default)]
    pub volume_tiers: Vec<CostTier>,
}

impl CostModel {
    /// Landed cost of one unit at `quantity`: supplier (or tier) cost plus overheads.
    pub fn landed_unit_cost(&self, quantity: i32) -> f64 {
        let supplier = select_tier(&self.volume_tiers, quantity)
            .map(|tier| tier.unit_cost)
            .unwrap_or(self.supplier_cost);
        supplier + self.handling_cost + self.shipping_cost + self.packaging_cost
    }

    pub fn quote(&self, quantity: i32, desired: Markup) -> Result<MarkupQuote, CatalogError> {
        if quantity < 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }
        let tiered = select_tier(&self.volume_tiers, quantity).is_some();
        let unit = MarkupCalculator::calculate(self.landed_unit_cost(quantity), desired)?;
        Ok(MarkupQuote::new(unit, quantity, tiered))
    }
}
