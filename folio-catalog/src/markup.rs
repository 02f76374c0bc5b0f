use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::product::{CatalogError, ProductType};
use crate::tiers::{select_tier, QuantityTier};

/// How a desired markup is expressed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Markup {
    /// Absolute profit per unit
    Amount(f64),
    /// Profit as a percentage of supplier cost
    Percentage(f64),
}

/// Selling price derived from a supplier cost and a markup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceCalculation {
    pub supplier_price: f64,
    pub selling_price: f64,
    pub markup: f64,
    pub markup_percentage: f64,
    pub margin_percentage: f64,
}

impl PriceCalculation {
    /// Derive percentages from an already-known supplier price and markup amount.
    pub fn from_amounts(supplier_price: f64, markup: f64) -> Result<Self, CatalogError> {
        MarkupCalculator::calculate(supplier_price, Markup::Amount(markup))
    }
}

pub struct MarkupCalculator;

impl MarkupCalculator {
    pub fn calculate(supplier_price: f64, desired: Markup) -> Result<PriceCalculation, CatalogError> {
        if !supplier_price.is_finite() || supplier_price <= 0.0 {
            return Err(CatalogError::InvalidCost(supplier_price));
        }

        let (markup, markup_percentage) = match desired {
            Markup::Amount(amount) => (amount, amount / supplier_price * 100.0),
            Markup::Percentage(percentage) => (supplier_price * percentage / 100.0, percentage),
        };

        if !markup.is_finite() {
            return Err(CatalogError::InvalidPrice { field: "markup", value: markup });
        }

        let selling_price = supplier_price + markup;
        let margin_percentage = if selling_price == 0.0 {
            0.0
        } else {
            markup / selling_price * 100.0
        };

        Ok(PriceCalculation {
            supplier_price,
            selling_price,
            markup,
            markup_percentage,
            margin_percentage,
        })
    }
}

/// Quantity bracket overriding a supplier product's base prices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VolumePrice {
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub supplier_price: f64,
    pub selling_price: f64,
    pub markup: f64,
}

impl QuantityTier for VolumePrice {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }

    fn max_quantity(&self) -> Option<i32> {
        self.max_quantity
    }
}

/// A whole product sourced from an external supplier, resold at a markup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierProduct {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub supplier_price: f64,
    pub selling_price: f64,
    pub markup: f64,
    pub markup_percentage: f64,
    pub margin_percentage: f64,
    #[serde(default)]
    pub volume_pricing: Vec<VolumePrice>,
    /// Days from order to dispatch
    pub shipping_days: Option<u32>,
    pub is_active: bool,
    pub currency: String,
    pub metadata: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Markup resolution for a requested quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkupQuote {
    pub quantity: i32,
    pub unit: PriceCalculation,
    pub total_supplier_cost: f64,
    pub total_selling_price: f64,
    pub total_markup: f64,
    pub volume_tier_applied: bool,
}

impl MarkupQuote {
    pub fn new(unit: PriceCalculation, quantity: i32, volume_tier_applied: bool) -> Self {
        let qty = quantity as f64;
        Self {
            quantity,
            unit,
            total_supplier_cost: unit.supplier_price * qty,
            total_selling_price: unit.selling_price * qty,
            total_markup: unit.markup * qty,
            volume_tier_applied,
        }
    }
}

impl SupplierProduct {
    /// Create a product priced from a supplier cost and a desired markup.
    pub fn new(
        supplier_id: Uuid,
        supplier_name: impl Into<String>,
        product_type: ProductType,
        variant: Option<String>,
        supplier_price: f64,
        desired: Markup,
    ) -> Result<Self, CatalogError> {
        let calc = MarkupCalculator::calculate(supplier_price, desired)?;
        Ok(Self {
            id: Uuid::new_v4(),
            supplier_id,
            supplier_name: supplier_name.into(),
            product_type,
            variant,
            supplier_price: calc.supplier_price,
            selling_price: calc.selling_price,
            markup: calc.markup,
            markup_percentage: calc.markup_percentage,
            margin_percentage: calc.margin_percentage,
            volume_pricing: Vec::new(),
            shipping_days: None,
            is_active: true,
            currency: "USD".to_string(),
            metadata: serde_json::json!({}),
            updated_at: Utc::now(),
        })
    }

    /// Replace the markup, keeping the supplier price.
    pub fn apply_markup(&mut self, desired: Markup) -> Result<PriceCalculation, CatalogError> {
        let calc = MarkupCalculator::calculate(self.supplier_price, desired)?;
        self.apply(calc);
        Ok(calc)
    }

    /// Move to a new supplier price while holding the absolute markup fixed.
    ///
    /// Percentages are recomputed from the new numbers, never re-entered.
    pub fn resync_supplier_price(&mut self, new_supplier_price: f64) -> Result<PriceCalculation, CatalogError> {
        let calc = MarkupCalculator::calculate(new_supplier_price, Markup::Amount(self.markup))?;
        self.apply(calc);
        Ok(calc)
    }

    /// Unit economics at `quantity`, honouring volume pricing.
    pub fn price_for_quantity(&self, quantity: i32) -> Result<MarkupQuote, CatalogError> {
        if quantity < 0 {
            return Err(CatalogError::InvalidQuantity(quantity));
        }

        match select_tier(&self.volume_pricing, quantity) {
            Some(tier) => {
                let unit = PriceCalculation::from_amounts(tier.supplier_price, tier.markup)?;
                Ok(MarkupQuote::new(unit, quantity, true))
            }
            None => Ok(MarkupQuote::new(self.base_calculation(), quantity, false)),
        }
    }

    pub fn base_calculation(&self) -> PriceCalculation {
        PriceCalculation {
            supplier_price: self.supplier_price,
            selling_price: self.selling_price,
            markup: self.markup,
            markup_percentage: self.markup_percentage,
            margin_percentage: self.margin_percentage,
        }
    }

    fn apply(&mut self, calc: PriceCalculation) {
        self.supplier_price = calc.supplier_price;
        self.selling_price = calc.selling_price;
        self.markup = calc.markup;
        self.markup_percentage = calc.markup_percentage;
        self.margin_percentage = calc.margin_percentage;
        self.updated_at = Utc::now();
    }
}
