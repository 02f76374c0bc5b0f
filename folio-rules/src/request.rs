use chrono::{DateTime, Utc};
use folio_catalog::ProductType;
use serde::{Deserialize, Serialize};

use crate::RuleError;

/// Input to a price calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingRequest {
    pub product_type: ProductType,
    pub quantity: i32,
    pub user_id: Option<String>,
    pub user_segment: Option<String>,
    pub region: Option<String>,
    pub channel: Option<String>,
    pub customer_tier: Option<String>,
    pub order_value: Option<f64>,
    /// Evaluate rules as of this instant instead of now
    pub timestamp: Option<DateTime<Utc>>,
    pub ab_test_variant: Option<String>,
}

impl PricingRequest {
    pub fn new(product_type: ProductType, quantity: i32) -> Self {
        Self {
            product_type,
            quantity,
            user_id: None,
            user_segment: None,
            region: None,
            channel: None,
            customer_tier: None,
            order_value: None,
            timestamp: None,
            ab_test_variant: None,
        }
    }

    pub fn validate(&self) -> Result<(), RuleError> {
        if self.quantity < 1 {
            return Err(RuleError::InvalidQuantity(self.quantity));
        }
        if let Some(value) = self.order_value {
            if !value.is_finite() || value < 0.0 {
                return Err(RuleError::InvalidOrderValue(value));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedDiscount {
    pub rule_name: String,
    pub discount_type: String,
    pub amount: f64,
    pub percentage: Option<f64>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedTax {
    pub name: String,
    pub amount: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingCharge {
    pub cost: f64,
    pub method: String,
}

/// A multiplicative step (volume, dynamic, A/B) kept for auditing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAdjustment {
    pub rule_name: String,
    pub kind: String,
    pub multiplier: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    pub subtotal: f64,
    pub discounts: f64,
    pub taxes: f64,
    pub shipping: f64,
    pub grand_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMetadata {
    pub calculated_at: DateTime<Utc>,
    pub version: String,
    /// Starts at 1.0; each applied dynamic rule multiplies it by 0.9
    pub confidence: f64,
}

/// Output of the pricing pipeline. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingResult {
    pub product_type: ProductType,
    pub quantity: i32,
    pub base_price: f64,
    pub final_price: f64,
    pub discounts: Vec<AppliedDiscount>,
    pub taxes: Vec<AppliedTax>,
    pub shipping: Option<ShippingCharge>,
    pub adjustments: Vec<PriceAdjustment>,
    pub currency: String,
    pub breakdown: PriceBreakdown,
    pub applied_rules: Vec<String>,
    pub ab_variant: Option<String>,
    pub metadata: ResultMetadata,
}

impl PricingResult {
    /// Same numbers, ignoring when it was computed.
    pub fn same_price_as(&self, other: &PricingResult) -> bool {
        let mut a = self.clone();
        a.metadata.calculated_at = other.metadata.calculated_at;
        a == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        assert!(PricingRequest::new(ProductType::Mug, 1).validate().is_ok());
        assert_eq!(
            PricingRequest::new(ProductType::Mug, 0).validate(),
            Err(RuleError::InvalidQuantity(0))
        );
        assert_eq!(
            PricingRequest::new(ProductType::Mug, -4).validate(),
            Err(RuleError::InvalidQuantity(-4))
        );

        let mut req = PricingRequest::new(ProductType::Mug, 2);
        req.order_value = Some(-1.0);
        assert_eq!(req.validate(), Err(RuleError::InvalidOrderValue(-1.0)));
    }

    #[test]
    fn test_request_accepts_minimal_json() {
        let req: PricingRequest =
            serde_json::from_value(serde_json::json!({"product_type": "PHOTO_BOOK", "quantity": 3})).unwrap();
        assert_eq!(req, PricingRequest::new(ProductType::PhotoBook, 3));
    }
}
