use std::collections::HashMap;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use folio_catalog::{ProductType, QuantityTier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RuleError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Fixed,
    Percentage,
    Tiered,
    Volume,
    Dynamic,
    Subscription,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleScope {
    Global,
    Product,
    User,
    Region,
    Channel,
}

/// Time-of-day window in UTC. A window whose end precedes its start wraps past midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

/// Predicates a request must satisfy. Empty lists and `None` bounds are wildcards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleConditions {
    #[serde(default)]
    pub product_types: Vec<ProductType>,
    #[serde(default)]
    pub user_ids: Vec<String>,
    #[serde(default)]
    pub user_segments: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub customer_tiers: Vec<String>,
    pub min_quantity: Option<i32>,
    pub max_quantity: Option<i32>,
    pub min_order_value: Option<f64>,
    pub max_order_value: Option<f64>,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    pub time_range: Option<TimeRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTier {
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub price: f64,
    /// Percentage taken off `price` inside this bracket
    pub discount: Option<f64>,
}

impl PriceTier {
    pub fn effective_price(&self) -> f64 {
        match self.discount {
            Some(pct) => self.price * (1.0 - pct / 100.0),
            None => self.price,
        }
    }
}

impl QuantityTier for PriceTier {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }

    fn max_quantity(&self) -> Option<i32> {
        self.max_quantity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RulePricing {
    BasePrice(f64),
    Tiers(Vec<PriceTier>),
    /// Free-form inputs read by the dynamic step
    Factors(HashMap<String, f64>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleDiscount {
    FixedAmount {
        value: f64,
    },
    Percentage {
        value: f64,
    },
    BuyXGetY {
        buy_quantity: i32,
        get_quantity: i32,
    },
    BulkDiscount {
        value: f64,
        max_discount: Option<f64>,
    },
    LoyaltyDiscount {
        value: f64,
        loyalty_multiplier: Option<f64>,
    },
}

impl RuleDiscount {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleDiscount::FixedAmount { .. } => "FIXED_AMOUNT",
            RuleDiscount::Percentage { .. } => "PERCENTAGE",
            RuleDiscount::BuyXGetY { .. } => "BUY_X_GET_Y",
            RuleDiscount::BulkDiscount { .. } => "BULK_DISCOUNT",
            RuleDiscount::LoyaltyDiscount { .. } => "LOYALTY_DISCOUNT",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DynamicPricing {
    pub demand_multiplier: f64,
    pub seasonality_factor: f64,
    pub inventory_level: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbVariant {
    pub name: String,
    pub percentage: f64,
    pub price_modifier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbTesting {
    pub variants: Vec<AbVariant>,
    pub is_active: bool,
}

/// An administrator-authored pricing rule. Calculation never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingRule {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: RuleType,
    pub scope: RuleScope,
    pub priority: i32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub pricing: Option<RulePricing>,
    pub discount: Option<RuleDiscount>,
    pub dynamic: Option<DynamicPricing>,
    pub ab_testing: Option<AbTesting>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingRule {
    /// Active global rule with no conditions, pricing or effects.
    pub fn new(name: impl Into<String>, rule_type: RuleType, priority: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            rule_type,
            scope: RuleScope::Global,
            priority,
            is_active: true,
            valid_from: None,
            valid_until: None,
            conditions: RuleConditions::default(),
            pricing: None,
            discount: None,
            dynamic: None,
            ab_testing: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from.map_or(true, |from| from <= at) && self.valid_until.map_or(true, |until| at <= until)
    }

    pub fn base_price(&self) -> Option<f64> {
        match &self.pricing {
            Some(RulePricing::BasePrice(price)) => Some(*price),
            _ => None,
        }
    }

    pub fn tiers(&self) -> &[PriceTier] {
        match &self.pricing {
            Some(RulePricing::Tiers(tiers)) => tiers,
            _ => &[],
        }
    }

    pub fn factor(&self, key: &str) -> Option<f64> {
        match &self.pricing {
            Some(RulePricing::Factors(factors)) => factors.get(key).copied(),
            _ => None,
        }
    }

    pub fn active_ab_testing(&self) -> Option<&AbTesting> {
        self.ab_testing.as_ref().filter(|ab| ab.is_active && !ab.variants.is_empty())
    }

    /// Structural checks applied on create/update.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.name.trim().is_empty() {
            return Err(RuleError::InvalidRule("name must not be empty".into()));
        }
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until < from {
                return Err(RuleError::InvalidRule(format!("{}: valid_until precedes valid_from", self.name)));
            }
        }
        match (self.rule_type, &self.pricing) {
            (RuleType::Fixed, Some(RulePricing::BasePrice(price))) if price.is_finite() && *price >= 0.0 => {}
            (RuleType::Fixed, _) => {
                return Err(RuleError::InvalidRule(format!("{}: FIXED rule needs a non-negative base_price", self.name)));
            }
            (RuleType::Tiered, Some(RulePricing::Tiers(tiers))) if !tiers.is_empty() => {}
            (RuleType::Tiered, _) => {
                return Err(RuleError::InvalidRule(format!("{}: TIERED rule needs at least one tier", self.name)));
            }
            _ => {}
        }
        if let Some(RuleDiscount::BuyXGetY { buy_quantity, get_quantity }) = &self.discount {
            if *buy_quantity < 1 {
                return Err(RuleError::InvalidRule(format!("{}: buy_quantity must be at least 1", self.name)));
            }
            if *get_quantity < 0 {
                return Err(RuleError::InvalidRule(format!("{}: get_quantity must not be negative", self.name)));
            }
        }
        Ok(())
    }
}
