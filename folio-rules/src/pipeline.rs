use chrono::{DateTime, Datelike, Utc};
use folio_catalog::select_tier;
use tracing::{debug, warn};

use crate::models::{PricingRule, RuleDiscount, RuleType};
use crate::request::{
    AppliedDiscount, AppliedTax, PriceAdjustment, PriceBreakdown, PricingRequest, PricingResult,
    ResultMetadata, ShippingCharge,
};
use crate::signals::PricingSignals;

pub const PRICING_ENGINE_VERSION: &str = "1.0.0";

const DEFAULT_BULK_CAP: f64 = 50.0;
const BULK_MIN_QUANTITY: i32 = 10;
const MAX_DEMAND_LEVEL: f64 = 0.2;
const DYNAMIC_CONFIDENCE_FACTOR: f64 = 0.9;

/// Running state threaded through the stages
struct Accumulator {
    base_price: f64,
    final_price: f64,
    discounts: Vec<AppliedDiscount>,
    taxes: Vec<AppliedTax>,
    shipping: Option<ShippingCharge>,
    adjustments: Vec<PriceAdjustment>,
    applied_rules: Vec<String>,
    confidence: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            base_price: 0.0,
            final_price: 0.0,
            discounts: Vec::new(),
            taxes: Vec::new(),
            shipping: None,
            adjustments: Vec::new(),
            applied_rules: Vec::new(),
            confidence: 1.0,
        }
    }

    fn record(&mut self, rule: &PricingRule) {
        if !self.applied_rules.iter().any(|name| name == &rule.name) {
            self.applied_rules.push(rule.name.clone());
        }
    }
}

/// Sequential price calculator:
/// base price, discounts, taxes, shipping, dynamic multipliers, then totals and A/B.
///
/// `rules` must already be filtered and ordered by [`crate::RuleMatcher`].
pub struct PricingPipeline {
    signals: PricingSignals,
    currency: String,
}

impl PricingPipeline {
    pub fn new(signals: PricingSignals, currency: impl Into<String>) -> Self {
        Self { signals, currency: currency.into() }
    }

    pub fn calculate(&self, request: &PricingRequest, rules: &[&PricingRule], at: DateTime<Utc>) -> PricingResult {
        let mut acc = Accumulator::new();

        self.apply_base_price(&mut acc, request, rules);
        self.apply_discounts(&mut acc, request, rules);
        self.apply_taxes(&mut acc, request);
        self.apply_shipping(&mut acc, request);
        self.apply_dynamic(&mut acc, request, rules, at);

        self.finalize(acc, request, rules)
    }

    fn apply_base_price(&self, acc: &mut Accumulator, request: &PricingRequest, rules: &[&PricingRule]) {
        let mut base = 0.0;

        if let Some((rule, price)) = rules
            .iter()
            .filter(|r| r.rule_type == RuleType::Fixed)
            .find_map(|r| r.base_price().map(|p| (*r, p)))
        {
            base = price;
            acc.record(rule);
        }

        if let Some((rule, tier)) = rules
            .iter()
            .filter(|r| r.rule_type == RuleType::Tiered)
            .find_map(|r| select_tier(r.tiers(), request.quantity).map(|t| (*r, t)))
        {
            base = tier.effective_price();
            acc.record(rule);
        }

        if request.quantity > 1 {
            if let Some(rule) = rules.iter().find(|r| r.rule_type == RuleType::Volume) {
                let pct = volume_discount(request.quantity);
                if pct > 0.0 {
                    let before = base;
                    base *= 1.0 - pct;
                    acc.adjustments.push(PriceAdjustment {
                        rule_name: rule.name.clone(),
                        kind: "VOLUME".to_string(),
                        multiplier: 1.0 - pct,
                        amount: base - before,
                    });
                    acc.record(rule);
                }
            }
        }

        acc.base_price = base;
        acc.final_price = base;
    }

    fn apply_discounts(&self, acc: &mut Accumulator, request: &PricingRequest, rules: &[&PricingRule]) {
        for rule in rules {
            let Some(discount) = &rule.discount else {
                continue;
            };
            let Some((amount, percentage, reason)) = discount_amount(discount, acc, request) else {
                continue;
            };

            let amount = amount.min(acc.final_price);
            if amount <= 0.0 {
                continue;
            }

            acc.final_price -= amount;
            acc.discounts.push(AppliedDiscount {
                rule_name: rule.name.clone(),
                discount_type: discount.kind().to_string(),
                amount,
                percentage,
                reason,
            });
            acc.record(rule);
        }
    }

    fn apply_taxes(&self, acc: &mut Accumulator, request: &PricingRequest) {
        let Some(region) = request.region.as_deref() else {
            return;
        };
        match self.signals.tax.tax_rate(region) {
            Some(rate) => acc.taxes.push(AppliedTax {
                name: format!("{} tax", region.to_uppercase()),
                amount: acc.final_price * rate / 100.0,
                rate,
            }),
            None => debug!(region, "No tax configuration, skipping"),
        }
    }

    fn apply_shipping(&self, acc: &mut Accumulator, request: &PricingRequest) {
        let Some(region) = request.region.as_deref() else {
            return;
        };
        match self.signals.shipping.shipping_cost(region, request.product_type, request.quantity) {
            Some(cost) => {
                acc.shipping = Some(ShippingCharge { cost, method: "standard".to_string() });
            }
            None => debug!(region, "No shipping configuration, skipping"),
        }
    }

    fn apply_dynamic(
        &self,
        acc: &mut Accumulator,
        request: &PricingRequest,
        rules: &[&PricingRule],
        at: DateTime<Utc>,
    ) {
        let Some(rule) = rules.iter().find(|r| r.rule_type == RuleType::Dynamic) else {
            return;
        };

        let demand_multiplier = rule
            .dynamic
            .as_ref()
            .map(|d| d.demand_multiplier)
            .or_else(|| rule.factor("demand_multiplier"))
            .unwrap_or(1.0);

        let demand_level = match self.signals.demand.demand_level(request.product_type) {
            Ok(Some(level)) => level.clamp(0.0, MAX_DEMAND_LEVEL),
            Ok(None) => 0.0,
            Err(e) => {
                warn!(product_type = %request.product_type, error = %e, "Demand signal unavailable, using neutral");
                0.0
            }
        };

        let inventory_multiplier = match self.signals.inventory.inventory_multiplier(request.product_type) {
            Ok(Some(m)) if m.is_finite() && m > 0.0 => m,
            Ok(_) => 1.0,
            Err(e) => {
                warn!(product_type = %request.product_type, error = %e, "Inventory signal unavailable, using neutral");
                1.0
            }
        };

        let mut multiplier = 1.0 + demand_level * demand_multiplier;
        multiplier *= seasonal_multiplier(at.month());
        multiplier *= inventory_multiplier;

        if (multiplier - 1.0).abs() < f64::EPSILON {
            return;
        }

        let amount = acc.final_price * (multiplier - 1.0);
        acc.final_price += amount;
        acc.adjustments.push(PriceAdjustment {
            rule_name: rule.name.clone(),
            kind: "DYNAMIC".to_string(),
            multiplier,
            amount,
        });
        acc.confidence *= DYNAMIC_CONFIDENCE_FACTOR;
        acc.record(rule);
    }

    fn finalize(&self, mut acc: Accumulator, request: &PricingRequest, rules: &[&PricingRule]) -> PricingResult {
        let taxes: f64 = acc.taxes.iter().map(|t| t.amount).sum();
        let shipping = acc.shipping.as_ref().map_or(0.0, |s| s.cost);
        let mut grand_total = acc.final_price + taxes + shipping;
        let mut ab_variant = None;

        if let Some((rule, ab)) = rules.iter().find_map(|r| r.active_ab_testing().map(|ab| (*r, ab))) {
            let variant = request
                .ab_test_variant
                .as_deref()
                .and_then(|wanted| ab.variants.iter().find(|v| v.name == wanted))
                .unwrap_or(&ab.variants[0]);

            let before = grand_total;
            grand_total *= variant.price_modifier;
            acc.adjustments.push(PriceAdjustment {
                rule_name: rule.name.clone(),
                kind: "AB_TEST".to_string(),
                multiplier: variant.price_modifier,
                amount: grand_total - before,
            });
            acc.record(rule);
            ab_variant = Some(variant.name.clone());
        }

        PricingResult {
            product_type: request.product_type,
            quantity: request.quantity,
            base_price: acc.base_price,
            final_price: acc.final_price,
            breakdown: PriceBreakdown {
                subtotal: acc.final_price,
                discounts: acc.discounts.iter().map(|d| d.amount).sum(),
                taxes,
                shipping,
                grand_total,
            },
            discounts: acc.discounts,
            taxes: acc.taxes,
            shipping: acc.shipping,
            adjustments: acc.adjustments,
            currency: self.currency.clone(),
            applied_rules: acc.applied_rules,
            ab_variant,
            metadata: ResultMetadata {
                calculated_at: Utc::now(),
                version: PRICING_ENGINE_VERSION.to_string(),
                confidence: acc.confidence,
            },
        }
    }
}

/// (amount, percentage, reason), or `None` when the discount does not apply.
fn discount_amount(
    discount: &RuleDiscount,
    acc: &Accumulator,
    request: &PricingRequest,
) -> Option<(f64, Option<f64>, String)> {
    match discount {
        RuleDiscount::FixedAmount { value } => Some((*value, None, format!("{value:.2} off"))),
        RuleDiscount::Percentage { value } => {
            Some((acc.final_price * value / 100.0, Some(*value), format!("{value}% off")))
        }
        RuleDiscount::BuyXGetY { buy_quantity, get_quantity } => {
            if *buy_quantity < 1 || request.quantity < *buy_quantity {
                return None;
            }
            if *get_quantity < 1 {
                return None;
            }
            // f64 so large authored quantities cannot overflow
            let free_items = f64::from(request.quantity / buy_quantity) * f64::from(*get_quantity);
            let unit_price = acc.base_price / request.quantity as f64;
            Some((
                free_items * unit_price,
                None,
                format!("Buy {buy_quantity} get {get_quantity} free ({free_items} free)"),
            ))
        }
        RuleDiscount::BulkDiscount { value, max_discount } => {
            if request.quantity < BULK_MIN_QUANTITY {
                return None;
            }
            let pct = value.min(max_discount.unwrap_or(DEFAULT_BULK_CAP));
            Some((acc.final_price * pct / 100.0, Some(pct), format!("Bulk order of {}", request.quantity)))
        }
        RuleDiscount::LoyaltyDiscount { value, loyalty_multiplier } => {
            let tier = request.customer_tier.as_deref()?;
            if !tier.eq_ignore_ascii_case("premium") && !tier.eq_ignore_ascii_case("vip") {
                return None;
            }
            let pct = value * loyalty_multiplier.unwrap_or(1.0);
            Some((acc.final_price * pct / 100.0, Some(pct), format!("Loyalty discount for {tier} customer")))
        }
    }
}

fn volume_discount(quantity: i32) -> f64 {
    match quantity {
        q if q >= 100 => 0.15,
        q if q >= 50 => 0.10,
        q if q >= 20 => 0.05,
        _ => 0.0,
    }
}

fn seasonal_multiplier(month: u32) -> f64 {
    match month {
        11 | 12 => 1.1,
        6..=8 => 1.05,
        _ => 1.0,
    }
}
