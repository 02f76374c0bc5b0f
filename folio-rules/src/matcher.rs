use chrono::{DateTime, Datelike, Utc};

use crate::models::{PricingRule, RuleConditions};
use crate::request::PricingRequest;

/// Selects the rules that apply to a request, highest priority first.
///
/// Ties on priority go to the most recently created rule.
pub struct RuleMatcher {
    rules: Vec<PricingRule>,
}

impl RuleMatcher {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        let mut rules = rules;
        rules.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| b.created_at.cmp(&a.created_at)));
        Self { rules }
    }

    pub fn rules(&self) -> &[PricingRule] {
        &self.rules
    }

    pub fn applicable_rules(&self, request: &PricingRequest, at: DateTime<Utc>) -> Vec<&PricingRule> {
        self.rules
            .iter()
            .filter(|rule| Self::matches(rule, request, at))
            .collect()
    }

    pub fn matches(rule: &PricingRule, request: &PricingRequest, at: DateTime<Utc>) -> bool {
        rule.is_active && rule.is_valid_at(at) && conditions_hold(&rule.conditions, request, at)
    }
}

fn conditions_hold(c: &RuleConditions, request: &PricingRequest, at: DateTime<Utc>) -> bool {
    if !c.product_types.is_empty() && !c.product_types.contains(&request.product_type) {
        return false;
    }
    if !listed(&c.user_ids, request.user_id.as_deref()) {
        return false;
    }
    if !listed(&c.user_segments, request.user_segment.as_deref()) {
        return false;
    }
    if !listed(&c.regions, request.region.as_deref()) {
        return false;
    }
    if !listed(&c.channels, request.channel.as_deref()) {
        return false;
    }
    if !listed(&c.customer_tiers, request.customer_tier.as_deref()) {
        return false;
    }
    if c.min_quantity.is_some_and(|min| request.quantity < min) {
        return false;
    }
    if c.max_quantity.is_some_and(|max| request.quantity > max) {
        return false;
    }
    if c.min_order_value.is_some() || c.max_order_value.is_some() {
        let Some(value) = request.order_value else {
            return false;
        };
        if c.min_order_value.is_some_and(|min| value < min) || c.max_order_value.is_some_and(|max| value > max) {
            return false;
        }
    }
    if !c.days_of_week.is_empty() && !c.days_of_week.contains(&at.weekday()) {
        return false;
    }
    if let Some(range) = &c.time_range {
        if !range.contains(at.time()) {
            return false;
        }
    }
    true
}

/// Empty list is a wildcard; otherwise the request must carry a listed value.
fn listed(allowed: &[String], value: Option<&str>) -> bool {
    allowed.is_empty() || value.is_some_and(|v| allowed.iter().any(|a| a.eq_ignore_ascii_case(v)))
}
