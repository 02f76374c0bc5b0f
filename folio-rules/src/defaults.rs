use folio_catalog::ProductType;

use crate::models::{DynamicPricing, PriceTier, PricingRule, RuleDiscount, RulePricing, RuleScope, RuleType};

/// Starter rule set installed on a fresh store.
pub fn default_rules() -> Vec<PricingRule> {
    let mut photo_book = PricingRule::new("Photo book base price", RuleType::Fixed, 100);
    photo_book.scope = RuleScope::Product;
    photo_book.conditions.product_types = vec![ProductType::PhotoBook];
    photo_book.pricing = Some(RulePricing::BasePrice(22.0));

    let mut calendar = PricingRule::new("Calendar base price", RuleType::Fixed, 100);
    calendar.scope = RuleScope::Product;
    calendar.conditions.product_types = vec![ProductType::Calendar];
    calendar.pricing = Some(RulePricing::BasePrice(18.0));

    let mut prints = PricingRule::new("Photo print tiers", RuleType::Tiered, 90);
    prints.scope = RuleScope::Product;
    prints.conditions.product_types = vec![ProductType::PhotoPrint];
    prints.pricing = Some(RulePricing::Tiers(vec![
        PriceTier { min_quantity: 1, max_quantity: Some(49), price: 0.35, discount: None },
        PriceTier { min_quantity: 50, max_quantity: Some(199), price: 0.29, discount: None },
        PriceTier { min_quantity: 200, max_quantity: None, price: 0.25, discount: None },
    ]));

    let mut volume = PricingRule::new("Volume pricing", RuleType::Volume, 50);
    volume.conditions.product_types = vec![ProductType::GreetingCard, ProductType::Calendar];

    let mut loyalty = PricingRule::new("Loyalty reward", RuleType::Subscription, 40);
    loyalty.scope = RuleScope::User;
    loyalty.conditions.customer_tiers = vec!["premium".into(), "vip".into()];
    loyalty.discount = Some(RuleDiscount::LoyaltyDiscount { value: 5.0, loyalty_multiplier: Some(1.0) });

    let mut holiday = PricingRule::new("Seasonal demand", RuleType::Dynamic, 10);
    holiday.conditions.product_types = vec![ProductType::Calendar, ProductType::PhotoBook];
    holiday.dynamic = Some(DynamicPricing { demand_multiplier: 1.0, seasonality_factor: 1.0, inventory_level: None });

    vec![photo_book, calendar, prints, volume, loyalty, holiday]
}
