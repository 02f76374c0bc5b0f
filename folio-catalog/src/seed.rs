//! Setup routines seeding the customization catalog per product type.
//!
//! Every entry is built through `CustomizationPricing::new`, so
//! `customer_price == supplier_cost + markup` holds for all seeded rows.

use crate::customization::{CustomizationPricing, CustomizationTier, CustomizationType, PricingModel};
use crate::product::ProductType;

pub fn photo_book_customizations() -> Vec<CustomizationPricing> {
    let pt = ProductType::PhotoBook;
    vec![
        CustomizationPricing::new(pt, CustomizationType::ExtraPages, "Extra pages", PricingModel::PerUnit, 0.5, 0.5)
            .with_limits(0, Some(100), 0),
        CustomizationPricing::new(pt, CustomizationType::CoverUpgrade, "Linen cover", PricingModel::FlatFee, 3.0, 2.0)
            .with_processing_time(2),
        CustomizationPricing::new(pt, CustomizationType::PaperUpgrade, "Lustre paper", PricingModel::FlatFee, 2.0, 3.0)
            .with_processing_time(1),
        CustomizationPricing::new(pt, CustomizationType::SizeUpgrade, "Larger format", PricingModel::FlatFee, 4.0, 4.0),
        CustomizationPricing::new(pt, CustomizationType::Lamination, "Matte lamination", PricingModel::FlatFee, 1.5, 1.5),
        CustomizationPricing::new(pt, CustomizationType::PersonalizedText, "Cover embossing", PricingModel::FlatFee, 0.5, 2.5)
            .with_processing_time(1),
        CustomizationPricing::new(pt, CustomizationType::GiftWrap, "Gift wrap", PricingModel::FlatFee, 1.0, 2.0),
    ]
}

pub fn calendar_customizations() -> Vec<CustomizationPricing> {
    let pt = ProductType::Calendar;
    vec![
        CustomizationPricing::new(
            pt,
            CustomizationType::ExtraPages,
            "Extra months",
            PricingModel::Tiered(vec![
                CustomizationTier::new(1, Some(5), 0.6, 0.4),
                CustomizationTier::new(6, None, 0.5, 0.3),
            ]),
            0.6,
            0.4,
        )
        .with_limits(0, Some(12), 0),
        CustomizationPricing::new(pt, CustomizationType::PaperUpgrade, "Heavyweight paper", PricingModel::FlatFee, 1.5, 2.5),
        CustomizationPricing::new(pt, CustomizationType::GiftWrap, "Gift wrap", PricingModel::FlatFee, 1.0, 2.0),
    ]
}

pub fn canvas_customizations() -> Vec<CustomizationPricing> {
    let pt = ProductType::CanvasPrint;
    vec![
        CustomizationPricing::new(pt, CustomizationType::FrameUpgrade, "Floating frame", PricingModel::FlatFee, 9.0, 11.0)
            .with_processing_time(2),
        CustomizationPricing::new(pt, CustomizationType::Lamination, "UV varnish", PricingModel::Percentage, 2.0, 3.0),
        CustomizationPricing::new(pt, CustomizationType::RushProcessing, "Rush production", PricingModel::FlatFee, 4.0, 6.0),
    ]
}

/// Full default catalog across product types.
pub fn default_customizations() -> Vec<CustomizationPricing> {
    let mut all = photo_book_customizations();
    all.extend(calendar_customizations());
    all.extend(canvas_customizations());
    all
}
