use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::product::{CatalogError, ProductType};
use crate::tiers::{select_tier, QuantityTier};

/// Purchasable add-ons on top of a base product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomizationType {
    ExtraPages,
    CoverUpgrade,
    PaperUpgrade,
    SizeUpgrade,
    Lamination,
    GiftWrap,
    PersonalizedText,
    RushProcessing,
    FrameUpgrade,
}

impl CustomizationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomizationType::ExtraPages => "EXTRA_PAGES",
            CustomizationType::CoverUpgrade => "COVER_UPGRADE",
            CustomizationType::PaperUpgrade => "PAPER_UPGRADE",
            CustomizationType::SizeUpgrade => "SIZE_UPGRADE",
            CustomizationType::Lamination => "LAMINATION",
            CustomizationType::GiftWrap => "GIFT_WRAP",
            CustomizationType::PersonalizedText => "PERSONALIZED_TEXT",
            CustomizationType::RushProcessing => "RUSH_PROCESSING",
            CustomizationType::FrameUpgrade => "FRAME_UPGRADE",
        }
    }
}

/// Quantity bracket for the TIERED model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationTier {
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub supplier_cost: f64,
    pub customer_price: f64,
    pub markup: f64,
}

impl CustomizationTier {
    pub fn new(min_quantity: i32, max_quantity: Option<i32>, supplier_cost: f64, markup: f64) -> Self {
        Self {
            min_quantity,
            max_quantity,
            supplier_cost,
            customer_price: supplier_cost + markup,
            markup,
        }
    }
}

impl QuantityTier for CustomizationTier {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }

    fn max_quantity(&self) -> Option<i32> {
        self.max_quantity
    }
}

/// How a customization's price scales with the requested quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "model", content = "tiers", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingModel {
    PerUnit,
    FlatFee,
    /// Priced exactly like `FlatFee`; no share of the base price is taken.
    Percentage,
    Tiered(Vec<CustomizationTier>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomizationLimits {
    pub min_quantity: i32,
    pub max_quantity: Option<i32>,
    pub default_quantity: i32,
}

/// Declared relationships between customizations. Advisory only: the
/// calculator prices whatever is requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomizationDependencies {
    #[serde(default)]
    pub requires: Vec<CustomizationType>,
    #[serde(default)]
    pub excludes: Vec<CustomizationType>,
    #[serde(default)]
    pub implies: Vec<CustomizationType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupplierInfo {
    pub supplier_sku: Option<String>,
    /// Extra production days this customization adds
    pub processing_time: Option<u32>,
}

/// Catalog entry pricing one customization for one product type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationPricing {
    pub id: Uuid,
    pub product_type: ProductType,
    pub customization_type: CustomizationType,
    pub variant: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub pricing_model: PricingModel,
    pub supplier_cost: f64,
    pub markup: f64,
    pub customer_price: f64,
    #[serde(default)]
    pub limits: CustomizationLimits,
    #[serde(default)]
    pub dependencies: CustomizationDependencies,
    pub supplier_info: Option<SupplierInfo>,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

impl CustomizationPricing {
    /// New active entry; `customer_price` is derived as `supplier_cost + markup`.
    pub fn new(
        product_type: ProductType,
        customization_type: CustomizationType,
        name: impl Into<String>,
        pricing_model: PricingModel,
        supplier_cost: f64,
        markup: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_type,
            customization_type,
            variant: None,
            name: name.into(),
            description: None,
            pricing_model,
            supplier_cost,
            markup,
            customer_price: supplier_cost + markup,
            limits: CustomizationLimits { min_quantity: 0, max_quantity: None, default_quantity: 1 },
            dependencies: CustomizationDependencies::default(),
            supplier_info: None,
            is_active: true,
            updated_at: Utc::now(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_processing_time(mut self, days: u32) -> Self {
        let info = self.supplier_info.get_or_insert_with(SupplierInfo::default);
        info.processing_time = Some(days);
        self
    }

    pub fn with_limits(mut self, min_quantity: i32, max_quantity: Option<i32>, default_quantity: i32) -> Self {
        self.limits = CustomizationLimits { min_quantity, max_quantity, default_quantity };
        self
    }

    /// `customer_price == supplier_cost + markup` for the entry and all of its tiers.
    pub fn is_consistent(&self) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        let tiers_ok = match &self.pricing_model {
            PricingModel::Tiered(tiers) => tiers
                .iter()
                .all(|t| close(t.customer_price, t.supplier_cost + t.markup)),
            _ => true,
        };
        tiers_ok && close(self.customer_price, self.supplier_cost + self.markup)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for (field, value) in [
            ("supplier_cost", self.supplier_cost),
            ("markup", self.markup),
            ("customer_price", self.customer_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CatalogError::InvalidPrice { field, value });
            }
        }
        Ok(())
    }

    /// (unit price, unit cost, unit markup, effective quantity)
    fn unit_economics(&self, requested: i32) -> (f64, f64, f64, i32) {
        match &self.pricing_model {
            PricingModel::PerUnit => (self.customer_price, self.supplier_cost, self.markup, requested),
            PricingModel::FlatFee | PricingModel::Percentage => {
                (self.customer_price, self.supplier_cost, self.markup, 1)
            }
            PricingModel::Tiered(tiers) => match select_tier(tiers, requested) {
                Some(tier) => (tier.customer_price, tier.supplier_cost, tier.markup, requested),
                None => (self.customer_price, self.supplier_cost, self.markup, requested),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationItem {
    pub customization_type: CustomizationType,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationRequest {
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub base_price: f64,
    #[serde(default)]
    pub customizations: Vec<CustomizationItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCustomization {
    pub customization_id: Uuid,
    pub customization_type: CustomizationType,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub unit_markup: f64,
    pub total_price: f64,
    pub total_cost: f64,
    pub total_markup: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProcessingTime {
    pub base: u32,
    pub additional: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationResult {
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub base_price: f64,
    pub customization_cost: f64,
    pub total_price: f64,
    pub total_supplier_cost: f64,
    pub total_markup: f64,
    pub margin_percentage: f64,
    pub customizations: Vec<AppliedCustomization>,
    pub processing_time: ProcessingTime,
}

/// Prices requested customizations against a catalog snapshot.
///
/// Pure: the same request over the same snapshot always yields the same result.
pub struct CustomizationCalculator {
    base_processing_days: u32,
}

impl Default for CustomizationCalculator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl CustomizationCalculator {
    pub fn new(base_processing_days: u32) -> Self {
        Self { base_processing_days }
    }

    pub fn calculate(
        &self,
        request: &CustomizationRequest,
        catalog: &[CustomizationPricing],
    ) -> Result<CustomizationResult, CatalogError> {
        if !request.base_price.is_finite() || request.base_price < 0.0 {
            return Err(CatalogError::InvalidPrice { field: "base_price", value: request.base_price });
        }
        if let Some(item) = request.customizations.iter().find(|c| c.quantity < 0) {
            return Err(CatalogError::InvalidQuantity(item.quantity));
        }

        let mut customization_cost = 0.0;
        let mut total_supplier_cost = 0.0;
        let mut total_markup = 0.0;
        let mut additional_days = 0;
        let mut applied = Vec::with_capacity(request.customizations.len());

        for item in &request.customizations {
            let Some(entry) = find_entry(catalog, request.product_type, request.variant.as_deref(), item.customization_type)
            else {
                warn!(
                    product_type = %request.product_type,
                    customization_type = ?item.customization_type,
                    "No pricing for customization, skipping"
                );
                continue;
            };

            let (unit_price, unit_cost, unit_markup, quantity) = entry.unit_economics(item.quantity);
            let qty = quantity as f64;
            let line = AppliedCustomization {
                customization_id: entry.id,
                customization_type: entry.customization_type,
                name: entry.name.clone(),
                quantity,
                unit_price,
                unit_cost,
                unit_markup,
                total_price: unit_price * qty,
                total_cost: unit_cost * qty,
                total_markup: unit_markup * qty,
            };

            customization_cost += line.total_price;
            total_supplier_cost += line.total_cost;
            total_markup += line.total_markup;
            additional_days += entry
                .supplier_info
                .as_ref()
                .and_then(|info| info.processing_time)
                .unwrap_or(0);

            debug!(customization_type = ?line.customization_type, total = line.total_price, "Customization priced");
            applied.push(line);
        }

        let total_price = request.base_price + customization_cost;
        let margin_percentage = if total_price > 0.0 {
            total_markup / total_price * 100.0
        } else {
            0.0
        };

        Ok(CustomizationResult {
            product_type: request.product_type,
            variant: request.variant.clone(),
            base_price: request.base_price,
            customization_cost,
            total_price,
            total_supplier_cost,
            total_markup,
            margin_percentage,
            customizations: applied,
            processing_time: ProcessingTime {
                base: self.base_processing_days,
                additional: additional_days,
                total: self.base_processing_days + additional_days,
            },
        })
    }
}

/// Exact variant match first, then the variant-agnostic entry.
fn find_entry<'a>(
    catalog: &'a [CustomizationPricing],
    product_type: ProductType,
    variant: Option<&str>,
    customization_type: CustomizationType,
) -> Option<&'a CustomizationPricing> {
    let mut candidates = catalog.iter().filter(|c| {
        c.is_active && c.product_type == product_type && c.customization_type == customization_type
    });

    match variant {
        Some(v) => {
            let candidates: Vec<_> = candidates.collect();
            candidates
                .iter()
                .find(|c| c.variant.as_deref() == Some(v))
                .or_else(|| candidates.iter().find(|c| c.variant.is_none()))
                .copied()
        }
        None => candidates.find(|c| c.variant.is_none()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;
    use crate::seed::photo_book_customizations;

    fn request(items: &[(CustomizationType, i32)]) -> CustomizationRequest {
        CustomizationRequest {
            product_type: ProductType::PhotoBook,
            variant: None,
            base_price: 22.0,
            customizations: items
                .iter()
                .map(|(t, q)| CustomizationItem { customization_type: *t, quantity: *q })
                .collect(),
        }
    }

    #[test]
    fn test_extra_pages_per_unit() {
        let catalog = photo_book_customizations();
        let calc = CustomizationCalculator::default();

        let result = calc.calculate(&request(&[(CustomizationType::ExtraPages, 5)]), &catalog).unwrap();

        assert!(approx_eq(result.customization_cost, 5.0));
        assert!(approx_eq(result.total_price, 27.0));
        assert!(approx_eq(result.total_markup, 2.5));
        assert!(approx_eq(result.total_supplier_cost, 2.5));
        assert!(approx_eq(result.margin_percentage, 2.5 / 27.0 * 100.0));
    }

    #[test]
    fn test_mixed_customizations() {
        let catalog = photo_book_customizations();
        let calc = CustomizationCalculator::default();

        let result = calc
            .calculate(
                &request(&[
                    (CustomizationType::ExtraPages, 8),
                    (CustomizationType::CoverUpgrade, 1),
                    (CustomizationType::PaperUpgrade, 1),
                ]),
                &catalog,
            )
            .unwrap();

        assert!(approx_eq(result.total_price, 40.0));
        assert!(approx_eq(result.total_markup, 9.0));
        assert_eq!(result.customizations.len(), 3);
    }

    #[test]
    fn test_flat_fee_ignores_requested_quantity() {
        let catalog = photo_book_customizations();
        let result = CustomizationCalculator::default()
            .calculate(&request(&[(CustomizationType::CoverUpgrade, 4)]), &catalog)
            .unwrap();

        assert_eq!(result.customizations[0].quantity, 1);
        assert!(approx_eq(result.customization_cost, 5.0));
    }

    #[test]
    fn test_percentage_model_priced_as_flat_fee() {
        let catalog = vec![CustomizationPricing::new(
            ProductType::PhotoBook,
            CustomizationType::GiftWrap,
            "Gift wrap",
            PricingModel::Percentage,
            1.0,
            1.5,
        )];
        let result = CustomizationCalculator::default()
            .calculate(&request(&[(CustomizationType::GiftWrap, 3)]), &catalog)
            .unwrap();

        assert!(approx_eq(result.customization_cost, 2.5));
        assert_eq!(result.customizations[0].quantity, 1);
    }

    #[test]
    fn test_missing_entry_is_skipped() {
        let catalog = photo_book_customizations();
        let with_missing = CustomizationCalculator::default()
            .calculate(
                &request(&[(CustomizationType::ExtraPages, 5), (CustomizationType::FrameUpgrade, 2)]),
                &catalog,
            )
            .unwrap();
        let without = CustomizationCalculator::default()
            .calculate(&request(&[(CustomizationType::ExtraPages, 5)]), &catalog)
            .unwrap();

        assert_eq!(with_missing, without);
    }

    #[test]
    fn test_tiered_boundaries() {
        let catalog = vec![CustomizationPricing::new(
            ProductType::PhotoBook,
            CustomizationType::ExtraPages,
            "Extra pages",
            PricingModel::Tiered(vec![
                CustomizationTier::new(10, Some(19), 0.4, 0.4),
                CustomizationTier::new(20, None, 0.3, 0.3),
            ]),
            0.5,
            0.5,
        )];
        let calc = CustomizationCalculator::default();

        let below = calc.calculate(&request(&[(CustomizationType::ExtraPages, 9)]), &catalog).unwrap();
        assert!(approx_eq(below.customizations[0].unit_price, 1.0));

        let first = calc.calculate(&request(&[(CustomizationType::ExtraPages, 10)]), &catalog).unwrap();
        assert!(approx_eq(first.customizations[0].unit_price, 0.8));
        assert!(approx_eq(first.customization_cost, 8.0));

        let second = calc.calculate(&request(&[(CustomizationType::ExtraPages, 20)]), &catalog).unwrap();
        assert!(approx_eq(second.customizations[0].unit_price, 0.6));
        assert!(approx_eq(second.total_markup, 6.0));
    }

    #[test]
    fn test_variant_specific_entry_preferred() {
        let mut catalog = photo_book_customizations();
        catalog.push(
            CustomizationPricing::new(
                ProductType::PhotoBook,
                CustomizationType::CoverUpgrade,
                "Linen cover (large)",
                PricingModel::FlatFee,
                4.0,
                4.0,
            )
            .with_variant("A3_LANDSCAPE"),
        );

        let mut req = request(&[(CustomizationType::CoverUpgrade, 1)]);
        req.variant = Some("A3_LANDSCAPE".to_string());
        let large = CustomizationCalculator::default().calculate(&req, &catalog).unwrap();
        assert!(approx_eq(large.customization_cost, 8.0));

        req.variant = Some("A5_PORTRAIT".to_string());
        let small = CustomizationCalculator::default().calculate(&req, &catalog).unwrap();
        assert!(approx_eq(small.customization_cost, 5.0));
    }

    #[test]
    fn test_processing_time_accumulates() {
        let catalog = photo_book_customizations();
        let result = CustomizationCalculator::default()
            .calculate(
                &request(&[(CustomizationType::CoverUpgrade, 1), (CustomizationType::PaperUpgrade, 1)]),
                &catalog,
            )
            .unwrap();

        assert_eq!(result.processing_time.base, 3);
        assert_eq!(result.processing_time.additional, 3);
        assert_eq!(result.processing_time.total, 6);
    }

    #[test]
    fn test_identical_inputs_identical_output() {
        let catalog = photo_book_customizations();
        let req = request(&[(CustomizationType::ExtraPages, 8), (CustomizationType::CoverUpgrade, 1)]);
        let calc = CustomizationCalculator::default();

        let first = serde_json::to_string(&calc.calculate(&req, &catalog).unwrap()).unwrap();
        let second = serde_json::to_string(&calc.calculate(&req, &catalog).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let catalog = photo_book_customizations();
        let err = CustomizationCalculator::default()
            .calculate(&request(&[(CustomizationType::ExtraPages, -1)]), &catalog)
            .unwrap_err();
        assert_eq!(err, CatalogError::InvalidQuantity(-1));
    }

    #[test]
    fn test_seeded_entries_keep_price_invariant() {
        assert!(photo_book_customizations().iter().all(CustomizationPricing::is_consistent));
    }

    #[test]
    fn test_as_str_matches_wire_name() {
        for t in [
            CustomizationType::ExtraPages,
            CustomizationType::CoverUpgrade,
            CustomizationType::PaperUpgrade,
            CustomizationType::SizeUpgrade,
            CustomizationType::Lamination,
            CustomizationType::GiftWrap,
            CustomizationType::PersonalizedText,
            CustomizationType::RushProcessing,
            CustomizationType::FrameUpgrade,
        ] {
            assert_eq!(serde_json::to_value(t).unwrap(), serde_json::Value::from(t.as_str()));
        }
    }
}
