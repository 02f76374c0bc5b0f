use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use folio_catalog::{
    CustomizationDependencies, CustomizationLimits, CustomizationPricing, CustomizationType, Markup,
    PriceCalculation, PricingModel, ProductType, SupplierInfo,
};
use folio_core::{CatalogRepository, CoreError, CoreResult, CostRepository, RuleRepository, SupplierCostFeed};
use folio_rules::{AbTesting, DynamicPricing, PricingRule, RuleConditions, RuleDiscount, RulePricing, RuleScope, RuleType};
use folio_shared::{
    event_timestamp, CatalogEvent, CustomizationChangedEvent, RuleChange, RuleChangedEvent,
    SupplierPricesSyncedEvent,
};

/// Rule fields an administrator authors. Identity and timestamps are owned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDraft {
    pub name: String,
    pub description: Option<String>,
    pub rule_type: RuleType,
    pub scope: Option<RuleScope>,
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub pricing: Option<RulePricing>,
    pub discount: Option<RuleDiscount>,
    pub dynamic: Option<DynamicPricing>,
    pub ab_testing: Option<AbTesting>,
}

fn default_active() -> bool {
    true
}

impl RuleDraft {
    fn apply_to(self, rule: &mut PricingRule) {
        rule.name = self.name;
        rule.description = self.description;
        rule.rule_type = self.rule_type;
        if let Some(scope) = self.scope {
            rule.scope = scope;
        }
        rule.priority = self.priority;
        rule.is_active = self.is_active;
        rule.valid_from = self.valid_from;
        rule.valid_until = self.valid_until;
        rule.conditions = self.conditions;
        rule.pricing = self.pricing;
        rule.discount = self.discount;
        rule.dynamic = self.dynamic;
        rule.ab_testing = self.ab_testing;
    }
}

/// Catalog entry as authored. `customer_price` is always derived from cost plus markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomizationDraft {
    pub product_type: ProductType,
    pub customization_type: CustomizationType,
    pub variant: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub pricing_model: PricingModel,
    pub supplier_cost: f64,
    pub markup: f64,
    pub limits: Option<CustomizationLimits>,
    #[serde(default)]
    pub dependencies: CustomizationDependencies,
    pub supplier_info: Option<SupplierInfo>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Outcome of a supplier price sync
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub updated: Vec<Uuid>,
    pub skipped: usize,
}

/// Admin-only mutations of rules, catalog entries and supplier products.
///
/// Writes are single-document, last write wins. Each successful mutation that can
/// change a computed price is announced on the event channel.
pub struct AdminService {
    rules: Arc<dyn RuleRepository>,
    costs: Arc<dyn CostRepository>,
    catalog: Arc<dyn CatalogRepository>,
    events: Option<broadcast::Sender<CatalogEvent>>,
}

impl AdminService {
    pub fn new(
        rules: Arc<dyn RuleRepository>,
        costs: Arc<dyn CostRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self { rules, costs, catalog, events: None }
    }

    pub fn with_events(mut self, events: broadcast::Sender<CatalogEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn publish(&self, event: CatalogEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        // No subscribers is fine
        if tx.send(event).is_err() {
            debug!("No listeners for catalog event");
        }
    }

    fn rule_changed(&self, rule: &PricingRule, change: RuleChange) {
        self.publish(CatalogEvent::RuleChanged(RuleChangedEvent {
            rule_id: rule.id,
            rule_name: rule.name.clone(),
            change,
            timestamp: event_timestamp(),
        }));
    }

    pub async fn list_rules(&self) -> CoreResult<Vec<PricingRule>> {
        self.rules.list_rules().await.map_err(CoreError::repository)
    }

    pub async fn get_rule(&self, id: Uuid) -> CoreResult<PricingRule> {
        self.rules
            .get_rule(id)
            .await
            .map_err(CoreError::repository)?
            .ok_or_else(|| CoreError::not_found("pricing rule", id))
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_rule(&self, draft: RuleDraft) -> CoreResult<PricingRule> {
        let mut rule = PricingRule::new(draft.name.clone(), draft.rule_type, draft.priority);
        draft.apply_to(&mut rule);
        rule.validate()?;

        self.rules.save_rule(&rule).await.map_err(CoreError::repository)?;
        info!(rule_id = %rule.id, "Pricing rule created");
        self.rule_changed(&rule, RuleChange::Created);
        Ok(rule)
    }

    #[instrument(skip(self, draft))]
    pub async fn update_rule(&self, id: Uuid, draft: RuleDraft) -> CoreResult<PricingRule> {
        let mut rule = self.get_rule(id).await?;
        draft.apply_to(&mut rule);
        rule.validate()?;
        rule.updated_at = Utc::now();

        self.rules.save_rule(&rule).await.map_err(CoreError::repository)?;
        info!(rule_id = %rule.id, "Pricing rule updated");
        self.rule_changed(&rule, RuleChange::Updated);
        Ok(rule)
    }

    #[instrument(skip(self))]
    pub async fn delete_rule(&self, id: Uuid) -> CoreResult<()> {
        let rule = self.get_rule(id).await?;
        if !self.rules.delete_rule(id).await.map_err(CoreError::repository)? {
            return Err(CoreError::not_found("pricing rule", id));
        }
        info!(rule_id = %id, "Pricing rule deleted");
        self.rule_changed(&rule, RuleChange::Deleted);
        Ok(())
    }

    /// Create or replace the entry for (product type, customization type, variant).
    #[instrument(skip(self, draft), fields(product_type = %draft.product_type, customization_type = ?draft.customization_type))]
    pub async fn upsert_customization(&self, draft: CustomizationDraft) -> CoreResult<CustomizationPricing> {
        let existing = self
            .catalog
            .list_customizations(draft.product_type)
            .await
            .map_err(CoreError::repository)?
            .into_iter()
            .find(|c| c.customization_type == draft.customization_type && c.variant == draft.variant);

        let mut entry = CustomizationPricing::new(
            draft.product_type,
            draft.customization_type,
            draft.name,
            draft.pricing_model,
            draft.supplier_cost,
            draft.markup,
        );
        if let Some(existing) = &existing {
            entry.id = existing.id;
        }
        entry.variant = draft.variant;
        entry.description = draft.description;
        if let Some(limits) = draft.limits {
            entry.limits = limits;
        }
        entry.dependencies = draft.dependencies;
        entry.supplier_info = draft.supplier_info;
        entry.is_active = draft.is_active;

        entry.validate()?;
        if !entry.is_consistent() {
            return Err(CoreError::ValidationError(format!(
                "{}: tier customer_price must equal supplier_cost + markup",
                entry.name
            )));
        }

        self.catalog.save_customization(&entry).await.map_err(CoreError::repository)?;
        info!(customization_id = %entry.id, created = existing.is_none(), "Customization pricing saved");
        self.publish(CatalogEvent::CustomizationChanged(CustomizationChangedEvent {
            customization_id: entry.id,
            product_type: entry.product_type.to_string(),
            customization_type: entry.customization_type.as_str().to_string(),
            timestamp: event_timestamp(),
        }));
        Ok(entry)
    }

    /// Re-price a supplier product with a new markup, keeping its supplier price.
    #[instrument(skip(self))]
    pub async fn update_supplier_markup(&self, id: Uuid, desired: Markup) -> CoreResult<PriceCalculation> {
        let mut product = self
            .costs
            .get_supplier_product(id)
            .await
            .map_err(CoreError::repository)?
            .ok_or_else(|| CoreError::not_found("supplier product", id))?;

        let calc = product.apply_markup(desired)?;
        self.costs.save_supplier_product(&product).await.map_err(CoreError::repository)?;
        info!(
            supplier_product_id = %id,
            selling_price = calc.selling_price,
            markup = calc.markup,
            "Supplier markup updated"
        );
        Ok(calc)
    }

    /// Pull current supplier prices and re-sync every known product, holding its markup amount.
    ///
    /// Unknown ids and unusable prices are skipped, not fatal.
    #[instrument(skip(self, feed))]
    pub async fn sync_supplier_prices(&self, feed: &dyn SupplierCostFeed) -> CoreResult<SyncReport> {
        let quotes = feed
            .fetch_quotes()
            .await
            .map_err(|e| CoreError::TransientError(e.to_string()))?;

        let mut report = SyncReport { updated: Vec::new(), skipped: 0 };
        for quote in quotes {
            let product = self
                .costs
                .get_supplier_product(quote.supplier_product_id)
                .await
                .map_err(CoreError::repository)?;
            let Some(mut product) = product else {
                warn!(supplier_product_id = %quote.supplier_product_id, "Unknown supplier product in feed, skipping");
                report.skipped += 1;
                continue;
            };

            if let Err(e) = product.resync_supplier_price(quote.supplier_price) {
                warn!(supplier_product_id = %product.id, error = %e, "Unusable supplier price, skipping");
                report.skipped += 1;
                continue;
            }

            self.costs.save_supplier_product(&product).await.map_err(CoreError::repository)?;
            report.updated.push(product.id);
        }

        info!(updated = report.updated.len(), skipped = report.skipped, "Supplier prices synced");
        self.publish(CatalogEvent::SupplierPricesSynced(SupplierPricesSyncedEvent {
            updated: report.updated.clone(),
            skipped: report.skipped,
            timestamp: event_timestamp(),
        }));
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_store::InMemoryStore;

    fn admin(store: Arc<InMemoryStore>) -> AdminService {
        AdminService::new(store.clone(), store.clone(), store)
    }

    fn fixed_draft(name: &str, price: f64) -> RuleDraft {
        RuleDraft {
            name: name.to_string(),
            description: None,
            rule_type: RuleType::Fixed,
            scope: None,
            priority: 10,
            is_active: true,
            valid_from: None,
            valid_until: None,
            conditions: RuleConditions::default(),
            pricing: Some(RulePricing::BasePrice(price)),
            discount: None,
            dynamic: None,
            ab_testing: None,
        }
    }

    #[tokio::test]
    async fn test_create_rule_emits_event() {
        let (tx, mut rx) = broadcast::channel(8);
        let svc = admin(Arc::new(InMemoryStore::new())).with_events(tx);

        let rule = svc.create_rule(fixed_draft("Poster base", 12.0)).await.unwrap();

        match rx.recv().await.unwrap() {
            CatalogEvent::RuleChanged(e) => {
                assert_eq!(e.rule_id, rule.id);
                assert_eq!(e.change, RuleChange::Created);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_rule_rejected() {
        let svc = admin(Arc::new(InMemoryStore::new()));
        let mut draft = fixed_draft("Broken", 5.0);
        draft.pricing = None;

        let err = svc.create_rule(draft).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(svc.list_rules().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_rule() {
        let svc = admin(Arc::new(InMemoryStore::new()));
        let id = Uuid::new_v4();

        let err = svc.update_rule(id, fixed_draft("Ghost", 1.0)).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
        let err = svc.delete_rule(id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_identity() {
        let svc = admin(Arc::new(InMemoryStore::new()));
        let created = svc.create_rule(fixed_draft("Mug base", 9.0)).await.unwrap();

        let updated = svc.update_rule(created.id, fixed_draft("Mug base", 11.0)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.base_price(), Some(11.0));
    }

    #[tokio::test]
    async fn test_upsert_customization_replaces_same_key() {
        let store = Arc::new(InMemoryStore::new());
        let svc = admin(store.clone());
        let draft = CustomizationDraft {
            product_type: ProductType::Mug,
            customization_type: CustomizationType::GiftWrap,
            variant: None,
            name: "Gift wrap".to_string(),
            description: None,
            pricing_model: PricingModel::FlatFee,
            supplier_cost: 1.0,
            markup: 1.5,
            limits: None,
            dependencies: CustomizationDependencies::default(),
            supplier_info: None,
            is_active: true,
        };

        let first = svc.upsert_customization(draft.clone()).await.unwrap();
        let second = svc.upsert_customization(CustomizationDraft { markup: 2.0, ..draft }).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!((second.customer_price - 3.0).abs() < 1e-9);
        assert_eq!(store.list_customizations(ProductType::Mug).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_customization_event_uses_wire_names() {
        let (tx, mut rx) = broadcast::channel(8);
        let svc = admin(Arc::new(InMemoryStore::new())).with_events(tx);
        let draft = CustomizationDraft {
            product_type: ProductType::Mug,
            customization_type: CustomizationType::GiftWrap,
            variant: None,
            name: "Gift wrap".to_string(),
            description: None,
            pricing_model: PricingModel::FlatFee,
            supplier_cost: 1.0,
            markup: 1.5,
            limits: None,
            dependencies: CustomizationDependencies::default(),
            supplier_info: None,
            is_active: true,
        };

        let entry = svc.upsert_customization(draft).await.unwrap();

        match rx.recv().await.unwrap() {
            CatalogEvent::CustomizationChanged(e) => {
                assert_eq!(e.customization_id, entry.id);
                assert_eq!(e.product_type, "MUG");
                assert_eq!(e.customization_type, "GIFT_WRAP");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_negative_customization_cost_rejected() {
        let svc = admin(Arc::new(InMemoryStore::new()));
        let draft = CustomizationDraft {
            product_type: ProductType::Mug,
            customization_type: CustomizationType::PersonalizedText,
            variant: None,
            name: "Text".to_string(),
            description: None,
            pricing_model: PricingModel::PerUnit,
            supplier_cost: -1.0,
            markup: 1.0,
            limits: None,
            dependencies: CustomizationDependencies::default(),
            supplier_info: None,
            is_active: true,
        };

        let err = svc.upsert_customization(draft).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
