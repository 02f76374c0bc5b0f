use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use folio_catalog::{
    CatalogError, CostModel, CostTier, CustomizationPricing, Markup, ProductType, SupplierProduct, VolumePrice,
};
use folio_core::repository::{CatalogRepository, CostRepository, RepoResult, RuleRepository};
use folio_rules::PricingRule;

/// Process-local store backing all three repositories.
///
/// Rows keep insertion order so snapshots are deterministic; a save with an
/// existing id replaces that row in place (last write wins).
#[derive(Default)]
pub struct InMemoryStore {
    rules: RwLock<Vec<PricingRule>>,
    cost_models: RwLock<Vec<CostModel>>,
    supplier_products: RwLock<Vec<SupplierProduct>>,
    customizations: RwLock<Vec<CustomizationPricing>>,
}

fn upsert<T: Clone>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool) {
    match rows.iter_mut().find(|r| same(r)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the default rules, customization catalog and a
    /// small set of cost models and supplier offers.
    pub fn seeded() -> Result<Self, CatalogError> {
        let rules = folio_rules::default_rules();
        let customizations = folio_catalog::seed::default_customizations();
        let cost_models = sample_cost_models();
        let supplier_products = sample_supplier_products()?;
        info!(
            rules = rules.len(),
            customizations = customizations.len(),
            cost_models = cost_models.len(),
            supplier_products = supplier_products.len(),
            "Seeding in-memory pricing store"
        );
        Ok(Self {
            rules: RwLock::new(rules),
            cost_models: RwLock::new(cost_models),
            supplier_products: RwLock::new(supplier_products),
            customizations: RwLock::new(customizations),
        })
    }
}

fn sample_cost_models() -> Vec<CostModel> {
    vec![
        CostModel {
            id: Uuid::new_v4(),
            product_type: ProductType::PhotoBook,
            variant: None,
            supplier_cost: 6.5,
            handling_cost: 0.75,
            shipping_cost: 1.5,
            packaging_cost: 0.5,
            volume_tiers: vec![
                CostTier { min_quantity: 10, max_quantity: Some(49), unit_cost: 5.8 },
                CostTier { min_quantity: 50, max_quantity: None, unit_cost: 5.2 },
            ],
        },
        CostModel {
            id: Uuid::new_v4(),
            product_type: ProductType::Mug,
            variant: None,
            supplier_cost: 2.9,
            handling_cost: 0.3,
            shipping_cost: 1.2,
            packaging_cost: 0.4,
            volume_tiers: Vec::new(),
        },
    ]
}

fn sample_supplier_products() -> Result<Vec<SupplierProduct>, CatalogError> {
    let printlab = Uuid::new_v4();
    let mut hardcover = SupplierProduct::new(
        printlab,
        "Printlab",
        ProductType::PhotoBook,
        Some("A4_HARDCOVER".to_string()),
        4.0,
        Markup::Amount(18.0),
    )?;
    hardcover.shipping_days = Some(4);
    hardcover.volume_pricing = vec![VolumePrice {
        min_quantity: 25,
        max_quantity: None,
        supplier_price: 3.5,
        selling_price: 19.5,
        markup: 16.0,
    }];

    let mut express = SupplierProduct::new(
        Uuid::new_v4(),
        "Bindery Express",
        ProductType::PhotoBook,
        Some("A4_HARDCOVER".to_string()),
        5.0,
        Markup::Percentage(300.0),
    )?;
    express.shipping_days = Some(2);

    let mut canvas = SupplierProduct::new(
        printlab,
        "Printlab",
        ProductType::CanvasPrint,
        Some("30X40".to_string()),
        9.0,
        Markup::Percentage(150.0),
    )?;
    canvas.shipping_days = Some(5);

    Ok(vec![hardcover, express, canvas])
}

#[async_trait]
impl RuleRepository for InMemoryStore {
    async fn list_rules(&self) -> RepoResult<Vec<PricingRule>> {
        Ok(self.rules.read().await.clone())
    }

    async fn get_rule(&self, id: Uuid) -> RepoResult<Option<PricingRule>> {
        Ok(self.rules.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn save_rule(&self, rule: &PricingRule) -> RepoResult<()> {
        let mut rules = self.rules.write().await;
        upsert(&mut rules, rule, |r| r.id == rule.id);
        Ok(())
    }

    async fn delete_rule(&self, id: Uuid) -> RepoResult<bool> {
        let mut rules = self.rules.write().await;
        let before = rules.len();
        rules.retain(|r| r.id != id);
        Ok(rules.len() != before)
    }
}

#[async_trait]
impl CostRepository for InMemoryStore {
    async fn get_cost_model(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
    ) -> RepoResult<Option<CostModel>> {
        let models = self.cost_models.read().await;
        let candidates: Vec<&CostModel> = models.iter().filter(|m| m.product_type == product_type).collect();

        let exact = variant.and_then(|v| candidates.iter().find(|m| m.variant.as_deref() == Some(v)));
        Ok(exact
            .or_else(|| candidates.iter().find(|m| m.variant.is_none()))
            .map(|m| (*m).clone()))
    }

    async fn save_cost_model(&self, model: &CostModel) -> RepoResult<()> {
        let mut models = self.cost_models.write().await;
        upsert(&mut models, model, |m| m.id == model.id);
        Ok(())
    }

    async fn get_supplier_product(&self, id: Uuid) -> RepoResult<Option<SupplierProduct>> {
        Ok(self.supplier_products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list_supplier_products(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
    ) -> RepoResult<Vec<SupplierProduct>> {
        Ok(self
            .supplier_products
            .read()
            .await
            .iter()
            .filter(|p| p.product_type == product_type && p.variant.as_deref() == variant)
            .cloned()
            .collect())
    }

    async fn save_supplier_product(&self, product: &SupplierProduct) -> RepoResult<()> {
        let mut products = self.supplier_products.write().await;
        upsert(&mut products, product, |p| p.id == product.id);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_customizations(&self, product_type: ProductType) -> RepoResult<Vec<CustomizationPricing>> {
        Ok(self
            .customizations
            .read()
            .await
            .iter()
            .filter(|c| c.product_type == product_type)
            .cloned()
            .collect())
    }

    async fn get_customization(&self, id: Uuid) -> RepoResult<Option<CustomizationPricing>> {
        Ok(self.customizations.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn save_customization(&self, entry: &CustomizationPricing) -> RepoResult<()> {
        let mut entries = self.customizations.write().await;
        upsert(&mut entries, entry, |c| c.id == entry.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_rules::RuleType;

    #[tokio::test]
    async fn test_rule_upsert_and_delete() {
        let store = InMemoryStore::new();
        let mut rule = PricingRule::new("Launch promo", RuleType::Percentage, 5);

        store.save_rule(&rule).await.unwrap();
        rule.priority = 9;
        store.save_rule(&rule).await.unwrap();

        let rules = store.list_rules().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].priority, 9);

        assert!(store.delete_rule(rule.id).await.unwrap());
        assert!(!store.delete_rule(rule.id).await.unwrap());
        assert!(store.get_rule(rule.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cost_model_prefers_exact_variant() {
        let store = InMemoryStore::new();
        let generic = CostModel {
            id: Uuid::new_v4(),
            product_type: ProductType::Mug,
            variant: None,
            supplier_cost: 3.0,
            handling_cost: 0.2,
            shipping_cost: 1.0,
            packaging_cost: 0.3,
            volume_tiers: vec![CostTier { min_quantity: 12, max_quantity: None, unit_cost: 2.5 }],
        };
        let magic = CostModel { id: Uuid::new_v4(), variant: Some("MAGIC".into()), supplier_cost: 5.0, ..generic.clone() };
        store.save_cost_model(&generic).await.unwrap();
        store.save_cost_model(&magic).await.unwrap();

        let found = store.get_cost_model(ProductType::Mug, Some("MAGIC")).await.unwrap().unwrap();
        assert_eq!(found.id, magic.id);
        let fallback = store.get_cost_model(ProductType::Mug, Some("ENAMEL")).await.unwrap().unwrap();
        assert_eq!(fallback.id, generic.id);
        assert!(store.get_cost_model(ProductType::Poster, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_supplier_products_filtered_by_variant() {
        let store = InMemoryStore::new();
        let a4 = SupplierProduct::new(Uuid::new_v4(), "Printlab", ProductType::PhotoBook, Some("A4".into()), 4.0, Markup::Amount(18.0)).unwrap();
        let a3 = SupplierProduct::new(Uuid::new_v4(), "Printlab", ProductType::PhotoBook, Some("A3".into()), 6.0, Markup::Amount(20.0)).unwrap();
        store.save_supplier_product(&a4).await.unwrap();
        store.save_supplier_product(&a3).await.unwrap();

        let listed = store.list_supplier_products(ProductType::PhotoBook, Some("A4")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, a4.id);
    }

    #[tokio::test]
    async fn test_seeded_store_has_catalog() {
        let store = InMemoryStore::seeded().unwrap();
        assert!(!store.list_rules().await.unwrap().is_empty());
        assert!(!store.list_customizations(ProductType::PhotoBook).await.unwrap().is_empty());
        let offers = store
            .list_supplier_products(ProductType::PhotoBook, Some("A4_HARDCOVER"))
            .await
            .unwrap();
        assert_eq!(offers.len(), 2);
    }
}
