use async_trait::async_trait;
use uuid::Uuid;

use folio_catalog::{CostModel, CustomizationPricing, ProductType, SupplierProduct};
use folio_rules::PricingRule;

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Repository trait for pricing rules
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Every rule, including inactive ones; matching happens in-process.
    async fn list_rules(&self) -> RepoResult<Vec<PricingRule>>;

    async fn get_rule(&self, id: Uuid) -> RepoResult<Option<PricingRule>>;

    async fn save_rule(&self, rule: &PricingRule) -> RepoResult<()>;

    /// Returns false when no rule had this id.
    async fn delete_rule(&self, id: Uuid) -> RepoResult<bool>;
}

/// Repository trait for product cost structures and supplier sourcing
#[async_trait]
pub trait CostRepository: Send + Sync {
    async fn get_cost_model(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
    ) -> RepoResult<Option<CostModel>>;

    async fn save_cost_model(&self, model: &CostModel) -> RepoResult<()>;

    async fn get_supplier_product(&self, id: Uuid) -> RepoResult<Option<SupplierProduct>>;

    /// All offers (active or not) for a product and variant.
    async fn list_supplier_products(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
    ) -> RepoResult<Vec<SupplierProduct>>;

    async fn save_supplier_product(&self, product: &SupplierProduct) -> RepoResult<()>;
}

/// Repository trait for the customization catalog
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_customizations(&self, product_type: ProductType) -> RepoResult<Vec<CustomizationPricing>>;

    async fn get_customization(&self, id: Uuid) -> RepoResult<Option<CustomizationPricing>>;

    async fn save_customization(&self, entry: &CustomizationPricing) -> RepoResult<()>;
}
