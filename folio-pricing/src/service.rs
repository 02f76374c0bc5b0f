use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use folio_catalog::{
    CustomizationCalculator, CustomizationRequest, CustomizationResult, Markup, MarkupQuote, ProductType,
    SupplierComparison,
};
use folio_core::{CacheKey, CatalogRepository, CoreError, CoreResult, CostRepository, PriceCache, RuleRepository};
use folio_rules::{PricingPipeline, PricingRequest, PricingResult, RuleMatcher};

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Read-side pricing operations over the rule, cost and catalog stores.
///
/// Every call works on a fresh snapshot of the stores; nothing here mutates them.
pub struct PricingService {
    rules: Arc<dyn RuleRepository>,
    costs: Arc<dyn CostRepository>,
    catalog: Arc<dyn CatalogRepository>,
    cache: Option<Arc<dyn PriceCache>>,
    cache_ttl: Duration,
    pipeline: PricingPipeline,
    customizations: CustomizationCalculator,
}

impl PricingService {
    pub fn new(
        rules: Arc<dyn RuleRepository>,
        costs: Arc<dyn CostRepository>,
        catalog: Arc<dyn CatalogRepository>,
        pipeline: PricingPipeline,
    ) -> Self {
        Self {
            rules,
            costs,
            catalog,
            cache: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            pipeline,
            customizations: CustomizationCalculator::default(),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn PriceCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    pub fn with_customization_calculator(mut self, calculator: CustomizationCalculator) -> Self {
        self.customizations = calculator;
        self
    }

    /// Price a product request through the rule pipeline.
    ///
    /// Cache failures only cost latency: reads fall through to a computation and
    /// write errors are logged.
    #[instrument(skip(self, request), fields(product_type = %request.product_type, quantity = request.quantity))]
    pub async fn calculate_price(&self, request: &PricingRequest) -> CoreResult<PricingResult> {
        request.validate()?;

        let cached = match &self.cache {
            Some(cache) => CacheKey::for_request(request).map(|key| (cache, key)),
            None => None,
        };

        if let Some((cache, key)) = &cached {
            match cache.get(key).await {
                Ok(Some(hit)) => {
                    debug!("Price cache hit");
                    return Ok(hit);
                }
                Ok(None) => debug!("Price cache miss"),
                Err(e) => warn!(error = %e, "Price cache read failed, computing"),
            }
        }

        let at = request.timestamp.unwrap_or_else(Utc::now);
        let rules = self.rules.list_rules().await.map_err(CoreError::repository)?;
        let matcher = RuleMatcher::new(rules);
        let applicable = matcher.applicable_rules(request, at);
        debug!(matched = applicable.len(), "Matched pricing rules");

        let result = self.pipeline.calculate(request, &applicable, at);

        if let Some((cache, key)) = &cached {
            if let Err(e) = cache.set(key, &result, self.cache_ttl).await {
                warn!(error = %e, "Price cache write failed");
            }
        }

        Ok(result)
    }

    /// Price a base product plus its requested customizations.
    #[instrument(skip(self, request), fields(product_type = %request.product_type))]
    pub async fn calculate_customized_price(&self, request: &CustomizationRequest) -> CoreResult<CustomizationResult> {
        let catalog = self
            .catalog
            .list_customizations(request.product_type)
            .await
            .map_err(CoreError::repository)?;
        Ok(self.customizations.calculate(request, &catalog)?)
    }

    /// Resolve a supplier product's markup at `quantity`, honouring its volume pricing.
    #[instrument(skip(self))]
    pub async fn calculate_markup_price(&self, supplier_product_id: Uuid, quantity: i32) -> CoreResult<MarkupQuote> {
        let product = self
            .costs
            .get_supplier_product(supplier_product_id)
            .await
            .map_err(CoreError::repository)?
            .ok_or_else(|| CoreError::not_found("supplier product", supplier_product_id))?;
        Ok(product.price_for_quantity(quantity)?)
    }

    /// Quote a self-produced product from its landed cost.
    #[instrument(skip(self))]
    pub async fn quote_from_cost_model(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
        quantity: i32,
        desired: Markup,
    ) -> CoreResult<MarkupQuote> {
        let model = self
            .costs
            .get_cost_model(product_type, variant)
            .await
            .map_err(CoreError::repository)?
            .ok_or_else(|| {
                CoreError::not_found("cost model", format!("{}/{}", product_type, variant.unwrap_or("-")))
            })?;
        Ok(model.quote(quantity, desired)?)
    }

    #[instrument(skip(self))]
    pub async fn compare_suppliers(
        &self,
        product_type: ProductType,
        variant: Option<&str>,
        quantity: i32,
    ) -> CoreResult<Vec<SupplierComparison>> {
        if quantity < 1 {
            return Err(CoreError::ValidationError(format!("quantity must be at least 1, got {quantity}")));
        }
        let offers = self
            .costs
            .list_supplier_products(product_type, variant)
            .await
            .map_err(CoreError::repository)?;
        Ok(folio_catalog::compare_suppliers(&offers, quantity))
    }
}
