use std::sync::Arc;

use folio_core::SupplierCostFeed;
use folio_pricing::{AdminService, PricingService};

/// Admin tokens are issued elsewhere; this service only verifies them.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingService>,
    pub admin: Arc<AdminService>,
    /// `None` when no supplier price feed is configured
    pub supplier_feed: Option<Arc<dyn SupplierCostFeed>>,
    pub auth: AuthConfig,
}
