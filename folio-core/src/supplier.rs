use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::RepoResult;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierQuote {
    pub supplier_product_id: Uuid,
    pub supplier_price: f64,
}

/// External feed of current supplier prices
#[async_trait]
pub trait SupplierCostFeed: Send + Sync {
    async fn fetch_quotes(&self) -> RepoResult<Vec<SupplierQuote>>;
}
