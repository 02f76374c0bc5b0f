use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use folio_core::repository::RepoResult;
use folio_core::supplier::{SupplierCostFeed, SupplierQuote};

/// Supplier price list dropped as a JSON array of quotes
pub struct FileCostFeed {
    path: PathBuf,
}

impl FileCostFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SupplierCostFeed for FileCostFeed {
    async fn fetch_quotes(&self) -> RepoResult<Vec<SupplierQuote>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let quotes: Vec<SupplierQuote> = serde_json::from_str(&raw)?;
        info!(path = %self.path.display(), quotes = quotes.len(), "Loaded supplier price feed");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_reads_quotes_from_file() {
        let id = Uuid::new_v4();
        let path = std::env::temp_dir().join(format!("folio-feed-{}.json", Uuid::new_v4()));
        let body = serde_json::json!([{ "supplier_product_id": id, "supplier_price": 4.25 }]);
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let quotes = FileCostFeed::new(&path).fetch_quotes().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(quotes, vec![SupplierQuote { supplier_product_id: id, supplier_price: 4.25 }]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let feed = FileCostFeed::new("/nonexistent/folio-feed.json");
        assert!(feed.fetch_quotes().await.is_err());
    }
}
