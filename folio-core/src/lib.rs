pub mod repository;
pub mod cache;
pub mod supplier;

use folio_catalog::CatalogError;
use folio_rules::RuleError;

pub use cache::{CacheKey, PriceCache};
pub use repository::{CatalogRepository, CostRepository, RepoResult, RuleRepository};
pub use supplier::{SupplierCostFeed, SupplierQuote};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid supplier cost: {0}")]
    InvalidCost(f64),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Repository error: {0}")]
    RepositoryError(String),
    #[error("Transient failure, retry: {0}")]
    TransientError(String),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound { kind, id: id.to_string() }
    }

    pub fn repository(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::RepositoryError(err.to_string())
    }
}

impl From<CatalogError> for CoreError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidCost(cost) => CoreError::InvalidCost(cost),
            other => CoreError::ValidationError(other.to_string()),
        }
    }
}

impl From<RuleError> for CoreError {
    fn from(err: RuleError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
