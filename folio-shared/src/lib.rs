pub mod models;

pub use models::events::{event_timestamp, CatalogEvent, CustomizationChangedEvent, RuleChangedEvent, RuleChange, SupplierPricesSyncedEvent};
