use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleChange {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RuleChangedEvent {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub change: RuleChange,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct CustomizationChangedEvent {
    pub customization_id: Uuid,
    pub product_type: String,
    pub customization_type: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct SupplierPricesSyncedEvent {
    pub updated: Vec<Uuid>,
    pub skipped: usize,
    pub timestamp: i64,
}

/// Anything an administrator changed that can invalidate a computed price.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CatalogEvent {
    RuleChanged(RuleChangedEvent),
    CustomizationChanged(CustomizationChangedEvent),
    SupplierPricesSynced(SupplierPricesSyncedEvent),
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CatalogEvent::RuleChanged(_) => "pricing.rule_changed",
            CatalogEvent::CustomizationChanged(_) => "pricing.customization_changed",
            CatalogEvent::SupplierPricesSynced(_) => "pricing.supplier_prices_synced",
        }
    }
}

/// Event timestamps are unix seconds.
pub fn event_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
