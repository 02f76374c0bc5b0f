pub mod service;
pub mod admin;

pub use service::PricingService;
pub use admin::{AdminService, CustomizationDraft, RuleDraft, SyncReport};
