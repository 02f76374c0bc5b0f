use serde::{Deserialize, Serialize};
use std::fmt;

/// Printable product families offered in the designer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    PhotoBook,
    Calendar,
    CanvasPrint,
    PhotoPrint,
    Poster,
    Mug,
    GreetingCard,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::PhotoBook => "PHOTO_BOOK",
            ProductType::Calendar => "CALENDAR",
            ProductType::CanvasPrint => "CANVAS_PRINT",
            ProductType::PhotoPrint => "PHOTO_PRINT",
            ProductType::Poster => "POSTER",
            ProductType::Mug => "MUG",
            ProductType::GreetingCard => "GREETING_CARD",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog-level validation errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Supplier cost must be positive, got {0}")]
    InvalidCost(f64),

    #[error("Quantity must not be negative, got {0}")]
    InvalidQuantity(i32),

    #[error("Invalid price for {field}: {value}")]
    InvalidPrice { field: &'static str, value: f64 },
}
