use serde::{Deserialize, Serialize};
use uuid::Uuid;
use tracing::warn;

use crate::markup::{MarkupQuote, SupplierProduct};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonTag {
    BestPrice,
    BestMargin,
    FastestShipping,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierComparison {
    pub supplier_product_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub quote: MarkupQuote,
    pub shipping_days: Option<u32>,
    pub tags: Vec<ComparisonTag>,
}

/// Price every active offer at `quantity`, tag the winners, highest margin first.
///
/// Ties share a tag. Offers that cannot be priced are left out.
pub fn compare_suppliers(offers: &[SupplierProduct], quantity: i32) -> Vec<SupplierComparison> {
    let mut rows: Vec<SupplierComparison> = offers
        .iter()
        .filter(|offer| offer.is_active)
        .filter_map(|offer| match offer.price_for_quantity(quantity) {
            Ok(quote) => Some(SupplierComparison {
                supplier_product_id: offer.id,
                supplier_id: offer.supplier_id,
                supplier_name: offer.supplier_name.clone(),
                quote,
                shipping_days: offer.shipping_days,
                tags: Vec::new(),
            }),
            Err(e) => {
                warn!(supplier_product_id = %offer.id, error = %e, "Unpriceable supplier offer");
                None
            }
        })
        .collect();

    let best_price = rows.iter().map(|r| r.quote.unit.selling_price).fold(f64::INFINITY, f64::min);
    let best_margin = rows.iter().map(|r| r.quote.unit.margin_percentage).fold(f64::NEG_INFINITY, f64::max);
    let fastest = rows.iter().filter_map(|r| r.shipping_days).min();

    for row in &mut rows {
        if row.quote.unit.selling_price == best_price {
            row.tags.push(ComparisonTag::BestPrice);
        }
        if row.quote.unit.margin_percentage == best_margin {
            row.tags.push(ComparisonTag::BestMargin);
        }
        if fastest.is_some() && row.shipping_days == fastest {
            row.tags.push(ComparisonTag::FastestShipping);
        }
    }

    rows.sort_by(|a, b| b.quote.unit.margin_percentage.total_cmp(&a.quote.unit.margin_percentage));
    rows
}
