use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use folio_catalog::{CustomizationRequest, CustomizationResult, Markup, MarkupQuote, ProductType, SupplierComparison};
use folio_rules::{PricingRequest, PricingResult};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CostQuoteRequest {
    pub product_type: ProductType,
    pub variant: Option<String>,
    pub quantity: i32,
    pub markup: Markup,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/pricing/calculate", post(calculate_price))
        .route("/v1/pricing/customized", post(calculate_customized_price))
        .route("/v1/pricing/supplier-products/{id}/quote", get(supplier_quote))
        .route("/v1/pricing/suppliers/compare", get(compare_suppliers))
        .route("/v1/pricing/cost-quote", post(cost_quote))
}

async fn calculate_price(
    State(state): State<AppState>,
    Json(req): Json<PricingRequest>,
) -> Result<Json<PricingResult>, AppError> {
    Ok(Json(state.pricing.calculate_price(&req).await?))
}

async fn calculate_customized_price(
    State(state): State<AppState>,
    Json(req): Json<CustomizationRequest>,
) -> Result<Json<CustomizationResult>, AppError> {
    Ok(Json(state.pricing.calculate_customized_price(&req).await?))
}

async fn supplier_quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<MarkupQuote>, AppError> {
    Ok(Json(state.pricing.calculate_markup_price(id, query.quantity).await?))
}

async fn compare_suppliers(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<Vec<SupplierComparison>>, AppError> {
    let rows = state
        .pricing
        .compare_suppliers(query.product_type, query.variant.as_deref(), query.quantity)
        .await?;
    Ok(Json(rows))
}

async fn cost_quote(
    State(state): State<AppState>,
    Json(req): Json<CostQuoteRequest>,
) -> Result<Json<MarkupQuote>, AppError> {
    let quote = state
        .pricing
        .quote_from_cost_model(req.product_type, req.variant.as_deref(), req.quantity, req.markup)
        .await?;
    Ok(Json(quote))
}
