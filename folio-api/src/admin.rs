use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use folio_catalog::{CustomizationPricing, Markup, PriceCalculation};
use folio_pricing::{CustomizationDraft, RuleDraft, SyncReport};
use folio_rules::PricingRule;

use crate::{error::AppError, middleware::admin_auth_middleware, state::AppState};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/pricing-rules", post(create_pricing_rule).get(list_pricing_rules))
        .route(
            "/v1/admin/pricing-rules/{id}",
            get(get_pricing_rule).put(update_pricing_rule).delete(delete_pricing_rule),
        )
        .route("/v1/admin/customizations", put(upsert_customization))
        .route("/v1/admin/supplier-products/{id}/markup", put(update_supplier_markup))
        .route("/v1/admin/supplier-products/sync", post(sync_supplier_prices))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

pub async fn create_pricing_rule(
    State(state): State<AppState>,
    Json(draft): Json<RuleDraft>,
) -> Result<(StatusCode, Json<PricingRule>), AppError> {
    let rule = state.admin.create_rule(draft).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn list_pricing_rules(State(state): State<AppState>) -> Result<Json<Vec<PricingRule>>, AppError> {
    Ok(Json(state.admin.list_rules().await?))
}

pub async fn get_pricing_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PricingRule>, AppError> {
    Ok(Json(state.admin.get_rule(id).await?))
}

pub async fn update_pricing_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<RuleDraft>,
) -> Result<Json<PricingRule>, AppError> {
    Ok(Json(state.admin.update_rule(id, draft).await?))
}

pub async fn delete_pricing_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.admin.delete_rule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upsert_customization(
    State(state): State<AppState>,
    Json(draft): Json<CustomizationDraft>,
) -> Result<Json<CustomizationPricing>, AppError> {
    Ok(Json(state.admin.upsert_customization(draft).await?))
}

pub async fn update_supplier_markup(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(markup): Json<Markup>,
) -> Result<Json<PriceCalculation>, AppError> {
    Ok(Json(state.admin.update_supplier_markup(id, markup).await?))
}

pub async fn sync_supplier_prices(State(state): State<AppState>) -> Result<Json<SyncReport>, AppError> {
    let feed = state
        .supplier_feed
        .clone()
        .ok_or_else(|| AppError::ServiceUnavailable("No supplier price feed configured".to_string()))?;
    Ok(Json(state.admin.sync_supplier_prices(feed.as_ref()).await?))
}
