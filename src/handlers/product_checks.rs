// src/handlers/product_checks.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentPrincipal, i18n::Locale},
    models::product_check::{CheckStatus, ProductCheck},
};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckPayload {
    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCheckPayload {
    // Opcional quando a contagem é informada: o status é calculado
    #[schema(example = "DISCREPANCY")]
    pub status: Option<CheckStatus>,
    #[validate(range(min = 0, message = "A contagem não pode ser negativa."))]
    #[schema(example = 46)]
    pub counted_quantity: Option<i32>,
    #[validate(length(max = 500, message = "A observação deve ter no máximo 500 caracteres."))]
    pub note: Option<String>,
}

// POST /api/products/{id}/checks
#[utoipa::path(
    post,
    path = "/api/products/{id}/checks",
    tag = "Product Checks",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = CreateCheckPayload,
    responses(
        (status = 201, description = "Conferência aberta (PENDING)", body = ProductCheck),
        (status = 403, description = "Cargo insuficiente ou outro negócio"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_check(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateCheckPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let check = app_state
        .product_check_service
        .create_check(&principal, product_id, payload.note)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(check)))
}

// GET /api/products/{id}/checks
#[utoipa::path(
    get,
    path = "/api/products/{id}/checks",
    tag = "Product Checks",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Histórico de conferências", body = Vec<ProductCheck>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_checks(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let checks = app_state
        .product_check_service
        .list_checks(&principal, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(checks))
}

// GET /api/product-checks/{id}
#[utoipa::path(
    get,
    path = "/api/product-checks/{id}",
    tag = "Product Checks",
    params(("id" = Uuid, Path, description = "ID da conferência")),
    responses(
        (status = 200, description = "Conferência", body = ProductCheck),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_check(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(check_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let check = app_state
        .product_check_service
        .get_check(&principal, check_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(check))
}

// POST /api/product-checks/{id}/resolve
#[utoipa::path(
    post,
    path = "/api/product-checks/{id}/resolve",
    tag = "Product Checks",
    params(("id" = Uuid, Path, description = "ID da conferência")),
    request_body = ResolveCheckPayload,
    responses(
        (status = 200, description = "Conferência resolvida", body = ProductCheck),
        (status = 400, description = "Status ou contagem inválidos"),
        (status = 422, description = "Conferência já resolvida")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_check(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(check_id): Path<Uuid>,
    Json(payload): Json<ResolveCheckPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let check = app_state
        .product_check_service
        .resolve_check(&principal, check_id, payload.status, payload.counted_quantity, payload.note)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(check))
}
