// src/handlers/transactions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::CurrentPrincipal, i18n::Locale},
    models::transaction::{TransactionFilter, TransactionView},
    workflows::transaction::{SaleInput, TransferInput},
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---

// Lojas são aceitas no corpo só para que o fluxo recuse com um erro claro
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,
    #[validate(url(message = "URL inválida."))]
    pub photo_proof_url: Option<String>,
    pub note: Option<String>,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferPayload {
    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,
    #[validate(required(message = "O campo 'fromStoreId' é obrigatório."))]
    pub from_store_id: Option<Uuid>,
    #[validate(required(message = "O campo 'toStoreId' é obrigatório."))]
    pub to_store_id: Option<Uuid>,
    #[validate(url(message = "URL inválida."))]
    pub photo_proof_url: Option<String>,
    #[validate(url(message = "URL inválida."))]
    pub transfer_proof_url: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitProofPayload {
    #[validate(url(message = "URL inválida."))]
    #[schema(example = "https://cdn.exemplo.com/fotos/caixa-12.jpg")]
    pub photo_proof_url: Option<String>,
    #[validate(url(message = "URL inválida."))]
    #[schema(example = "https://cdn.exemplo.com/transferencias/nf-1203.pdf")]
    pub transfer_proof_url: Option<String>,
}

impl From<CreateSalePayload> for SaleInput {
    fn from(p: CreateSalePayload) -> Self {
        SaleInput {
            amount: p.amount,
            from_store_id: p.from_store_id,
            to_store_id: p.to_store_id,
            photo_proof_url: p.photo_proof_url,
            note: p.note,
        }
    }
}

impl From<CreateTransferPayload> for TransferInput {
    fn from(p: CreateTransferPayload) -> Self {
        TransferInput {
            amount: p.amount,
            from_store_id: p.from_store_id,
            to_store_id: p.to_store_id,
            photo_proof_url: p.photo_proof_url,
            transfer_proof_url: p.transfer_proof_url,
            note: p.note,
        }
    }
}

// ---
// Criação
// ---

// POST /api/transactions/sales
#[utoipa::path(
    post,
    path = "/api/transactions/sales",
    tag = "Transactions",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda registrada (já finalizada)", body = TransactionView),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<CreateSalePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sale = app_state
        .transaction_service
        .create_sale(&principal, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(TransactionView::from(sale))))
}

// POST /api/transactions/transfers
#[utoipa::path(
    post,
    path = "/api/transactions/transfers",
    tag = "Transactions",
    request_body = CreateTransferPayload,
    responses(
        (status = 201, description = "Transferência criada", body = TransactionView),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Cargo insuficiente ou loja de outro negócio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transfer(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(payload): Json<CreateTransferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transfer = app_state
        .transaction_service
        .create_transfer(&principal, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(TransactionView::from(transfer))))
}

// ---
// Leitura
// ---

// GET /api/transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(TransactionFilter),
    responses(
        (status = 200, description = "Transações do negócio", body = Vec<TransactionView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let transactions = app_state
        .transaction_service
        .list_transactions(&principal, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let views: Vec<TransactionView> = transactions.into_iter().map(TransactionView::from).collect();
    Ok(Json(views))
}

// GET /api/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "ID da transação")),
    responses(
        (status = 200, description = "Transação", body = TransactionView),
        (status = 403, description = "Transação de outro negócio"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = app_state
        .transaction_service
        .get_transaction(&principal, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(TransactionView::from(transaction)))
}

// ---
// Transições
// ---

// POST /api/transactions/{id}/proof
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/proof",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "ID da transferência")),
    request_body = SubmitProofPayload,
    responses(
        (status = 200, description = "Comprovante anexado", body = TransactionView),
        (status = 400, description = "Nenhum comprovante informado"),
        (status = 422, description = "Estado não permite anexar comprovante")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_proof(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitProofPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state
        .transaction_service
        .submit_proof(&principal, id, payload.photo_proof_url, payload.transfer_proof_url)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(TransactionView::from(transaction)))
}

// POST /api/transactions/{id}/approve
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/approve",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "ID da transferência")),
    responses(
        (status = 200, description = "Transferência aprovada", body = TransactionView),
        (status = 400, description = "Falta o comprovante de transferência"),
        (status = 403, description = "Cargo insuficiente ou outro negócio"),
        (status = 422, description = "Estado não permite aprovação")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = app_state
        .transaction_service
        .approve(&principal, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(TransactionView::from(transaction)))
}

// POST /api/transactions/{id}/finish
#[utoipa::path(
    post,
    path = "/api/transactions/{id}/finish",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "ID da transferência")),
    responses(
        (status = 200, description = "Transferência finalizada", body = TransactionView),
        (status = 422, description = "Transferência ainda não aprovada")
    ),
    security(("api_jwt" = []))
)]
pub async fn finish_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = app_state
        .transaction_service
        .finish(&principal, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(TransactionView::from(transaction)))
}
