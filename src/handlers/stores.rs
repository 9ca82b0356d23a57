// src/handlers/stores.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::CurrentPrincipal,
        i18n::Locale,
        rbac::{AtLeastAdmin, RequireRole},
    },
    models::store::{NewStore, Store, StoreChanges},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_hours"))]
pub struct CreateStorePayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    #[schema(example = "Loja Centro")]
    pub name: String,

    #[validate(length(min = 1, max = 32, message = "O código deve ter entre 1 e 32 caracteres."))]
    #[schema(example = "CTR-01")]
    pub code: String,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,

    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub opens_at: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub closes_at: Option<NaiveTime>,

    #[validate(length(min = 1, message = "O fuso horário não pode ser vazio."))]
    #[schema(example = "America/Sao_Paulo")]
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_hours"))]
pub struct UpdateStorePayload {
    #[validate(length(min = 1, max = 120, message = "O nome não pode ser vazio."))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub opens_at: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub closes_at: Option<NaiveTime>,
    #[validate(length(min = 1, message = "O fuso horário não pode ser vazio."))]
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}

// Abertura precisa ser antes do fechamento quando os dois são informados
fn validate_hours(opens_at: Option<NaiveTime>, closes_at: Option<NaiveTime>) -> Result<(), ValidationError> {
    if let (Some(open), Some(close)) = (opens_at, closes_at) {
        if open >= close {
            let mut err = ValidationError::new("hours");
            err.message = Some("O horário de abertura deve ser anterior ao de fechamento.".into());
            return Err(err);
        }
    }
    Ok(())
}

fn validate_create_hours(payload: &CreateStorePayload) -> Result<(), ValidationError> {
    validate_hours(payload.opens_at, payload.closes_at)
}

fn validate_update_hours(payload: &UpdateStorePayload) -> Result<(), ValidationError> {
    validate_hours(payload.opens_at, payload.closes_at)
}

impl From<CreateStorePayload> for NewStore {
    fn from(p: CreateStorePayload) -> Self {
        NewStore {
            name: p.name,
            code: p.code,
            address: p.address,
            city: p.city,
            state: p.state,
            postal_code: p.postal_code,
            phone: p.phone,
            opens_at: p.opens_at,
            closes_at: p.closes_at,
            timezone: p.timezone,
        }
    }
}

impl From<UpdateStorePayload> for StoreChanges {
    fn from(p: UpdateStorePayload) -> Self {
        StoreChanges {
            name: p.name,
            address: p.address,
            city: p.city,
            state: p.state,
            postal_code: p.postal_code,
            phone: p.phone,
            opens_at: p.opens_at,
            closes_at: p.closes_at,
            timezone: p.timezone,
            is_active: p.is_active,
        }
    }
}

// ---
// Handlers
// ---

// POST /api/stores
#[utoipa::path(
    post,
    path = "/api/stores",
    tag = "Stores",
    request_body = CreateStorePayload,
    responses(
        (status = 201, description = "Loja criada", body = Store),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Cargo insuficiente"),
        (status = 409, description = "Código já usado no negócio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    _guard: RequireRole<AtLeastAdmin>,
    Json(payload): Json<CreateStorePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let store = app_state
        .store_service
        .create_store(&principal, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(store)))
}

// GET /api/stores
#[utoipa::path(
    get,
    path = "/api/stores",
    tag = "Stores",
    responses(
        (status = 200, description = "Lojas do negócio", body = Vec<Store>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stores(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ApiError> {
    let stores = app_state
        .store_service
        .list_stores(&principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(stores))
}

// GET /api/stores/{id}
#[utoipa::path(
    get,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Loja", body = Store),
        (status = 403, description = "Loja de outro negócio"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_store(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(store_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let store = app_state
        .store_service
        .get_store(&principal, store_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store))
}

// PATCH /api/stores/{id}
#[utoipa::path(
    patch,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    request_body = UpdateStorePayload,
    responses(
        (status = 200, description = "Loja atualizada", body = Store),
        (status = 403, description = "Cargo insuficiente ou outro negócio"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let store = app_state
        .store_service
        .update_store(&principal, store_id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(store))
}

// DELETE /api/stores/{id}
#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 204, description = "Loja removida"),
        (status = 403, description = "Cargo insuficiente ou outro negócio"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_store(
    State(app_state): State<AppState>,
    locale: Locale,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(store_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .store_service
        .delete_store(&principal, store_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(opens_at: Option<NaiveTime>, closes_at: Option<NaiveTime>) -> CreateStorePayload {
        CreateStorePayload {
            name: "Loja Centro".into(),
            code: "CTR-01".into(),
            address: None,
            city: None,
            state: None,
            postal_code: None,
            phone: None,
            opens_at,
            closes_at,
            timezone: None,
        }
    }

    #[test]
    fn opening_hour_must_precede_closing_hour() {
        let eight = NaiveTime::from_hms_opt(8, 0, 0);
        let six_pm = NaiveTime::from_hms_opt(18, 0, 0);

        assert!(payload(eight, six_pm).validate().is_ok());
        assert!(payload(eight, None).validate().is_ok());
        assert!(payload(six_pm, eight).validate().is_err());
    }

    #[test]
    fn empty_code_is_rejected() {
        let mut p = payload(None, None);
        p.code = String::new();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }
}
