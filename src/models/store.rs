// src/models/store.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Store (A "Loja")
// ---
// Pertence diretamente a um OWNER (owner_id é a raiz do tenant)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: Uuid,
    #[schema(ignore)]
    pub owner_id: Uuid,

    #[schema(example = "Loja Centro")]
    pub name: String,
    #[schema(example = "CTR-01")]
    pub code: String,

    #[schema(example = "Rua das Flores, 123")]
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,

    // Horário de funcionamento (hora local da loja)
    #[schema(value_type = Option<String>, example = "08:00:00")]
    pub opens_at: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "18:00:00")]
    pub closes_at: Option<NaiveTime>,
    #[schema(example = "America/Sao_Paulo")]
    pub timezone: String,

    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Dados já validados para inserir uma loja.
#[derive(Debug, Clone, Default)]
pub struct NewStore {
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub opens_at: Option<NaiveTime>,
    pub closes_at: Option<NaiveTime>,
    pub timezone: Option<String>,
}

/// Campos alteráveis. `None` mantém o valor atual.
#[derive(Debug, Clone, Default)]
pub struct StoreChanges {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub opens_at: Option<NaiveTime>,
    pub closes_at: Option<NaiveTime>,
    pub timezone: Option<String>,
    pub is_active: Option<bool>,
}
