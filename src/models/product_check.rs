// src/models/product_check.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_check_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pending,     // Estado inicial
    Match,       // Contagem confere com o sistema
    Discrepancy, // Contagem divergente
}

impl CheckStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, CheckStatus::Pending)
    }
}

// Registro de conferência de estoque (auditoria append-only)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductCheck {
    pub id: Uuid,
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub checked_by: Uuid,
    pub status: CheckStatus,
    #[schema(example = 48)]
    pub expected_quantity: i32,
    #[schema(example = 46)]
    pub counted_quantity: Option<i32>,
    pub note: Option<String>,
    pub checked_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductCheck {
    pub product_id: Uuid,
    pub store_id: Uuid,
    pub checked_by: Uuid,
    pub expected_quantity: i32,
    pub note: Option<String>,
}

/// Resultado da resolução, calculado pelo workflow antes do UPDATE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResolution {
    pub status: CheckStatus,
    pub counted_quantity: Option<i32>,
    pub note: Option<String>,
}
