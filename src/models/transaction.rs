// src/models/transaction.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Sale,     // Vira "SALE"
    Transfer, // Vira "TRANSFER"
}

// Estado explícito do fluxo. Não é persistido: é derivado das flags
// (is_finished, approved_by, URLs de comprovante) no momento da leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    Draft,
    AwaitingApproval,
    Approved,
    Finished,
}

impl TransactionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionState::Draft => "DRAFT",
            TransactionState::AwaitingApproval => "AWAITING_APPROVAL",
            TransactionState::Approved => "APPROVED",
            TransactionState::Finished => "FINISHED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    #[schema(example = "https://cdn.exemplo.com/fotos/recibo-991.jpg")]
    pub photo_proof_url: Option<String>,
    #[schema(example = "https://cdn.exemplo.com/transferencias/nf-1203.pdf")]
    pub transfer_proof_url: Option<String>,
    #[schema(example = "150.50")]
    pub amount: Decimal,
    pub note: Option<String>,
    pub is_finished: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Resposta da API: a transação + o estado derivado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub state: TransactionState,
}

impl From<Transaction> for TransactionView {
    fn from(transaction: Transaction) -> Self {
        let state = transaction.state();
        Self { transaction, state }
    }
}

/// Linha pronta para INSERT, produzida pelo workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub created_by: Uuid,
    pub from_store_id: Option<Uuid>,
    pub to_store_id: Option<Uuid>,
    pub photo_proof_url: Option<String>,
    pub transfer_proof_url: Option<String>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub is_finished: bool,
}

// Filtros da listagem (query string)
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
