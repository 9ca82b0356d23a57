// src/common/error.rs

use std::sync::LazyLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Catálogo usado quando o erro é convertido sem Locale (ex.: dentro de middlewares)
static FALLBACK_I18N: LazyLock<I18nStore> = LazyLock::new(I18nStore::load);

// Motivo de uma negação do motor de autorização.
// O código em texto é estável: o cliente usa para distinguir os casos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    CrossTenant,
    InsufficientRole,
}

impl DenyReason {
    pub const fn code(self) -> &'static str {
        match self {
            DenyReason::CrossTenant => "cross-tenant",
            DenyReason::InsufficientRole => "insufficient-role",
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Validação ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Entrada inválida: {0}")]
    Validation(String),

    #[error("Nome de usuário já existe")]
    UsernameAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // --- Autenticação (AuthError) ---
    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // --- Autorização ---
    #[error("Acesso negado: {0}")]
    Forbidden(DenyReason),

    // --- Entidade (ou elo da cadeia de posse) ausente ou removida ---
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    // --- Máquina de estados ---
    #[error("Transição inválida: {0}")]
    InvalidState(String),

    // --- Invariante de dados violada (inesperado) ---
    #[error("Integridade violada: {0}")]
    Integrity(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável (máquina) do erro.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) => "validation",
            AppError::UsernameAlreadyExists => "username-taken",
            AppError::UniqueConstraintViolation(_) => "conflict",
            AppError::InvalidCredentials => "invalid-credentials",
            AppError::InvalidToken => "invalid-token",
            AppError::Forbidden(reason) => reason.code(),
            AppError::NotFound(_) => "not-found",
            AppError::InvalidState(_) => "invalid-state",
            AppError::Integrity(_) => "integrity",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UsernameAlreadyExists | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte para a resposta HTTP já traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();
        let message = i18n.translate(&locale.0, code);

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(fields))
            }
            AppError::Validation(reason) | AppError::InvalidState(reason) => Some(json!({ "reason": reason })),
            AppError::UniqueConstraintViolation(what) => Some(json!({ "reason": what })),
            AppError::NotFound(entity) => Some(json!({ "entity": entity })),
            AppError::Forbidden(_) => None,
            // Erros internos: loga o detalhe, mas não vaza para o cliente.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(code, "Erro Interno do Servidor: {}", e);
                None
            }
            _ => None,
        };

        ApiError {
            status,
            error: message.to_string(),
            code: code.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &FALLBACK_I18N).into_response()
    }
}

// ---
// ApiError: a forma de transporte (status + corpo JSON)
// ---
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "code": self.code, "details": details }),
            None => json!({ "error": self.error, "code": self.code }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn json_body(res: Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn pt() -> Locale {
        Locale("pt".into())
    }

    #[tokio::test]
    async fn forbidden_carries_discriminable_reason() {
        let store = I18nStore::load();

        let res = AppError::Forbidden(DenyReason::CrossTenant)
            .to_api_error(&pt(), &store)
            .into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = json_body(res).await;
        assert_eq!(body["code"], "cross-tenant");

        let res = AppError::Forbidden(DenyReason::InsufficientRole)
            .to_api_error(&pt(), &store)
            .into_response();
        let body = json_body(res).await;
        assert_eq!(body["code"], "insufficient-role");
    }

    #[tokio::test]
    async fn taxonomy_maps_to_transport_status() {
        let cases = [
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED, "invalid-token"),
            (AppError::NotFound("Produto"), StatusCode::NOT_FOUND, "not-found"),
            (AppError::Validation("sem comprovante".into()), StatusCode::BAD_REQUEST, "validation"),
            (AppError::InvalidState("já finalizada".into()), StatusCode::UNPROCESSABLE_ENTITY, "invalid-state"),
            (AppError::Integrity("owner_id nulo".into()), StatusCode::INTERNAL_SERVER_ERROR, "integrity"),
        ];

        for (err, status, code) in cases {
            let res = err.into_response();
            assert_eq!(res.status(), status);
            assert_eq!(json_body(res).await["code"], code);
        }
    }

    #[tokio::test]
    async fn integrity_details_are_not_leaked() {
        let res = AppError::Integrity("usuário X sem owner_id".into()).into_response();
        let body = json_body(res).await;
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn messages_follow_locale() {
        let store = I18nStore::load();
        let en = AppError::InvalidState("x".into()).to_api_error(&Locale("en".into()), &store);
        let pt = AppError::InvalidState("x".into()).to_api_error(&pt(), &store);
        assert_ne!(en.error, pt.error);
        assert_eq!(en.code, pt.code);
    }
}
