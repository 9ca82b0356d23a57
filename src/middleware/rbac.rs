// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::{AppError, DenyReason},
    models::auth::{Principal, Role},
};

/// Cargo mínimo exigido por uma rota.
/// É um filtro grosso: o motor de autorização ainda roda dentro de cada serviço.
/// Só vale para rotas cujo alvo é o próprio tenant; com um id no caminho,
/// `cross-tenant` e `NotFound` precisam ser decididos antes do cargo.
pub trait RoleRequirement: Send + Sync + 'static {
    fn minimum() -> Role;
}

/// Extrator (guardião) que barra a requisição antes do handler.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or(AppError::InvalidToken)?;

        check(principal, T::minimum())?;
        Ok(RequireRole(PhantomData))
    }
}

fn check(principal: &Principal, minimum: Role) -> Result<(), AppError> {
    if !principal.role.at_least(minimum) {
        tracing::warn!(
            user_id = %principal.user_id,
            role = %principal.role,
            required = %minimum,
            "Cargo insuficiente para a rota"
        );
        return Err(AppError::Forbidden(DenyReason::InsufficientRole));
    }
    Ok(())
}

// ---
// REQUISITOS (TIPOS)
// ---

pub struct AtLeastAdmin;
impl RoleRequirement for AtLeastAdmin {
    fn minimum() -> Role { Role::Admin }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with(principal: Option<Principal>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(p) = principal {
            parts.extensions.insert(p);
        }
        parts
    }

    fn principal(role: Role) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            role,
            owner_id: (role != Role::Owner).then(Uuid::new_v4),
        }
    }

    #[tokio::test]
    async fn admin_gate_lets_admin_and_owner_through() {
        for role in [Role::Owner, Role::Admin] {
            let mut parts = parts_with(Some(principal(role)));
            assert!(RequireRole::<AtLeastAdmin>::from_request_parts(&mut parts, &()).await.is_ok());
        }
    }

    #[tokio::test]
    async fn admin_gate_rejects_lower_roles_and_anonymous() {
        for role in [Role::Staff, Role::Cashier] {
            let mut parts = parts_with(Some(principal(role)));
            let result = RequireRole::<AtLeastAdmin>::from_request_parts(&mut parts, &()).await;
            assert!(matches!(result, Err(AppError::Forbidden(DenyReason::InsufficientRole))));
        }

        let mut parts = parts_with(None);
        let result = RequireRole::<AtLeastAdmin>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
