// src/workflows/product_check.rs

//! Conferência de estoque: PENDING → MATCH | DISCREPANCY.
//! Resolvida, a conferência não muda mais; uma nova contagem é um novo registro.

use crate::{
    common::error::AppError,
    models::{
        auth::Principal,
        catalog::Product,
        product_check::{CheckResolution, CheckStatus, NewProductCheck, ProductCheck},
    },
};

/// Abre uma conferência com o saldo atual do produto como referência.
pub fn open_check(principal: &Principal, product: &Product, note: Option<String>) -> Result<NewProductCheck, AppError> {
    if product.deleted_at.is_some() {
        return Err(AppError::NotFound("Produto"));
    }

    Ok(NewProductCheck {
        product_id: product.id,
        store_id: product.store_id,
        checked_by: principal.user_id,
        expected_quantity: product.quantity,
        note,
    })
}

/// Fecha uma conferência pendente.
///
/// Com `counted_quantity` o status pode ser omitido (é calculado). Um status
/// explícito que contradiz a contagem é rejeitado.
pub fn resolve(
    check: &ProductCheck,
    status: Option<CheckStatus>,
    counted_quantity: Option<i32>,
    note: Option<String>,
) -> Result<CheckResolution, AppError> {
    if check.status.is_resolved() {
        return Err(AppError::InvalidState(format!(
            "a conferência {} já foi resolvida; abra uma nova",
            check.id
        )));
    }

    if counted_quantity.is_some_and(|c| c < 0) {
        return Err(AppError::Validation("a contagem não pode ser negativa".into()));
    }

    let derived = counted_quantity.map(|counted| {
        if counted == check.expected_quantity {
            CheckStatus::Match
        } else {
            CheckStatus::Discrepancy
        }
    });

    let status = match (status, derived) {
        (Some(CheckStatus::Pending), _) => {
            return Err(AppError::Validation("PENDING não é um status de resolução".into()));
        }
        (Some(explicit), Some(computed)) if explicit != computed => {
            return Err(AppError::Validation(format!(
                "status {:?} contradiz a contagem informada",
                explicit
            )));
        }
        (Some(explicit), _) => explicit,
        (None, Some(computed)) => computed,
        (None, None) => {
            return Err(AppError::Validation("informe o status ou a contagem".into()));
        }
    };

    Ok(CheckResolution {
        status,
        counted_quantity,
        note: note.or_else(|| check.note.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        access::{
            fixtures::Fixture,
            ownership::ChainLink,
            policy::{ensure, Action},
        },
        common::error::DenyReason,
        models::auth::Role,
    };
    use chrono::Utc;

    fn apply(check: &ProductCheck, resolution: CheckResolution) -> ProductCheck {
        ProductCheck {
            status: resolution.status,
            counted_quantity: resolution.counted_quantity,
            note: resolution.note,
            resolved_at: Some(Utc::now()),
            ..check.clone()
        }
    }

    fn pending() -> (Fixture, ProductCheck) {
        let mut fx = Fixture::default();
        let owner = fx.owner();
        let staff = fx.member(owner, Role::Staff);
        let store = fx.store(owner);
        let product = fx.product(store);
        let id = fx.check(product, staff);
        let check = fx.checks[&id].clone();
        (fx, check)
    }

    #[test]
    fn open_check_snapshots_product() {
        let (fx, _) = pending();
        let product = fx.products.values().next().unwrap();
        let staff = fx.users.values().find(|u| u.role == Role::Staff).unwrap();

        let new = open_check(&fx.principal(staff.id), product, Some("inventário mensal".into())).unwrap();
        assert_eq!(new.store_id, product.store_id);
        assert_eq!(new.expected_quantity, product.quantity);
        assert_eq!(new.checked_by, staff.id);
    }

    #[test]
    fn resolving_pending_check_is_terminal() {
        let (_, check) = pending();

        let resolution = resolve(&check, Some(CheckStatus::Match), None, Some("ok".into())).unwrap();
        assert_eq!(resolution.status, CheckStatus::Match);

        let resolved = apply(&check, resolution);
        assert!(resolved.status.is_resolved());
        assert!(matches!(
            resolve(&resolved, Some(CheckStatus::Discrepancy), None, None),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn status_is_derived_from_count() {
        let (_, check) = pending();
        let expected = check.expected_quantity;

        assert_eq!(resolve(&check, None, Some(expected), None).unwrap().status, CheckStatus::Match);
        assert_eq!(
            resolve(&check, None, Some(expected - 2), None).unwrap().status,
            CheckStatus::Discrepancy
        );
    }

    #[test]
    fn invalid_resolutions_are_rejected() {
        let (_, check) = pending();
        let expected = check.expected_quantity;

        assert!(matches!(resolve(&check, Some(CheckStatus::Pending), None, None), Err(AppError::Validation(_))));
        assert!(matches!(resolve(&check, None, None, None), Err(AppError::Validation(_))));
        assert!(matches!(resolve(&check, None, Some(-1), None), Err(AppError::Validation(_))));
        assert!(matches!(
            resolve(&check, Some(CheckStatus::Match), Some(expected + 1), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn deleted_product_cannot_be_checked() {
        let (fx, _) = pending();
        let mut product = fx.products.values().next().unwrap().clone();
        product.deleted_at = Some(Utc::now());
        let owner = fx.users.values().find(|u| u.role == Role::Owner).unwrap();

        assert!(matches!(
            open_check(&fx.principal(owner.id), &product, None),
            Err(AppError::NotFound("Produto"))
        ));
    }

    #[tokio::test]
    async fn cashier_cannot_open_or_resolve_checks() {
        let (mut fx, check) = pending();
        let owner = fx.users.values().find(|u| u.role == Role::Owner).unwrap().id;
        let cashier = fx.member(owner, Role::Cashier);
        let p = fx.principal(cashier);

        assert!(matches!(
            ensure(&fx, &p, Action::CreateProductCheck, ChainLink::Product(check.product_id)).await,
            Err(AppError::Forbidden(DenyReason::InsufficientRole))
        ));
        assert!(matches!(
            ensure(&fx, &p, Action::ResolveProductCheck, ChainLink::ProductCheck(check.id)).await,
            Err(AppError::Forbidden(DenyReason::InsufficientRole))
        ));
        // Leitura continua liberada
        ensure(&fx, &p, Action::Read, ChainLink::ProductCheck(check.id)).await.unwrap();
    }
}
