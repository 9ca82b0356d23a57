// src/access/policy.rs

//! Motor de autorização: (Principal, ação, alvo) → Allow | Deny(motivo).
//!
//! Regras, em ordem:
//! 1. o tenant do principal precisa ser o tenant do alvo (`cross-tenant`);
//! 2. o próprio usuário sempre pode ler/atualizar o seu registro;
//! 3. o cargo precisa alcançar o mínimo da ação (`insufficient-role`).
//!
//! Nada aqui escreve em lugar nenhum: pode ser chamado quantas vezes for
//! preciso antes de uma escrita.

use uuid::Uuid;

use crate::{
    access::ownership::{resolve_tenant, scope_of, ChainLink, ChainSource},
    common::error::{AppError, DenyReason},
    models::auth::{Principal, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateStore,
    UpdateStore,
    DeleteStore,
    WriteCatalog,
    DeleteCatalog,
    CreateSale,
    CreateTransfer,
    SubmitTransferProof,
    ApproveTransfer,
    FinishTransfer,
    CreateProductCheck,
    ResolveProductCheck,
}

impl Action {
    pub const ALL: [Action; 16] = [
        Action::Read,
        Action::CreateUser,
        Action::UpdateUser,
        Action::DeleteUser,
        Action::CreateStore,
        Action::UpdateStore,
        Action::DeleteStore,
        Action::WriteCatalog,
        Action::DeleteCatalog,
        Action::CreateSale,
        Action::CreateTransfer,
        Action::SubmitTransferProof,
        Action::ApproveTransfer,
        Action::FinishTransfer,
        Action::CreateProductCheck,
        Action::ResolveProductCheck,
    ];

    /// Tabela de cargo mínimo por ação. OWNER satisfaz qualquer mínimo.
    pub const fn minimum_role(self) -> Role {
        match self {
            Action::Read | Action::CreateSale | Action::CreateTransfer => Role::Cashier,

            Action::WriteCatalog
            | Action::SubmitTransferProof
            | Action::FinishTransfer
            | Action::CreateProductCheck
            | Action::ResolveProductCheck => Role::Staff,

            Action::CreateUser
            | Action::UpdateUser
            | Action::DeleteUser
            | Action::CreateStore
            | Action::UpdateStore
            | Action::DeleteStore
            | Action::DeleteCatalog
            | Action::ApproveTransfer => Role::Admin,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::CreateUser => "user:create",
            Action::UpdateUser => "user:update",
            Action::DeleteUser => "user:delete",
            Action::CreateStore => "store:create",
            Action::UpdateStore => "store:update",
            Action::DeleteStore => "store:delete",
            Action::WriteCatalog => "catalog:write",
            Action::DeleteCatalog => "catalog:delete",
            Action::CreateSale => "sale:create",
            Action::CreateTransfer => "transfer:create",
            Action::SubmitTransferProof => "transfer:proof",
            Action::ApproveTransfer => "transfer:approve",
            Action::FinishTransfer => "transfer:finish",
            Action::CreateProductCheck => "check:create",
            Action::ResolveProductCheck => "check:resolve",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason)),
        }
    }
}

// Exceção de autoatendimento: ler/atualizar o próprio cadastro.
fn is_self_service(principal: &Principal, action: Action, target: ChainLink) -> bool {
    matches!(action, Action::Read | Action::UpdateUser) && target == ChainLink::User(principal.user_id)
}

/// Decisão pura, com o tenant do alvo já resolvido.
pub fn decide(
    principal: &Principal,
    action: Action,
    target: ChainLink,
    entity_tenant: Uuid,
) -> Result<Decision, AppError> {
    let tenant = resolve_tenant(principal)?;
    if tenant != entity_tenant {
        return Ok(Decision::Deny(DenyReason::CrossTenant));
    }

    if is_self_service(principal, action, target) || principal.role.at_least(action.minimum_role()) {
        Ok(Decision::Allow)
    } else {
        Ok(Decision::Deny(DenyReason::InsufficientRole))
    }
}

/// Resolve a cadeia de posse do alvo e decide.
/// Falha com `NotFound` se algum elo da cadeia não existir (ou estiver removido).
pub async fn authorize<S>(
    source: &S,
    principal: &Principal,
    action: Action,
    target: ChainLink,
) -> Result<Decision, AppError>
where
    S: ChainSource + ?Sized,
{
    // O tenant do principal é validado antes de qualquer I/O
    resolve_tenant(principal)?;
    let entity_tenant = scope_of(source, target).await?;
    let decision = decide(principal, action, target, entity_tenant)?;

    if let Decision::Deny(reason) = decision {
        tracing::warn!(
            user_id = %principal.user_id,
            role = %principal.role,
            action = action.as_str(),
            target = ?target,
            reason = reason.code(),
            "Acesso negado"
        );
    }

    Ok(decision)
}

/// Atalho para os serviços: `Deny` vira `AppError::Forbidden`.
pub async fn ensure<S>(
    source: &S,
    principal: &Principal,
    action: Action,
    target: ChainLink,
) -> Result<(), AppError>
where
    S: ChainSource + ?Sized,
{
    authorize(source, principal, action, target).await?.into_result()
}

/// Gestão de equipe: só é possível criar/remover cargos estritamente abaixo do seu.
pub fn can_manage(principal: &Principal, subject_role: Role) -> Decision {
    if principal.role > subject_role {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::InsufficientRole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::fixtures::Fixture;

    fn principal(role: Role, tenant: Uuid) -> Principal {
        match role {
            Role::Owner => Principal { user_id: tenant, role, owner_id: None },
            _ => Principal { user_id: Uuid::new_v4(), role, owner_id: Some(tenant) },
        }
    }

    #[test]
    fn owner_satisfies_every_minimum() {
        let tenant = Uuid::new_v4();
        let owner = principal(Role::Owner, tenant);
        for action in Action::ALL {
            assert_eq!(
                decide(&owner, action, ChainLink::Tenant(tenant), tenant).unwrap(),
                Decision::Allow,
                "{action:?}"
            );
        }
    }

    #[test]
    fn permissions_are_monotonic_in_role() {
        let tenant = Uuid::new_v4();
        let target = ChainLink::Store(Uuid::new_v4());

        for action in Action::ALL {
            for lower in Role::ALL {
                for higher in Role::ALL.into_iter().filter(|r| *r > lower) {
                    let low = decide(&principal(lower, tenant), action, target, tenant).unwrap();
                    let high = decide(&principal(higher, tenant), action, target, tenant).unwrap();
                    if low.is_allowed() {
                        assert!(high.is_allowed(), "{action:?}: {lower} permitido, {higher} negado");
                    }
                }
            }
        }
    }

    #[test]
    fn role_thresholds() {
        let tenant = Uuid::new_v4();
        let target = ChainLink::Tenant(tenant);
        let cashier = principal(Role::Cashier, tenant);
        let staff = principal(Role::Staff, tenant);
        let admin = principal(Role::Admin, tenant);

        assert!(decide(&cashier, Action::Read, target, tenant).unwrap().is_allowed());
        assert!(decide(&cashier, Action::CreateSale, target, tenant).unwrap().is_allowed());
        // Transferência: mesmo mínimo da venda; as lojas são checadas à parte
        assert!(decide(&cashier, Action::CreateTransfer, target, tenant).unwrap().is_allowed());
        assert_eq!(
            decide(&cashier, Action::SubmitTransferProof, target, tenant).unwrap(),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(
            decide(&cashier, Action::CreateProductCheck, target, tenant).unwrap(),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert!(decide(&staff, Action::CreateProductCheck, target, tenant).unwrap().is_allowed());
        assert_eq!(
            decide(&staff, Action::ApproveTransfer, target, tenant).unwrap(),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert_eq!(
            decide(&staff, Action::CreateStore, target, tenant).unwrap(),
            Decision::Deny(DenyReason::InsufficientRole)
        );
        assert!(decide(&admin, Action::ApproveTransfer, target, tenant).unwrap().is_allowed());
        assert!(decide(&admin, Action::DeleteUser, target, tenant).unwrap().is_allowed());
    }

    #[test]
    fn subordinates_may_update_themselves_only() {
        let tenant = Uuid::new_v4();
        let cashier = principal(Role::Cashier, tenant);

        let own = ChainLink::User(cashier.user_id);
        assert!(decide(&cashier, Action::UpdateUser, own, tenant).unwrap().is_allowed());
        assert!(decide(&cashier, Action::Read, own, tenant).unwrap().is_allowed());
        assert!(!decide(&cashier, Action::DeleteUser, own, tenant).unwrap().is_allowed());

        let colleague = ChainLink::User(Uuid::new_v4());
        assert_eq!(
            decide(&cashier, Action::UpdateUser, colleague, tenant).unwrap(),
            Decision::Deny(DenyReason::InsufficientRole)
        );
    }

    #[test]
    fn self_service_never_crosses_tenants() {
        let cashier = principal(Role::Cashier, Uuid::new_v4());
        let decision = decide(&cashier, Action::Read, ChainLink::User(cashier.user_id), Uuid::new_v4()).unwrap();
        assert_eq!(decision, Decision::Deny(DenyReason::CrossTenant));
    }

    #[tokio::test]
    async fn staff_cannot_read_another_owners_store() {
        let mut fx = Fixture::default();
        let owner_a = fx.owner();
        let owner_b = fx.owner();
        let staff_a = fx.member(owner_a, Role::Staff);
        let staff_b = fx.member(owner_b, Role::Staff);
        let store_a = fx.store(owner_a);
        let store_b = fx.store(owner_b);

        let pa = fx.principal(staff_a);
        let pb = fx.principal(staff_b);

        assert_eq!(
            authorize(&fx, &pa, Action::Read, ChainLink::Store(store_b)).await.unwrap(),
            Decision::Deny(DenyReason::CrossTenant)
        );
        assert_eq!(
            authorize(&fx, &pb, Action::Read, ChainLink::Store(store_a)).await.unwrap(),
            Decision::Deny(DenyReason::CrossTenant)
        );
        assert!(authorize(&fx, &pa, Action::Read, ChainLink::Store(store_a)).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn cross_tenant_wins_over_any_role() {
        let mut fx = Fixture::default();
        let owner_a = fx.owner();
        let owner_b = fx.owner();
        let store_b = fx.store(owner_b);
        let product_b = fx.product(store_b);

        // Nem o OWNER de outro tenant passa
        let pa = fx.principal(owner_a);
        for action in Action::ALL {
            assert_eq!(
                authorize(&fx, &pa, action, ChainLink::Product(product_b)).await.unwrap(),
                Decision::Deny(DenyReason::CrossTenant)
            );
        }
    }

    #[tokio::test]
    async fn cashier_reading_foreign_product_gets_cross_tenant_error() {
        let mut fx = Fixture::default();
        let o1 = fx.owner();
        let o2 = fx.owner();
        let cashier = fx.member(o1, Role::Cashier);
        let store = fx.store(o2);
        let product = fx.product(store);

        let err = ensure(&fx, &fx.principal(cashier), Action::Read, ChainLink::Product(product))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(DenyReason::CrossTenant)));
    }

    #[tokio::test]
    async fn authorize_is_idempotent() {
        let mut fx = Fixture::default();
        let owner = fx.owner();
        let cashier = fx.member(owner, Role::Cashier);
        let store = fx.store(owner);
        let p = fx.principal(cashier);

        for action in [Action::Read, Action::DeleteStore] {
            let first = authorize(&fx, &p, action, ChainLink::Store(store)).await.unwrap();
            let second = authorize(&fx, &p, action, ChainLink::Store(store)).await.unwrap();
            assert_eq!(first, second);
        }
        assert!(fx.stores[&store].deleted_at.is_none());
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let mut fx = Fixture::default();
        let owner = fx.owner();
        let p = fx.principal(owner);

        let err = authorize(&fx, &p, Action::Read, ChainLink::Store(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Loja")));
    }

    #[test]
    fn managers_only_manage_lower_roles() {
        let tenant = Uuid::new_v4();
        let owner = principal(Role::Owner, tenant);
        let admin = principal(Role::Admin, tenant);

        assert!(can_manage(&owner, Role::Admin).is_allowed());
        assert!(can_manage(&admin, Role::Staff).is_allowed());
        assert!(can_manage(&admin, Role::Cashier).is_allowed());
        assert!(!can_manage(&admin, Role::Admin).is_allowed());
        assert!(!can_manage(&owner, Role::Owner).is_allowed());
    }
}
