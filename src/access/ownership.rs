// src/access/ownership.rs

//! Resolução de tenant: quem é o OWNER dono de um Principal ou de uma entidade.
//!
//! Cada entidade sabe apontar para o próximo elo da sua cadeia de posse
//! ([`OwnerChain`]). O [`scope_of`] percorre esses elos, carregando cada um
//! por meio de um [`ChainSource`] (Postgres em produção, memória nos testes),
//! até chegar à raiz [`ChainLink::Tenant`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Principal, Role, User},
        catalog::{Category, Product},
        product_check::ProductCheck,
        store::Store,
        transaction::{Transaction, TransactionType},
    },
};

/// Profundidade máxima da cadeia. A mais longa hoje é
/// ProductCheck → Product → Store → Owner → Tenant.
pub const MAX_CHAIN_DEPTH: usize = 8;

// Um elo da cadeia de posse, identificado pelo tipo + id da entidade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainLink {
    /// Raiz: id do OWNER já verificado.
    Tenant(Uuid),
    /// Usuário que obrigatoriamente é um OWNER ativo.
    Owner(Uuid),
    User(Uuid),
    Store(Uuid),
    Category(Uuid),
    Product(Uuid),
    Transaction(Uuid),
    ProductCheck(Uuid),
}

impl ChainLink {
    pub const fn entity_name(self) -> &'static str {
        match self {
            ChainLink::Tenant(_) | ChainLink::Owner(_) => "Dono",
            ChainLink::User(_) => "Usuário",
            ChainLink::Store(_) => "Loja",
            ChainLink::Category(_) => "Categoria",
            ChainLink::Product(_) => "Produto",
            ChainLink::Transaction(_) => "Transação",
            ChainLink::ProductCheck(_) => "Conferência",
        }
    }
}

/// Capacidade "tenho dono": devolve o próximo elo rumo ao OWNER.
pub trait OwnerChain {
    fn parent_link(&self) -> Result<ChainLink, AppError>;
}

impl OwnerChain for User {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        match (self.role, self.owner_id) {
            (Role::Owner, None) => Ok(ChainLink::Tenant(self.id)),
            (Role::Owner, Some(_)) => Err(AppError::Integrity(format!(
                "OWNER {} possui owner_id preenchido",
                self.id
            ))),
            (_, Some(owner_id)) => Ok(ChainLink::Owner(owner_id)),
            (role, None) => Err(AppError::Integrity(format!(
                "usuário {} ({}) sem owner_id",
                self.id, role
            ))),
        }
    }
}

impl OwnerChain for Store {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        Ok(ChainLink::Owner(self.owner_id))
    }
}

impl OwnerChain for Category {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        Ok(ChainLink::Store(self.store_id))
    }
}

impl OwnerChain for Product {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        Ok(ChainLink::Store(self.store_id))
    }
}

impl OwnerChain for ProductCheck {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        Ok(ChainLink::Product(self.product_id))
    }
}

impl OwnerChain for Transaction {
    fn parent_link(&self) -> Result<ChainLink, AppError> {
        match self.transaction_type {
            // Transferência: pertence ao tenant das lojas envolvidas
            TransactionType::Transfer => self.from_store_id.map(ChainLink::Store).ok_or_else(|| {
                AppError::Integrity(format!("transferência {} sem loja de origem", self.id))
            }),
            // Venda: pertence ao tenant de quem a registrou
            TransactionType::Sale => Ok(ChainLink::User(self.created_by)),
        }
    }
}

/// Próximo elo de um usuário carregado a partir de [`ChainLink::Owner`].
/// O alvo precisa ser de fato um OWNER; qualquer outra coisa é dado corrompido.
pub fn owner_root(user: &User) -> Result<ChainLink, AppError> {
    if user.role != Role::Owner {
        return Err(AppError::Integrity(format!(
            "owner_id aponta para {} que é {}, não OWNER",
            user.id, user.role
        )));
    }
    user.parent_link()
}

/// Fonte dos elos da cadeia (camada de persistência).
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Carrega a entidade do elo e devolve o elo seguinte.
    /// `Ok(None)` quando a linha não existe ou foi removida (soft delete).
    async fn parent_of(&self, link: ChainLink) -> Result<Option<ChainLink>, AppError>;
}

/// Tenant do Principal: o próprio id para um OWNER, senão o owner_id.
pub fn resolve_tenant(principal: &Principal) -> Result<Uuid, AppError> {
    match (principal.role, principal.owner_id) {
        (Role::Owner, _) => Ok(principal.user_id),
        (_, Some(owner_id)) => Ok(owner_id),
        (role, None) => Err(AppError::Integrity(format!(
            "principal {} ({}) sem owner_id",
            principal.user_id, role
        ))),
    }
}

pub fn same_tenant(a: &Principal, b: &Principal) -> Result<bool, AppError> {
    Ok(resolve_tenant(a)? == resolve_tenant(b)?)
}

/// Percorre a cadeia de posse até a raiz e devolve o id do OWNER.
pub async fn scope_of<S>(source: &S, target: ChainLink) -> Result<Uuid, AppError>
where
    S: ChainSource + ?Sized,
{
    let mut link = target;
    for _ in 0..MAX_CHAIN_DEPTH {
        if let ChainLink::Tenant(owner_id) = link {
            return Ok(owner_id);
        }
        link = source
            .parent_of(link)
            .await?
            .ok_or(AppError::NotFound(link.entity_name()))?;
    }

    Err(AppError::Integrity(format!(
        "cadeia de posse de {:?} excede {} elos",
        target, MAX_CHAIN_DEPTH
    )))
}
