// src/services/user_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    access::{
        ownership::{resolve_tenant, ChainLink},
        policy::{can_manage, ensure, Action},
    },
    common::error::AppError,
    db::{OwnershipRepository, UserRepository},
    models::auth::{Principal, Role, User},
    services::auth::hash_password,
};

// Gestão da equipe de um tenant (funcionários subordinados ao OWNER)
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    ownership: OwnershipRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, ownership: OwnershipRepository, pool: PgPool) -> Self {
        Self { user_repo, ownership, pool }
    }

    pub async fn get_user(&self, principal: &Principal, user_id: Uuid) -> Result<User, AppError> {
        ensure(&self.ownership, principal, Action::Read, ChainLink::User(user_id)).await?;

        self.user_repo
            .find_by_id(&self.pool, user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, AppError> {
        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::Read, ChainLink::Tenant(tenant)).await?;

        self.user_repo.list_by_tenant(&self.pool, tenant).await
    }

    /// Cria um funcionário no tenant de quem está criando.
    /// O novo cargo precisa ser estritamente inferior ao do criador.
    pub async fn create_member(
        &self,
        principal: &Principal,
        username: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<User, AppError> {
        if role == Role::Owner {
            return Err(AppError::Validation(
                "um OWNER só pode ser criado pelo registro público".into(),
            ));
        }

        let tenant = resolve_tenant(principal)?;
        ensure(&self.ownership, principal, Action::CreateUser, ChainLink::Tenant(tenant)).await?;
        can_manage(principal, role).into_result()?;

        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .user_repo
            .create_user(&mut *tx, username, &hashed_password, name, role, Some(tenant))
            .await?;
        tx.commit().await?;

        tracing::info!(
            created_by = %principal.user_id,
            user_id = %user.id,
            role = %user.role,
            "Funcionário criado"
        );
        Ok(user)
    }

    /// Atualiza nome/senha. O próprio usuário sempre pode; terceiros exigem ADMIN
    /// e cargo superior ao do alvo.
    pub async fn update_user(
        &self,
        principal: &Principal,
        user_id: Uuid,
        name: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AppError> {
        ensure(&self.ownership, principal, Action::UpdateUser, ChainLink::User(user_id)).await?;

        let mut tx = self.pool.begin().await?;

        if user_id != principal.user_id {
            let target = self
                .user_repo
                .find_by_id(&mut *tx, user_id)
                .await?
                .ok_or(AppError::NotFound("Usuário"))?;
            can_manage(principal, target.role).into_result()?;
        }

        let password_hash = match password {
            Some(p) => Some(hash_password(p).await?),
            None => None,
        };

        let user = self
            .user_repo
            .update_profile(&mut *tx, user_id, name, password_hash.as_deref())
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        tx.commit().await?;

        Ok(user)
    }

    pub async fn delete_user(&self, principal: &Principal, user_id: Uuid) -> Result<(), AppError> {
        if user_id == principal.user_id {
            return Err(AppError::Validation("não é possível remover a si mesmo".into()));
        }
        ensure(&self.ownership, principal, Action::DeleteUser, ChainLink::User(user_id)).await?;

        let mut tx = self.pool.begin().await?;
        let target = self
            .user_repo
            .find_by_id(&mut *tx, user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        can_manage(principal, target.role).into_result()?;

        if !self.user_repo.soft_delete(&mut *tx, user_id).await? {
            return Err(AppError::NotFound("Usuário"));
        }
        tx.commit().await?;

        tracing::info!(deleted_by = %principal.user_id, user_id = %user_id, "Funcionário removido");
        Ok(())
    }
}
