// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, Principal, Role, User},
};

// Camada de credenciais: senha (bcrypt) e token (JWT).
// O resto do sistema só enxerga o Principal que sai de `verify`.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl_hours: i64,
    pool: PgPool,
}

/// Hash bcrypt fora do runtime assíncrono (operação cara de CPU).
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl_hours: i64, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, token_ttl_hours, pool }
    }

    /// Registro público: cria um OWNER, raiz de um novo tenant.
    pub async fn register_owner(&self, username: &str, password: &str, name: &str) -> Result<String, AppError> {
        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let owner = self
            .user_repo
            .create_user(&mut *tx, username, &hashed_password, name, Role::Owner, None)
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = %owner.id, "Novo OWNER registrado");
        self.create_token(&owner)
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(&user)
    }

    /// Token → Principal. O usuário é relido do banco: removido ou com cargo
    /// alterado, vale o que está persistido, não o que o token diz.
    pub async fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let claims = self.decode_claims(token)?;

        let user = self
            .user_repo
            .find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Principal::from_user(&user)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            owner_id: user.owner_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    // Pool preguiçoso: nunca conecta, basta para testar o ciclo do token.
    fn service() -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/pos_test")
            .unwrap();
        AuthService::new(UserRepository::new(pool.clone()), "segredo-de-teste".into(), 1, pool)
    }

    fn user(role: Role, owner_id: Option<Uuid>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "caixa".into(),
            password_hash: String::new(),
            name: "Caixa".into(),
            role,
            owner_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn token_round_trips_claims() {
        let svc = service();
        let owner_id = Uuid::new_v4();
        let cashier = user(Role::Cashier, Some(owner_id));

        let token = svc.create_token(&cashier).unwrap();
        let claims = svc.decode_claims(&token).unwrap();

        assert_eq!(claims.sub, cashier.id);
        assert_eq!(claims.role, Role::Cashier);
        assert_eq!(claims.owner_id, Some(owner_id));
    }

    #[tokio::test]
    async fn tampered_or_foreign_tokens_are_rejected() {
        let svc = service();
        let token = svc.create_token(&user(Role::Owner, None)).unwrap();

        let other = AuthService { jwt_secret: "outro-segredo".into(), ..service() };
        assert!(matches!(other.decode_claims(&token), Err(AppError::InvalidToken)));
        assert!(matches!(svc.decode_claims("nao.e.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn hash_password_produces_verifiable_hash() {
        let hashed = hash_password("senha-forte").await.unwrap();
        assert!(verify("senha-forte", &hashed).unwrap());
        assert!(!verify("senha-errada", &hashed).unwrap());
    }
}
