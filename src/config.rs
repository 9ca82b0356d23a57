// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CatalogRepository, OwnershipRepository, ProductCheckRepository, StoreRepository,
        TransactionRepository, UserRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService,
        product_check_service::ProductCheckService, store_service::StoreService,
        transaction_service::TransactionService, user_service::UserService,
    },
};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub bind_addr: String,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub store_service: StoreService,
    pub catalog_service: CatalogService,
    pub transaction_service: TransactionService,
    pub product_check_service: ProductCheckService,
}

// Lê uma variável opcional; presente mas inválida é erro de configuração
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} possui valor inválido: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let token_ttl_hours = env_or("JWT_EXPIRATION_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let db_pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!(max_connections, "✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let store_repo = StoreRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let tx_repo = TransactionRepository::new(db_pool.clone());
        let check_repo = ProductCheckRepository::new(db_pool.clone());
        let ownership = OwnershipRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, token_ttl_hours, db_pool.clone());
        let user_service = UserService::new(user_repo, ownership.clone(), db_pool.clone());
        let store_service = StoreService::new(store_repo, ownership.clone(), db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), ownership.clone(), db_pool.clone());
        let transaction_service = TransactionService::new(tx_repo, ownership.clone(), db_pool.clone());
        let product_check_service =
            ProductCheckService::new(check_repo, catalog_repo, ownership, db_pool.clone());

        Ok(Self {
            db_pool,
            bind_addr,
            i18n_store: Arc::new(I18nStore::load()),
            auth_service,
            user_service,
            store_service,
            catalog_service,
            transaction_service,
            product_check_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_and_rejects_garbage() {
        // Nomes exclusivos deste teste: não colidem com outras variáveis do processo
        assert_eq!(env_or("POS_TEST_UNSET_VAR", 7u32).unwrap(), 7);

        unsafe { env::set_var("POS_TEST_BAD_VAR", "muitas") };
        assert!(env_or("POS_TEST_BAD_VAR", 5u32).is_err());

        unsafe { env::set_var("POS_TEST_GOOD_VAR", "12") };
        assert_eq!(env_or("POS_TEST_GOOD_VAR", 5u32).unwrap(), 12);
    }
}
