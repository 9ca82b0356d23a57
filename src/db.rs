pub mod user_repo;
pub use user_repo::UserRepository;
pub mod store_repo;
pub use store_repo::StoreRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
pub mod product_check_repo;
pub use product_check_repo::ProductCheckRepository;
pub mod ownership_repo;
pub use ownership_repo::OwnershipRepository;
