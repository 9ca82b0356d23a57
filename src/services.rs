pub mod auth;
pub mod user_service;
pub mod store_service;
pub mod catalog_service;
pub mod transaction_service;
pub mod product_check_service;
