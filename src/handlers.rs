pub mod auth;
pub mod users;
pub mod stores;
pub mod catalog;
pub mod transactions;
pub mod product_checks;
