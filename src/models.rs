pub mod auth;
pub mod store;
pub mod catalog;
pub mod transaction;
pub mod product_check;
