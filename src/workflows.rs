//! Máquinas de estado puras. Nenhuma função daqui faz I/O.

pub mod product_check;
pub mod transaction;
