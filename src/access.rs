//! Controle de acesso: cadeia de posse (tenant) e tabela de permissões por cargo.

pub mod ownership;
pub mod policy;

#[cfg(test)]
pub(crate) mod fixtures;
