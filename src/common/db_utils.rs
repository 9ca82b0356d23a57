use crate::common::error::AppError;

// ---
// Helper: tradução de violações de unicidade do Postgres
// ---
/// Converte um erro do sqlx em `AppError`, dando a chance de traduzir a
/// violação de unicidade pelo nome da constraint.
pub(crate) fn map_unique_violation<F>(e: sqlx::Error, on_unique: F) -> AppError
where
    F: FnOnce(&str) -> AppError,
{
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            return on_unique(constraint);
        }
    }
    e.into()
}

/// Paginação simples: limite entre 1 e 100 (padrão 50), offset não negativo.
pub(crate) fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (limit.unwrap_or(50).clamp(1, 100), offset.unwrap_or(0).max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_are_clamped() {
        assert_eq!(page_bounds(None, None), (50, 0));
        assert_eq!(page_bounds(Some(1000), Some(-5)), (100, 0));
        assert_eq!(page_bounds(Some(0), Some(20)), (1, 20));
    }

    #[test]
    fn non_database_errors_pass_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, |_| AppError::UsernameAlreadyExists);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
