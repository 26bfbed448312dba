use sea_orm::DbErr;

/// SQLSTATE 23505, whichever way the driver reports it.
pub fn is_unique_violation(e: &DbErr) -> bool {
    let err_str = e.to_string().to_lowercase();
    err_str.contains("23505")
        || err_str.contains("duplicate key")
        || err_str.contains("unique constraint")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_postgres_messages() {
        let err = DbErr::Custom(
            "error returned from database: duplicate key value violates unique constraint \"genres_slug_key\""
                .to_string(),
        );
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&DbErr::Custom("connection reset".into())));
    }
}
