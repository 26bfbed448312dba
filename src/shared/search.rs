use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::ColumnTrait;

/// `LIKE` pattern matching `needle` anywhere, with wildcards in the input escaped.
pub fn contains_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Case-insensitive substring filter on a text column, qualified with its table.
pub fn contains_ci<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::col((column.entity_name(), column)).ilike(contains_pattern(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_needle() {
        assert_eq!(contains_pattern("Dune"), "%Dune%");
    }

    #[test]
    fn escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
