//! Unified SQL storage implementations.
//!
//! This module provides shared implementations for SQL-based storage backends
//! (PostgreSQL, SQLite). The implementations are parameterized by database type
//! using the `SqlDatabase` trait; each store uses a macro to generate one
//! trait impl per enabled backend.

/// Sum of invoice amounts with the given status, cast so both backends
/// decode it as a 64-bit integer.
macro_rules! status_sum {
    ($status:literal, $alias:literal) => {
        sea_query::Expr::cust(concat!(
            "CAST(COALESCE(SUM(CASE WHEN invoices.status = '",
            $status,
            "' THEN invoices.amount ELSE 0 END), 0) AS BIGINT) AS ",
            $alias
        ))
    };
}

mod customer_store;
mod dashboard_store;
mod invoice_store;
mod product_store;
mod query;
mod user_store;

use sea_query::{Alias, Expr, IntoColumnRef, SimpleExpr};

pub use customer_store::SqlCustomerStore;
pub use dashboard_store::SqlDashboardStore;
pub use invoice_store::SqlInvoiceStore;
pub use product_store::SqlProductStore;
pub use query::SqlDatabase;
pub use user_store::SqlUserStore;

use crate::interfaces::StorageError;

/// Case-insensitive substring match on a text column.
pub(crate) fn column_contains<DB: SqlDatabase, C: IntoColumnRef>(col: C, query: &str) -> SimpleExpr {
    DB::contains_ci(Expr::col(col).into(), query)
}

/// Substring match on a numeric or date column rendered as text.
pub(crate) fn text_contains<DB: SqlDatabase, C: IntoColumnRef>(col: C, query: &str) -> SimpleExpr {
    DB::contains_ci(Expr::col(col).cast_as(Alias::new("TEXT")), query)
}

/// Map a unique-constraint violation to `Conflict`, anything else to
/// `Database`.
pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StorageError::Conflict(format!("{} already exists", what))
        }
        _ => StorageError::Database(err),
    }
}

/// Map a foreign-key violation on an invoice write to `CustomerNotFound`.
pub(crate) fn customer_fk_or_database(err: sqlx::Error, customer_id: &str) -> StorageError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            StorageError::CustomerNotFound(customer_id.to_string())
        }
        _ => StorageError::Database(err),
    }
}

#[cfg(feature = "postgres")]
pub mod postgres {
    //! PostgreSQL database backend.

    use sea_query::{BinOper, Expr, PostgresQueryBuilder, SimpleExpr};
    use sqlx::PgPool;

    /// PostgreSQL database marker type.
    pub struct Postgres;

    impl super::SqlDatabase for Postgres {
        type Pool = PgPool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(PostgresQueryBuilder)
        }

        /// `ILIKE` folds case per the database's Unicode collation.
        fn contains_ci(expr: SimpleExpr, query: &str) -> SimpleExpr {
            let pattern = format!("%{}%", escape_like(query));
            Expr::expr(expr).binary(BinOper::Custom("ILIKE"), Expr::val(pattern))
        }
    }

    /// Escape `LIKE` metacharacters so the query matches literally.
    fn escape_like(query: &str) -> String {
        let mut escaped = String::with_capacity(query.len());
        for ch in query.chars() {
            if matches!(ch, '\\' | '%' | '_') {
                escaped.push('\\');
            }
            escaped.push(ch);
        }
        escaped
    }

    pub type PostgresCustomerStore = super::SqlCustomerStore<Postgres>;
    pub type PostgresInvoiceStore = super::SqlInvoiceStore<Postgres>;
    pub type PostgresDashboardStore = super::SqlDashboardStore<Postgres>;
    pub type PostgresUserStore = super::SqlUserStore<Postgres>;
    pub type PostgresProductStore = super::SqlProductStore<Postgres>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    //! SQLite database backend.

    use sea_query::{BinOper, Expr, SimpleExpr, SqliteQueryBuilder};
    use sqlx::SqlitePool;

    /// SQLite database marker type.
    pub struct Sqlite;

    impl super::SqlDatabase for Sqlite {
        type Pool = SqlitePool;

        fn build_select(stmt: sea_query::SelectStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_insert(stmt: sea_query::InsertStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_update(stmt: sea_query::UpdateStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        fn build_delete(stmt: sea_query::DeleteStatement) -> String {
            stmt.to_string(SqliteQueryBuilder)
        }

        /// SQLite's `LOWER()` and `LIKE` fold ASCII only, so matching goes
        /// through the `REGEXP` function registered on every connection.
        fn contains_ci(expr: SimpleExpr, query: &str) -> SimpleExpr {
            let pattern = format!("(?i){}", regex::escape(query));
            Expr::expr(expr).binary(BinOper::Custom("REGEXP"), Expr::val(pattern))
        }
    }

    pub type SqliteCustomerStore = super::SqlCustomerStore<Sqlite>;
    pub type SqliteInvoiceStore = super::SqlInvoiceStore<Sqlite>;
    pub type SqliteDashboardStore = super::SqlDashboardStore<Sqlite>;
    pub type SqliteUserStore = super::SqlUserStore<Sqlite>;
    pub type SqliteProductStore = super::SqlProductStore<Sqlite>;
}
