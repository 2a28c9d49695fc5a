//! Unified SQL InvoiceStore implementation.

use std::marker::PhantomData;

use sea_query::{Cond, Condition, Expr, Order, Query, SelectStatement};

use super::{column_contains, text_contains, SqlDatabase};
use crate::storage::schema::{Customers, Invoices};

/// SQL-based implementation of `InvoiceStore`.
pub struct SqlInvoiceStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlInvoiceStore<DB> {
    /// Create a new SQL invoice store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &DB::Pool {
        &self.pool
    }
}

/// Match on customer name/email, amount, date or status.
fn search_condition<DB: SqlDatabase>(query: &str) -> Condition {
    Cond::any()
        .add(column_contains::<DB, _>((Customers::Table, Customers::Name), query))
        .add(column_contains::<DB, _>((Customers::Table, Customers::Email), query))
        .add(text_contains::<DB, _>((Invoices::Table, Invoices::Amount), query))
        .add(text_contains::<DB, _>((Invoices::Table, Invoices::Date), query))
        .add(column_contains::<DB, _>((Invoices::Table, Invoices::Status), query))
}

/// Invoices joined with customers, filtered, newest first.
fn search_rows<DB: SqlDatabase>(query: &str) -> SelectStatement {
    Query::select()
        .column((Invoices::Table, Invoices::Id))
        .column((Invoices::Table, Invoices::CustomerId))
        .column((Customers::Table, Customers::Name))
        .column((Customers::Table, Customers::Email))
        .column((Customers::Table, Customers::ImageUrl))
        .column((Invoices::Table, Invoices::Amount))
        .column((Invoices::Table, Invoices::Date))
        .column((Invoices::Table, Invoices::Status))
        .from(Invoices::Table)
        .inner_join(
            Customers::Table,
            Expr::col((Invoices::Table, Invoices::CustomerId))
                .equals((Customers::Table, Customers::Id)),
        )
        .cond_where(search_condition::<DB>(query))
        .order_by((Invoices::Table, Invoices::Date), Order::Desc)
        .order_by((Invoices::Table, Invoices::Id), Order::Asc)
        .to_owned()
}

/// Count of invoices matching the search.
fn search_count<DB: SqlDatabase>(query: &str) -> SelectStatement {
    Query::select()
        .expr_as(
            Expr::col((Invoices::Table, Invoices::Id)).count(),
            sea_query::Alias::new("count"),
        )
        .from(Invoices::Table)
        .inner_join(
            Customers::Table,
            Expr::col((Invoices::Table, Invoices::CustomerId))
                .equals((Customers::Table, Customers::Id)),
        )
        .cond_where(search_condition::<DB>(query))
        .to_owned()
}

/// `SELECT COUNT(*) FROM customers WHERE id = ?`.
fn customer_exists(customer_id: &str) -> SelectStatement {
    Query::select()
        .expr_as(Expr::col(Customers::Id).count(), sea_query::Alias::new("count"))
        .from(Customers::Table)
        .and_where(Expr::col(Customers::Id).eq(customer_id))
        .to_owned()
}

/// Macro to implement InvoiceStore for a specific SQL backend.
macro_rules! impl_invoice_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlInvoiceStore<$db_type> {
            fn row_from(row: &$row_type) -> crate::interfaces::Result<crate::models::InvoiceRow> {
                use sqlx::Row;

                let status: String = row.try_get("status")?;
                Ok(crate::models::InvoiceRow {
                    id: row.try_get("id")?,
                    customer_id: row.try_get("customer_id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    image_url: row.try_get("image_url")?,
                    amount: row.try_get("amount")?,
                    date: row.try_get("date")?,
                    status: status.parse()?,
                })
            }

            fn invoice_from(row: &$row_type) -> crate::interfaces::Result<crate::models::Invoice> {
                use sqlx::Row;

                let status: String = row.try_get("status")?;
                Ok(crate::models::Invoice {
                    id: row.try_get("id")?,
                    customer_id: row.try_get("customer_id")?,
                    amount: row.try_get("amount")?,
                    status: status.parse()?,
                    date: row.try_get("date")?,
                })
            }

            fn select_invoice(id: &str) -> SelectStatement {
                Query::select()
                    .columns([
                        Invoices::Id,
                        Invoices::CustomerId,
                        Invoices::Amount,
                        Invoices::Status,
                        Invoices::Date,
                    ])
                    .from(Invoices::Table)
                    .and_where(Expr::col(Invoices::Id).eq(id))
                    .to_owned()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::InvoiceStore for SqlInvoiceStore<$db_type> {
            async fn filtered(
                &self,
                query: &str,
                page: u64,
            ) -> crate::interfaces::Result<Vec<crate::models::InvoiceRow>> {
                use crate::interfaces::ITEMS_PER_PAGE;
                use crate::storage::helpers::page_offset;

                let stmt = search_rows::<$db_type>(query)
                    .limit(ITEMS_PER_PAGE)
                    .offset(page_offset(page))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::row_from).collect()
            }

            async fn total_pages(&self, query: &str) -> crate::interfaces::Result<u64> {
                use sqlx::Row;

                use crate::storage::helpers::total_pages;

                let sql = <$db_type>::build_select(search_count::<$db_type>(query));
                let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
                let count: i64 = row.try_get("count")?;
                Ok(total_pages(count.max(0) as u64))
            }

            async fn page_after(
                &self,
                query: &str,
                offset: u64,
                limit: u64,
            ) -> crate::interfaces::Result<crate::models::InvoicePage> {
                use crate::storage::helpers::split_page;

                // One extra row tells us whether another slice exists.
                let stmt = search_rows::<$db_type>(query)
                    .limit(limit + 1)
                    .offset(offset)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                let rows = rows
                    .iter()
                    .map(Self::row_from)
                    .collect::<crate::interfaces::Result<Vec<_>>>()?;
                let (data, next_cursor) = split_page(rows, offset, limit);
                Ok(crate::models::InvoicePage { data, next_cursor })
            }

            async fn get_form(
                &self,
                id: &str,
            ) -> crate::interfaces::Result<Option<crate::models::InvoiceForm>> {
                let sql = <$db_type>::build_select(Self::select_invoice(id));
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                let invoice = row.as_ref().map(Self::invoice_from).transpose()?;
                Ok(invoice.map(|inv| {
                    crate::models::InvoiceForm::from_cents(
                        inv.id,
                        inv.customer_id,
                        inv.amount,
                        inv.status,
                    )
                }))
            }

            async fn create(
                &self,
                invoice: crate::models::NewInvoice,
            ) -> crate::interfaces::Result<crate::models::Invoice> {
                use sqlx::Row;

                use crate::interfaces::StorageError;
                use crate::storage::sql::customer_fk_or_database;

                let mut tx = self.pool.begin().await?;

                let sql = <$db_type>::build_select(customer_exists(&invoice.customer_id));
                let count: i64 = sqlx::query(&sql).fetch_one(&mut *tx).await?.try_get("count")?;
                if count == 0 {
                    return Err(StorageError::CustomerNotFound(invoice.customer_id));
                }

                let created = crate::models::Invoice {
                    id: crate::models::new_id(),
                    customer_id: invoice.customer_id,
                    amount: invoice.amount,
                    status: invoice.status,
                    date: invoice.date,
                };

                let stmt = Query::insert()
                    .into_table(Invoices::Table)
                    .columns([
                        Invoices::Id,
                        Invoices::CustomerId,
                        Invoices::Amount,
                        Invoices::Status,
                        Invoices::Date,
                    ])
                    .values_panic([
                        created.id.clone().into(),
                        created.customer_id.clone().into(),
                        created.amount.into(),
                        created.status.as_str().into(),
                        created.date.clone().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| customer_fk_or_database(e, &created.customer_id))?;

                tx.commit().await?;
                Ok(created)
            }

            async fn update(
                &self,
                id: &str,
                update: crate::models::InvoiceUpdate,
            ) -> crate::interfaces::Result<crate::models::Invoice> {
                use sqlx::Row;

                use crate::interfaces::StorageError;
                use crate::storage::sql::customer_fk_or_database;

                let mut tx = self.pool.begin().await?;

                let sql = <$db_type>::build_select(customer_exists(&update.customer_id));
                let count: i64 = sqlx::query(&sql).fetch_one(&mut *tx).await?.try_get("count")?;
                if count == 0 {
                    return Err(StorageError::CustomerNotFound(update.customer_id));
                }

                let stmt = Query::update()
                    .table(Invoices::Table)
                    .value(Invoices::CustomerId, update.customer_id.clone())
                    .value(Invoices::Amount, update.amount)
                    .value(Invoices::Status, update.status.as_str())
                    .and_where(Expr::col(Invoices::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| customer_fk_or_database(e, &update.customer_id))?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("invoice", id));
                }

                let sql = <$db_type>::build_select(Self::select_invoice(id));
                let row = sqlx::query(&sql).fetch_one(&mut *tx).await?;
                let invoice = Self::invoice_from(&row)?;

                tx.commit().await?;
                Ok(invoice)
            }

            async fn delete(&self, id: &str) -> crate::interfaces::Result<()> {
                use crate::interfaces::StorageError;

                let stmt = Query::delete()
                    .from_table(Invoices::Table)
                    .and_where(Expr::col(Invoices::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_delete(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("invoice", id));
                }
                Ok(())
            }

            async fn seed(
                &self,
                invoices: &[crate::models::Invoice],
            ) -> crate::interfaces::Result<()> {
                use sea_query::OnConflict;

                for invoice in invoices {
                    let stmt = Query::insert()
                        .into_table(Invoices::Table)
                        .columns([
                            Invoices::Id,
                            Invoices::CustomerId,
                            Invoices::Amount,
                            Invoices::Status,
                            Invoices::Date,
                        ])
                        .values_panic([
                            invoice.id.clone().into(),
                            invoice.customer_id.clone().into(),
                            invoice.amount.into(),
                            invoice.status.as_str().into(),
                            invoice.date.clone().into(),
                        ])
                        .on_conflict(OnConflict::column(Invoices::Id).do_nothing().to_owned())
                        .to_owned();

                    let sql = <$db_type>::build_insert(stmt);
                    sqlx::query(&sql).execute(&self.pool).await?;
                }
                Ok(())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_invoice_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_invoice_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
