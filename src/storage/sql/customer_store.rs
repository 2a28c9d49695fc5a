//! Unified SQL CustomerStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of `CustomerStore`.
pub struct SqlCustomerStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlCustomerStore<DB> {
    /// Create a new SQL customer store with the given pool.
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

/// Macro to implement CustomerStore for a specific SQL backend.
macro_rules! impl_customer_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlCustomerStore<$db_type> {
            fn customer_from_row(row: &$row_type) -> crate::interfaces::Result<crate::models::Customer> {
                use sqlx::Row;

                let status: String = row.try_get("status")?;
                Ok(crate::models::Customer {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    image_url: row.try_get("image_url")?,
                    status: status.parse()?,
                    phone: row.try_get("phone")?,
                    company: row.try_get("company")?,
                    location: row.try_get("location")?,
                })
            }

            fn select_customers() -> sea_query::SelectStatement {
                use crate::storage::schema::Customers;

                sea_query::Query::select()
                    .columns([
                        Customers::Id,
                        Customers::Name,
                        Customers::Email,
                        Customers::ImageUrl,
                        Customers::Status,
                        Customers::Phone,
                        Customers::Company,
                        Customers::Location,
                    ])
                    .from(Customers::Table)
                    .to_owned()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::CustomerStore for SqlCustomerStore<$db_type> {
            async fn list_all(&self) -> crate::interfaces::Result<Vec<crate::models::Customer>> {
                use sea_query::Order;

                use crate::storage::schema::Customers;

                let stmt = Self::select_customers()
                    .order_by(Customers::Name, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::customer_from_row).collect()
            }

            async fn list_fields(
                &self,
            ) -> crate::interfaces::Result<Vec<crate::models::CustomerField>> {
                use sea_query::{Order, Query};
                use sqlx::Row;

                use crate::storage::schema::Customers;

                let stmt = Query::select()
                    .columns([Customers::Id, Customers::Name])
                    .from(Customers::Table)
                    .order_by(Customers::Name, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        Ok(crate::models::CustomerField {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                        })
                    })
                    .collect()
            }

            async fn filtered_table(
                &self,
                query: &str,
            ) -> crate::interfaces::Result<Vec<crate::models::CustomerTableRow>> {
                use sea_query::{Alias, Cond, Expr, Func, Order, Query};
                use sqlx::Row;

                use crate::storage::schema::{Customers, Invoices};
                use crate::storage::sql::column_contains;

                let stmt = Query::select()
                    .column((Customers::Table, Customers::Id))
                    .column((Customers::Table, Customers::Name))
                    .column((Customers::Table, Customers::Email))
                    .column((Customers::Table, Customers::ImageUrl))
                    .expr_as(
                        Func::count(Expr::col((Invoices::Table, Invoices::Id))),
                        Alias::new("total_invoices"),
                    )
                    .expr(status_sum!("pending", "total_pending"))
                    .expr(status_sum!("paid", "total_paid"))
                    .from(Customers::Table)
                    .left_join(
                        Invoices::Table,
                        Expr::col((Customers::Table, Customers::Id))
                            .equals((Invoices::Table, Invoices::CustomerId)),
                    )
                    .cond_where(
                        Cond::any()
                            .add(column_contains::<$db_type, _>(
                                (Customers::Table, Customers::Name),
                                query,
                            ))
                            .add(column_contains::<$db_type, _>(
                                (Customers::Table, Customers::Email),
                                query,
                            ))
                            .add(column_contains::<$db_type, _>(
                                (Customers::Table, Customers::Company),
                                query,
                            )),
                    )
                    .group_by_columns([
                        (Customers::Table, Customers::Id),
                        (Customers::Table, Customers::Name),
                        (Customers::Table, Customers::Email),
                        (Customers::Table, Customers::ImageUrl),
                    ])
                    .order_by((Customers::Table, Customers::Name), Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        Ok(crate::models::CustomerTableRow {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                            email: row.try_get("email")?,
                            image_url: row.try_get("image_url")?,
                            total_invoices: row.try_get("total_invoices")?,
                            total_pending: row.try_get("total_pending")?,
                            total_paid: row.try_get("total_paid")?,
                        })
                    })
                    .collect()
            }

            async fn get(
                &self,
                id: &str,
            ) -> crate::interfaces::Result<Option<crate::models::Customer>> {
                use sea_query::Expr;

                use crate::storage::schema::Customers;

                let stmt = Self::select_customers()
                    .and_where(Expr::col(Customers::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(Self::customer_from_row).transpose()
            }

            async fn create(
                &self,
                customer: crate::models::NewCustomer,
            ) -> crate::interfaces::Result<crate::models::Customer> {
                use sea_query::Query;

                use crate::storage::schema::Customers;

                let created = crate::models::Customer {
                    id: crate::models::new_id(),
                    name: customer.name,
                    email: customer.email,
                    image_url: customer.image_url,
                    status: customer.status,
                    phone: customer.phone,
                    company: customer.company,
                    location: customer.location,
                };

                let stmt = Query::insert()
                    .into_table(Customers::Table)
                    .columns([
                        Customers::Id,
                        Customers::Name,
                        Customers::Email,
                        Customers::ImageUrl,
                        Customers::Status,
                        Customers::Phone,
                        Customers::Company,
                        Customers::Location,
                    ])
                    .values_panic([
                        created.id.clone().into(),
                        created.name.clone().into(),
                        created.email.clone().into(),
                        created.image_url.clone().into(),
                        created.status.as_str().into(),
                        created.phone.clone().into(),
                        created.company.clone().into(),
                        created.location.clone().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await?;

                Ok(created)
            }

            async fn update(
                &self,
                id: &str,
                update: crate::models::CustomerUpdate,
            ) -> crate::interfaces::Result<crate::models::Customer> {
                use sea_query::{Expr, Query};

                use crate::interfaces::{CustomerStore, StorageError};
                use crate::storage::schema::Customers;

                // Statements hold `Rc` idents; render before the first await.
                let sql = {
                    let mut stmt = Query::update();
                    stmt.table(Customers::Table)
                        .value(Customers::Name, update.name)
                        .value(Customers::Email, update.email)
                        .value(Customers::Status, update.status.as_str())
                        .value(Customers::Phone, update.phone)
                        .value(Customers::Company, update.company)
                        .value(Customers::Location, update.location)
                        .and_where(Expr::col(Customers::Id).eq(id));
                    if let Some(image_url) = update.image_url {
                        stmt.value(Customers::ImageUrl, image_url);
                    }
                    <$db_type>::build_update(stmt)
                };
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("customer", id));
                }

                self.get(id)
                    .await?
                    .ok_or_else(|| StorageError::not_found("customer", id))
            }

            async fn delete_with_invoices(&self, id: &str) -> crate::interfaces::Result<u64> {
                use sea_query::{Expr, Query};

                use crate::interfaces::StorageError;
                use crate::storage::schema::{Customers, Invoices};

                let mut tx = self.pool.begin().await?;

                let stmt = Query::delete()
                    .from_table(Invoices::Table)
                    .and_where(Expr::col(Invoices::CustomerId).eq(id))
                    .to_owned();
                let sql = <$db_type>::build_delete(stmt);
                let invoices_deleted = sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();

                let stmt = Query::delete()
                    .from_table(Customers::Table)
                    .and_where(Expr::col(Customers::Id).eq(id))
                    .to_owned();
                let sql = <$db_type>::build_delete(stmt);
                let customers_deleted = sqlx::query(&sql).execute(&mut *tx).await?.rows_affected();

                if customers_deleted == 0 {
                    // Dropping the transaction rolls back the invoice delete.
                    return Err(StorageError::not_found("customer", id));
                }

                tx.commit().await?;
                Ok(invoices_deleted)
            }

            async fn seed(
                &self,
                customers: &[crate::models::Customer],
            ) -> crate::interfaces::Result<()> {
                use sea_query::{OnConflict, Query};

                use crate::storage::schema::Customers;

                for customer in customers {
                    let stmt = Query::insert()
                        .into_table(Customers::Table)
                        .columns([
                            Customers::Id,
                            Customers::Name,
                            Customers::Email,
                            Customers::ImageUrl,
                            Customers::Status,
                            Customers::Phone,
                            Customers::Company,
                            Customers::Location,
                        ])
                        .values_panic([
                            customer.id.clone().into(),
                            customer.name.clone().into(),
                            customer.email.clone().into(),
                            customer.image_url.clone().into(),
                            customer.status.as_str().into(),
                            customer.phone.clone().into(),
                            customer.company.clone().into(),
                            customer.location.clone().into(),
                        ])
                        .on_conflict(OnConflict::column(Customers::Id).do_nothing().to_owned())
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
impl_customer_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_customer_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
