//! Unified SQL DashboardStore implementation.

use std::marker::PhantomData;

use super::SqlDatabase;

/// SQL-based implementation of `DashboardStore`.
pub struct SqlDashboardStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlDashboardStore<DB> {
    /// Create a new SQL dashboard store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

/// Number of rows in the latest-invoices panel.
const LATEST_INVOICES: u64 = 5;

/// Macro to implement DashboardStore for a specific SQL backend.
macro_rules! impl_dashboard_store {
    ($db_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::DashboardStore for SqlDashboardStore<$db_type> {
            async fn revenue(&self) -> crate::interfaces::Result<Vec<crate::models::Revenue>> {
                use sea_query::Query;
                use sqlx::Row;

                use crate::storage::schema::Revenue;

                let stmt = Query::select()
                    .columns([Revenue::Month, Revenue::Revenue])
                    .from(Revenue::Table)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        Ok(crate::models::Revenue {
                            month: row.try_get("month")?,
                            revenue: row.try_get("revenue")?,
                        })
                    })
                    .collect()
            }

            async fn latest_invoices(
                &self,
            ) -> crate::interfaces::Result<Vec<crate::models::LatestInvoice>> {
                use sea_query::{Expr, Order, Query};
                use sqlx::Row;

                use crate::storage::schema::{Customers, Invoices};

                let stmt = Query::select()
                    .column((Invoices::Table, Invoices::Amount))
                    .column((Customers::Table, Customers::Name))
                    .column((Customers::Table, Customers::ImageUrl))
                    .column((Customers::Table, Customers::Email))
                    .column((Invoices::Table, Invoices::Id))
                    .from(Invoices::Table)
                    .inner_join(
                        Customers::Table,
                        Expr::col((Invoices::Table, Invoices::CustomerId))
                            .equals((Customers::Table, Customers::Id)),
                    )
                    .order_by((Invoices::Table, Invoices::Date), Order::Desc)
                    .order_by((Invoices::Table, Invoices::Id), Order::Asc)
                    .limit(LATEST_INVOICES)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        let amount: i64 = row.try_get("amount")?;
                        Ok(crate::models::LatestInvoice {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                            email: row.try_get("email")?,
                            image_url: row.try_get("image_url")?,
                            amount: crate::models::format_currency(amount),
                        })
                    })
                    .collect()
            }

            async fn card_totals(&self) -> crate::interfaces::Result<crate::models::CardTotals> {
                use sea_query::{Alias, Expr, Query};
                use sqlx::Row;

                use crate::storage::schema::{Customers, Invoices};

                let invoice_count = <$db_type>::build_select(
                    Query::select()
                        .expr_as(Expr::col(Invoices::Id).count(), Alias::new("count"))
                        .from(Invoices::Table)
                        .to_owned(),
                );
                let customer_count = <$db_type>::build_select(
                    Query::select()
                        .expr_as(Expr::col(Customers::Id).count(), Alias::new("count"))
                        .from(Customers::Table)
                        .to_owned(),
                );
                let status_totals = <$db_type>::build_select(
                    Query::select()
                        .expr(status_sum!("paid", "paid"))
                        .expr(status_sum!("pending", "pending"))
                        .from(Invoices::Table)
                        .to_owned(),
                );

                let (invoices, customers, totals) = tokio::try_join!(
                    sqlx::query(&invoice_count).fetch_one(&self.pool),
                    sqlx::query(&customer_count).fetch_one(&self.pool),
                    sqlx::query(&status_totals).fetch_one(&self.pool),
                )?;

                Ok(crate::models::CardTotals {
                    invoice_count: invoices.try_get("count")?,
                    customer_count: customers.try_get("count")?,
                    paid_cents: totals.try_get("paid")?,
                    pending_cents: totals.try_get("pending")?,
                })
            }

            async fn seed_revenue(
                &self,
                revenue: &[crate::models::Revenue],
            ) -> crate::interfaces::Result<()> {
                use sea_query::{OnConflict, Query};

                use crate::storage::schema::Revenue;

                for row in revenue {
                    let stmt = Query::insert()
                        .into_table(Revenue::Table)
                        .columns([Revenue::Month, Revenue::Revenue])
                        .values_panic([row.month.clone().into(), row.revenue.into()])
                        .on_conflict(OnConflict::column(Revenue::Month).do_nothing().to_owned())
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
impl_dashboard_store!(super::postgres::Postgres, "postgres");
impl_dashboard_store!(super::sqlite::Sqlite, "sqlite");
