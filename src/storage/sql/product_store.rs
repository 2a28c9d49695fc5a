//! Unified SQL ProductStore implementation.

use std::marker::PhantomData;

use sea_query::{Query, SelectStatement};

use super::SqlDatabase;
use crate::storage::schema::Products;

/// SQL-based implementation of `ProductStore`.
pub struct SqlProductStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlProductStore<DB> {
    /// Create a new SQL product store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

fn select_products() -> SelectStatement {
    Query::select()
        .columns([
            Products::Id,
            Products::Name,
            Products::Description,
            Products::Price,
            Products::Category,
            Products::ImageUrl,
            Products::Status,
            Products::CreatedAt,
            Products::UpdatedAt,
        ])
        .from(Products::Table)
        .to_owned()
}

/// Macro to implement ProductStore for a specific SQL backend.
macro_rules! impl_product_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlProductStore<$db_type> {
            fn product_from_row(
                row: &$row_type,
            ) -> crate::interfaces::Result<crate::models::Product> {
                use sqlx::Row;

                let status: String = row.try_get("status")?;
                Ok(crate::models::Product {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    price: row.try_get("price")?,
                    category: row.try_get("category")?,
                    image_url: row.try_get("image_url")?,
                    status: status.parse()?,
                    created_at: row.try_get("created_at")?,
                    updated_at: row.try_get("updated_at")?,
                })
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::ProductStore for SqlProductStore<$db_type> {
            async fn list(
                &self,
                category: Option<&str>,
            ) -> crate::interfaces::Result<Vec<crate::models::Product>> {
                use sea_query::{Expr, Order};

                let sql = {
                    let mut stmt = select_products();
                    if let Some(category) = category {
                        stmt.and_where(Expr::col(Products::Category).eq(category));
                    }
                    stmt.order_by(Products::CreatedAt, Order::Desc);
                    <$db_type>::build_select(stmt)
                };
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter().map(Self::product_from_row).collect()
            }

            async fn get(
                &self,
                id: &str,
            ) -> crate::interfaces::Result<Option<crate::models::Product>> {
                use sea_query::Expr;

                let stmt = select_products()
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(Self::product_from_row).transpose()
            }

            async fn create(
                &self,
                input: crate::models::ProductInput,
            ) -> crate::interfaces::Result<crate::models::Product> {
                let now = crate::models::now_rfc3339();
                let created = crate::models::Product {
                    id: crate::models::new_id(),
                    name: input.name,
                    description: input.description,
                    price: input.price,
                    category: input.category,
                    image_url: input.image_url,
                    status: input.status,
                    created_at: now.clone(),
                    updated_at: now,
                };

                let stmt = Query::insert()
                    .into_table(Products::Table)
                    .columns([
                        Products::Id,
                        Products::Name,
                        Products::Description,
                        Products::Price,
                        Products::Category,
                        Products::ImageUrl,
                        Products::Status,
                        Products::CreatedAt,
                        Products::UpdatedAt,
                    ])
                    .values_panic([
                        created.id.clone().into(),
                        created.name.clone().into(),
                        created.description.clone().into(),
                        created.price.into(),
                        created.category.clone().into(),
                        created.image_url.clone().into(),
                        created.status.as_str().into(),
                        created.created_at.clone().into(),
                        created.updated_at.clone().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql).execute(&self.pool).await?;
                Ok(created)
            }

            async fn update(
                &self,
                id: &str,
                input: crate::models::ProductInput,
            ) -> crate::interfaces::Result<crate::models::Product> {
                use sea_query::Expr;

                use crate::interfaces::{ProductStore, StorageError};

                let stmt = Query::update()
                    .table(Products::Table)
                    .value(Products::Name, input.name)
                    .value(Products::Description, input.description)
                    .value(Products::Price, input.price)
                    .value(Products::Category, input.category)
                    .value(Products::ImageUrl, input.image_url)
                    .value(Products::Status, input.status.as_str())
                    .value(Products::UpdatedAt, crate::models::now_rfc3339())
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("product", id));
                }

                self.get(id)
                    .await?
                    .ok_or_else(|| StorageError::not_found("product", id))
            }

            async fn delete(&self, id: &str) -> crate::interfaces::Result<()> {
                use sea_query::Expr;

                use crate::interfaces::StorageError;

                let stmt = Query::delete()
                    .from_table(Products::Table)
                    .and_where(Expr::col(Products::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_delete(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("product", id));
                }
                Ok(())
            }
        }
    };
}

// Generate implementations for each SQL backend
impl_product_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_product_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
