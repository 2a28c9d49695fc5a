//! Unified SQL UserStore implementation.

use std::marker::PhantomData;

use sea_query::{Query, SelectStatement};

use super::SqlDatabase;
use crate::storage::schema::Users;

/// SQL-based implementation of `UserStore`.
pub struct SqlUserStore<DB: SqlDatabase> {
    pool: DB::Pool,
    _marker: PhantomData<DB>,
}

impl<DB: SqlDatabase> SqlUserStore<DB> {
    /// Create a new SQL user store with the given pool.
    pub fn new(pool: DB::Pool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }
}

fn select_users() -> SelectStatement {
    Query::select()
        .columns([
            Users::Id,
            Users::Name,
            Users::Email,
            Users::Password,
            Users::Role,
            Users::Company,
            Users::Location,
            Users::Phone,
            Users::Title,
        ])
        .from(Users::Table)
        .to_owned()
}

/// Macro to implement UserStore for a specific SQL backend.
macro_rules! impl_user_store {
    ($db_type:ty, $row_type:ty, $feature:literal) => {
        #[cfg(feature = $feature)]
        impl SqlUserStore<$db_type> {
            fn user_from_row(row: &$row_type) -> crate::interfaces::Result<crate::models::User> {
                use sqlx::Row;

                let role: String = row.try_get("role")?;
                Ok(crate::models::User {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    password: row.try_get("password")?,
                    role: role.parse()?,
                    profile: crate::models::UserProfile {
                        company: row.try_get("company")?,
                        location: row.try_get("location")?,
                        phone: row.try_get("phone")?,
                        title: row.try_get("title")?,
                    },
                })
            }

            async fn fetch_one_where(
                &self,
                column: Users,
                value: &str,
            ) -> crate::interfaces::Result<Option<crate::models::User>> {
                use sea_query::Expr;

                let stmt = select_users()
                    .and_where(Expr::col(column).eq(value))
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
                row.as_ref().map(Self::user_from_row).transpose()
            }
        }

        #[cfg(feature = $feature)]
        #[async_trait::async_trait]
        impl crate::interfaces::UserStore for SqlUserStore<$db_type> {
            async fn find_by_email(
                &self,
                email: &str,
            ) -> crate::interfaces::Result<Option<crate::models::User>> {
                self.fetch_one_where(Users::Email, email).await
            }

            async fn get(&self, id: &str) -> crate::interfaces::Result<Option<crate::models::User>> {
                self.fetch_one_where(Users::Id, id).await
            }

            async fn create(
                &self,
                user: crate::models::NewUser,
            ) -> crate::interfaces::Result<crate::models::User> {
                use crate::storage::sql::conflict_or_database;

                let created = crate::models::User {
                    id: crate::models::new_id(),
                    name: user.name,
                    email: user.email,
                    password: user.password_hash,
                    role: user.role,
                    profile: crate::models::UserProfile::default(),
                };

                let stmt = Query::insert()
                    .into_table(Users::Table)
                    .columns([
                        Users::Id,
                        Users::Name,
                        Users::Email,
                        Users::Password,
                        Users::Role,
                    ])
                    .values_panic([
                        created.id.clone().into(),
                        created.name.clone().into(),
                        created.email.clone().into(),
                        created.password.clone().into(),
                        created.role.as_str().into(),
                    ])
                    .to_owned();

                let sql = <$db_type>::build_insert(stmt);
                sqlx::query(&sql)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| conflict_or_database(e, "user with this email"))?;

                Ok(created)
            }

            async fn list_summaries(
                &self,
            ) -> crate::interfaces::Result<Vec<crate::models::UserSummary>> {
                use sea_query::Order;
                use sqlx::Row;

                let stmt = Query::select()
                    .columns([Users::Id, Users::Name, Users::Email, Users::Role])
                    .from(Users::Table)
                    .order_by(Users::Name, Order::Asc)
                    .to_owned();

                let sql = <$db_type>::build_select(stmt);
                let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
                rows.iter()
                    .map(|row| {
                        let role: String = row.try_get("role")?;
                        Ok(crate::models::UserSummary {
                            id: row.try_get("id")?,
                            name: row.try_get("name")?,
                            email: row.try_get("email")?,
                            role: role.parse()?,
                        })
                    })
                    .collect()
            }

            async fn update_profile(
                &self,
                id: &str,
                name: &str,
                profile: crate::models::UserProfile,
            ) -> crate::interfaces::Result<crate::models::User> {
                use sea_query::Expr;

                use crate::interfaces::StorageError;

                let stmt = Query::update()
                    .table(Users::Table)
                    .value(Users::Name, name)
                    .value(Users::Company, profile.company)
                    .value(Users::Location, profile.location)
                    .value(Users::Phone, profile.phone)
                    .value(Users::Title, profile.title)
                    .and_where(Expr::col(Users::Id).eq(id))
                    .to_owned();

                let sql = <$db_type>::build_update(stmt);
                let result = sqlx::query(&sql).execute(&self.pool).await?;
                if result.rows_affected() == 0 {
                    return Err(StorageError::not_found("user", id));
                }

                self.fetch_one_where(Users::Id, id)
                    .await?
                    .ok_or_else(|| StorageError::not_found("user", id))
            }

            async fn seed(&self, users: &[crate::models::User]) -> crate::interfaces::Result<()> {
                use sea_query::OnConflict;

                for user in users {
                    let stmt = Query::insert()
                        .into_table(Users::Table)
                        .columns([
                            Users::Id,
                            Users::Name,
                            Users::Email,
                            Users::Password,
                            Users::Role,
                            Users::Company,
                            Users::Location,
                            Users::Phone,
                            Users::Title,
                        ])
                        .values_panic([
                            user.id.clone().into(),
                            user.name.clone().into(),
                            user.email.clone().into(),
                            user.password.clone().into(),
                            user.role.as_str().into(),
                            user.profile.company.clone().into(),
                            user.profile.location.clone().into(),
                            user.profile.phone.clone().into(),
                            user.profile.title.clone().into(),
                        ])
                        .on_conflict(OnConflict::column(Users::Id).do_nothing().to_owned())
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
impl_user_store!(super::postgres::Postgres, sqlx::postgres::PgRow, "postgres");
impl_user_store!(super::sqlite::Sqlite, sqlx::sqlite::SqliteRow, "sqlite");
