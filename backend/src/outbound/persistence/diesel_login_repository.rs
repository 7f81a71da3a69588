//! PostgreSQL-backed `LoginRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LoginRepository, LoginRepositoryError};
use crate::domain::{Login, join_rollen, split_rollen};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_pool_error};
use super::models::{LoginRow, NewLoginRow};
use super::pool::{DbPool, PoolError};
use super::schema::login;

/// Diesel-backed implementation of the `LoginRepository` port.
#[derive(Clone)]
pub struct DieselLoginRepository {
    pool: DbPool,
}

impl DieselLoginRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> LoginRepositoryError {
    map_pool_error(error, LoginRepositoryError::connection)
}

/// Map Diesel errors; `username` names the login a unique violation hit.
fn map_diesel_error(error: diesel::result::Error, username: &str) -> LoginRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => LoginRepositoryError::connection(message),
        DieselFailure::Query(message) => LoginRepositoryError::query(message),
        DieselFailure::UniqueViolation(_) => LoginRepositoryError::duplicate_username(username),
    }
}

fn row_to_login(row: LoginRow) -> Result<Login, LoginRepositoryError> {
    let rollen = split_rollen(&row.rollen)
        .map_err(|err| LoginRepositoryError::query(format!("invalid stored rollen: {err}")))?;
    Ok(Login {
        id: row.id,
        username: row.username,
        password_hash: row.password,
        rollen,
    })
}

#[async_trait]
impl LoginRepository for DieselLoginRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Login>, LoginRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        login::table
            .filter(login::username.eq(username))
            .select(LoginRow::as_select())
            .first::<LoginRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, username))?
            .map(row_to_login)
            .transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(exists(login::table.filter(login::username.eq(username))))
            .get_result::<bool>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, username))
    }

    async fn save(&self, record: &Login) -> Result<(), LoginRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewLoginRow {
            id: record.id,
            username: &record.username,
            password: &record.password_hash,
            rollen: join_rollen(&record.rollen),
        };
        diesel::insert_into(login::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, &record.username))
    }

    async fn delete_by_username(&self, username: &str) -> Result<bool, LoginRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(login::table.filter(login::username.eq(username)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, username))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rolle;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    fn stored_roles_are_parsed() {
        let login = row_to_login(LoginRow {
            id: Uuid::new_v4(),
            username: "admin".to_owned(),
            password: "$2b$hash".to_owned(),
            rollen: "ADMIN,KUNDE,ACTUATOR".to_owned(),
        })
        .expect("valid row");
        assert_eq!(login.rollen, vec![Rolle::Admin, Rolle::Kunde, Rolle::Actuator]);
    }

    #[rstest]
    fn unknown_stored_role_is_a_query_error() {
        let err = row_to_login(LoginRow {
            id: Uuid::new_v4(),
            username: "x".to_owned(),
            password: "h".to_owned(),
            rollen: "KAISER".to_owned(),
        })
        .expect_err("unknown role");
        assert!(matches!(err, LoginRepositoryError::Query { .. }));
    }
}
