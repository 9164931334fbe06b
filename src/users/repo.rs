use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::repo_types::{User, Users, STATUS_ACTIVE};
use crate::db::translate;
use crate::errors::{AppError, AppResult};

const QUERY_INSERT_USER: &str = r#"
    INSERT INTO users (first_name, last_name, email, created_at, password, status)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;
const QUERY_GET_USER: &str = r#"
    SELECT id, first_name, last_name, email, created_at, status
    FROM users
    WHERE id = $1
"#;
const QUERY_UPDATE_USER: &str = r#"
    UPDATE users SET first_name = $1, last_name = $2, email = $3
    WHERE id = $4
"#;
const QUERY_DELETE_USER: &str = "DELETE FROM users WHERE id = $1";
const QUERY_FIND_BY_STATUS: &str = r#"
    SELECT id, first_name, last_name, email, created_at, status
    FROM users
    WHERE status = $1
"#;
const QUERY_FIND_BY_CREDENTIALS: &str = r#"
    SELECT id, first_name, last_name, email, created_at, status
    FROM users
    WHERE email = $1 AND password = $2 AND status = $3
"#;

/// Persistence port for users. Implementations only map rows to fields;
/// business rules live in the service.
#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn get(&self, id: i64) -> AppResult<User>;
    async fn find_by_status(&self, status: &str) -> AppResult<Users>;
    /// Only matches `active` users.
    async fn find_by_credentials(&self, email: &str, password_hash: &str) -> AppResult<User>;
    /// Inserts `user` and writes the generated id back onto it.
    async fn save(&self, user: &mut User) -> AppResult<()>;
    /// Persists first name, last name and email; nothing else.
    async fn update(&self, user: &User) -> AppResult<()>;
    async fn delete(&self, user: &User) -> AppResult<()>;
}

pub(crate) fn user_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("user {id} not found"))
}

pub(crate) fn no_users_with_status(status: &str) -> AppError {
    AppError::NotFound(format!("no users matching status {status}"))
}

pub(crate) fn invalid_credentials() -> AppError {
    AppError::NotFound("invalid user credentials".into())
}

/// Postgres-backed repository. Every call borrows one pooled connection for
/// the duration of a single statement.
#[derive(Clone)]
pub struct PgUsersRepo {
    db: PgPool,
}

impl PgUsersRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepo for PgUsersRepo {
    async fn get(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(QUERY_GET_USER)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(translate)?
            .ok_or_else(|| {
                debug!(user_id = id, "user not found");
                user_not_found(id)
            })
    }

    async fn find_by_status(&self, status: &str) -> AppResult<Users> {
        let users = sqlx::query_as::<_, User>(QUERY_FIND_BY_STATUS)
            .bind(status)
            .fetch_all(&self.db)
            .await
            .map_err(translate)?;
        if users.is_empty() {
            return Err(no_users_with_status(status));
        }
        Ok(users)
    }

    async fn find_by_credentials(&self, email: &str, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(QUERY_FIND_BY_CREDENTIALS)
            .bind(email)
            .bind(password_hash)
            .bind(STATUS_ACTIVE)
            .fetch_optional(&self.db)
            .await
            .map_err(translate)?
            .ok_or_else(invalid_credentials)
    }

    async fn save(&self, user: &mut User) -> AppResult<()> {
        let id = sqlx::query_scalar::<_, i64>(QUERY_INSERT_USER)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.created_at)
            .bind(&user.password)
            .bind(&user.status)
            .fetch_one(&self.db)
            .await
            .map_err(translate)?;
        user.id = id;
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        sqlx::query(QUERY_UPDATE_USER)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(user.id)
            .execute(&self.db)
            .await
            .map_err(translate)?;
        Ok(())
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        sqlx::query(QUERY_DELETE_USER)
            .bind(user.id)
            .execute(&self.db)
            .await
            .map_err(translate)?;
        Ok(())
    }
}
