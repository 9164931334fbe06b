//! In-memory [`UsersRepo`] used as a test double and by `AppState::fake`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repo::{invalid_credentials, no_users_with_status, user_not_found, UsersRepo};
use super::repo_types::{User, Users, STATUS_ACTIVE};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct MemoryUsersRepo {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl Inner {
    fn email_taken(&self, email: &str, except: i64) -> bool {
        self.rows.values().any(|u| u.email == email && u.id != except)
    }
}

impl MemoryUsersRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored row, password included.
    pub async fn stored(&self, id: i64) -> Option<User> {
        self.inner.read().await.rows.get(&id).cloned()
    }
}

/// Reads never return the password column, matching the SQL implementation.
fn without_password(u: &User) -> User {
    User {
        password: String::new(),
        ..u.clone()
    }
}

fn duplicate_email() -> AppError {
    AppError::InvalidArgument("email already exists".into())
}

#[async_trait]
impl UsersRepo for MemoryUsersRepo {
    async fn get(&self, id: i64) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .rows
            .get(&id)
            .map(without_password)
            .ok_or_else(|| user_not_found(id))
    }

    async fn find_by_status(&self, status: &str) -> AppResult<Users> {
        let inner = self.inner.read().await;
        let users: Users = inner
            .rows
            .values()
            .filter(|u| u.status == status)
            .map(without_password)
            .collect();
        if users.is_empty() {
            return Err(no_users_with_status(status));
        }
        Ok(users)
    }

    async fn find_by_credentials(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let inner = self.inner.read().await;
        inner
            .rows
            .values()
            .find(|u| u.email == email && u.password == password_hash && u.status == STATUS_ACTIVE)
            .map(without_password)
            .ok_or_else(invalid_credentials)
    }

    async fn save(&self, user: &mut User) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&user.email, 0) {
            return Err(duplicate_email());
        }
        inner.last_id += 1;
        user.id = inner.last_id;
        inner.rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.email_taken(&user.email, user.id) {
            return Err(duplicate_email());
        }
        // Like an UPDATE matching no rows: nothing happens.
        if let Some(row) = inner.rows.get_mut(&user.id) {
            row.first_name = user.first_name.clone();
            row.last_name = user.last_name.clone();
            row.email = user.email.clone();
        }
        Ok(())
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        self.inner.write().await.rows.remove(&user.id);
        Ok(())
    }
}
