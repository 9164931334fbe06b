use sqlx::FromRow;

use crate::errors::{AppError, AppResult};

pub const STATUS_ACTIVE: &str = "active";

/// User record in the database.
///
/// Deliberately not `Serialize`: responses go through [`super::dto::UserView`],
/// so the password column has no path to the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64, // 0 until persisted
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: String,
    pub status: String,
    #[sqlx(default)]
    pub password: String, // argon2 PHC string once hashed; reads never select it
}

pub type Users = Vec<User>;

impl User {
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Normalizes the entity in place, then checks required fields.
    /// Stops at the first violation.
    pub fn validate(&mut self) -> AppResult<()> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.password = self.password.trim().to_string();

        if self.first_name.is_empty() {
            return Err(AppError::InvalidArgument("firstname is required".into()));
        }
        if self.last_name.is_empty() {
            return Err(AppError::InvalidArgument("lastname is required".into()));
        }
        if self.email.is_empty() {
            return Err(AppError::InvalidArgument("invalid email address".into()));
        }
        if self.password.is_empty() {
            return Err(AppError::InvalidArgument("invalid password".into()));
        }
        Ok(())
    }
}
