use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// Request body for create/update. Missing fields read as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl UserPayload {
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            ..User::default()
        }
    }
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub status: Option<String>,
}

/// What anyone may see: no name, no email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub created_at: String,
    pub status: String,
}

/// What the user themselves (or a trusted internal caller) sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserView {
    Public(PublicUser),
    Private(PrivateUser),
}

impl User {
    pub fn marshal(&self, is_public: bool) -> UserView {
        if is_public {
            UserView::Public(PublicUser {
                id: self.id,
                created_at: self.created_at.clone(),
                status: self.status.clone(),
            })
        } else {
            UserView::Private(PrivateUser {
                id: self.id,
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                email: self.email.clone(),
                created_at: self.created_at.clone(),
                status: self.status.clone(),
            })
        }
    }
}

pub fn marshal_all(users: &[User], is_public: bool) -> Vec<UserView> {
    users.iter().map(|u| u.marshal(is_public)).collect()
}
