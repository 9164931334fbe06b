use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::dto::LoginRequest;
use super::password::CredentialHasher;
use super::repo::UsersRepo;
use super::repo_types::{User, Users, STATUS_ACTIVE};
use crate::dates;
use crate::errors::AppResult;

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn get_user(&self, id: i64) -> AppResult<User>;
    async fn search_user(&self, status: &str) -> AppResult<Users>;
    async fn login_user(&self, request: LoginRequest) -> AppResult<User>;
    async fn create_user(&self, user: User) -> AppResult<User>;
    async fn update_user(&self, is_partial: bool, user: User) -> AppResult<User>;
    async fn delete_user(&self, id: i64) -> AppResult<User>;
}

pub struct DefaultUsersService {
    repo: Arc<dyn UsersRepo>,
    hasher: CredentialHasher,
}

impl DefaultUsersService {
    pub fn new(repo: Arc<dyn UsersRepo>, hasher: CredentialHasher) -> Self {
        Self { repo, hasher }
    }
}

#[async_trait]
impl UsersService for DefaultUsersService {
    async fn get_user(&self, id: i64) -> AppResult<User> {
        self.repo.get(id).await
    }

    async fn search_user(&self, status: &str) -> AppResult<Users> {
        self.repo.find_by_status(status).await
    }

    async fn login_user(&self, request: LoginRequest) -> AppResult<User> {
        let email = request.email.trim().to_lowercase();
        let hash = self.hasher.hash(request.password.trim())?;
        self.repo.find_by_credentials(&email, &hash).await
    }

    async fn create_user(&self, mut user: User) -> AppResult<User> {
        user.validate()?;

        user.status = STATUS_ACTIVE.to_string();
        user.created_at = dates::now_db_format()?;
        user.password = self.hasher.hash(&user.password)?;

        self.repo.save(&mut user).await?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Fetch-then-write. Not atomic against a concurrent writer on the same row.
    async fn update_user(&self, is_partial: bool, mut user: User) -> AppResult<User> {
        let mut current = self.get_user(user.id).await?;

        if is_partial {
            if !user.first_name.is_empty() {
                current.first_name = user.first_name.clone();
            }
            if !user.last_name.is_empty() {
                current.last_name = user.last_name.clone();
            }
            // A rejected email keeps the stored one; the caller is not told.
            match user.validate() {
                Ok(()) => current.email = user.email,
                Err(e) => debug!(user_id = current.id, error = %e, "partial update keeps email"),
            }
        } else {
            current.first_name = user.first_name;
            current.last_name = user.last_name;
            current.email = user.email;
        }

        self.repo.update(&current).await?;
        info!(user_id = current.id, is_partial, "user updated");
        Ok(current)
    }

    async fn delete_user(&self, id: i64) -> AppResult<User> {
        let current = self.get_user(id).await?;
        self.repo.delete(&current).await?;
        info!(user_id = current.id, "user deleted");
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::users::memory::MemoryUsersRepo;

    fn service() -> (Arc<MemoryUsersRepo>, DefaultUsersService) {
        let repo = Arc::new(MemoryUsersRepo::new());
        let hasher = CredentialHasher::new("service-test-salt").unwrap();
        (repo.clone(), DefaultUsersService::new(repo, hasher))
    }

    fn new_user(first: &str, last: &str, email: &str, password: &str) -> User {
        User {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password: password.into(),
            ..User::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_server_fields_and_hashes_password() {
        let (repo, svc) = service();
        let created = svc
            .create_user(new_user(" A ", "X", " A@X.com ", "s3cret"))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.status, STATUS_ACTIVE);
        assert_eq!(created.email, "a@x.com");
        assert!(!created.created_at.is_empty());

        let stored = repo.stored(created.id).await.unwrap();
        assert_ne!(stored.password, "s3cret");
        let hasher = CredentialHasher::new("service-test-salt").unwrap();
        assert_eq!(stored.password, hasher.hash("s3cret").unwrap());
    }

    #[tokio::test]
    async fn create_ignores_client_status_and_timestamp() {
        let (_, svc) = service();
        let input = User {
            status: "admin".into(),
            created_at: "1970-01-01 00:00:00".into(),
            ..new_user("A", "X", "a@x.com", "pw")
        };
        let created = svc.create_user(input).await.unwrap();
        assert_eq!(created.status, STATUS_ACTIVE);
        assert_ne!(created.created_at, "1970-01-01 00:00:00");
    }

    #[tokio::test]
    async fn create_rejects_invalid_and_persists_nothing() {
        let (repo, svc) = service();
        let err = svc.create_user(new_user("", "X", "a@x.com", "pw")).await.unwrap_err();
        assert_eq!(err, AppError::InvalidArgument("firstname is required".into()));
        assert!(repo.stored(1).await.is_none());
    }

    #[tokio::test]
    async fn create_accepts_email_without_domain() {
        let (_, svc) = service();
        let created = svc.create_user(new_user("A", "X", "Bob", "pw")).await.unwrap();
        assert_eq!(created.email, "bob");
    }

    #[tokio::test]
    async fn create_duplicate_email_is_invalid_argument() {
        let (_, svc) = service();
        svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();
        let err = svc
            .create_user(new_user("B", "Y", "A@x.com", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let (_, svc) = service();
        assert_eq!(
            svc.get_user(42).await.unwrap_err(),
            AppError::NotFound("user 42 not found".into())
        );
    }

    #[tokio::test]
    async fn partial_update_ignores_blanks_and_bad_email() {
        let (repo, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let patch = User {
            id: existing.id,
            ..new_user("", "B", "bad", "")
        };
        let merged = svc.update_user(true, patch).await.unwrap();

        assert_eq!(merged.first_name, "A");
        assert_eq!(merged.last_name, "B");
        assert_eq!(merged.email, "a@x.com");

        let stored = repo.stored(existing.id).await.unwrap();
        assert_eq!(
            (stored.first_name.as_str(), stored.last_name.as_str(), stored.email.as_str()),
            ("A", "B", "a@x.com")
        );
    }

    #[tokio::test]
    async fn partial_update_applies_email_when_incoming_entity_validates() {
        let (_, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let patch = User {
            id: existing.id,
            ..new_user("A", "X", " NEW@x.com ", "pw")
        };
        let merged = svc.update_user(true, patch).await.unwrap();
        assert_eq!(merged.email, "new@x.com");
    }

    #[tokio::test]
    async fn partial_update_accepts_any_non_blank_email() {
        let (repo, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let patch = User {
            id: existing.id,
            ..new_user("A", "X", "newmail", "pw")
        };
        let merged = svc.update_user(true, patch).await.unwrap();
        assert_eq!(merged.email, "newmail");
        assert_eq!(repo.stored(existing.id).await.unwrap().email, "newmail");
    }

    #[tokio::test]
    async fn full_update_overwrites_even_with_blanks() {
        let (repo, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let put = User {
            id: existing.id,
            ..new_user("", "B", "bad", "")
        };
        let merged = svc.update_user(false, put).await.unwrap();

        assert_eq!(merged.first_name, "");
        assert_eq!(merged.last_name, "B");
        assert_eq!(merged.email, "bad");
        assert_eq!(merged.status, STATUS_ACTIVE);
        assert_eq!(merged.created_at, existing.created_at);
        assert_eq!(repo.stored(existing.id).await.unwrap().first_name, "");
    }

    #[tokio::test]
    async fn update_of_missing_user_fails_fast() {
        let (_, svc) = service();
        let err = svc
            .update_user(false, User { id: 9, ..new_user("A", "B", "a@x.com", "pw") })
            .await
            .unwrap_err();
        assert_eq!(err, AppError::NotFound("user 9 not found".into()));
    }

    #[tokio::test]
    async fn update_keeps_password_and_status() {
        let (repo, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();
        let before = repo.stored(existing.id).await.unwrap().password;

        svc.update_user(false, User { id: existing.id, ..new_user("C", "D", "c@x.com", "other") })
            .await
            .unwrap();

        let row = repo.stored(existing.id).await.unwrap();
        assert_eq!(row.password, before);
        assert_eq!(row.status, STATUS_ACTIVE);
    }

    #[tokio::test]
    async fn delete_returns_removed_user_and_is_terminal() {
        let (_, svc) = service();
        let existing = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let deleted = svc.delete_user(existing.id).await.unwrap();
        assert_eq!(deleted.email, "a@x.com");
        assert!(matches!(svc.get_user(existing.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete_user(existing.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn search_with_no_matches_is_not_found() {
        let (_, svc) = service();
        svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let err = svc.search_user("bogus-status").await.unwrap_err();
        assert_eq!(err, AppError::NotFound("no users matching status bogus-status".into()));
        assert_eq!(svc.search_user("active").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn login_matches_hashed_credentials() {
        let (_, svc) = service();
        let created = svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let user = svc
            .login_user(LoginRequest { email: " A@X.COM".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(user.id, created.id);
        assert!(user.password.is_empty());
    }

    #[tokio::test]
    async fn login_trims_password_like_registration() {
        let (_, svc) = service();
        let created = svc.create_user(new_user("A", "X", "a@x.com", " pw ")).await.unwrap();

        let user = svc
            .login_user(LoginRequest { email: "a@x.com".into(), password: " pw ".into() })
            .await
            .unwrap();
        assert_eq!(user.id, created.id);

        let user = svc
            .login_user(LoginRequest { email: "a@x.com".into(), password: "pw".into() })
            .await
            .unwrap();
        assert_eq!(user.id, created.id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let (_, svc) = service();
        svc.create_user(new_user("A", "X", "a@x.com", "pw")).await.unwrap();

        let wrong_password = svc
            .login_user(LoginRequest { email: "a@x.com".into(), password: "nope".into() })
            .await
            .unwrap_err();
        let unknown_email = svc
            .login_user(LoginRequest { email: "ghost@x.com".into(), password: "pw".into() })
            .await
            .unwrap_err();

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(unknown_email, AppError::NotFound("invalid user credentials".into()));
    }
}
