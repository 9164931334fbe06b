use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use tracing::error;

use crate::errors::{AppError, AppResult};

const MIN_SALT_BYTES: usize = 8;
const MAX_SALT_BYTES: usize = 48;

/// One-way credential hash with a fixed, configured salt.
///
/// Login looks users up by `(email, hash)`, so the same plaintext must always
/// produce the same string.
#[derive(Clone)]
pub struct CredentialHasher {
    salt: SaltString,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher").finish_non_exhaustive()
    }
}

impl CredentialHasher {
    pub fn new(salt: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (MIN_SALT_BYTES..=MAX_SALT_BYTES).contains(&salt.len()),
            "PASSWORD_SALT must be {MIN_SALT_BYTES}..={MAX_SALT_BYTES} bytes"
        );
        let salt = SaltString::encode_b64(salt.as_bytes())
            .map_err(|e| anyhow::anyhow!("PASSWORD_SALT: {e}"))?;
        Ok(Self { salt })
    }

    pub fn hash(&self, plain: &str) -> AppResult<String> {
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &self.salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AppError::Internal("error processing request".into())
            })?
            .to_string();
        Ok(hash)
    }
}
