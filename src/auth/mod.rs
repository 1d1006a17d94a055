use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use std::sync::Arc;

use crate::{
    domain::User,
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Hash a password using Argon2. Used in tests and user creation.
    #[allow(dead_code)]
    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Resolve a bearer value to an admin account.
    ///
    /// The bearer is the caller's plaintext email address, not a signed
    /// credential: whoever sends an admin's email passes. The check fails
    /// closed, so an unknown email or a non-admin role both come back as
    /// `None` and repository failures propagate as 500s.
    pub async fn authenticate_admin(&self, bearer: &str) -> Result<Option<User>> {
        self.user_repo.find_admin_by_email(bearer).await
    }
}
