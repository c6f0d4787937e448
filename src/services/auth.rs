//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::enums::Role,
    models::user::{User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by login email and return a JWT token with the user
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        // A missing account and a wrong password answer identically
        let user = match self.repository.users.get_by_email(email).await {
            Ok(user) => user,
            Err(AppError::NotFound(_)) => {
                return Err(AppError::Authentication(
                    "Invalid email or password".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token_for(&user).await?;
        Ok((token, user))
    }

    /// Build claims from the user and their grade and sign them
    pub async fn create_token_for(&self, user: &User) -> AppResult<String> {
        let grade = self.repository.grades.get_by_id(user.grade_id).await?;
        let is_approver =
            grade.is_approver || matches!(user.role, Role::Approver | Role::Admin);

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            grade_level: grade.level,
            is_approver,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Current user profile
    pub async fn me(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against the stored hash. Accounts without a password
/// cannot log in.
pub fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    if let Some(ref stored) = user.password {
        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        return Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok());
    }
    Ok(false)
}
