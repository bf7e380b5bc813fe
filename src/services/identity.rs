use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{RegisterUser, User};
use crate::repositories::{TokenRepository, UserRepository};

/// Credential checks and opaque bearer tokens.
#[derive(Clone)]
pub struct IdentityProvider {
    user_repo: UserRepository,
    token_repo: TokenRepository,
}

impl IdentityProvider {
    pub fn new(user_repo: UserRepository, token_repo: TokenRepository) -> Self {
        Self {
            user_repo,
            token_repo,
        }
    }

    pub async fn register(&self, input: RegisterUser) -> Result<User> {
        input.validate()?;
        let user = self.user_repo.create(&input).await?;
        tracing::info!(user_id = user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        match self.user_repo.verify_password(email, password).await? {
            Some(user) => Ok(user),
            None => {
                tracing::warn!("Failed login attempt");
                Err(AppError::Unauthorized(
                    "Incorrect email or password".to_string(),
                ))
            }
        }
    }

    pub async fn issue_token(&self, user_id: i64) -> Result<String> {
        self.token_repo.create(user_id).await
    }

    pub async fn resolve_token(&self, token: &str) -> Result<i64> {
        self.token_repo
            .find_valid(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
    }

    /// Token to principal. A token whose user no longer exists is rejected.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser> {
        let user_id = self.resolve_token(token).await?;
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
        Ok(AuthUser::from(user))
    }

    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        self.token_repo.delete(token).await
    }

    pub async fn purge_expired(&self) -> Result<usize> {
        self.token_repo.cleanup_expired().await
    }
}
