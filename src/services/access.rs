use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::UserRole;

/// Role gate applied before any mutation.
pub fn authorize(user_role: UserRole, required_role: UserRole) -> bool {
    match (user_role, required_role) {
        (UserRole::Client, UserRole::Client) | (UserRole::Trainer, UserRole::Trainer) => true,
        (UserRole::Client, UserRole::Trainer) | (UserRole::Trainer, UserRole::Client) => false,
    }
}

/// Fails with Forbidden unless `user` holds `required_role`.
pub fn require_role(user: &AuthUser, required_role: UserRole, action: &str) -> Result<()> {
    if authorize(user.role, required_role) {
        return Ok(());
    }
    tracing::warn!(
        user_id = user.id,
        role = user.role.as_str(),
        required = required_role.as_str(),
        "Role check failed: {}",
        action
    );
    Err(AppError::Forbidden(format!(
        "Only a {} can {}",
        required_role.as_str(),
        action
    )))
}
