use axum::{extract::FromRequestParts, http::request::Parts, Extension};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{User, UserOut, UserRole};
use crate::services::IdentityProvider;

/// The authenticated principal, resolved from `Authorization: Bearer <token>`.
///
/// Every diary and training operation takes this value explicitly.
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            second_name: user.second_name,
            email: user.email,
            role: user.role,
        }
    }
}

impl From<AuthUser> for UserOut {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            second_name: user.second_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Raw bearer token of the current request.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Not authenticated".to_string()))?;
        Ok(BearerToken(bearer.token().to_string()))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let Extension(identity) =
            Extension::<IdentityProvider>::from_request_parts(parts, state)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;

        identity.authenticate(&token).await
    }
}
