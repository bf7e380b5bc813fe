use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::auth::BearerToken;
use crate::models::{LoginCredentials, RegisterUser, TokenResponse, UserOut};
use crate::services::IdentityProvider;

#[derive(Clone)]
pub struct AuthState {
    pub identity: IdentityProvider,
}

pub async fn register(
    State(state): State<AuthState>,
    ApiJson(payload): ApiJson<RegisterUser>,
) -> Result<impl IntoResponse> {
    let user = state.identity.register(payload).await?;
    Ok((StatusCode::CREATED, Json(UserOut::from(user))))
}

pub async fn login(
    State(state): State<AuthState>,
    ApiJson(credentials): ApiJson<LoginCredentials>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .identity
        .verify_credentials(&credentials.email, &credentials.password)
        .await?;
    let token = state.identity.issue_token(user.id).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn logout(
    State(state): State<AuthState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode> {
    state.identity.revoke_token(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
