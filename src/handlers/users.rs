use axum::Json;

use crate::middleware::AuthUser;
use crate::models::UserOut;

pub async fn me(auth_user: AuthUser) -> Json<UserOut> {
    Json(UserOut::from(auth_user))
}
