use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::AuthUser;
use crate::models::{Diary, JoinDiary};
use crate::services::DiaryManager;

#[derive(Clone)]
pub struct DiaryState {
    pub diaries: DiaryManager,
}

pub async fn show(State(state): State<DiaryState>, auth_user: AuthUser) -> Result<Json<Diary>> {
    Ok(Json(state.diaries.get_my_diary(&auth_user).await?))
}

pub async fn create(
    State(state): State<DiaryState>,
    auth_user: AuthUser,
) -> Result<impl IntoResponse> {
    let diary = state.diaries.create_diary(&auth_user).await?;
    Ok((StatusCode::CREATED, Json(diary)))
}

pub async fn join(
    State(state): State<DiaryState>,
    auth_user: AuthUser,
    ApiJson(payload): ApiJson<JoinDiary>,
) -> Result<Json<Diary>> {
    Ok(Json(
        state
            .diaries
            .join_diary(&auth_user, payload.diary_id)
            .await?,
    ))
}

pub async fn delete(State(state): State<DiaryState>, auth_user: AuthUser) -> Result<StatusCode> {
    state.diaries.delete_diary(&auth_user).await?;
    Ok(StatusCode::NO_CONTENT)
}
