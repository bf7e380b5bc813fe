use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AuthUser;
use crate::models::{CreateTraining, TrainingDetail};
use crate::services::TrainingManager;

#[derive(Clone)]
pub struct TrainingsState {
    pub trainings: TrainingManager,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(alias = "dt")]
    date: Option<NaiveDate>,
}

pub async fn list(
    State(state): State<TrainingsState>,
    auth_user: AuthUser,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<TrainingDetail>>> {
    Ok(Json(
        state
            .trainings
            .list_trainings(&auth_user, query.date)
            .await?,
    ))
}

pub async fn create(
    State(state): State<TrainingsState>,
    auth_user: AuthUser,
    ApiJson(payload): ApiJson<CreateTraining>,
) -> Result<impl IntoResponse> {
    let training = state.trainings.create_training(&auth_user, &payload).await?;
    Ok((StatusCode::CREATED, Json(training)))
}

pub async fn start(
    State(state): State<TrainingsState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<TrainingDetail>> {
    Ok(Json(state.trainings.start_training(&auth_user, id).await?))
}

pub async fn finish(
    State(state): State<TrainingsState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<TrainingDetail>> {
    Ok(Json(state.trainings.finish_training(&auth_user, id).await?))
}

pub async fn delete(
    State(state): State<TrainingsState>,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode> {
    state.trainings.delete_training(&auth_user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
