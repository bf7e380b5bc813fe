use axum::{extract::State, Json};

use crate::error::{AppError, Result};
use crate::extract::ApiPath;
use crate::models::Exercise;
use crate::repositories::ExerciseRepository;

#[derive(Clone)]
pub struct ExercisesState {
    pub exercise_repo: ExerciseRepository,
}

pub async fn list(State(state): State<ExercisesState>) -> Result<Json<Vec<Exercise>>> {
    Ok(Json(state.exercise_repo.find_all().await?))
}

pub async fn show(
    State(state): State<ExercisesState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Exercise>> {
    let exercise = state
        .exercise_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))?;
    Ok(Json(exercise))
}
