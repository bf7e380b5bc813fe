use std::collections::BTreeSet;

use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{CreateTraining, Diary, Training, TrainingDetail, UserRole};
use crate::repositories::{ExerciseRepository, TrainingRepository};

use super::access::require_role;
use super::diary::DiaryManager;

/// Scheduling and the `Scheduled -> InProgress -> Finished` lifecycle.
///
/// Trainers create and delete trainings in their own diary; the diary's
/// client starts and finishes them.
#[derive(Clone)]
pub struct TrainingManager {
    diaries: DiaryManager,
    training_repo: TrainingRepository,
    exercise_repo: ExerciseRepository,
}

impl TrainingManager {
    pub fn new(
        diaries: DiaryManager,
        training_repo: TrainingRepository,
        exercise_repo: ExerciseRepository,
    ) -> Self {
        Self {
            diaries,
            training_repo,
            exercise_repo,
        }
    }

    pub async fn list_trainings(
        &self,
        user: &AuthUser,
        date: Option<NaiveDate>,
    ) -> Result<Vec<TrainingDetail>> {
        let diary = self.diaries.get_my_diary(user).await?;
        self.training_repo.find_by_diary(diary.id, date).await
    }

    pub async fn create_training(
        &self,
        user: &AuthUser,
        payload: &CreateTraining,
    ) -> Result<TrainingDetail> {
        require_role(user, UserRole::Trainer, "create trainings")?;
        payload.validate()?;

        let diary = self.diaries.get_my_diary(user).await?;
        if payload.diary_id != diary.id {
            return Err(AppError::Forbidden(
                "Cannot create a training in another diary".to_string(),
            ));
        }

        let mut requested = BTreeSet::new();
        for exercise in &payload.exercises {
            if !requested.insert(exercise.exercise_id) {
                return Err(AppError::Conflict(format!(
                    "Exercise {} appears more than once",
                    exercise.exercise_id
                )));
            }
        }

        let requested: Vec<i64> = requested.into_iter().collect();
        let found = self.exercise_repo.find_existing_ids(&requested).await?;
        let missing: Vec<String> = requested
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!(
                "Exercises not found: {}",
                missing.join(", ")
            )));
        }

        let detail = self
            .training_repo
            .create_with_exercises(
                diary.id,
                payload.resolved_name(),
                payload.date,
                &payload.exercises,
            )
            .await?;
        tracing::info!(
            training_id = detail.training.id,
            diary_id = diary.id,
            exercises = detail.exercises.len(),
            "Training created"
        );
        Ok(detail)
    }

    pub async fn start_training(&self, user: &AuthUser, training_id: i64) -> Result<TrainingDetail> {
        require_role(user, UserRole::Client, "start a training")?;

        let diary = self.diaries.get_my_diary(user).await?;
        let training = self.owned_training(&diary, training_id).await?;
        if training.start_at.is_some() {
            return Err(AppError::Conflict("Training already started".to_string()));
        }

        if !self.training_repo.mark_started(training.id, Utc::now()).await? {
            return Err(AppError::Conflict("Training already started".to_string()));
        }
        tracing::info!(training_id, client_id = user.id, "Training started");
        self.reload(training_id).await
    }

    pub async fn finish_training(
        &self,
        user: &AuthUser,
        training_id: i64,
    ) -> Result<TrainingDetail> {
        require_role(user, UserRole::Client, "finish a training")?;

        let diary = self.diaries.get_my_diary(user).await?;
        let training = self.owned_training(&diary, training_id).await?;
        let Some(start_at) = training.start_at else {
            return Err(AppError::Conflict("Training has not started yet".to_string()));
        };
        if training.end_at.is_some() {
            return Err(AppError::Conflict("Training already finished".to_string()));
        }

        // end_at never precedes start_at, even if the clock stepped back.
        let end_at = Utc::now().max(start_at);
        if !self.training_repo.mark_finished(training.id, end_at).await? {
            return Err(AppError::Conflict("Training already finished".to_string()));
        }
        tracing::info!(training_id, client_id = user.id, "Training finished");
        self.reload(training_id).await
    }

    pub async fn delete_training(&self, user: &AuthUser, training_id: i64) -> Result<()> {
        require_role(user, UserRole::Trainer, "delete trainings")?;

        let diary = self.diaries.get_my_diary(user).await?;
        let training = self.owned_training(&diary, training_id).await?;
        if !self.training_repo.delete(training.id).await? {
            return Err(AppError::NotFound("Training not found".to_string()));
        }
        tracing::info!(training_id, diary_id = diary.id, "Training deleted");
        Ok(())
    }

    async fn owned_training(&self, diary: &Diary, training_id: i64) -> Result<Training> {
        let training = self
            .training_repo
            .find_by_id(training_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Training not found".to_string()))?;
        if training.diary_id != diary.id {
            return Err(AppError::Forbidden("This is not your training".to_string()));
        }
        Ok(training)
    }

    async fn reload(&self, training_id: i64) -> Result<TrainingDetail> {
        self.training_repo
            .find_detail(training_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Training not found".to_string()))
    }
}
