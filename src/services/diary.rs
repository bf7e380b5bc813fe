use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{diary::DEFAULT_DIARY_NAME, Diary, UserRole};
use crate::repositories::DiaryRepository;

use super::access::require_role;

/// Pairing rules: one diary per trainer, at most one client per diary,
/// at most one diary per client.
#[derive(Clone)]
pub struct DiaryManager {
    diary_repo: DiaryRepository,
}

impl DiaryManager {
    pub fn new(diary_repo: DiaryRepository) -> Self {
        Self { diary_repo }
    }

    pub async fn get_my_diary(&self, user: &AuthUser) -> Result<Diary> {
        let diary = match user.role {
            UserRole::Trainer => self.diary_repo.find_by_trainer(user.id).await?,
            UserRole::Client => self.diary_repo.find_by_client(user.id).await?,
        };
        diary.ok_or_else(|| AppError::NotFound("Diary not found".to_string()))
    }

    pub async fn create_diary(&self, user: &AuthUser) -> Result<Diary> {
        require_role(user, UserRole::Trainer, "create a diary")?;

        if self.diary_repo.find_by_trainer(user.id).await?.is_some() {
            return Err(AppError::Conflict("You already have a diary".to_string()));
        }

        let diary = self.diary_repo.create(user.id, DEFAULT_DIARY_NAME).await?;
        tracing::info!(diary_id = diary.id, trainer_id = user.id, "Diary created");
        Ok(diary)
    }

    pub async fn join_diary(&self, user: &AuthUser, diary_id: i64) -> Result<Diary> {
        require_role(user, UserRole::Client, "join a diary")?;

        if self.diary_repo.find_by_client(user.id).await?.is_some() {
            return Err(AppError::Conflict("You already belong to a diary".to_string()));
        }

        let diary = self
            .diary_repo
            .find_by_id(diary_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Diary not found".to_string()))?;
        if diary.client_id.is_some() {
            return Err(AppError::Conflict("Diary already has a client".to_string()));
        }

        let diary = self
            .diary_repo
            .set_client(diary_id, user.id)
            .await?
            .ok_or_else(|| AppError::Conflict("Diary already has a client".to_string()))?;
        tracing::info!(diary_id = diary.id, client_id = user.id, "Client joined diary");
        Ok(diary)
    }

    pub async fn delete_diary(&self, user: &AuthUser) -> Result<()> {
        require_role(user, UserRole::Trainer, "delete a diary")?;

        let diary = self.get_my_diary(user).await?;
        if !self.diary_repo.delete(diary.id).await? {
            return Err(AppError::NotFound("Diary not found".to_string()));
        }
        tracing::info!(diary_id = diary.id, trainer_id = user.id, "Diary deleted");
        Ok(())
    }
}
