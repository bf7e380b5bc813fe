pub mod diary;
pub mod exercise;
pub mod training;
pub mod user;

use rusqlite::Row;

pub use diary::{Diary, JoinDiary};
pub use exercise::Exercise;
pub use training::{
    CreateTraining, CreateTrainingExercise, Training, TrainingDetail, TrainingExercise,
    TrainingStatus,
};
pub use user::{LoginCredentials, RegisterUser, TokenResponse, User, UserOut, UserRole};

/// Decodes a model from a row selected with named columns.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}
