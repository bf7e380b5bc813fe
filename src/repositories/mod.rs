pub mod diary_repo;
pub mod exercise_repo;
pub mod token_repo;
pub mod training_repo;
pub mod user_repo;

pub use diary_repo::DiaryRepository;
pub use exercise_repo::ExerciseRepository;
pub use token_repo::TokenRepository;
pub use training_repo::TrainingRepository;
pub use user_repo::UserRepository;
