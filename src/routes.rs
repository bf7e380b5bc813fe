use axum::{
    routing::{delete, get, patch, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::DbPool;
use crate::handlers::{auth, diary, exercises, health, trainings, users};
use crate::repositories::{
    DiaryRepository, ExerciseRepository, TokenRepository, TrainingRepository, UserRepository,
};
use crate::services::{DiaryManager, IdentityProvider, TrainingManager};

/// Wires repositories and managers over `pool` and returns the full router.
pub fn create_app(pool: DbPool, token_lifetime_days: i64) -> Router {
    let user_repo = UserRepository::new(pool.clone());
    let token_repo = TokenRepository::new(pool.clone(), token_lifetime_days);
    let diary_repo = DiaryRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let training_repo = TrainingRepository::new(pool);

    let identity = IdentityProvider::new(user_repo, token_repo);
    let diaries = DiaryManager::new(diary_repo);
    let training_manager =
        TrainingManager::new(diaries.clone(), training_repo, exercise_repo.clone());

    create_router(
        auth::AuthState {
            identity: identity.clone(),
        },
        diary::DiaryState { diaries },
        trainings::TrainingsState {
            trainings: training_manager,
        },
        exercises::ExercisesState { exercise_repo },
        identity,
    )
}

pub fn create_router(
    auth_state: auth::AuthState,
    diary_state: diary::DiaryState,
    trainings_state: trainings::TrainingsState,
    exercises_state: exercises::ExercisesState,
    identity: IdentityProvider,
) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/users/me", get(users::me))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .with_state(auth_state)
        // Diary routes
        .route(
            "/diary",
            get(diary::show).post(diary::create).delete(diary::delete),
        )
        .route("/diary/join", post(diary::join))
        .with_state(diary_state)
        // Training routes
        .route("/trainings", get(trainings::list).post(trainings::create))
        .route("/trainings/{id}", delete(trainings::delete))
        .route("/trainings/{id}/start", patch(trainings::start))
        .route("/trainings/{id}/finish", patch(trainings::finish))
        .with_state(trainings_state)
        // Exercise catalog
        .route("/exercises", get(exercises::list))
        .route("/exercises/{id}", get(exercises::show))
        .with_state(exercises_state)
        // Token resolution for the AuthUser extractor
        .layer(Extension(identity))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
