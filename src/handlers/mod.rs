pub mod auth;
pub mod diary;
pub mod exercises;
pub mod health;
pub mod trainings;
pub mod users;
