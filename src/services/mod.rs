pub mod access;
pub mod diary;
pub mod identity;
pub mod training;

pub use access::{authorize, require_role};
pub use diary::DiaryManager;
pub use identity::IdentityProvider;
pub use training::TrainingManager;
