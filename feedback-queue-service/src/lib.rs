//! Storage backends and review orchestration for the rule feedback queue.

pub mod config;
pub mod error;
pub mod repository;
pub mod service;
pub mod validator;

pub use config::Config;
pub use error::QueueError;
pub use repository::{
    FeedbackRepository, InMemoryRepository, RepositoryError, SqliteRepository, UpdateOutcome,
};
pub use service::ReviewService;
pub use validator::TransitionValidator;
