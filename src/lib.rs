//! Terminal client for timed Ficous exercise quizzes.

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod timer;

pub use api::{ExerciseApi, FicousClient};
pub use controller::{LoadState, QuizController};
pub use error::{AnswerError, ApiError, QuizError};
pub use session::{Phase, QuizSession, TOTAL_TIME};
