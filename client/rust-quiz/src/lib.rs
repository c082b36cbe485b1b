pub mod config;
pub mod metrics;
pub mod models;
pub mod services;
pub mod terminal;

pub use config::Config;
pub use services::{HangmanGame, HttpQuizBackend, QuizBackend, QuizSessionMachine};
