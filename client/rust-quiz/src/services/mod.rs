pub mod backend;
pub mod hangman;
pub mod http_backend;
pub mod quiz_session;

pub use backend::{BackendError, QuizBackend};
pub use hangman::{GameStatus, GuessResult, HangmanGame, MAX_WRONG_GUESSES};
pub use http_backend::HttpQuizBackend;
pub use quiz_session::{
    Operation, QuizAttempt, QuizSessionMachine, SessionError, SessionPhase, SessionSnapshot,
    SubmitOutcome,
};
