pub mod question;
pub mod quiz;

pub use question::{DataContractError, Question, QuestionType, RawQuestion, RawQuestionType};
pub use quiz::{
    AbandonResponse, AnswerResult, NextQuestion, QuestionEnvelope, QuizComplete, ReviewEntry,
    SessionState, SessionUpdate, StartQuizResponse, SubmitAnswerRequest, SubmitAnswerResponse,
    SubmittedAnswer, TerminalOutcome,
};
