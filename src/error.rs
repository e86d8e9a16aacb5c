use thiserror::Error;

use crate::models::question::{OptionKey, Topic};

/// Failures of the quiz engine, as reported to callers.
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("No questions available for this selection")]
    NoQuestionsAvailable,

    #[error("A quiz session is already in progress")]
    SessionAlreadyActive,

    #[error("Invalid answer option: {0:?} (expected A, B, C or D)")]
    InvalidAnswerOption(String),

    #[error("An answer was already recorded for this question")]
    AnswerAlreadyRecorded,

    #[error("Question count must be at least 1")]
    InvalidQuestionCount,

    #[error("No quiz session is in progress")]
    NoActiveSession,

    #[error("The current question has not been answered yet")]
    AnswerNotRecorded,

    #[error("Question repository unavailable: {0}")]
    RepositoryUnavailable(#[source] StoreError),

    #[error("Progress store unavailable: {0}")]
    ProgressUnavailable(#[source] StoreError),
}

/// Failures of the persistence collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed question pack: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid question: {0}")]
    InvalidQuestion(#[from] QuestionError),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuestionError {
    #[error("Question text is empty")]
    EmptyText,

    #[error("Option {0} is empty")]
    EmptyOption(OptionKey),

    #[error("Subtopic {subtopic:?} is not part of {topic}")]
    UnknownSubtopic { topic: Topic, subtopic: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Startup failures of the server binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Logger setup failed: {0}")]
    Logger(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Usage: {0}")]
    Usage(String),
}
