use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors surfaced while building a pool or starting a session.
///
/// Nothing in here is raised mid-session: once a session is running, every
/// submission is judged and bad input simply becomes an incorrect verdict.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot start a session with an empty prompt pool")]
    EmptyPool,

    #[error("prompt {key:?} has no accepted answers")]
    NoAcceptedAnswers { key: String },

    #[error("unknown group: {0}")]
    UnknownGroup(String),

    #[error("failed to load dataset {name}: {message}")]
    Dataset { name: String, message: String },
}
