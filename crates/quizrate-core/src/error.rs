//! Engine error types.
//!
//! Every failure the sampler, the rating engine or an attempt can report is a
//! variant of [`EngineError`]. Callers map errors to user-facing messages by
//! [`ErrorKind`] without string matching.

use thiserror::Error;

use crate::model::{QuestionId, QuestionType};

/// Errors that can occur while drawing questions or scoring an attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Bad inputs or configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The pool holds fewer questions than requested.
    #[error("insufficient questions: requested {requested}, pool has {available}")]
    InsufficientQuestions { requested: usize, available: usize },

    /// A question type tag outside the known set.
    #[error("unknown question type: '{0}'")]
    UnknownQuestionType(String),

    /// The answer payload does not fit the question's declared type.
    #[error("malformed answer for question {question_id} ({expected}): {reason}")]
    MalformedAnswer {
        question_id: QuestionId,
        expected: QuestionType,
        reason: String,
    },

    /// An answer refers to a question outside the answered set.
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// The same question id appears twice in a pool or question set.
    #[error("duplicate question: {0}")]
    DuplicateQuestion(QuestionId),

    /// The same question was answered twice within one attempt.
    #[error("question {0} already answered")]
    DuplicateAnswer(QuestionId),

    /// Scoring was requested on an attempt that is already finalized.
    #[error("attempt already finalized")]
    AttemptAlreadyFinalized,

    /// An answer arrived after the attempt was finalized.
    #[error("attempt is finalized, answer for question {0} rejected")]
    AnswerAfterFinalization(QuestionId),

    /// Finalization was requested before every question was answered.
    #[error("attempt incomplete: {missing} question(s) unanswered")]
    AttemptIncomplete { missing: usize },
}

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any work starts; fix the inputs.
    Configuration,
    /// The data handed to the engine is inconsistent.
    Data,
    /// The caller drove an attempt through an invalid transition.
    State,
}

impl EngineError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidConfiguration(_) => ErrorKind::Configuration,
            EngineError::InsufficientQuestions { .. }
            | EngineError::UnknownQuestionType(_)
            | EngineError::MalformedAnswer { .. }
            | EngineError::UnknownQuestion(_)
            | EngineError::DuplicateQuestion(_)
            | EngineError::DuplicateAnswer(_) => ErrorKind::Data,
            EngineError::AttemptAlreadyFinalized
            | EngineError::AnswerAfterFinalization(_)
            | EngineError::AttemptIncomplete { .. } => ErrorKind::State,
        }
    }

    /// Returns `true` if this error can only come from a caller bug.
    pub fn is_caller_bug(&self) -> bool {
        self.kind() == ErrorKind::State
    }
}
