//! Core data model types for quizrate.
//!
//! Questions, candidate pools, exams and submitted answers. Ratings and the
//! catalog itself are owned by the caller; the engine only reads them.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Identifier of a question.
pub type QuestionId = u64;

/// Identifier of an answer option.
pub type OptionId = u64;

/// Skill rating of a student or difficulty rating of a question.
pub type Rating = i32;

/// Rating given to new students and questions.
pub const DEFAULT_RATING: Rating = 1500;

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    OpenEnded,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single_choice"),
            QuestionType::MultipleChoice => write!(f, "multiple_choice"),
            QuestionType::OpenEnded => write!(f, "open_ended"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "s" | "single_choice" => Ok(QuestionType::SingleChoice),
            "m" | "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "o" | "open_ended" => Ok(QuestionType::OpenEnded),
            _ => Err(EngineError::UnknownQuestionType(s.to_string())),
        }
    }
}

impl TryFrom<String> for QuestionType {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One selectable answer of a choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// A question together with its current difficulty rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub text: String,
    /// Difficulty; higher is harder.
    #[serde(default = "default_rating")]
    pub rating: Rating,
    /// Options in presentation order. Empty for open-ended questions.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
}

fn default_rating() -> Rating {
    DEFAULT_RATING
}

impl Question {
    /// Creates a question without options at the default rating.
    pub fn new(id: QuestionId, question_type: QuestionType) -> Self {
        Self {
            id,
            question_type,
            text: String::new(),
            rating: DEFAULT_RATING,
            options: Vec::new(),
        }
    }

    /// Sets the difficulty rating.
    pub fn with_rating(mut self, rating: Rating) -> Self {
        self.rating = rating;
        self
    }

    /// Appends an option.
    pub fn with_option(mut self, id: OptionId, correct: bool) -> Self {
        self.options.push(AnswerOption {
            id,
            text: String::new(),
            correct,
        });
        self
    }

    /// Ids of the options flagged correct.
    pub fn correct_option_ids(&self) -> BTreeSet<OptionId> {
        self.options
            .iter()
            .filter(|o| o.correct)
            .map(|o| o.id)
            .collect()
    }

    /// The `(id, rating)` pair the sampler works on.
    pub fn pool_entry(&self) -> PoolEntry {
        PoolEntry {
            id: self.id,
            rating: self.rating,
        }
    }
}

/// A candidate for sampling: a question id and its rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: QuestionId,
    pub rating: Rating,
}

impl PoolEntry {
    pub fn new(id: QuestionId, rating: Rating) -> Self {
        Self { id, rating }
    }
}

/// An exam as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// How many questions one attempt draws.
    pub num_questions: usize,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Exam {
    /// The candidate pool for this exam, in catalog order.
    pub fn pool(&self) -> Vec<PoolEntry> {
        self.questions.iter().map(Question::pool_entry).collect()
    }

    /// Looks up a question by id.
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Collects the questions for a drawn id sequence, in that order.
    pub fn questions_for(&self, ids: &[QuestionId]) -> Result<Vec<Question>, EngineError> {
        ids.iter()
            .map(|&id| {
                self.question(id)
                    .cloned()
                    .ok_or(EngineError::UnknownQuestion(id))
            })
            .collect()
    }
}

/// Raw answer payload as submitted by the student.
///
/// Form posts often deliver option ids as strings, so a textual payload
/// holding an integer is accepted for single-choice questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerPayload {
    Choice(OptionId),
    Choices(Vec<OptionId>),
    Text(String),
}

/// One answer of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub question_type: QuestionType,
    pub answer: AnswerPayload,
}

impl SubmittedAnswer {
    pub fn single(question_id: QuestionId, option: OptionId) -> Self {
        Self {
            question_id,
            question_type: QuestionType::SingleChoice,
            answer: AnswerPayload::Choice(option),
        }
    }

    pub fn multiple(question_id: QuestionId, options: impl IntoIterator<Item = OptionId>) -> Self {
        Self {
            question_id,
            question_type: QuestionType::MultipleChoice,
            answer: AnswerPayload::Choices(options.into_iter().collect()),
        }
    }

    pub fn open(question_id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            question_id,
            question_type: QuestionType::OpenEnded,
            answer: AnswerPayload::Text(text.into()),
        }
    }

    /// Checks the payload against `question` and returns it in canonical form.
    ///
    /// Fails with [`EngineError::MalformedAnswer`] when the declared type
    /// disagrees with the question or the payload has the wrong shape.
    pub fn response_for(&self, question: &Question) -> Result<Response, EngineError> {
        let malformed = |reason: String| EngineError::MalformedAnswer {
            question_id: question.id,
            expected: question.question_type,
            reason,
        };

        if self.question_type != question.question_type {
            return Err(malformed(format!(
                "answer declared as {}",
                self.question_type
            )));
        }

        match (question.question_type, &self.answer) {
            (QuestionType::SingleChoice, AnswerPayload::Choice(id)) => Ok(Response::Single(*id)),
            (QuestionType::SingleChoice, AnswerPayload::Text(text)) => text
                .trim()
                .parse::<OptionId>()
                .map(Response::Single)
                .map_err(|_| malformed(format!("'{text}' is not an option id"))),
            (QuestionType::SingleChoice, AnswerPayload::Choices(_)) => {
                Err(malformed("expected a single option id, got a list".into()))
            }
            (QuestionType::MultipleChoice, AnswerPayload::Choices(ids)) => {
                Ok(Response::Multiple(ids.iter().copied().collect()))
            }
            (QuestionType::MultipleChoice, _) => {
                Err(malformed("expected a list of option ids".into()))
            }
            (QuestionType::OpenEnded, AnswerPayload::Text(text)) => Ok(Response::Open(text.clone())),
            (QuestionType::OpenEnded, _) => Err(malformed("expected free text".into())),
        }
    }
}

/// A validated answer, shaped by its question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Single(OptionId),
    Multiple(BTreeSet<OptionId>),
    Open(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::SingleChoice.to_string(), "single_choice");
        assert_eq!("S".parse::<QuestionType>().unwrap(), QuestionType::SingleChoice);
        assert_eq!(
            "multiple-choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert_eq!("o".parse::<QuestionType>().unwrap(), QuestionType::OpenEnded);
        assert_eq!(
            "essay".parse::<QuestionType>(),
            Err(EngineError::UnknownQuestionType("essay".into()))
        );
    }

    #[test]
    fn question_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&QuestionType::OpenEnded).unwrap();
        assert_eq!(json, "\"open_ended\"");
        let parsed: QuestionType = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(parsed, QuestionType::MultipleChoice);
        let err = serde_json::from_str::<QuestionType>("\"essay\"").unwrap_err();
        assert!(err.to_string().contains("unknown question type"));
    }

    #[test]
    fn question_defaults_rating() {
        let q: Question = serde_json::from_str(r#"{"id": 1, "type": "S"}"#).unwrap();
        assert_eq!(q.rating, DEFAULT_RATING);
        assert!(q.options.is_empty());
    }

    #[test]
    fn correct_option_ids() {
        let q = Question::new(1, QuestionType::MultipleChoice)
            .with_option(10, true)
            .with_option(11, false)
            .with_option(12, true);
        assert_eq!(q.correct_option_ids(), BTreeSet::from([10, 12]));
    }

    #[test]
    fn payload_untagged_shapes() {
        let answers: Vec<SubmittedAnswer> = serde_json::from_str(
            r#"[
                {"question_id": 1, "question_type": "single_choice", "answer": 3},
                {"question_id": 2, "question_type": "multiple_choice", "answer": [4, 5]},
                {"question_id": 3, "question_type": "open_ended", "answer": "because"}
            ]"#,
        )
        .unwrap();
        assert_eq!(answers[0].answer, AnswerPayload::Choice(3));
        assert_eq!(answers[1].answer, AnswerPayload::Choices(vec![4, 5]));
        assert_eq!(answers[2].answer, AnswerPayload::Text("because".into()));
    }

    #[test]
    fn response_accepts_numeric_text_for_single_choice() {
        let q = Question::new(1, QuestionType::SingleChoice);
        let answer = SubmittedAnswer {
            question_id: 1,
            question_type: QuestionType::SingleChoice,
            answer: AnswerPayload::Text(" 42 ".into()),
        };
        assert_eq!(answer.response_for(&q).unwrap(), Response::Single(42));
    }

    #[test]
    fn response_rejects_list_for_single_choice() {
        let q = Question::new(1, QuestionType::SingleChoice);
        let answer = SubmittedAnswer {
            question_id: 1,
            question_type: QuestionType::SingleChoice,
            answer: AnswerPayload::Choices(vec![1, 2]),
        };
        assert!(matches!(
            answer.response_for(&q),
            Err(EngineError::MalformedAnswer { question_id: 1, .. })
        ));
    }

    #[test]
    fn response_rejects_mismatched_declared_type() {
        let q = Question::new(1, QuestionType::MultipleChoice);
        let answer = SubmittedAnswer::single(1, 3);
        assert!(matches!(
            answer.response_for(&q),
            Err(EngineError::MalformedAnswer {
                expected: QuestionType::MultipleChoice,
                ..
            })
        ));
    }

    #[test]
    fn response_collapses_duplicate_choices() {
        let q = Question::new(1, QuestionType::MultipleChoice);
        let answer = SubmittedAnswer::multiple(1, [2, 2, 3]);
        assert_eq!(
            answer.response_for(&q).unwrap(),
            Response::Multiple(BTreeSet::from([2, 3]))
        );
    }

    #[test]
    fn questions_for_keeps_draw_order() {
        let exam = Exam {
            id: "e".into(),
            name: "E".into(),
            description: String::new(),
            num_questions: 2,
            questions: vec![
                Question::new(1, QuestionType::OpenEnded),
                Question::new(2, QuestionType::OpenEnded),
            ],
        };
        let picked = exam.questions_for(&[2, 1]).unwrap();
        assert_eq!(picked[0].id, 2);
        assert_eq!(picked[1].id, 1);
        assert_eq!(
            exam.questions_for(&[9]).unwrap_err(),
            EngineError::UnknownQuestion(9)
        );
    }
}
