//! Answer scoring and Elo-style rating updates.
//!
//! The expected score of a student on a question follows a logistic curve in
//! the rating gap, shifted so that equal ratings predict `zero_score` instead
//! of one half:
//!
//! ```text
//! A        = zero_score / (1 - zero_score)
//! expected = A / (A + e^((question_rating - student_rating) / span))
//! change   = multiplier * (score - expected)
//! ```
//!
//! The student gains `round(change)` and the question loses it. Every change
//! in one batch is computed against the pre-exam student rating.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{RatingConfig, MAX_PRECISION};
use crate::error::EngineError;
use crate::model::{Question, QuestionId, Rating, Response, SubmittedAnswer};

/// Outcome of scoring a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub question_id: QuestionId,
    /// Correctness in `[0, 1]`.
    pub score: f64,
    /// Score the model predicted for this student.
    pub expected: f64,
    /// Unrounded `multiplier * (score - expected)`.
    pub change: f64,
    pub question_rating_before: Rating,
    /// Applied to the question's rating; the negation of the student's share.
    pub question_delta: i32,
}

/// Proposed rating changes for one finalized batch of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingOutcome {
    /// Sum of the rounded per-question changes.
    pub student_delta: i32,
    pub question_deltas: BTreeMap<QuestionId, i32>,
    /// Per-question details in answer order.
    pub scores: Vec<QuestionScore>,
}

impl RatingOutcome {
    /// Student rating after the update, saturating at the `i32` bounds.
    pub fn new_student_rating(&self, before: Rating) -> Rating {
        before.saturating_add(self.student_delta)
    }

    /// New rating of every answered question.
    pub fn new_question_ratings(&self) -> BTreeMap<QuestionId, Rating> {
        self.scores
            .iter()
            .map(|s| {
                (
                    s.question_id,
                    s.question_rating_before.saturating_add(s.question_delta),
                )
            })
            .collect()
    }

    /// Sum of all scores, e.g. for showing "2.5 / 3".
    pub fn total_score(&self) -> f64 {
        self.scores.iter().map(|s| s.score).sum()
    }
}

/// Scores answers and derives rating changes.
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: RatingConfig,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(RatingConfig::default())
    }
}

impl RatingEngine {
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Correctness of `answer` on `question`, in `[0, 1]`.
    ///
    /// Open-ended answers always score 1 since they are not graded
    /// automatically.
    pub fn answer_score(
        &self,
        question: &Question,
        answer: &SubmittedAnswer,
    ) -> Result<f64, EngineError> {
        let correct = question.correct_option_ids();
        let score = match answer.response_for(question)? {
            Response::Single(id) => {
                if correct.contains(&id) {
                    1.0
                } else {
                    0.0
                }
            }
            Response::Multiple(chosen) => {
                let extra = chosen.difference(&correct).count();
                let missed = correct.difference(&chosen).count();
                (1.0 - (extra + missed) as f64 / 2.0).max(0.0)
            }
            Response::Open(_) => 1.0,
        };
        Ok(score)
    }

    /// Score a student rated `student_rating` is expected to get on a
    /// question rated `question_rating`.
    pub fn expected_score(&self, student_rating: Rating, question_rating: Rating) -> f64 {
        let a = self.config.zero_score / (1.0 - self.config.zero_score);
        let diff = f64::from(question_rating) - f64::from(student_rating);
        let expected = a / (a + (diff / self.config.span).exp());
        round_to(expected, self.config.precision)
    }

    /// Unrounded rating change for the student on one question.
    pub fn rating_change(&self, score: f64, expected: f64) -> f64 {
        self.config.multiplier * (score - expected)
    }

    /// Scores a complete batch of answers against `questions`.
    ///
    /// Every question must be answered exactly once. Nothing is scored unless
    /// every answer validates.
    pub fn score_batch(
        &self,
        student_rating: Rating,
        questions: &[Question],
        answers: &[SubmittedAnswer],
    ) -> Result<RatingOutcome, EngineError> {
        self.config.validate()?;

        let mut by_id: HashMap<QuestionId, &Question> = HashMap::with_capacity(questions.len());
        for question in questions {
            if by_id.insert(question.id, question).is_some() {
                return Err(EngineError::DuplicateQuestion(question.id));
            }
        }

        let mut answered = HashSet::with_capacity(answers.len());
        let mut pairs = Vec::with_capacity(answers.len());
        for answer in answers {
            let question = by_id
                .get(&answer.question_id)
                .copied()
                .ok_or(EngineError::UnknownQuestion(answer.question_id))?;
            if !answered.insert(answer.question_id) {
                return Err(EngineError::DuplicateAnswer(answer.question_id));
            }
            pairs.push((question, self.answer_score(question, answer)?));
        }
        if answered.len() < questions.len() {
            return Err(EngineError::AttemptIncomplete {
                missing: questions.len() - answered.len(),
            });
        }

        let mut student_delta: i32 = 0;
        let mut question_deltas = BTreeMap::new();
        let mut scores = Vec::with_capacity(pairs.len());
        for (question, score) in pairs {
            let expected = self.expected_score(student_rating, question.rating);
            let change = self.rating_change(score, expected);
            let rounded = change.round() as i32;
            tracing::debug!(
                question = question.id,
                score,
                expected,
                change,
                "scored answer"
            );
            student_delta = student_delta.saturating_add(rounded);
            question_deltas.insert(question.id, -rounded);
            scores.push(QuestionScore {
                question_id: question.id,
                score,
                expected,
                change,
                question_rating_before: question.rating,
                question_delta: -rounded,
            });
        }

        Ok(RatingOutcome {
            student_delta,
            question_deltas,
            scores,
        })
    }
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits.min(MAX_PRECISION) as i32);
    (value * factor).round() / factor
}
