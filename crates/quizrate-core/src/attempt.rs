//! In-progress exam attempts and their finalized records.
//!
//! An [`Attempt`] collects answers for a drawn question set and is scored
//! exactly once. The result is an [`AttemptRecord`], an immutable audit entry.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{Question, QuestionId, Rating, SubmittedAnswer};
use crate::scoring::{RatingEngine, RatingOutcome};

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Collecting,
    Scoring,
    Finalized,
}

/// Progress after accepting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitProgress {
    Pending { remaining: usize },
    /// Every question has an answer; the attempt is ready to finalize.
    Complete,
}

/// One student's pass through one drawn question set.
#[derive(Debug, Clone)]
pub struct Attempt {
    id: Uuid,
    exam_id: String,
    student_id: String,
    student_rating: Rating,
    questions: Vec<Question>,
    answers: BTreeMap<QuestionId, SubmittedAnswer>,
    state: AttemptState,
}

impl Attempt {
    /// Starts collecting answers for `questions`, in presentation order.
    ///
    /// `student_rating` is the pre-exam rating every answer is scored against.
    pub fn new(
        exam_id: impl Into<String>,
        student_id: impl Into<String>,
        student_rating: Rating,
        questions: Vec<Question>,
    ) -> Result<Self, EngineError> {
        let mut seen = std::collections::HashSet::with_capacity(questions.len());
        if let Some(dup) = questions.iter().find(|q| !seen.insert(q.id)) {
            return Err(EngineError::DuplicateQuestion(dup.id));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            exam_id: exam_id.into(),
            student_id: student_id.into(),
            student_rating,
            questions,
            answers: BTreeMap::new(),
            state: AttemptState::Collecting,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    pub fn remaining(&self) -> usize {
        self.questions.len() - self.answers.len()
    }

    /// Accepts one answer.
    ///
    /// The payload is validated against its question right away, so a
    /// malformed answer never reaches scoring.
    pub fn submit(&mut self, answer: SubmittedAnswer) -> Result<SubmitProgress, EngineError> {
        if self.state != AttemptState::Collecting {
            return Err(EngineError::AnswerAfterFinalization(answer.question_id));
        }
        let question = self
            .questions
            .iter()
            .find(|q| q.id == answer.question_id)
            .ok_or(EngineError::UnknownQuestion(answer.question_id))?;
        if self.answers.contains_key(&answer.question_id) {
            return Err(EngineError::DuplicateAnswer(answer.question_id));
        }
        answer.response_for(question)?;
        self.answers.insert(answer.question_id, answer);

        Ok(match self.remaining() {
            0 => SubmitProgress::Complete,
            remaining => SubmitProgress::Pending { remaining },
        })
    }

    /// Scores every answer and closes the attempt.
    ///
    /// On failure the attempt goes back to collecting and nothing changes.
    pub fn finalize(&mut self, engine: &RatingEngine) -> Result<AttemptRecord, EngineError> {
        match self.state {
            AttemptState::Collecting => {}
            AttemptState::Scoring | AttemptState::Finalized => {
                return Err(EngineError::AttemptAlreadyFinalized)
            }
        }
        if self.remaining() > 0 {
            return Err(EngineError::AttemptIncomplete {
                missing: self.remaining(),
            });
        }

        self.state = AttemptState::Scoring;
        let answers: Vec<SubmittedAnswer> = self
            .questions
            .iter()
            .filter_map(|q| self.answers.get(&q.id).cloned())
            .collect();
        let outcome = match engine.score_batch(self.student_rating, &self.questions, &answers) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = AttemptState::Collecting;
                return Err(e);
            }
        };
        self.state = AttemptState::Finalized;

        tracing::info!(
            attempt = %self.id,
            exam = %self.exam_id,
            student = %self.student_id,
            delta = outcome.student_delta,
            "attempt finalized"
        );

        Ok(AttemptRecord {
            id: self.id,
            exam_id: self.exam_id.clone(),
            student_id: self.student_id.clone(),
            question_ids: self.question_ids(),
            answers,
            student_rating_before: self.student_rating,
            outcome,
            finalized_at: Utc::now(),
        })
    }
}

/// Audit entry for a completed attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    pub exam_id: String,
    pub student_id: String,
    /// Drawn question ids in presentation order.
    pub question_ids: Vec<QuestionId>,
    pub answers: Vec<SubmittedAnswer>,
    pub student_rating_before: Rating,
    pub outcome: RatingOutcome,
    pub finalized_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn student_rating_after(&self) -> Rating {
        self.outcome.new_student_rating(self.student_rating_before)
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: AttemptRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerPayload, QuestionType};

    fn questions() -> Vec<Question> {
        vec![
            Question::new(1, QuestionType::SingleChoice)
                .with_option(11, true)
                .with_option(12, false),
            Question::new(2, QuestionType::MultipleChoice)
                .with_option(21, true)
                .with_option(22, true)
                .with_option(23, false),
            Question::new(3, QuestionType::OpenEnded),
        ]
    }

    fn answered_attempt() -> Attempt {
        let mut attempt = Attempt::new("exam", "student", 1500, questions()).unwrap();
        attempt.submit(SubmittedAnswer::single(1, 11)).unwrap();
        attempt.submit(SubmittedAnswer::multiple(2, [21])).unwrap();
        attempt.submit(SubmittedAnswer::open(3, "essay")).unwrap();
        attempt
    }

    #[test]
    fn submit_reports_progress() {
        let mut attempt = Attempt::new("exam", "student", 1500, questions()).unwrap();
        assert_eq!(attempt.state(), AttemptState::Collecting);
        assert_eq!(
            attempt.submit(SubmittedAnswer::single(1, 12)).unwrap(),
            SubmitProgress::Pending { remaining: 2 }
        );
        assert_eq!(
            attempt.submit(SubmittedAnswer::open(3, "")).unwrap(),
            SubmitProgress::Pending { remaining: 1 }
        );
        assert_eq!(
            attempt.submit(SubmittedAnswer::multiple(2, [21, 22])).unwrap(),
            SubmitProgress::Complete
        );
    }

    #[test]
    fn submit_rejects_bad_answers() {
        let mut attempt = Attempt::new("exam", "student", 1500, questions()).unwrap();
        assert_eq!(
            attempt.submit(SubmittedAnswer::single(9, 1)),
            Err(EngineError::UnknownQuestion(9))
        );
        let list_for_single = SubmittedAnswer {
            question_id: 1,
            question_type: QuestionType::SingleChoice,
            answer: AnswerPayload::Choices(vec![11]),
        };
        assert!(matches!(
            attempt.submit(list_for_single),
            Err(EngineError::MalformedAnswer { .. })
        ));
        attempt.submit(SubmittedAnswer::single(1, 11)).unwrap();
        assert_eq!(
            attempt.submit(SubmittedAnswer::single(1, 12)),
            Err(EngineError::DuplicateAnswer(1))
        );
        assert_eq!(attempt.remaining(), 2);
    }

    #[test]
    fn finalize_requires_every_answer() {
        let mut attempt = Attempt::new("exam", "student", 1500, questions()).unwrap();
        attempt.submit(SubmittedAnswer::single(1, 11)).unwrap();
        assert_eq!(
            attempt.finalize(&RatingEngine::default()),
            Err(EngineError::AttemptIncomplete { missing: 2 })
        );
        assert_eq!(attempt.state(), AttemptState::Collecting);
    }

    #[test]
    fn finalize_produces_record_once() {
        let mut attempt = answered_attempt();
        let record = attempt.finalize(&RatingEngine::default()).unwrap();
        assert_eq!(attempt.state(), AttemptState::Finalized);
        assert_eq!(record.question_ids, vec![1, 2, 3]);
        assert_eq!(record.answers.len(), 3);
        assert_eq!(record.student_rating_before, 1500);
        assert_eq!(
            record.student_rating_after(),
            1500 + record.outcome.student_delta
        );

        assert_eq!(
            attempt.finalize(&RatingEngine::default()),
            Err(EngineError::AttemptAlreadyFinalized)
        );
        assert_eq!(
            attempt.submit(SubmittedAnswer::single(1, 11)),
            Err(EngineError::AnswerAfterFinalization(1))
        );
    }

    #[test]
    fn record_scores_follow_presentation_order() {
        let mut attempt = Attempt::new("exam", "student", 1500, questions()).unwrap();
        attempt.submit(SubmittedAnswer::open(3, "late")).unwrap();
        attempt.submit(SubmittedAnswer::single(1, 11)).unwrap();
        attempt.submit(SubmittedAnswer::multiple(2, [21, 22])).unwrap();
        let record = attempt.finalize(&RatingEngine::default()).unwrap();
        let order: Vec<_> = record.outcome.scores.iter().map(|s| s.question_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_questions_rejected() {
        let mut qs = questions();
        qs.push(Question::new(1, QuestionType::OpenEnded));
        assert_eq!(
            Attempt::new("exam", "student", 1500, qs).unwrap_err(),
            EngineError::DuplicateQuestion(1)
        );
    }

    #[test]
    fn record_json_roundtrip() {
        let record = answered_attempt()
            .finalize(&RatingEngine::default())
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records").join("attempt.json");
        record.save_json(&path).unwrap();
        let loaded = AttemptRecord::load_json(&path).unwrap();
        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.outcome.student_delta, record.outcome.student_delta);
        assert_eq!(loaded.outcome.question_deltas, record.outcome.question_deltas);
    }
}
