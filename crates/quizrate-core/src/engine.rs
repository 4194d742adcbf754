//! Entry points of the adaptive exam engine.
//!
//! [`ExamEngine`] bundles a sampler and a rating engine built from one
//! [`EngineConfig`]. The free functions [`draw_questions`] and
//! [`finalize_attempt`] use the default configuration.

use rand::Rng;

use crate::attempt::Attempt;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::model::{Exam, PoolEntry, Question, QuestionId, Rating, SubmittedAnswer};
use crate::sampler::QuestionSampler;
use crate::scoring::{RatingEngine, RatingOutcome};

/// Draws question sets and scores attempts with one configuration.
#[derive(Debug, Clone)]
pub struct ExamEngine {
    config: EngineConfig,
    rating: RatingEngine,
}

impl Default for ExamEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            rating: RatingEngine::default(),
        }
    }
}

impl ExamEngine {
    /// Builds an engine, rejecting out-of-range configuration values.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let rating = RatingEngine::new(config.rating.clone());
        Ok(Self { config, rating })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rating_engine(&self) -> &RatingEngine {
        &self.rating
    }

    /// Draws `num_questions` distinct ids from `pool`, centered on `peak`.
    pub fn draw_questions<R: Rng + ?Sized>(
        &self,
        pool: &[PoolEntry],
        peak: Option<Rating>,
        num_questions: usize,
        rng: &mut R,
    ) -> Result<Vec<QuestionId>, EngineError> {
        let mut sampler = QuestionSampler::new(&self.config.sampler);
        if let Some(peak) = peak {
            sampler = sampler.with_peak(peak);
        }
        sampler.draw(pool, num_questions, rng)
    }

    /// Draws the exam's configured number of questions for a student and
    /// opens an attempt over them.
    pub fn start_attempt<R: Rng + ?Sized>(
        &self,
        exam: &Exam,
        student_id: &str,
        student_rating: Rating,
        rng: &mut R,
    ) -> Result<Attempt, EngineError> {
        let ids = self.draw_questions(&exam.pool(), Some(student_rating), exam.num_questions, rng)?;
        let questions = exam.questions_for(&ids)?;
        Attempt::new(exam.id.clone(), student_id, student_rating, questions)
    }

    /// Scores a complete batch of answers and proposes new ratings.
    ///
    /// Pure: the same inputs always give the same outcome.
    pub fn finalize_attempt(
        &self,
        student_rating: Rating,
        answered_questions: &[Question],
        submitted_answers: &[SubmittedAnswer],
    ) -> Result<RatingOutcome, EngineError> {
        self.rating
            .score_batch(student_rating, answered_questions, submitted_answers)
    }
}

/// [`ExamEngine::draw_questions`] with the default configuration.
pub fn draw_questions<R: Rng + ?Sized>(
    pool: &[PoolEntry],
    peak: Option<Rating>,
    num_questions: usize,
    rng: &mut R,
) -> Result<Vec<QuestionId>, EngineError> {
    ExamEngine::default().draw_questions(pool, peak, num_questions, rng)
}

/// [`ExamEngine::finalize_attempt`] with the default configuration.
pub fn finalize_attempt(
    student_rating: Rating,
    answered_questions: &[Question],
    submitted_answers: &[SubmittedAnswer],
) -> Result<RatingOutcome, EngineError> {
    ExamEngine::default().finalize_attempt(student_rating, answered_questions, submitted_answers)
}
