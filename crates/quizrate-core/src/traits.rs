//! The seam between the engine and whoever owns the ratings.
//!
//! The engine never writes ratings. It proposes a [`RatingOutcome`], and the
//! caller persists it through a [`RatingStore`] implementation backed by its
//! database, cache or anything else.

use std::collections::HashMap;

use crate::model::{QuestionId, Rating, DEFAULT_RATING};
use crate::scoring::RatingOutcome;

/// Storage for student and question ratings.
///
/// Implementations serialize concurrent writes to the same question
/// themselves; the engine gives no cross-attempt atomicity.
pub trait RatingStore {
    /// Current rating of a student.
    fn student_rating(&self, student_id: &str) -> Rating;

    /// Current rating of a question.
    fn question_rating(&self, question_id: QuestionId) -> Rating;

    fn set_student_rating(&mut self, student_id: &str, rating: Rating);

    fn set_question_rating(&mut self, question_id: QuestionId, rating: Rating);
}

impl RatingOutcome {
    /// Applies the proposed deltas to the values currently held in `store`.
    /// Ratings saturate at the `i32` bounds.
    pub fn apply<S: RatingStore + ?Sized>(&self, student_id: &str, store: &mut S) {
        let student = store.student_rating(student_id);
        store.set_student_rating(student_id, student.saturating_add(self.student_delta));
        for (&question_id, &delta) in &self.question_deltas {
            let current = store.question_rating(question_id);
            store.set_question_rating(question_id, current.saturating_add(delta));
        }
    }
}

/// A `HashMap`-backed store. Unknown entries read as [`DEFAULT_RATING`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryRatings {
    students: HashMap<String, Rating>,
    questions: HashMap<QuestionId, Rating>,
}

impl InMemoryRatings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds question ratings, e.g. from a loaded catalog.
    pub fn with_questions(mut self, ratings: impl IntoIterator<Item = (QuestionId, Rating)>) -> Self {
        self.questions.extend(ratings);
        self
    }
}

impl RatingStore for InMemoryRatings {
    fn student_rating(&self, student_id: &str) -> Rating {
        self.students
            .get(student_id)
            .copied()
            .unwrap_or(DEFAULT_RATING)
    }

    fn question_rating(&self, question_id: QuestionId) -> Rating {
        self.questions
            .get(&question_id)
            .copied()
            .unwrap_or(DEFAULT_RATING)
    }

    fn set_student_rating(&mut self, student_id: &str, rating: Rating) {
        self.students.insert(student_id.to_string(), rating);
    }

    fn set_question_rating(&mut self, question_id: QuestionId, rating: Rating) {
        self.questions.insert(question_id, rating);
    }
}
