//! End-to-end exam lifecycle tests against the bundled catalogs.
//!
//! These drive the library the way an orchestration layer would: load a
//! catalog, draw a set for a student, collect answers, finalize and persist.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use quizrate_core::attempt::{AttemptState, SubmitProgress};
use quizrate_core::model::{Exam, Question, QuestionType, SubmittedAnswer};
use quizrate_core::parser::parse_exam;
use quizrate_core::traits::{InMemoryRatings, RatingStore};
use quizrate_core::{EngineError, ErrorKind, ExamEngine};

fn arithmetic() -> Exam {
    parse_exam(Path::new("../../exams/arithmetic.toml")).unwrap()
}

/// A fully correct answer for any question.
fn correct_answer(question: &Question) -> SubmittedAnswer {
    match question.question_type {
        QuestionType::SingleChoice => {
            let id = *question.correct_option_ids().iter().next().unwrap();
            SubmittedAnswer::single(question.id, id)
        }
        QuestionType::MultipleChoice => {
            SubmittedAnswer::multiple(question.id, question.correct_option_ids())
        }
        QuestionType::OpenEnded => SubmittedAnswer::open(question.id, "answer"),
    }
}

/// A fully wrong answer for choice questions; open-ended still scores 1.
fn wrong_answer(question: &Question) -> SubmittedAnswer {
    let wrong: Vec<u64> = question
        .options
        .iter()
        .filter(|o| !o.correct)
        .map(|o| o.id)
        .collect();
    match question.question_type {
        QuestionType::SingleChoice => SubmittedAnswer::single(question.id, wrong[0]),
        QuestionType::MultipleChoice => SubmittedAnswer::multiple(question.id, wrong),
        QuestionType::OpenEnded => SubmittedAnswer::open(question.id, ""),
    }
}

fn store_for(exam: &Exam) -> InMemoryRatings {
    InMemoryRatings::new().with_questions(exam.questions.iter().map(|q| (q.id, q.rating)))
}

/// Runs one attempt for `student`, answering with `answer`, and persists it.
fn take_exam(
    engine: &ExamEngine,
    exam: &mut Exam,
    store: &mut InMemoryRatings,
    student: &str,
    seed: u64,
    answer: fn(&Question) -> SubmittedAnswer,
) -> i32 {
    for q in &mut exam.questions {
        q.rating = store.question_rating(q.id);
    }
    let rating = store.student_rating(student);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut attempt = engine.start_attempt(exam, student, rating, &mut rng).unwrap();

    let drawn = exam.questions_for(&attempt.question_ids()).unwrap();
    let mut progress = None;
    for question in &drawn {
        progress = Some(attempt.submit(answer(question)).unwrap());
    }
    assert_eq!(progress, Some(SubmitProgress::Complete));

    let record = attempt.finalize(engine.rating_engine()).unwrap();
    assert_eq!(attempt.state(), AttemptState::Finalized);
    record.outcome.apply(student, store);
    record.outcome.student_delta
}

#[test]
fn ratings_are_conserved_across_attempts() {
    let engine = ExamEngine::default();
    let mut exam = arithmetic();
    let mut store = store_for(&exam);

    let total = |store: &InMemoryRatings, exam: &Exam| -> i32 {
        store.student_rating("alice")
            + store.student_rating("bob")
            + exam
                .questions
                .iter()
                .map(|q| store.question_rating(q.id))
                .sum::<i32>()
    };
    let before = total(&store, &exam);

    for seed in 0..10 {
        take_exam(&engine, &mut exam, &mut store, "alice", seed, correct_answer);
        take_exam(&engine, &mut exam, &mut store, "bob", seed + 100, wrong_answer);
    }

    assert_eq!(total(&store, &exam), before);
}

#[test]
fn strong_and_weak_students_separate() {
    let engine = ExamEngine::default();
    let mut exam = arithmetic();
    let mut store = store_for(&exam);

    for seed in 0..15 {
        take_exam(&engine, &mut exam, &mut store, "strong", seed, correct_answer);
        take_exam(&engine, &mut exam, &mut store, "weak", seed + 1000, wrong_answer);
    }

    assert!(store.student_rating("strong") > 1500);
    assert!(store.student_rating("weak") < store.student_rating("strong"));
}

#[test]
fn finalizing_twice_is_a_state_error() {
    let engine = ExamEngine::default();
    let exam = arithmetic();
    let mut rng = StdRng::seed_from_u64(3);
    let mut attempt = engine.start_attempt(&exam, "carol", 1500, &mut rng).unwrap();
    for question in exam.questions_for(&attempt.question_ids()).unwrap() {
        attempt.submit(correct_answer(&question)).unwrap();
    }
    attempt.finalize(engine.rating_engine()).unwrap();

    let err = attempt.finalize(engine.rating_engine()).unwrap_err();
    assert_eq!(err, EngineError::AttemptAlreadyFinalized);
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn finalize_attempt_matches_attempt_record() {
    let engine = ExamEngine::default();
    let exam = arithmetic();
    let mut rng = StdRng::seed_from_u64(11);
    let mut attempt = engine.start_attempt(&exam, "dave", 1480, &mut rng).unwrap();
    let questions = exam.questions_for(&attempt.question_ids()).unwrap();
    let answers: Vec<SubmittedAnswer> = questions.iter().map(wrong_answer).collect();
    for answer in answers.clone() {
        attempt.submit(answer).unwrap();
    }
    let record = attempt.finalize(engine.rating_engine()).unwrap();

    let outcome = engine.finalize_attempt(1480, &questions, &answers).unwrap();
    assert_eq!(outcome, record.outcome);
}
