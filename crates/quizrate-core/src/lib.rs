//! quizrate-core: Adaptive exam engine.
//!
//! Draws question sets weighted toward a student's rating and scores finished
//! attempts with an Elo-style update that moves the student and every answered
//! question in opposite directions.

pub mod attempt;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod sampler;
pub mod scoring;
pub mod traits;

pub use engine::{draw_questions, finalize_attempt, ExamEngine};
pub use error::{EngineError, ErrorKind};
