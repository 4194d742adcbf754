//! Rating-weighted question sampling.
//!
//! Each candidate gets a Gaussian-shaped weight in rating distance from the
//! peak, `2^(-((rating - peak) / tolerance)^2)`, so a question at the peak
//! weighs 1 and one `tolerance` away weighs 0.5. Questions are then drawn
//! proportionally to weight, without replacement.

use std::collections::HashSet;

use rand::Rng;

use crate::config::SamplerConfig;
use crate::error::EngineError;
use crate::model::{PoolEntry, QuestionId, Rating};

/// Weight of a question rated `rating` for a sampler centered at `peak`.
pub fn weight(rating: Rating, peak: Rating, tolerance: f64) -> f64 {
    let d = (f64::from(rating) - f64::from(peak)) / tolerance;
    (-(d * d)).exp2()
}

/// Draws question sets centered on a target rating.
#[derive(Debug, Clone)]
pub struct QuestionSampler {
    config: SamplerConfig,
    peak: Option<Rating>,
}

impl QuestionSampler {
    pub fn new(config: &SamplerConfig) -> Self {
        Self {
            config: config.clone(),
            peak: None,
        }
    }

    /// Sets the rating where draws are most likely, usually the student's.
    pub fn with_peak(mut self, peak: Rating) -> Self {
        self.peak = Some(peak);
        self
    }

    /// Weight of every pool entry, in pool order.
    pub fn weights(&self, pool: &[PoolEntry]) -> Result<Vec<f64>, EngineError> {
        let peak = self.require_peak()?;
        Ok(pool
            .iter()
            .map(|entry| weight(entry.rating, peak, self.config.tolerance))
            .collect())
    }

    /// Draws `num_questions` distinct ids from `pool`.
    ///
    /// The returned order is the draw order. Inputs are checked before any
    /// randomness is consumed.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        pool: &[PoolEntry],
        num_questions: usize,
        rng: &mut R,
    ) -> Result<Vec<QuestionId>, EngineError> {
        let peak = self.require_peak()?;
        self.config.validate()?;
        if num_questions == 0 {
            return Err(EngineError::InvalidConfiguration(
                "num_questions must be positive".into(),
            ));
        }
        if num_questions > pool.len() {
            return Err(EngineError::InsufficientQuestions {
                requested: num_questions,
                available: pool.len(),
            });
        }
        let mut seen = HashSet::with_capacity(pool.len());
        if let Some(dup) = pool.iter().find(|entry| !seen.insert(entry.id)) {
            return Err(EngineError::DuplicateQuestion(dup.id));
        }

        let mut remaining: Vec<(QuestionId, f64)> = pool
            .iter()
            .map(|entry| (entry.id, weight(entry.rating, peak, self.config.tolerance)))
            .collect();
        let mut drawn = Vec::with_capacity(num_questions);

        while drawn.len() < num_questions {
            let index = pick_index(&remaining, rng);
            let (id, _) = remaining.remove(index);
            drawn.push(id);
        }

        tracing::debug!(peak, count = drawn.len(), "drew questions: {drawn:?}");
        Ok(drawn)
    }

    fn require_peak(&self) -> Result<Rating, EngineError> {
        self.peak.ok_or_else(|| {
            EngineError::InvalidConfiguration("sampling peak was not provided".into())
        })
    }
}

/// Proportional-to-weight choice over the remaining candidates.
///
/// Falls back to a uniform choice once every remaining weight has underflowed
/// to zero.
fn pick_index<R: Rng + ?Sized>(remaining: &[(QuestionId, f64)], rng: &mut R) -> usize {
    let total: f64 = remaining.iter().map(|(_, w)| w).sum();
    if !(total.is_finite() && total > 0.0) {
        tracing::debug!(
            remaining = remaining.len(),
            "all weights vanished, falling back to uniform choice"
        );
        return rng.gen_range(0..remaining.len());
    }

    let target = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    remaining
        .iter()
        .position(|(_, w)| {
            cumulative += w;
            cumulative > target
        })
        .or_else(|| remaining.iter().rposition(|(_, w)| *w > 0.0))
        .unwrap_or(remaining.len() - 1)
}
