//! Score tracking
//!
//! The score is a single signed value with no floor and no ceiling. Every
//! change is recorded together with its cause so a play-through can be
//! audited after the fact.

use serde::Serialize;

use crate::steps::common::HintTier;

/// Why the score changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cause {
    /// A wrong answer on a step
    WrongAnswer {
        /// Index of the step
        step: usize,
    },
    /// A hint tier unlocked on a step
    HintPurchase {
        /// Index of the step
        step: usize,
        /// The tier unlocked
        tier: HintTier,
    },
}

/// A single change of the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjustment {
    /// What caused the change
    pub cause: Cause,
    /// Signed change applied
    pub delta: i64,
}

/// The running score of a play-through
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    value: i64,
    history: Vec<Adjustment>,
}

impl ScoreTracker {
    /// Creates a tracker starting at `initial`
    pub fn new(initial: i64) -> Self {
        Self {
            value: initial,
            history: Vec::new(),
        }
    }

    /// Applies a signed change attributed to `cause`
    pub fn add(&mut self, delta: i64, cause: Cause) {
        self.value = self.value.saturating_add(delta);
        self.history.push(Adjustment { cause, delta });
    }

    /// Current score
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Every change applied so far, oldest first
    pub fn history(&self) -> &[Adjustment] {
        &self.history
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_score_goes_negative() {
        let mut score = ScoreTracker::new(20);
        score.add(-15, Cause::WrongAnswer { step: 1 });
        score.add(-15, Cause::WrongAnswer { step: 1 });
        assert_eq!(score.value(), -10);
    }

    #[test]
    fn test_history_keeps_causes() {
        let mut score = ScoreTracker::new(100);
        score.add(
            -25,
            Cause::HintPurchase {
                step: 0,
                tier: HintTier::Low,
            },
        );
        score.add(-10, Cause::WrongAnswer { step: 0 });

        assert_eq!(score.value(), 65);
        assert_eq!(score.history().len(), 2);
        assert_eq!(
            score.history()[0],
            Adjustment {
                cause: Cause::HintPurchase {
                    step: 0,
                    tier: HintTier::Low
                },
                delta: -25
            }
        );
        let total: i64 = score.history().iter().map(|a| a.delta).sum();
        assert_eq!(100 + total, score.value());
    }
}
