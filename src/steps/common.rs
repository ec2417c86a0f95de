//! Shared data and outcome types for step implementations
//!
//! This module contains the prompt fields every step type carries, the hint
//! tiers, and the [`Outcome`] an evaluator hands back to the game. Evaluators
//! never mutate anything themselves; the game applies their outcomes.

use std::collections::BTreeMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::media::Media;
use crate::constants::{attempts::MAX_ATTEMPTS, prompt};

/// A hint cost level
///
/// Each tier has its own unlock state and text on every step.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    enum_map::Enum,
    derive_more::Display,
)]
pub enum HintTier {
    /// The cheaper hint
    #[serde(rename = "25")]
    #[display("25")]
    Low,
    /// The stronger hint
    #[serde(rename = "50")]
    #[display("50")]
    High,
}

impl HintTier {
    /// Points deducted the first time this tier is unlocked on a step
    pub const fn cost(self) -> i64 {
        match self {
            Self::Low => 25,
            Self::High => 50,
        }
    }
}

/// Validates every hint text against the hint length limit
fn validate_hints(hints: &BTreeMap<HintTier, String>, _ctx: &()) -> garde::Result {
    match hints
        .iter()
        .find(|(_, text)| text.len() > prompt::MAX_HINT_LENGTH)
    {
        Some((tier, _)) => Err(garde::Error::new(format!(
            "hint {tier} is longer than {}",
            prompt::MAX_HINT_LENGTH
        ))),
        None => Ok(()),
    }
}

/// Fields shared by every step type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Prompt {
    /// Position of the step in the catalog, as authored
    #[serde(default)]
    #[garde(skip)]
    pub id: u32,
    /// Short heading
    #[serde(default)]
    #[garde(length(max = prompt::MAX_TITLE_LENGTH))]
    pub title: String,
    /// The question or instruction shown to the player
    #[serde(default)]
    #[garde(length(max = prompt::MAX_TEXT_LENGTH))]
    pub question: String,
    /// Attached media references
    #[serde(flatten)]
    #[garde(skip)]
    pub media: Media,
    /// Optional hint texts keyed by tier
    #[serde(default)]
    #[garde(custom(validate_hints))]
    pub hints: BTreeMap<HintTier, String>,
}

impl Prompt {
    /// Returns the hint text for a tier, if the step carries one
    pub fn hint(&self, tier: HintTier) -> Option<&str> {
        self.hints.get(&tier).map(String::as_str)
    }
}

/// Input rejected before it reaches an evaluator's decision
///
/// Rejections never cost points or attempts.
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Blank input where text was required
    #[error("input cannot be empty")]
    Empty,
    /// Not every image has a label yet
    #[error("every image needs a label")]
    IncompleteAssignment,
    /// The chosen option is not part of this step
    #[error("no such option")]
    UnknownOption,
    /// The chosen option was removed by the 50/50 lifeline
    #[error("option was removed")]
    RemovedOption,
    /// The image is not part of this step
    #[error("no such image")]
    UnknownImage,
    /// The label is not part of this step
    #[error("no such label")]
    UnknownLabel,
    /// The text is longer than allowed
    #[error("input is too long")]
    TooLong,
}

/// The decision an evaluator reaches for one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The answer was right; the step completes successfully
    Solved,
    /// The answer was wrong but another attempt remains
    Missed {
        /// Points to deduct
        penalty: i64,
    },
    /// The answer was wrong and no attempts remain; the step locks with the
    /// answer revealed
    Exhausted {
        /// Points to deduct
        penalty: i64,
    },
    /// A step without correctness was completed
    Acknowledged,
}

impl Outcome {
    /// Classifies a wrong answer given the attempts already spent
    pub fn wrong(attempts_so_far: u32, penalty: i64) -> Self {
        if attempts_so_far + 1 >= MAX_ATTEMPTS {
            Self::Exhausted { penalty }
        } else {
            Self::Missed { penalty }
        }
    }

    /// Points this outcome deducts
    pub fn penalty(self) -> i64 {
        match self {
            Self::Missed { penalty } | Self::Exhausted { penalty } => penalty,
            Self::Solved | Self::Acknowledged => 0,
        }
    }

    /// Whether the step is completed after this outcome
    pub fn completes(self) -> bool {
        !matches!(self, Self::Missed { .. })
    }

    /// Whether the step counts as a success after this outcome
    pub fn succeeded(self) -> bool {
        matches!(self, Self::Solved | Self::Acknowledged)
    }
}

/// Title and body of the notice shown after an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    /// Heading of the notice
    pub title: String,
    /// Body text of the notice
    pub body: String,
}

impl Announcement {
    /// Creates an announcement from a title and a body
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Normalizes free text for comparison (trimmed and lowercased)
pub fn clean_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_first_attempt_is_missed() {
        assert_eq!(Outcome::wrong(0, 10), Outcome::Missed { penalty: 10 });
    }

    #[test]
    fn test_wrong_second_attempt_is_exhausted() {
        assert_eq!(Outcome::wrong(1, 15), Outcome::Exhausted { penalty: 15 });
    }

    #[test]
    fn test_outcome_flags() {
        assert!(Outcome::Solved.completes() && Outcome::Solved.succeeded());
        assert!(Outcome::Acknowledged.completes() && Outcome::Acknowledged.succeeded());
        assert!(!Outcome::Missed { penalty: 10 }.completes());
        let exhausted = Outcome::Exhausted { penalty: 10 };
        assert!(exhausted.completes() && !exhausted.succeeded());
        assert_eq!(exhausted.penalty(), 10);
        assert_eq!(Outcome::Solved.penalty(), 0);
    }

    #[test]
    fn test_hint_tier_keys() {
        let prompt: Prompt =
            serde_json::from_str(r#"{"title":"t","hints":{"25":"cheap","50":"strong"}}"#).unwrap();
        assert_eq!(prompt.hint(HintTier::Low), Some("cheap"));
        assert_eq!(prompt.hint(HintTier::High), Some("strong"));
        assert_eq!(HintTier::High.cost(), 50);
    }

    #[test]
    fn test_hint_too_long() {
        let mut step_prompt = Prompt::default();
        step_prompt
            .hints
            .insert(HintTier::Low, "a".repeat(prompt::MAX_HINT_LENGTH + 1));
        assert!(step_prompt.validate().is_err());
    }

    #[test]
    fn test_clean_answer() {
        assert_eq!(clean_answer("  ScAlPeL "), "scalpel");
    }
}
