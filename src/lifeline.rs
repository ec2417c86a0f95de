//! Lifeline eligibility and consumption
//!
//! Three kinds of help are available: tiered hints drawn from a budget
//! shared by the whole game, a single 50/50 that hides wrong options, and a
//! single phone-a-friend call. The 50/50 and the call are session-wide: once
//! spent on any step they are gone for every step.

use enum_map::{Enum, EnumMap, enum_map};
use serde::Serialize;
use thiserror::Error;

use crate::{
    constants::multiple_choice::FIFTY_FIFTY_REMOVALS,
    record::StepRecord,
    steps::{
        common::{HintTier, Prompt},
        config::StepKind,
        multiple_choice,
    },
};

/// The kinds of lifeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize)]
pub enum Lifeline {
    /// Tiered hint texts
    Hint,
    /// Hide two wrong options
    FiftyFifty,
    /// Phone a friend
    Call,
}

/// Errors raised when a lifeline cannot be used
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// This step type does not offer the lifeline
    #[error("lifeline is not offered on this step")]
    Ineligible,
    /// The step is not the open frontier
    #[error("lifelines are only available on the open frontier step")]
    Closed,
    /// The session-wide single use was already spent
    #[error("lifeline was already used")]
    Spent,
    /// No hint budget remains
    #[error("no hints left")]
    HintBudgetExhausted,
    /// The step carries no text for the requested tier
    #[error("no hint for tier {0}")]
    MissingHint(HintTier),
}

/// Display state of one lifeline button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Not offered on this step type
    Hidden,
    /// Offered but the step is not open for help
    Disabled,
    /// Offered but already consumed
    UsedUp,
    /// Usable now
    Ready,
}

/// Result of unlocking a hint tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unlock {
    /// The tier was newly purchased
    Purchased {
        /// The hint text
        text: String,
        /// Points to deduct
        cost: i64,
    },
    /// The tier was already unlocked; viewing it again is free
    Revisited {
        /// The hint text
        text: String,
    },
}

impl Unlock {
    /// The revealed hint text
    pub fn text(&self) -> &str {
        match self {
            Self::Purchased { text, .. } | Self::Revisited { text } => text,
        }
    }
}

/// Which lifelines a step type offers
pub fn eligibility(kind: StepKind) -> EnumMap<Lifeline, bool> {
    match kind {
        StepKind::MultipleChoice => enum_map! { _ => true },
        StepKind::Password | StepKind::DragDrop => enum_map! {
            Lifeline::FiftyFifty => false,
            _ => true,
        },
        StepKind::Textbox | StepKind::Info => enum_map! { _ => false },
    }
}

/// Session-wide lifeline consumption
#[derive(Debug, Clone, Default)]
pub struct Lifelines {
    hint_budget: u32,
    hints_used: u32,
    used_fifty: bool,
    used_call: bool,
}

impl Lifelines {
    /// Creates the lifeline pool for a game with the given hint budget
    pub fn new(hint_budget: u32) -> Self {
        Self {
            hint_budget,
            ..Self::default()
        }
    }

    /// Hints unlocked so far across the whole game
    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Hints still available across the whole game
    pub fn hints_left(&self) -> u32 {
        self.hint_budget.saturating_sub(self.hints_used)
    }

    /// Whether the 50/50 was spent
    pub fn used_fifty(&self) -> bool {
        self.used_fifty
    }

    /// Whether the call was spent
    pub fn used_call(&self) -> bool {
        self.used_call
    }

    fn ensure(kind: StepKind, lifeline: Lifeline, open: bool) -> Result<(), Error> {
        if !eligibility(kind)[lifeline] {
            return Err(Error::Ineligible);
        }
        if !open {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Button states for a step of `kind`
    ///
    /// `open` is whether the step is the frontier and not yet completed.
    pub fn status(&self, kind: StepKind, open: bool) -> EnumMap<Lifeline, Status> {
        let eligible = eligibility(kind);
        let used = enum_map! {
            Lifeline::Hint => self.hints_left() == 0,
            Lifeline::FiftyFifty => self.used_fifty,
            Lifeline::Call => self.used_call,
        };
        EnumMap::from_fn(|lifeline| {
            if !eligible[lifeline] {
                Status::Hidden
            } else if !open {
                Status::Disabled
            } else if used[lifeline] {
                Status::UsedUp
            } else {
                Status::Ready
            }
        })
    }

    /// Checks that the hint dialog may be opened
    ///
    /// # Errors
    ///
    /// * `Error::Ineligible` - the step type offers no hints
    /// * `Error::Closed` - the step is not open for help
    pub fn open_hints(&self, kind: StepKind, open: bool) -> Result<(), Error> {
        Self::ensure(kind, Lifeline::Hint, open)
    }

    /// Unlocks (or re-views) a hint tier on a step
    ///
    /// A tier is charged once per step; viewing it again costs nothing and
    /// does not touch the budget.
    ///
    /// # Errors
    ///
    /// * `Error::Ineligible` - the step type offers no hints
    /// * `Error::Closed` - the step is not open for help
    /// * `Error::MissingHint` - the step carries no text for the tier
    /// * `Error::HintBudgetExhausted` - a new tier was requested with no budget left
    pub fn unlock_hint(
        &mut self,
        kind: StepKind,
        open: bool,
        tier: HintTier,
        prompt: &Prompt,
        record: &mut StepRecord,
    ) -> Result<Unlock, Error> {
        Self::ensure(kind, Lifeline::Hint, open)?;
        let text = prompt.hint(tier).ok_or(Error::MissingHint(tier))?.to_owned();
        if record.hint_unlocked[tier] {
            return Ok(Unlock::Revisited { text });
        }
        if self.hints_left() == 0 {
            return Err(Error::HintBudgetExhausted);
        }
        self.hints_used += 1;
        record.hint_unlocked[tier] = true;
        Ok(Unlock::Purchased {
            text,
            cost: tier.cost(),
        })
    }

    /// Spends the 50/50 on a multiple choice step
    ///
    /// Hides up to two wrong options on this step only and returns them.
    ///
    /// # Errors
    ///
    /// * `Error::Ineligible` - the step is not multiple choice
    /// * `Error::Closed` - the step is not open for help
    /// * `Error::Spent` - the 50/50 was already used in this session
    pub fn fifty_fifty(
        &mut self,
        step: Option<&multiple_choice::StepConfig>,
        open: bool,
        record: &mut StepRecord,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<String>, Error> {
        let Some(step) = step else {
            return Err(Error::Ineligible);
        };
        Self::ensure(StepKind::MultipleChoice, Lifeline::FiftyFifty, open)?;
        if self.used_fifty {
            return Err(Error::Spent);
        }
        let removed = rng.choose_multiple(step.removable(record).into_iter(), FIFTY_FIFTY_REMOVALS);
        self.used_fifty = true;
        record.used_fifty = true;
        record.removed_options.extend(removed.iter().cloned());
        Ok(removed)
    }

    /// Spends the call on a step
    ///
    /// # Errors
    ///
    /// * `Error::Ineligible` - the step type offers no call
    /// * `Error::Closed` - the step is not open for help
    /// * `Error::Spent` - the call was already used in this session
    pub fn call(
        &mut self,
        kind: StepKind,
        open: bool,
        record: &mut StepRecord,
    ) -> Result<(), Error> {
        Self::ensure(kind, Lifeline::Call, open)?;
        if self.used_call {
            return Err(Error::Spent);
        }
        self.used_call = true;
        record.used_call = true;
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn mcq() -> multiple_choice::StepConfig {
        let mut prompt = Prompt::default();
        prompt.hints.insert(HintTier::Low, "cheap".to_string());
        prompt.hints.insert(HintTier::High, "strong".to_string());
        multiple_choice::StepConfig {
            prompt,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: "B".to_string(),
        }
    }

    #[test]
    fn test_eligibility_table() {
        let mcq = eligibility(StepKind::MultipleChoice);
        assert!(mcq[Lifeline::Hint] && mcq[Lifeline::FiftyFifty] && mcq[Lifeline::Call]);

        for kind in [StepKind::Password, StepKind::DragDrop] {
            let table = eligibility(kind);
            assert!(table[Lifeline::Hint] && table[Lifeline::Call]);
            assert!(!table[Lifeline::FiftyFifty]);
        }

        for kind in [StepKind::Textbox, StepKind::Info] {
            assert!(eligibility(kind).values().all(|allowed| !allowed));
        }
    }

    #[test]
    fn test_hint_charged_once_per_tier() {
        let step = mcq();
        let mut lifelines = Lifelines::new(3);
        let mut record = StepRecord::default();

        let first = lifelines
            .unlock_hint(StepKind::MultipleChoice, true, HintTier::Low, &step.prompt, &mut record)
            .unwrap();
        assert_eq!(
            first,
            Unlock::Purchased {
                text: "cheap".to_string(),
                cost: 25
            }
        );
        let again = lifelines
            .unlock_hint(StepKind::MultipleChoice, true, HintTier::Low, &step.prompt, &mut record)
            .unwrap();
        assert_eq!(
            again,
            Unlock::Revisited {
                text: "cheap".to_string()
            }
        );
        assert_eq!(lifelines.hints_used(), 1);
        assert_eq!(lifelines.hints_left(), 2);
    }

    #[test]
    fn test_hint_budget_is_global() {
        let step = mcq();
        let mut lifelines = Lifelines::new(1);
        let mut first_record = StepRecord::default();
        let mut second_record = StepRecord::default();

        lifelines
            .unlock_hint(
                StepKind::MultipleChoice,
                true,
                HintTier::High,
                &step.prompt,
                &mut first_record,
            )
            .unwrap();
        assert_eq!(
            lifelines.unlock_hint(
                StepKind::MultipleChoice,
                true,
                HintTier::Low,
                &step.prompt,
                &mut second_record
            ),
            Err(Error::HintBudgetExhausted)
        );
        assert!(!second_record.hint_unlocked[HintTier::Low]);
        assert_eq!(lifelines.hints_used(), 1);

        // Already unlocked tiers stay viewable with an empty budget.
        assert!(matches!(
            lifelines.unlock_hint(
                StepKind::MultipleChoice,
                true,
                HintTier::High,
                &step.prompt,
                &mut first_record
            ),
            Ok(Unlock::Revisited { .. })
        ));
    }

    #[test]
    fn test_missing_hint_text() {
        let mut lifelines = Lifelines::new(2);
        let mut record = StepRecord::default();
        assert_eq!(
            lifelines.unlock_hint(
                StepKind::Password,
                true,
                HintTier::Low,
                &Prompt::default(),
                &mut record
            ),
            Err(Error::MissingHint(HintTier::Low))
        );
        assert_eq!(lifelines.hints_used(), 0);
    }

    #[test]
    fn test_hint_requires_open_step() {
        let step = mcq();
        let mut lifelines = Lifelines::new(2);
        let mut record = StepRecord::default();
        assert_eq!(
            lifelines.unlock_hint(
                StepKind::MultipleChoice,
                false,
                HintTier::Low,
                &step.prompt,
                &mut record
            ),
            Err(Error::Closed)
        );
        assert_eq!(
            lifelines.unlock_hint(StepKind::Info, true, HintTier::Low, &step.prompt, &mut record),
            Err(Error::Ineligible)
        );
    }

    #[test]
    fn test_fifty_fifty_once_per_session() {
        let step = mcq();
        let mut lifelines = Lifelines::new(0);
        let mut rng = fastrand::Rng::with_seed(7);
        let mut third = StepRecord::default();
        let mut fifth = StepRecord::default();

        let removed = lifelines
            .fifty_fifty(Some(&step), true, &mut third, &mut rng)
            .unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!removed.contains(&"B".to_string()));
        assert_eq!(third.removed_options.len(), 2);
        assert!(third.used_fifty);

        assert_eq!(
            lifelines.fifty_fifty(Some(&step), true, &mut fifth, &mut rng),
            Err(Error::Spent)
        );
        assert!(fifth.removed_options.is_empty());
    }

    #[test]
    fn test_fifty_fifty_with_one_wrong_option() {
        let mut step = mcq();
        step.options = vec!["A".into(), "B".into()];
        let mut lifelines = Lifelines::new(0);
        let mut record = StepRecord::default();
        let removed = lifelines
            .fifty_fifty(Some(&step), true, &mut record, &mut fastrand::Rng::with_seed(1))
            .unwrap();
        assert_eq!(removed, vec!["A".to_string()]);
    }

    #[test]
    fn test_fifty_fifty_not_on_other_types() {
        let mut lifelines = Lifelines::new(0);
        let mut record = StepRecord::default();
        assert_eq!(
            lifelines.fifty_fifty(None, true, &mut record, &mut fastrand::Rng::with_seed(1)),
            Err(Error::Ineligible)
        );
        assert!(!lifelines.used_fifty());
    }

    #[test]
    fn test_call_once_per_session() {
        let mut lifelines = Lifelines::new(0);
        let mut first = StepRecord::default();
        let mut second = StepRecord::default();
        assert!(lifelines.call(StepKind::Password, true, &mut first).is_ok());
        assert!(first.used_call);
        assert_eq!(
            lifelines.call(StepKind::DragDrop, true, &mut second),
            Err(Error::Spent)
        );
        assert!(!second.used_call);
        assert!(lifelines.used_call());
    }

    #[test]
    fn test_status_buttons() {
        let mut lifelines = Lifelines::new(1);
        let status = lifelines.status(StepKind::Password, true);
        assert_eq!(status[Lifeline::Hint], Status::Ready);
        assert_eq!(status[Lifeline::FiftyFifty], Status::Hidden);
        assert_eq!(status[Lifeline::Call], Status::Ready);

        let status = lifelines.status(StepKind::MultipleChoice, false);
        assert!(status.values().all(|s| *s == Status::Disabled));

        lifelines
            .call(StepKind::MultipleChoice, true, &mut StepRecord::default())
            .unwrap();
        assert_eq!(
            lifelines.status(StepKind::MultipleChoice, true)[Lifeline::Call],
            Status::UsedUp
        );
        assert_eq!(
            Lifelines::new(0).status(StepKind::DragDrop, true)[Lifeline::Hint],
            Status::UsedUp
        );
    }
}
