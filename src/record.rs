//! Per-step attempt and completion records
//!
//! Every step the player reaches gets one [`StepRecord`], created with
//! defaults on the first logical visit and kept for the rest of the session.
//! Records are stored in an arena keyed by step index so they can be
//! inspected independently of any presentation.

use std::collections::{BTreeMap, BTreeSet};

use enum_map::EnumMap;
use serde::Serialize;

use crate::steps::common::{HintTier, Outcome};

/// Mutable state of one step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Whether the step is finished (successfully or not)
    pub completed: bool,
    /// Whether the step was finished successfully
    pub success: bool,
    /// Number of wrong attempts so far
    pub attempts: u32,
    /// Options hidden by the 50/50 lifeline
    pub removed_options: BTreeSet<String>,
    /// Last option selected on a multiple choice step
    pub selected: Option<String>,
    /// Current image to label assignment on a drag-and-drop step
    pub drag_assignment: BTreeMap<String, String>,
    /// Draft text of an opinion step
    pub text_value: String,
    /// Password accepted on a password step
    pub password_entered: String,
    /// Whether the 50/50 lifeline was spent on this step
    pub used_fifty: bool,
    /// Whether the call lifeline was spent on this step
    pub used_call: bool,
    /// Which hint tiers are unlocked on this step
    pub hint_unlocked: EnumMap<HintTier, bool>,
    /// Whether a submission for this step is awaiting acknowledgement
    pub submitting: bool,
}

impl StepRecord {
    /// Applies the completion and attempt bookkeeping common to every outcome
    pub fn resolve(&mut self, outcome: Outcome) {
        if matches!(outcome, Outcome::Missed { .. } | Outcome::Exhausted { .. }) {
            self.attempts += 1;
        }
        if outcome.completes() {
            self.completed = true;
            self.success = outcome.succeeded();
        }
    }
}

/// Arena of step records keyed by step index
#[derive(Debug, Clone, Default)]
pub struct Records {
    records: BTreeMap<usize, StepRecord>,
}

impl Records {
    /// Returns the record at `index`, creating a default one on first visit
    pub fn visit(&mut self, index: usize) -> &mut StepRecord {
        self.records.entry(index).or_default()
    }

    /// Returns the record at `index` if the step was ever visited
    pub fn get(&self, index: usize) -> Option<&StepRecord> {
        self.records.get(&index)
    }

    /// Returns the record at `index` mutably if the step was ever visited
    pub fn get_mut(&mut self, index: usize) -> Option<&mut StepRecord> {
        self.records.get_mut(&index)
    }

    /// Whether the step at `index` was visited and completed
    pub fn is_completed(&self, index: usize) -> bool {
        self.get(index).is_some_and(|record| record.completed)
    }

    /// Number of visited steps
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no step was visited yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_visit_creates_defaults_once() {
        let mut records = Records::default();
        assert!(records.get(2).is_none());

        records.visit(2).attempts = 1;
        assert_eq!(records.visit(2).attempts, 1);
        assert_eq!(records.len(), 1);
        assert!(!records.get(2).unwrap().completed);
        assert!(!records.get(2).unwrap().hint_unlocked[HintTier::Low]);
    }

    #[test]
    fn test_resolve_missed() {
        let mut record = StepRecord::default();
        record.resolve(Outcome::Missed { penalty: 10 });
        assert_eq!(record.attempts, 1);
        assert!(!record.completed);
    }

    #[test]
    fn test_resolve_exhausted() {
        let mut record = StepRecord::default();
        record.resolve(Outcome::Missed { penalty: 10 });
        record.resolve(Outcome::Exhausted { penalty: 10 });
        assert_eq!(record.attempts, 2);
        assert!(record.completed);
        assert!(!record.success);
    }

    #[test]
    fn test_resolve_solved_keeps_attempts() {
        let mut record = StepRecord::default();
        record.resolve(Outcome::Missed { penalty: 10 });
        record.resolve(Outcome::Solved);
        assert_eq!(record.attempts, 1);
        assert!(record.completed && record.success);
    }

    #[test]
    fn test_is_completed_unvisited() {
        let records = Records::default();
        assert!(!records.is_completed(0));
        assert!(records.is_empty());
    }
}
