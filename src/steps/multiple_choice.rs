//! Multiple choice step implementation
//!
//! A multiple choice step shows a question with a fixed list of options, one
//! of which is correct. A wrong pick costs points; the second wrong pick
//! locks the step and reveals the answer.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::common::{Announcement, InputError, Outcome, Prompt};
use crate::{
    constants::{
        attempts::MAX_ATTEMPTS,
        multiple_choice::{MAX_OPTION_COUNT, MAX_OPTION_LENGTH, MIN_OPTION_COUNT, PENALTY},
    },
    record::StepRecord,
};

/// Definition of a multiple choice step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepConfig {
    /// Shared prompt fields
    #[serde(flatten)]
    #[garde(dive)]
    pub prompt: Prompt,
    /// The options, in display order
    #[garde(
        length(min = MIN_OPTION_COUNT, max = MAX_OPTION_COUNT),
        inner(length(min = 1, max = MAX_OPTION_LENGTH))
    )]
    pub options: Vec<String>,
    /// The correct option
    #[garde(length(min = 1, max = MAX_OPTION_LENGTH))]
    pub answer: String,
}

/// How an option is marked once the step is locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mark {
    /// The correct option
    Correct,
    /// The player's wrong selection
    Wrong,
}

/// Presentation of a single option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// Option text
    pub text: String,
    /// Hidden by the 50/50 lifeline
    pub removed: bool,
    /// Whether the option can be picked
    pub enabled: bool,
    /// Result marking, only present once locked
    pub mark: Option<Mark>,
}

/// Presentation of a multiple choice step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Options in display order
    pub options: Vec<OptionView>,
}

impl StepConfig {
    /// Checks that the answer is one of the options and that options are distinct
    pub fn consistency(&self) -> Result<(), String> {
        if !self.options.iter().all_unique() {
            return Err("options must be distinct".to_owned());
        }
        if !self.options.contains(&self.answer) {
            return Err(format!("answer {:?} is not one of the options", self.answer));
        }
        Ok(())
    }

    /// Decides the outcome of picking `selected`
    ///
    /// # Errors
    ///
    /// * `InputError::UnknownOption` - the option is not part of this step
    /// * `InputError::RemovedOption` - the option was hidden by 50/50
    pub fn evaluate(&self, selected: &str, record: &StepRecord) -> Result<Outcome, InputError> {
        if !self.options.iter().any(|option| option == selected) {
            return Err(InputError::UnknownOption);
        }
        if record.removed_options.contains(selected) {
            return Err(InputError::RemovedOption);
        }
        if selected == self.answer {
            Ok(Outcome::Solved)
        } else {
            Ok(Outcome::wrong(record.attempts, PENALTY))
        }
    }

    /// Applies the type-specific part of an outcome to the record
    pub fn settle(&self, selected: &str, outcome: Outcome, record: &mut StepRecord) {
        record.resolve(outcome);
        record.selected = Some(selected.to_owned());
    }

    /// The notice shown to the player for an outcome
    ///
    /// `record` is the record after the outcome was settled.
    pub fn announce(&self, outcome: Outcome, record: &StepRecord) -> Announcement {
        match outcome {
            Outcome::Exhausted { penalty } => Announcement::new(
                "WRONG TWICE",
                format!(
                    "The correct answer was:\n{}\n\n-{penalty} Points. Press CONTINUE to proceed.",
                    self.answer
                ),
            ),
            Outcome::Missed { penalty } => Announcement::new(
                "WRONG",
                format!(
                    "Incorrect answer.\n-{penalty} Points.\n{} attempt(s) remaining.",
                    MAX_ATTEMPTS.saturating_sub(record.attempts)
                ),
            ),
            Outcome::Solved | Outcome::Acknowledged => Announcement::new("CORRECT!", "Well done."),
        }
    }

    /// Wrong options still on display, candidates for the 50/50 lifeline
    pub fn removable(&self, record: &StepRecord) -> Vec<String> {
        self.options
            .iter()
            .filter(|option| **option != self.answer && !record.removed_options.contains(*option))
            .cloned()
            .collect_vec()
    }

    /// Builds the presentation of this step
    pub fn view(&self, record: &StepRecord, locked: bool) -> View {
        View {
            options: self
                .options
                .iter()
                .map(|option| {
                    let removed = record.removed_options.contains(option);
                    let mark = if !locked {
                        None
                    } else if *option == self.answer {
                        Some(Mark::Correct)
                    } else if record.selected.as_ref() == Some(option) {
                        Some(Mark::Wrong)
                    } else {
                        None
                    };
                    OptionView {
                        text: option.clone(),
                        removed,
                        enabled: !locked && !removed,
                        mark,
                    }
                })
                .collect(),
        }
    }
}
