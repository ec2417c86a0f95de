//! Password step implementation
//!
//! The player types a secret word found through clues. Matching ignores
//! surrounding whitespace and letter case.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{Announcement, InputError, Outcome, Prompt, clean_answer};
use crate::{
    constants::{
        attempts::MAX_ATTEMPTS,
        password::{MAX_SECRET_LENGTH, PENALTY},
    },
    record::StepRecord,
};

/// Definition of a password step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepConfig {
    /// Shared prompt fields
    #[serde(flatten)]
    #[garde(dive)]
    pub prompt: Prompt,
    /// The secret, compared case-insensitively
    #[garde(length(min = 1, max = MAX_SECRET_LENGTH))]
    pub password: String,
}

/// Presentation of a password step
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// The accepted password, once solved
    pub entered: String,
    /// Whether input is accepted
    pub enabled: bool,
    /// The secret, revealed after the attempts ran out
    pub revealed: Option<String>,
    /// Optional document with clues
    pub pdf_link: Option<String>,
}

impl StepConfig {
    /// Checks that the secret is not just whitespace
    pub fn consistency(&self) -> Result<(), String> {
        if self.password.trim().is_empty() {
            return Err("password cannot be blank".to_owned());
        }
        Ok(())
    }

    /// Decides the outcome of entering `input`
    ///
    /// # Errors
    ///
    /// * `InputError::Empty` - the input is blank after trimming
    pub fn evaluate(&self, input: &str, record: &StepRecord) -> Result<Outcome, InputError> {
        let input = clean_answer(input);
        if input.is_empty() {
            return Err(InputError::Empty);
        }
        if input == clean_answer(&self.password) {
            Ok(Outcome::Solved)
        } else {
            Ok(Outcome::wrong(record.attempts, PENALTY))
        }
    }

    /// Applies the type-specific part of an outcome to the record
    pub fn settle(&self, input: &str, outcome: Outcome, record: &mut StepRecord) {
        record.resolve(outcome);
        if outcome == Outcome::Solved {
            input.trim().clone_into(&mut record.password_entered);
        }
    }

    /// The notice shown to the player for an outcome
    ///
    /// `record` is the record after the outcome was settled.
    pub fn announce(&self, outcome: Outcome, record: &StepRecord) -> Announcement {
        match outcome {
            Outcome::Exhausted { penalty } => Announcement::new(
                "LOCKED OUT",
                format!(
                    "The correct password was:\n{}\n\n-{penalty} Points.",
                    self.password
                ),
            ),
            Outcome::Missed { penalty } => Announcement::new(
                "ACCESS DENIED",
                format!(
                    "Incorrect Password.\n-{penalty} Points.\n{} attempt(s) remaining.",
                    MAX_ATTEMPTS.saturating_sub(record.attempts)
                ),
            ),
            Outcome::Solved | Outcome::Acknowledged => {
                Announcement::new("CORRECT!", "That is the right password.")
            }
        }
    }

    /// Builds the presentation of this step
    pub fn view(&self, record: &StepRecord, locked: bool) -> View {
        View {
            entered: record.password_entered.clone(),
            enabled: !locked,
            revealed: (record.completed && !record.success).then(|| self.password.clone()),
            pdf_link: self.prompt.media.pdf_link.clone(),
        }
    }
}
