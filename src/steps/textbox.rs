//! Free-text opinion step implementation
//!
//! There is no right answer: the step completes once the opinion has been
//! accepted by the scoring service. Until then the draft stays editable and
//! a failed submission can simply be sent again.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::common::{Announcement, InputError, Outcome, Prompt};
use crate::{constants::textbox::MAX_TEXT_LENGTH, record::StepRecord};

const DEFAULT_PLACEHOLDER: &str = "Write your clinical opinion here...";

/// Definition of an opinion step
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepConfig {
    /// Shared prompt fields
    #[serde(flatten)]
    #[garde(dive)]
    pub prompt: Prompt,
    /// Placeholder shown in the empty text area
    #[serde(default)]
    #[garde(skip)]
    pub placeholder: Option<String>,
}

/// Presentation of an opinion step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Placeholder for the text area
    pub placeholder: String,
    /// Current draft
    pub text: String,
    /// Whether the draft can be edited
    pub editable: bool,
    /// Whether the submit control is enabled
    pub submittable: bool,
    /// Whether a submission is on its way
    pub saving: bool,
}

impl StepConfig {
    /// Returns the text to submit from the record's draft
    ///
    /// # Errors
    ///
    /// * `InputError::Empty` - the draft is blank after trimming
    /// * `InputError::TooLong` - the draft exceeds the length limit
    pub fn prepare(&self, record: &StepRecord) -> Result<String, InputError> {
        let text = record.text_value.trim();
        if text.is_empty() {
            return Err(InputError::Empty);
        }
        if text.len() > MAX_TEXT_LENGTH {
            return Err(InputError::TooLong);
        }
        Ok(text.to_owned())
    }

    /// The outcome once the service acknowledged the submission
    pub fn evaluate(&self) -> Outcome {
        Outcome::Acknowledged
    }

    /// Applies an acknowledgement to the record
    pub fn settle(&self, outcome: Outcome, record: &mut StepRecord) {
        record.resolve(outcome);
        record.submitting = false;
    }

    /// The notice shown once the opinion is saved
    pub fn announce(&self) -> Announcement {
        Announcement::new("OPINION SAVED", "Thank you for participating.")
    }

    /// Builds the presentation of this step
    pub fn view(&self, record: &StepRecord, locked: bool) -> View {
        View {
            placeholder: self
                .placeholder
                .clone()
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_owned()),
            text: record.text_value.clone(),
            editable: !locked && !record.submitting,
            submittable: !locked && !record.submitting,
            saving: record.submitting,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn create_test_step() -> StepConfig {
        StepConfig {
            prompt: Prompt {
                title: "Reflection".to_string(),
                question: "What would you do next?".to_string(),
                ..Prompt::default()
            },
            placeholder: None,
        }
    }

    #[test]
    fn test_blank_draft_is_rejected() {
        let step = create_test_step();
        let mut record = StepRecord::default();
        assert_eq!(step.prepare(&record), Err(InputError::Empty));
        record.text_value = " \n\t ".to_string();
        assert_eq!(step.prepare(&record), Err(InputError::Empty));
    }

    #[test]
    fn test_draft_is_trimmed() {
        let step = create_test_step();
        let record = StepRecord {
            text_value: "  order an MRI \n".to_string(),
            ..StepRecord::default()
        };
        assert_eq!(step.prepare(&record).unwrap(), "order an MRI");
    }

    #[test]
    fn test_overlong_draft_is_rejected() {
        let step = create_test_step();
        let record = StepRecord {
            text_value: "a".repeat(MAX_TEXT_LENGTH + 1),
            ..StepRecord::default()
        };
        assert_eq!(step.prepare(&record), Err(InputError::TooLong));
    }

    #[test]
    fn test_acknowledgement_completes() {
        let step = create_test_step();
        let mut record = StepRecord {
            submitting: true,
            ..StepRecord::default()
        };
        step.settle(step.evaluate(), &mut record);
        assert!(record.completed && record.success);
        assert!(!record.submitting);
        assert_eq!(record.attempts, 0);
    }

    #[test]
    fn test_view_while_saving() {
        let step = create_test_step();
        let record = StepRecord {
            submitting: true,
            ..StepRecord::default()
        };
        let view = step.view(&record, false);
        assert!(view.saving && !view.submittable && !view.editable);
        assert_eq!(view.placeholder, DEFAULT_PLACEHOLDER);
    }
}
