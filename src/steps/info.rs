//! Informational interstitial step
//!
//! Shows a block of text (and optionally an image). Acknowledging it
//! completes the step and moves straight on.

use garde::Validate;
use serde::{Deserialize, Serialize};

use super::common::{Outcome, Prompt};
use crate::constants::prompt::MAX_TEXT_LENGTH;

/// Definition of an informational step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepConfig {
    /// Shared prompt fields
    #[serde(flatten)]
    #[garde(dive)]
    pub prompt: Prompt,
    /// Body text, one paragraph per line
    #[serde(default)]
    #[garde(length(max = MAX_TEXT_LENGTH))]
    pub text: String,
}

/// Presentation of an informational step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Body paragraphs
    pub paragraphs: Vec<String>,
    /// Whether the continue control is enabled
    pub continuable: bool,
}

impl StepConfig {
    /// The outcome of acknowledging the step
    pub fn evaluate(&self) -> Outcome {
        Outcome::Acknowledged
    }

    /// Builds the presentation of this step
    pub fn view(&self, locked: bool) -> View {
        View {
            paragraphs: self.text.lines().map(str::to_owned).collect(),
            continuable: !locked,
        }
    }
}
