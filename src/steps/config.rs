//! Step catalog and step definitions
//!
//! This module defines the [`Catalog`] supplied at startup: the global game
//! settings plus the ordered list of step definitions. It also provides the
//! dispatch layer from a step definition to its type-specific view.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    common::Prompt, drag_drop, info, media::Display, multiple_choice, password, textbox,
};
use crate::{
    constants::catalog::{
        DEFAULT_INITIAL_SCORE, DEFAULT_TIMER_SECONDS, MAX_HINTS_TOTAL, MAX_STEPS_COUNT,
        MAX_TIMER_SECONDS, MIN_TIMER_SECONDS,
    },
    record::StepRecord,
};

/// Errors raised while loading a catalog
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not a well-formed catalog
    #[error("catalog could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    /// A structural limit is violated
    #[error("catalog is invalid: {0}")]
    Invalid(#[from] garde::Report),
    /// A step's answer does not fit its own definition
    #[error("step {index} is inconsistent: {reason}")]
    Inconsistent {
        /// Position of the offending step
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

fn default_timer_seconds() -> u32 {
    DEFAULT_TIMER_SECONDS
}

fn default_initial_score() -> i64 {
    DEFAULT_INITIAL_SCORE
}

/// Global settings of a play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GameSettings {
    /// Length of the countdown in seconds
    #[serde(default = "default_timer_seconds")]
    #[garde(range(min = MIN_TIMER_SECONDS, max = MAX_TIMER_SECONDS))]
    pub timer_seconds: u32,
    /// Score at the start of the game
    #[serde(default = "default_initial_score")]
    #[garde(skip)]
    pub initial_score: i64,
    /// Number of hint tiers that may be unlocked across the whole game
    #[serde(default)]
    #[garde(range(max = MAX_HINTS_TOTAL))]
    pub max_hints_total: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            timer_seconds: DEFAULT_TIMER_SECONDS,
            initial_score: DEFAULT_INITIAL_SCORE,
            max_hints_total: 0,
        }
    }
}

/// The immutable definition of a whole game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Catalog {
    /// Global settings
    #[serde(default)]
    #[garde(dive)]
    pub game: GameSettings,
    /// Steps in play order
    #[garde(length(min = 1, max = MAX_STEPS_COUNT), dive)]
    pub steps: Vec<StepConfig>,
}

/// The type of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Pick one of several options
    MultipleChoice,
    /// Type a secret word
    Password,
    /// Label images
    DragDrop,
    /// Write a free-text opinion
    Textbox,
    /// Read and continue
    Info,
}

/// Definition of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepConfig {
    /// A multiple choice question
    #[serde(rename = "mcq")]
    MultipleChoice(#[garde(dive)] multiple_choice::StepConfig),
    /// A password puzzle
    Password(#[garde(dive)] password::StepConfig),
    /// An image labelling exercise
    DragDrop(#[garde(dive)] drag_drop::StepConfig),
    /// A free-text opinion
    Textbox(#[garde(dive)] textbox::StepConfig),
    /// An informational interstitial
    Info(#[garde(dive)] info::StepConfig),
}

/// Type-specific presentation of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepView {
    /// Multiple choice options
    MultipleChoice(multiple_choice::View),
    /// Password input
    Password(password::View),
    /// Drop slots and labels
    DragDrop(drag_drop::View),
    /// Opinion text area
    Textbox(textbox::View),
    /// Informational text
    Info(info::View),
}

impl StepConfig {
    /// The type of this step
    pub fn kind(&self) -> StepKind {
        match self {
            Self::MultipleChoice(_) => StepKind::MultipleChoice,
            Self::Password(_) => StepKind::Password,
            Self::DragDrop(_) => StepKind::DragDrop,
            Self::Textbox(_) => StepKind::Textbox,
            Self::Info(_) => StepKind::Info,
        }
    }

    /// The prompt fields shared by every step type
    pub fn prompt(&self) -> &Prompt {
        match self {
            Self::MultipleChoice(s) => &s.prompt,
            Self::Password(s) => &s.prompt,
            Self::DragDrop(s) => &s.prompt,
            Self::Textbox(s) => &s.prompt,
            Self::Info(s) => &s.prompt,
        }
    }

    /// Media this step displays in its prompt area
    pub fn display(&self) -> Display {
        self.prompt().media.display()
    }

    /// Checks cross-field rules that structural validation cannot express
    fn consistency(&self) -> Result<(), String> {
        match self {
            Self::MultipleChoice(s) => s.consistency(),
            Self::Password(s) => s.consistency(),
            Self::DragDrop(s) => s.consistency(),
            Self::Textbox(_) | Self::Info(_) => Ok(()),
        }
    }

    /// Builds the type-specific presentation for a record
    pub fn view(&self, record: &StepRecord, locked: bool) -> StepView {
        match self {
            Self::MultipleChoice(s) => StepView::MultipleChoice(s.view(record, locked)),
            Self::Password(s) => StepView::Password(s.view(record, locked)),
            Self::DragDrop(s) => StepView::DragDrop(s.view(record, locked)),
            Self::Textbox(s) => StepView::Textbox(s.view(record, locked)),
            Self::Info(s) => StepView::Info(s.view(locked)),
        }
    }
}

impl Catalog {
    /// Parses and validates a catalog document
    ///
    /// # Errors
    ///
    /// * `Error::Parse` - the document is not a catalog
    /// * `Error::Invalid` - a structural limit is violated
    /// * `Error::Inconsistent` - a step's answer does not fit its definition
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gameshow::steps::config::Catalog;
    ///
    /// let catalog = Catalog::from_json(
    ///     r#"{"game":{"timer_seconds":600},
    ///         "steps":[{"type":"info","title":"Welcome","text":"Good luck"}]}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(catalog.len(), 1);
    /// assert_eq!(catalog.game.initial_score, 100);
    /// ```
    pub fn from_json(document: &str) -> Result<Self, Error> {
        let catalog: Self = serde_json::from_str(document)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Runs structural validation followed by per-step consistency checks
    ///
    /// # Errors
    ///
    /// * `Error::Invalid` - a structural limit is violated
    /// * `Error::Inconsistent` - a step's answer does not fit its definition
    pub fn check(&self) -> Result<(), Error> {
        self.validate()?;
        for (index, step) in self.steps.iter().enumerate() {
            step.consistency()
                .map_err(|reason| Error::Inconsistent { index, reason })?;
        }
        Ok(())
    }

    /// Returns the step at `index`
    pub fn step(&self, index: usize) -> Option<&StepConfig> {
        self.steps.get(index)
    }

    /// Returns the number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Checks if the catalog contains no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::steps::common::HintTier;

    const DOCUMENT: &str = r#"{
        "game": {"timer_seconds": 1800, "initial_score": 100, "max_hints_total": 3},
        "steps": [
            {"id": 1, "type": "mcq", "title": "Stage 1", "question": "Pick one",
             "options": ["A", "B", "C", "D"], "answer": "B",
             "hints": {"25": "Not A", "50": "Second letter"}, "image": "xray.png"},
            {"id": 2, "type": "password", "title": "Stage 2", "question": "Magic word?",
             "password": "scalpel", "pdf_link": "/static/patient.pdf"},
            {"id": 3, "type": "dragdrop", "title": "Stage 3", "question": "Label",
             "images": ["a.png", "b.png"], "labels": ["Heart", "Lung"],
             "answer": {"a.png": "Heart", "b.png": "Lung"}},
            {"id": 4, "type": "textbox", "title": "Opinion", "question": "Thoughts?"},
            {"id": 5, "type": "info", "title": "Done", "text": "Diagnosis Confirmed\nWell played"}
        ]
    }"#;

    #[test]
    fn test_parse_full_catalog() {
        let catalog = Catalog::from_json(DOCUMENT).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.game.max_hints_total, 3);
        let kinds: Vec<StepKind> = catalog.steps.iter().map(StepConfig::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::MultipleChoice,
                StepKind::Password,
                StepKind::DragDrop,
                StepKind::Textbox,
                StepKind::Info
            ]
        );
        let first = catalog.step(0).unwrap();
        assert_eq!(first.prompt().hint(HintTier::Low), Some("Not A"));
        assert_eq!(first.display(), Display::Image("xray.png".to_string()));
    }

    #[test]
    fn test_defaults() {
        let catalog =
            Catalog::from_json(r#"{"steps":[{"type":"info","text":"hello"}]}"#).unwrap();
        assert_eq!(catalog.game, GameSettings::default());
        assert_eq!(catalog.game.timer_seconds, 1800);
    }

    #[test]
    fn test_empty_catalog_is_invalid() {
        assert!(matches!(
            Catalog::from_json(r#"{"steps":[]}"#),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_timer_is_invalid() {
        assert!(matches!(
            Catalog::from_json(r#"{"game":{"timer_seconds":0},"steps":[{"type":"info"}]}"#),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        assert!(matches!(
            Catalog::from_json(r#"{"steps":[{"type":"quiz"}]}"#),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_inconsistent_step_is_reported_with_index() {
        let document = r#"{"steps":[
            {"type":"info"},
            {"type":"mcq","options":["A","B"],"answer":"C"}
        ]}"#;
        assert!(matches!(
            Catalog::from_json(document),
            Err(Error::Inconsistent { index: 1, .. })
        ));
    }

    #[test]
    fn test_too_many_steps() {
        let catalog = Catalog {
            game: GameSettings::default(),
            steps: vec![
                StepConfig::Info(info::StepConfig {
                    prompt: Prompt::default(),
                    text: String::new(),
                });
                MAX_STEPS_COUNT + 1
            ],
        };
        assert!(catalog.check().is_err());
    }
}
