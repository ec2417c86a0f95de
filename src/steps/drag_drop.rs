//! Drag-and-drop labelling step implementation
//!
//! The player drops one label onto each image. A submission is only judged
//! once every image carries a label, and it is right only if the whole
//! assignment matches. After a first miss the labels are cleared; after a
//! second the correct assignment is filled in and the step locks.

use std::collections::{BTreeMap, BTreeSet};

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::common::{Announcement, InputError, Outcome, Prompt};
use crate::{
    constants::drag_drop::{MAX_IMAGE_COUNT, MAX_LABEL_COUNT, MAX_LABEL_LENGTH, PENALTY},
    record::StepRecord,
};

/// Definition of a drag-and-drop step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StepConfig {
    /// Shared prompt fields
    #[serde(flatten)]
    #[garde(dive)]
    pub prompt: Prompt,
    /// Image keys, in display order
    #[garde(length(min = 1, max = MAX_IMAGE_COUNT), inner(length(min = 1)))]
    pub images: Vec<String>,
    /// Labels on offer
    #[garde(
        length(min = 1, max = MAX_LABEL_COUNT),
        inner(length(min = 1, max = MAX_LABEL_LENGTH))
    )]
    pub labels: Vec<String>,
    /// Correct label for every image
    #[garde(skip)]
    pub answer: BTreeMap<String, String>,
}

/// Presentation of one drop slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Image key
    pub image: String,
    /// Label currently dropped on the image
    pub label: Option<String>,
}

/// Presentation of one draggable label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelView {
    /// Label text
    pub text: String,
    /// Whether the label is already placed on some image
    pub used: bool,
}

/// Presentation of a drag-and-drop step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Slots in display order
    pub slots: Vec<SlotView>,
    /// Labels in display order
    pub labels: Vec<LabelView>,
    /// Whether labels can still be moved
    pub draggable: bool,
    /// Whether the submit control is shown
    pub submittable: bool,
}

impl StepConfig {
    /// Checks that the answer covers exactly the images and uses listed labels
    pub fn consistency(&self) -> Result<(), String> {
        if !self.images.iter().all_unique() {
            return Err("images must be distinct".to_owned());
        }
        let images: BTreeSet<&String> = self.images.iter().collect();
        let answered: BTreeSet<&String> = self.answer.keys().collect();
        if images != answered {
            return Err("answer must name a label for every image and nothing else".to_owned());
        }
        if let Some(label) = self
            .answer
            .values()
            .find(|label| !self.labels.contains(label))
        {
            return Err(format!("answer label {label:?} is not on offer"));
        }
        Ok(())
    }

    /// Checks that a label may be dropped on an image
    ///
    /// # Errors
    ///
    /// * `InputError::UnknownImage` - the image is not part of this step
    /// * `InputError::UnknownLabel` - the label is not on offer
    pub fn check_drop(&self, image: &str, label: &str) -> Result<(), InputError> {
        if !self.images.iter().any(|candidate| candidate == image) {
            return Err(InputError::UnknownImage);
        }
        if !self.labels.iter().any(|candidate| candidate == label) {
            return Err(InputError::UnknownLabel);
        }
        Ok(())
    }

    /// Decides the outcome of submitting the record's current assignment
    ///
    /// # Errors
    ///
    /// * `InputError::IncompleteAssignment` - some image has no label yet
    pub fn evaluate(&self, record: &StepRecord) -> Result<Outcome, InputError> {
        let assignment = &record.drag_assignment;
        if !self
            .images
            .iter()
            .all(|image| assignment.contains_key(image))
        {
            return Err(InputError::IncompleteAssignment);
        }
        let correct = self
            .answer
            .iter()
            .all(|(image, label)| assignment.get(image) == Some(label));
        if correct {
            Ok(Outcome::Solved)
        } else {
            Ok(Outcome::wrong(record.attempts, PENALTY))
        }
    }

    /// Applies the type-specific part of an outcome to the record
    pub fn settle(&self, outcome: Outcome, record: &mut StepRecord) {
        record.resolve(outcome);
        match outcome {
            Outcome::Missed { .. } => record.drag_assignment.clear(),
            Outcome::Exhausted { .. } => record.drag_assignment.clone_from(&self.answer),
            Outcome::Solved | Outcome::Acknowledged => {}
        }
    }

    /// The notice shown to the player for an outcome
    pub fn announce(&self, outcome: Outcome) -> Announcement {
        match outcome {
            Outcome::Exhausted { penalty } => Announcement::new(
                "FAILED",
                format!(
                    "Incorrect placement.\n-{penalty} Points.\nLabels corrected automatically."
                ),
            ),
            Outcome::Missed { penalty } => Announcement::new(
                "WRONG",
                format!("Incorrect placement.\n-{penalty} Points.\nLabels reset. Try again."),
            ),
            Outcome::Solved | Outcome::Acknowledged => {
                Announcement::new("CORRECT!", "Every label is in place.")
            }
        }
    }

    /// Builds the presentation of this step
    pub fn view(&self, record: &StepRecord, locked: bool) -> View {
        let placed: BTreeSet<&String> = record.drag_assignment.values().collect();
        View {
            slots: self
                .images
                .iter()
                .map(|image| SlotView {
                    image: image.clone(),
                    label: record.drag_assignment.get(image).cloned(),
                })
                .collect(),
            labels: self
                .labels
                .iter()
                .map(|label| LabelView {
                    text: label.clone(),
                    used: placed.contains(label),
                })
                .collect(),
            draggable: !locked,
            submittable: !locked,
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
                title: "Stage 3".to_string(),
                question: "Label the anatomy".to_string(),
                ..Prompt::default()
            },
            images: vec!["heart.png".into(), "lung.png".into()],
            labels: vec!["Heart".into(), "Lung".into(), "Liver".into()],
            answer: BTreeMap::from([
                ("heart.png".to_string(), "Heart".to_string()),
                ("lung.png".to_string(), "Lung".to_string()),
            ]),
        }
    }

    fn assign(record: &mut StepRecord, pairs: &[(&str, &str)]) {
        for (image, label) in pairs {
            record
                .drag_assignment
                .insert((*image).to_string(), (*label).to_string());
        }
    }

    #[test]
    fn test_step_is_consistent() {
        let step = create_test_step();
        assert!(step.validate().is_ok());
        assert!(step.consistency().is_ok());
    }

    #[test]
    fn test_answer_must_cover_images() {
        let mut step = create_test_step();
        step.answer.remove("lung.png");
        assert!(step.consistency().is_err());
    }

    #[test]
    fn test_answer_labels_must_be_offered() {
        let mut step = create_test_step();
        step.answer
            .insert("lung.png".to_string(), "Kidney".to_string());
        assert!(step.consistency().is_err());
    }

    #[test]
    fn test_incomplete_assignment_is_rejected() {
        let step = create_test_step();
        let mut record = StepRecord::default();
        assign(&mut record, &[("heart.png", "Heart")]);
        assert_eq!(step.evaluate(&record), Err(InputError::IncompleteAssignment));
        assert_eq!(record.attempts, 0);
    }

    #[test]
    fn test_wrong_twice_autocorrects() {
        let step = create_test_step();
        let mut record = StepRecord::default();

        assign(&mut record, &[("heart.png", "Lung"), ("lung.png", "Heart")]);
        let outcome = step.evaluate(&record).unwrap();
        assert_eq!(outcome, Outcome::Missed { penalty: 15 });
        step.settle(outcome, &mut record);
        assert!(record.drag_assignment.is_empty());
        assert!(!record.completed);

        assign(&mut record, &[("heart.png", "Liver"), ("lung.png", "Heart")]);
        let outcome = step.evaluate(&record).unwrap();
        assert_eq!(outcome, Outcome::Exhausted { penalty: 15 });
        step.settle(outcome, &mut record);
        assert!(record.completed && !record.success);
        assert_eq!(record.drag_assignment, step.answer);
    }

    #[test]
    fn test_correct_assignment() {
        let step = create_test_step();
        let mut record = StepRecord::default();
        assign(&mut record, &[("heart.png", "Heart"), ("lung.png", "Lung")]);
        let outcome = step.evaluate(&record).unwrap();
        assert_eq!(outcome, Outcome::Solved);
        step.settle(outcome, &mut record);
        assert!(record.completed && record.success);
        assert_eq!(record.drag_assignment.len(), 2);
    }

    #[test]
    fn test_check_drop() {
        let step = create_test_step();
        assert!(step.check_drop("heart.png", "Liver").is_ok());
        assert_eq!(
            step.check_drop("brain.png", "Heart"),
            Err(InputError::UnknownImage)
        );
        assert_eq!(
            step.check_drop("heart.png", "Brain"),
            Err(InputError::UnknownLabel)
        );
    }

    #[test]
    fn test_view_marks_used_labels() {
        let step = create_test_step();
        let mut record = StepRecord::default();
        assign(&mut record, &[("lung.png", "Lung")]);
        let view = step.view(&record, false);
        assert_eq!(view.slots[0].label, None);
        assert_eq!(view.slots[1].label.as_deref(), Some("Lung"));
        assert!(view.labels[1].used);
        assert!(!view.labels[0].used);
        assert!(view.submittable);
        assert!(!step.view(&record, true).draggable);
    }
}
