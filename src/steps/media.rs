//! Media references attached to steps
//!
//! Steps point at media by file name only; fetching and drawing the files is
//! left to the presentation layer. This module decides which of the attached
//! references a step actually displays.

use serde::{Deserialize, Serialize};
use serde_with::{OneOrMany, formats::PreferOne, serde_as, skip_serializing_none};

/// How the attached media should be laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// A row of animated images
    Gif,
    /// Scrollable stacks of image series
    ImageStacks,
}

/// Media references carried by a step definition
///
/// Every field is optional; a step may carry none of them.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    /// Explicit layout hint
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// A single still image
    #[serde(default)]
    pub image: Option<String>,
    /// One or more animated images
    #[serde_as(as = "OneOrMany<_, PreferOne>")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gif: Vec<String>,
    /// Image series, one inner list per stack
    #[serde(default)]
    pub stack_data: Option<Vec<Vec<String>>>,
    /// A document the player can open alongside the step
    #[serde(default)]
    pub pdf_link: Option<String>,
}

/// The media a step shows in its prompt area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Display {
    /// Nothing to show
    Nothing,
    /// A row of animated images
    Gifs(Vec<String>),
    /// Scrollable image series
    Stacks(Vec<Vec<String>>),
    /// A single still image
    Image(String),
}

impl Media {
    /// Picks what to display: GIFs first, then image stacks, then the still image
    ///
    /// A GIF layout without explicit GIF files falls back to the still image
    /// shown as a one-element row.
    pub fn display(&self) -> Display {
        match self.media_type {
            Some(MediaType::Gif) => {
                if !self.gif.is_empty() {
                    return Display::Gifs(self.gif.clone());
                }
                if let Some(image) = &self.image {
                    return Display::Gifs(vec![image.clone()]);
                }
                Display::Nothing
            }
            Some(MediaType::ImageStacks) if self.stack_data.is_some() => {
                Display::Stacks(self.stack_data.clone().unwrap_or_default())
            }
            _ => self
                .image
                .clone()
                .map_or(Display::Nothing, Display::Image),
        }
    }
}
