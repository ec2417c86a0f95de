//! Step types and catalog configuration
//!
//! This module contains the different step types a game is made of:
//! multiple choice questions, password puzzles, drag-and-drop labelling,
//! free-text opinions, and informational interstitials. Each step type has
//! its own definition, outcome evaluator, and view.

pub mod common;
pub mod config;
pub mod drag_drop;
pub mod info;
pub mod media;
pub mod multiple_choice;
pub mod password;
pub mod textbox;
