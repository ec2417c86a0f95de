//! Team identity intake
//!
//! The team name and member list come from an identity collaborator at
//! startup. A missing name means the player has not registered yet and has
//! to be sent to registration before a game can start.

use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::team::MAX_NAME_LENGTH;

/// Errors that can occur while accepting a team identity
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No usable team name was supplied
    #[error("team is not registered")]
    Unregistered,
    /// The name exceeds the maximum allowed length
    #[error("team name is too long")]
    TooLong,
    /// The name contains inappropriate content
    #[error("team name is inappropriate")]
    Inappropriate,
}

/// A registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name, also the key on the leaderboard
    pub name: String,
    /// Member names, possibly empty
    #[serde(default)]
    pub members: Vec<String>,
}

impl Team {
    /// Accepts a team identity after validation
    ///
    /// # Arguments
    ///
    /// * `name` - The stored team name, if any (will be trimmed of whitespace)
    /// * `members` - Member names; blank entries are dropped
    ///
    /// # Errors
    ///
    /// * `Error::Unregistered` - Name is missing or blank
    /// * `Error::TooLong` - Name exceeds the length limit
    /// * `Error::Inappropriate` - Name contains inappropriate content
    pub fn register<S: AsRef<str>>(name: Option<&str>, members: &[S]) -> Result<Self, Error> {
        let name = rustrict::trim_whitespace(name.ok_or(Error::Unregistered)?);
        if name.is_empty() {
            return Err(Error::Unregistered);
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::TooLong);
        }
        if name.is_inappropriate() {
            return Err(Error::Inappropriate);
        }
        let members = members
            .iter()
            .map(|member| rustrict::trim_whitespace(member.as_ref()))
            .filter(|member| !member.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Self {
            name: name.to_owned(),
            members,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    const NO_MEMBERS: [&str; 0] = [];

    #[test]
    fn test_register_trims_name() {
        let team = Team::register(Some("  Night Shift  "), &NO_MEMBERS).unwrap();
        assert_eq!(team.name, "Night Shift");
        assert!(team.members.is_empty());
    }

    #[test]
    fn test_missing_name_is_unregistered() {
        assert_eq!(Team::register(None, &NO_MEMBERS), Err(Error::Unregistered));
        assert_eq!(
            Team::register(Some(" \t "), &NO_MEMBERS),
            Err(Error::Unregistered)
        );
    }

    #[test]
    fn test_name_length_limit() {
        let max_name = "a".repeat(MAX_NAME_LENGTH);
        assert!(Team::register(Some(&max_name), &NO_MEMBERS).is_ok());

        let long_name = "a".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(
            Team::register(Some(&long_name), &NO_MEMBERS),
            Err(Error::TooLong)
        );
    }

    #[test]
    fn test_inappropriate_name() {
        assert_eq!(
            Team::register(Some("fuck"), &NO_MEMBERS),
            Err(Error::Inappropriate)
        );
    }

    #[test]
    fn test_members_are_cleaned() {
        let team = Team::register(Some("Residents"), &[" Ana ", "", "  ", "Ben"]).unwrap();
        assert_eq!(team.members, vec!["Ana".to_string(), "Ben".to_string()]);
    }
}
