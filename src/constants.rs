//! Configuration constants for the game show
//!
//! This module contains the limits used to validate a step catalog and the
//! fixed rules of play (penalties, attempt limits, pacing delays) shared by
//! every session.

/// Catalog-wide limits
pub mod catalog {
    /// Maximum number of steps in a single catalog
    pub const MAX_STEPS_COUNT: usize = 100;
    /// Smallest accepted countdown, in seconds
    pub const MIN_TIMER_SECONDS: u32 = 1;
    /// Largest accepted countdown, in seconds
    pub const MAX_TIMER_SECONDS: u32 = 24 * 60 * 60;
    /// Largest accepted session-wide hint budget
    pub const MAX_HINTS_TOTAL: u32 = 100;
    /// Countdown used when the catalog does not name one
    pub const DEFAULT_TIMER_SECONDS: u32 = 1800;
    /// Starting score used when the catalog does not name one
    pub const DEFAULT_INITIAL_SCORE: i64 = 100;
}

/// Prompt text limits shared by every step type
pub mod prompt {
    /// Maximum length of a step title
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum length of a step question or body text
    pub const MAX_TEXT_LENGTH: usize = 4000;
    /// Maximum length of a hint text
    pub const MAX_HINT_LENGTH: usize = 1000;
}

/// Multiple choice step rules
pub mod multiple_choice {
    /// Minimum number of options
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of options
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single option
    pub const MAX_OPTION_LENGTH: usize = 200;
    /// Points lost per wrong selection
    pub const PENALTY: i64 = 10;
    /// Number of wrong options hidden by the 50/50 lifeline
    pub const FIFTY_FIFTY_REMOVALS: usize = 2;
}

/// Password step rules
pub mod password {
    /// Maximum length of the secret
    pub const MAX_SECRET_LENGTH: usize = 100;
    /// Points lost per wrong password
    pub const PENALTY: i64 = 15;
}

/// Drag-and-drop labelling step rules
pub mod drag_drop {
    /// Maximum number of images to label
    pub const MAX_IMAGE_COUNT: usize = 12;
    /// Maximum number of labels on offer
    pub const MAX_LABEL_COUNT: usize = 24;
    /// Maximum length of a single label
    pub const MAX_LABEL_LENGTH: usize = 100;
    /// Points lost per wrong submission
    pub const PENALTY: i64 = 15;
}

/// Free-text opinion step rules
pub mod textbox {
    /// Maximum length of a submitted opinion
    pub const MAX_TEXT_LENGTH: usize = 10_000;
}

/// Rules shared by every answerable step
pub mod attempts {
    /// Wrong attempts allowed before a step locks with the answer revealed
    pub const MAX_ATTEMPTS: u32 = 2;
}

/// Team identity limits
pub mod team {
    /// Maximum length of a team name in characters
    pub const MAX_NAME_LENGTH: usize = 30;
}

/// Pacing of the session
pub mod pacing {
    use web_time::Duration;

    /// Real-time length of one countdown unit
    pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
    /// Non-interactive delay before a newly unlocked step becomes active
    pub const TRANSITION_DELAY: Duration = Duration::from_millis(2500);
    /// Interval between leaderboard refreshes after the game ends
    pub const LEADERBOARD_POLL_INTERVAL: Duration = Duration::from_secs(3);
    /// Remaining seconds below which the clock is flagged as running low
    pub const LOW_TIME_THRESHOLD: u32 = 180;
}

/// Leaderboard display limits
pub mod leaderboard {
    /// Number of entries shown on the podium
    pub const PODIUM_SIZE: usize = 3;
    /// Maximum number of entries carried in a snapshot
    pub const DISPLAY_LIMIT: usize = 50;
}
