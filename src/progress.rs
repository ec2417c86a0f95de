//! Frontier and browsing positions
//!
//! The active index is the furthest step the player has unlocked; the view
//! index is the step on screen. The view may wander back through completed
//! steps but never past the active one, and only an advancement moves the
//! frontier forward. Advancing goes through a transitioning phase that the
//! game resolves when its pacing alarm fires.

use serde::Serialize;
use thiserror::Error;

/// Where the play-through stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Steps accept input
    Playing,
    /// Pacing delay between a completed step and the next one
    Transitioning {
        /// The step that was just completed
        from: usize,
        /// The step about to become active
        to: usize,
    },
    /// The game has ended
    Finished,
}

/// What an accepted advancement leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The next step unlocks once the pacing delay passes
    Transition {
        /// The step about to become active
        to: usize,
    },
    /// The last step was completed; the game ends
    Finish,
}

/// Reasons an advancement is refused
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The player is browsing an earlier step
    #[error("only the frontier step can advance")]
    NotFrontier,
    /// The frontier step is not completed yet
    #[error("the current step is not completed")]
    Incomplete,
    /// An advancement is already under way
    #[error("already moving to the next step")]
    Transitioning,
    /// The game is over
    #[error("the game has finished")]
    Finished,
}

/// Active and view positions over a catalog of `count` steps
#[derive(Debug, Clone)]
pub struct Progress {
    active: usize,
    view: usize,
    count: usize,
    phase: Phase,
}

impl Progress {
    /// Starts at the first of `count` steps
    pub fn new(count: usize) -> Self {
        Self {
            active: 0,
            view: 0,
            count,
            phase: Phase::Playing,
        }
    }

    /// Index of the frontier step
    pub fn active(&self) -> usize {
        self.active
    }

    /// Index of the step on screen
    pub fn view(&self) -> usize {
        self.view
    }

    /// The current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the step on screen is the frontier
    pub fn is_frontier(&self) -> bool {
        self.view == self.active
    }

    /// Whether the step on screen rejects new input
    ///
    /// `completed` is the completion flag of the viewed step's record.
    pub fn is_locked(&self, completed: bool) -> bool {
        !self.is_frontier() || completed
    }

    /// Whether there is an earlier step to go back to
    pub fn can_go_back(&self) -> bool {
        self.view > 0
    }

    /// Moves the view one step back, stopping at the first step
    pub fn back(&mut self) -> usize {
        self.view = self.view.saturating_sub(1);
        self.view
    }

    /// Moves the view one step forward, stopping at the frontier
    pub fn forward(&mut self) -> usize {
        self.view = self.active.min(self.view + 1);
        self.view
    }

    /// Progress through the catalog, in whole percent
    pub fn percent(&self) -> usize {
        if self.count == 0 {
            return 0;
        }
        self.active * 100 / self.count
    }

    /// Starts moving past the frontier step
    ///
    /// `completed` is the completion flag of the frontier record.
    ///
    /// # Errors
    ///
    /// * `Error::Finished` - the game is over
    /// * `Error::Transitioning` - an advancement is already pending
    /// * `Error::NotFrontier` - the player is browsing
    /// * `Error::Incomplete` - the frontier step is not completed
    pub fn begin_advance(&mut self, completed: bool) -> Result<Advance, Error> {
        match self.phase {
            Phase::Finished => return Err(Error::Finished),
            Phase::Transitioning { .. } => return Err(Error::Transitioning),
            Phase::Playing => {}
        }
        if !self.is_frontier() {
            return Err(Error::NotFrontier);
        }
        if !completed {
            return Err(Error::Incomplete);
        }
        if self.active + 1 >= self.count {
            return Ok(Advance::Finish);
        }
        let to = self.active + 1;
        self.phase = Phase::Transitioning {
            from: self.active,
            to,
        };
        Ok(Advance::Transition { to })
    }

    /// Unlocks the step a pending transition was heading to
    ///
    /// Returns `false` for a stale or unexpected target, leaving everything
    /// unchanged.
    pub fn complete_transition(&mut self, to: usize) -> bool {
        match self.phase {
            Phase::Transitioning { to: pending, .. } if pending == to => {
                self.active = to;
                self.view = to;
                self.phase = Phase::Playing;
                true
            }
            _ => false,
        }
    }

    /// Marks the game as ended
    pub fn finish(&mut self) {
        self.phase = Phase::Finished;
    }
}
