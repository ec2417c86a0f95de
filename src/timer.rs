//! Countdown clock of a play-through
//!
//! The timer counts whole seconds down from the configured duration. It is
//! driven from outside by one tick per second; it never reads the wall
//! clock itself.

use serde::Serialize;

use crate::constants::pacing::LOW_TIME_THRESHOLD;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tick {
    /// The timer is paused; nothing changed
    Paused,
    /// One second elapsed, with this many left
    Running(u32),
    /// The last second elapsed; the timer is now stopped
    Expired,
    /// The timer was already stopped
    Stopped,
}

/// A pausable countdown
#[derive(Debug, Clone)]
pub struct Timer {
    duration: u32,
    left: u32,
    paused: bool,
    stopped: bool,
}

impl Timer {
    /// Creates a running timer of `duration` seconds
    pub fn new(duration: u32) -> Self {
        Self {
            duration,
            left: duration,
            paused: false,
            stopped: false,
        }
    }

    /// Advances the clock by one second unless paused or stopped
    ///
    /// Expiry is reported exactly once; the timer stops permanently when it
    /// reaches zero.
    pub fn tick(&mut self) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }
        if self.paused {
            return Tick::Paused;
        }
        self.left = self.left.saturating_sub(1);
        if self.left == 0 {
            self.stopped = true;
            Tick::Expired
        } else {
            Tick::Running(self.left)
        }
    }

    /// Pauses the countdown; pausing twice is the same as pausing once
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes the countdown; resuming twice is the same as resuming once
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Stops the countdown for good
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Seconds remaining
    pub fn left(&self) -> u32 {
        self.left
    }

    /// Seconds elapsed since the start
    pub fn elapsed(&self) -> u32 {
        self.duration - self.left
    }

    /// Whether the countdown is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the countdown has stopped for good
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether little time is left
    pub fn is_low(&self) -> bool {
        self.left < LOW_TIME_THRESHOLD
    }

    /// Remaining time rendered as `MM:SS`
    pub fn format(&self) -> String {
        clock(u64::from(self.left))
    }
}

/// Renders a number of seconds as `MM:SS`
pub fn clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
