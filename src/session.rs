//! Driving a game against its collaborators
//!
//! The [`Game`] only describes the work it needs done as [`Effect`]s. This
//! module defines the [`Backend`] trait for the outside world (catalog
//! source, scoring service, renderer) and the [`Session`] shell that
//! interprets effects against a backend. Time is simulated: alarms are kept
//! in a queue and delivered when [`Session::advance_clock`] moves past them,
//! so a whole play-through can be replayed deterministically.

use std::collections::{BTreeMap, VecDeque};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use web_time::Duration;

use super::{
    game::{
        self, AlarmMessage, Effect, Game, IncomingMessage, OpinionSubmission, Response,
        ResultSubmission, Snapshot,
    },
    leaderboard::LeaderboardEntry,
    steps::config::{self, Catalog},
    team::{self, Team},
};

/// Failure reported by a backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The service could not be reached
    #[error("service unreachable: {0}")]
    Unreachable(String),
    /// The service refused the request
    #[error("service rejected the request: {0}")]
    Rejected(String),
}

/// Errors surfaced by a session
#[derive(Error, Debug)]
pub enum Error {
    /// The team identity was not accepted
    #[error(transparent)]
    Team(#[from] team::Error),
    /// The catalog could not be loaded
    #[error(transparent)]
    Catalog(#[from] config::Error),
    /// A backend call failed where no recovery is possible
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The game rejected a command
    #[error(transparent)]
    Game(#[from] game::Error),
}

/// The outside world as seen by a session
///
/// Implementations might talk HTTP to a scoring service and draw to a
/// screen; tests use an in-memory fake.
pub trait Backend {
    /// Fetches the catalog document
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the document cannot be retrieved.
    fn fetch_catalog(&mut self) -> Result<String, BackendError>;

    /// Stores an opinion
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the opinion was not stored.
    fn submit_opinion(&mut self, submission: &OpinionSubmission) -> Result<(), BackendError>;

    /// Stores the final result and returns the leaderboard
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the result was not stored.
    fn submit_result(
        &mut self,
        submission: &ResultSubmission,
    ) -> Result<Vec<LeaderboardEntry>, BackendError>;

    /// Fetches the current leaderboard
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the leaderboard cannot be retrieved.
    fn fetch_leaderboard(&mut self) -> Result<Vec<LeaderboardEntry>, BackendError>;

    /// Renders the game
    fn present(&mut self, snapshot: &Snapshot);

    /// Shows a transient message
    fn notify(&mut self, _message: &str) {}

    /// Plays the celebration effect
    fn celebrate(&mut self) {}
}

/// A game wired to a backend with a simulated clock
pub struct Session<B: Backend> {
    backend: B,
    game: Game,
    /// Simulated time since the session started
    now: Duration,
    /// Pending alarms keyed by due time, then by scheduling order
    alarms: BTreeMap<(Duration, u64), AlarmMessage>,
    sequence: u64,
}

impl<B: Backend> std::fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("game", &self.game)
            .field("now", &self.now)
            .field("alarms", &self.alarms.len())
            .finish_non_exhaustive()
    }
}

impl<B: Backend> Session<B> {
    /// Registers the team, loads the catalog, and starts the game
    ///
    /// # Arguments
    ///
    /// * `backend` - The collaborators of this session
    /// * `name` - Stored team name, if the player registered
    /// * `members` - Stored member names
    /// * `seed` - Seed for the game's randomness
    ///
    /// # Errors
    ///
    /// * `Error::Team` - the player must register first
    /// * `Error::Backend` - the catalog could not be fetched
    /// * `Error::Catalog` - the catalog is malformed
    #[instrument(skip(backend, members))]
    pub fn start<S: AsRef<str>>(
        mut backend: B,
        name: Option<&str>,
        members: &[S],
        seed: u64,
    ) -> Result<Self, Error> {
        let team = Team::register(name, members)?;
        let catalog = Catalog::from_json(&backend.fetch_catalog()?)?;
        info!(team = %team.name, steps = catalog.len(), "session loaded");

        let mut game = Game::new(catalog, team, seed);
        let effects = game.start()?;
        let mut session = Self {
            backend,
            game,
            now: Duration::ZERO,
            alarms: BTreeMap::new(),
            sequence: 0,
        };
        session.apply(effects);
        Ok(session)
    }

    /// The game being played
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Simulated time since the session started
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of alarms waiting to fire
    pub fn pending_alarms(&self) -> usize {
        self.alarms.len()
    }

    /// Forwards a player command to the game
    ///
    /// # Errors
    ///
    /// * `Error::Game` - the game rejected the command; nothing changed
    pub fn send(&mut self, message: IncomingMessage) -> Result<(), Error> {
        let effects = self.game.receive_message(message)?;
        self.apply(effects);
        Ok(())
    }

    /// Moves the simulated clock forward, firing every alarm that falls due
    ///
    /// Alarms fire in due order; alarms due at the same instant fire in the
    /// order they were scheduled.
    pub fn advance_clock(&mut self, elapsed: Duration) {
        let target = self.now.saturating_add(elapsed);
        while let Some(entry) = self.alarms.first_entry() {
            let (due, _) = *entry.key();
            if due > target {
                break;
            }
            let alarm = entry.remove();
            self.now = due;
            let effects = self.game.receive_alarm(alarm);
            self.apply(effects);
        }
        self.now = target;
    }

    fn schedule(&mut self, alarm: AlarmMessage, delay: Duration) {
        self.alarms
            .insert((self.now.saturating_add(delay), self.sequence), alarm);
        self.sequence += 1;
    }

    /// Interprets effects until none are left, then renders once if asked
    fn apply(&mut self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);
        let mut refresh = false;
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Schedule(alarm, delay) => self.schedule(alarm, delay),
                Effect::SubmitOpinion(submission) => {
                    let step = submission.step;
                    let response = match self.backend.submit_opinion(&submission) {
                        Ok(()) => Response::OpinionSaved { step },
                        Err(error) => {
                            warn!(%error, step, "could not store opinion");
                            Response::OpinionFailed { step }
                        }
                    };
                    queue.extend(self.game.receive_response(response));
                }
                Effect::SubmitResult(submission) => {
                    let response = match self.backend.submit_result(&submission) {
                        Ok(entries) => Response::ResultAccepted(entries),
                        Err(error) => {
                            warn!(%error, "could not store result");
                            Response::ResultFailed
                        }
                    };
                    queue.extend(self.game.receive_response(response));
                }
                Effect::FetchLeaderboard => match self.backend.fetch_leaderboard() {
                    Ok(entries) => {
                        queue.extend(self.game.receive_response(Response::Leaderboard(entries)));
                    }
                    Err(error) => debug!(%error, "leaderboard poll failed"),
                },
                Effect::Celebrate => self.backend.celebrate(),
                Effect::Notify(message) => self.backend.notify(&message),
                Effect::Refresh => refresh = true,
            }
        }
        if refresh {
            let snapshot = self.game.snapshot();
            self.backend.present(&snapshot);
        }
    }
}
