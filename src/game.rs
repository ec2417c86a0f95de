//! Core game logic and state management
//!
//! This module contains the [`Game`] struct, the progression and outcome
//! state machine of a single play-through. Player commands, alarms, and
//! responses from the scoring service go in; a list of [`Effect`]s comes
//! out for an outer shell to interpret. The game itself never waits,
//! sleeps, or talks to the network, so every transition is deterministic.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use web_time::Duration;

use super::{
    TruncatedVec,
    constants::pacing::{LEADERBOARD_POLL_INTERVAL, TICK_INTERVAL, TRANSITION_DELAY},
    leaderboard::{Leaderboard, LeaderboardEntry, PodiumPlace},
    lifeline::{self, Lifeline, Lifelines, Status, Unlock},
    progress::{self, Advance, Phase, Progress},
    record::{Records, StepRecord},
    score::{Cause, ScoreTracker},
    steps::{
        common::{Announcement, HintTier, InputError, Outcome},
        config::{Catalog, StepConfig, StepKind, StepView},
        media::Display,
    },
    team::Team,
    timer::{self, Tick, Timer},
};

/// Commands issued by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingMessage {
    /// Browse one step back
    Back,
    /// Browse one step forward, up to the frontier
    Forward,
    /// Move past the completed frontier step
    Advance,
    /// Pick an option on a multiple choice step
    SelectOption(String),
    /// Enter a password
    SubmitPassword(String),
    /// Drop a label on an image
    AssignLabel {
        /// Image key
        image: String,
        /// Label text
        label: String,
    },
    /// Submit the current label assignment
    SubmitAssignment,
    /// Replace the draft of an opinion step
    EditText(String),
    /// Send the opinion draft
    SubmitText,
    /// Continue past an informational step
    Acknowledge,
    /// Open the hint dialog
    OpenHint,
    /// Unlock or re-view a hint tier inside the hint dialog
    UnlockHint(HintTier),
    /// Spend the 50/50
    UseFiftyFifty,
    /// Spend the call and open its dialog
    OpenCall,
    /// Close whichever dialog is open
    Dismiss,
    /// Send the final result again after a failed submission
    RetryResult,
}

/// Alarm messages for timed events
///
/// Alarms are requested through [`Effect::Schedule`] and delivered back by
/// the shell once their delay has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second of the countdown
    Tick,
    /// The pacing delay before a step unlocks has passed
    Transition {
        /// The step to unlock
        to: usize,
    },
    /// Time to refresh the leaderboard
    PollLeaderboard,
}

/// Replies from the scoring service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// An opinion was stored
    OpinionSaved {
        /// The step the opinion belongs to
        step: usize,
    },
    /// An opinion could not be stored
    OpinionFailed {
        /// The step the opinion belongs to
        step: usize,
    },
    /// The final result was stored; carries the leaderboard
    ResultAccepted(Vec<LeaderboardEntry>),
    /// The final result could not be stored
    ResultFailed,
    /// A leaderboard poll came back
    Leaderboard(Vec<LeaderboardEntry>),
}

/// Payload of an opinion submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpinionSubmission {
    /// The step the opinion belongs to, echoed back in the response
    #[serde(skip)]
    pub step: usize,
    /// Team name
    pub team: String,
    /// Trimmed opinion text
    pub text: String,
}

/// Payload of the final result submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSubmission {
    /// Team name
    pub team: String,
    /// Final score
    pub score: i64,
    /// Seconds spent before the game ended
    pub time_spent: u64,
}

/// Work requested from the outer shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver the alarm back after the delay
    Schedule(AlarmMessage, Duration),
    /// Send an opinion to the scoring service
    SubmitOpinion(OpinionSubmission),
    /// Send the final result to the scoring service
    SubmitResult(ResultSubmission),
    /// Request a fresh leaderboard
    FetchLeaderboard,
    /// Play the celebration effect
    Celebrate,
    /// Show a transient message
    Notify(String),
    /// Re-render from [`Game::snapshot`]
    Refresh,
}

/// Errors raised when a command is rejected
///
/// A rejected command leaves the game untouched.
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The game was already started
    #[error("game has already started")]
    AlreadyStarted,
    /// The game was not started yet
    #[error("game has not started")]
    NotStarted,
    /// The game is over
    #[error("the game has finished")]
    Finished,
    /// A step is about to unlock
    #[error("moving to the next step")]
    Transitioning,
    /// A dialog is open
    #[error("a dialog is open")]
    Busy,
    /// There is no dialog to close
    #[error("no dialog is open")]
    NoModal,
    /// Hints can only be unlocked from the hint dialog
    #[error("the hint dialog is not open")]
    HintClosed,
    /// The viewed step accepts no new input
    #[error("this step is locked")]
    Locked,
    /// The command does not fit the viewed step
    #[error("command does not apply to this step type")]
    WrongStepType,
    /// An opinion submission is still pending
    #[error("a submission is pending")]
    Submitting,
    /// There is no failed result submission
    #[error("no result submission to retry")]
    NothingToRetry,
    /// The input was rejected
    #[error(transparent)]
    Input(#[from] InputError),
    /// The lifeline cannot be used
    #[error(transparent)]
    Lifeline(#[from] lifeline::Error),
    /// The advancement was refused
    #[error(transparent)]
    Progress(#[from] progress::Error),
}

/// A blocking dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Modal {
    /// A step was completed successfully; dismissing moves on
    Success(Announcement),
    /// A step was answered wrongly; dismissing returns to it
    Result(Announcement),
    /// The hint dialog, with the tier currently shown
    Hint {
        /// The tier whose text is shown
        revealed: Option<HintTier>,
    },
    /// The call dialog
    Call,
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EndReason {
    /// The last step was completed
    Completed,
    /// The countdown ran out
    Expired,
}

/// State of the final result submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Submission {
    /// Waiting for the scoring service
    Pending,
    /// The scoring service failed; can be retried
    Failed,
    /// The scoring service stored the result
    Accepted,
}

/// The fixed outcome of a finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ending {
    /// Why the game ended
    pub reason: EndReason,
    /// Score at the end
    pub score: i64,
    /// Seconds spent
    pub time_spent: u64,
    /// State of the result submission
    pub submission: Submission,
}

impl Ending {
    fn submission_for(&self, team: &Team) -> ResultSubmission {
        ResultSubmission {
            team: team.name.clone(),
            score: self.score,
            time_spent: self.time_spent,
        }
    }
}

/// Countdown display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clock {
    /// Seconds remaining
    pub seconds_left: u32,
    /// Remaining time as `MM:SS`
    pub display: String,
    /// Whether the low-time warning is on
    pub low: bool,
    /// Whether the countdown is paused
    pub paused: bool,
}

/// Position in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    /// Frontier index
    pub active: usize,
    /// Viewed index
    pub view: usize,
    /// Number of steps
    pub count: usize,
    /// Frontier progress in whole percent
    pub percent: usize,
}

/// Lifeline buttons of the viewed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifelineBar {
    /// Hint button
    pub hint: Status,
    /// 50/50 button
    pub fifty_fifty: Status,
    /// Call button
    pub call: Status,
    /// Hints left in the whole game
    pub hints_left: u32,
}

/// The viewed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSnapshot {
    /// Step index
    pub index: usize,
    /// Step type
    pub kind: StepKind,
    /// Heading
    pub title: String,
    /// Question or instruction
    pub question: String,
    /// Media to show
    pub display: Display,
    /// Type-specific presentation
    pub view: StepView,
    /// Whether the step rejects new input
    pub locked: bool,
    /// Wrong attempts so far
    pub attempts: u32,
    /// Lifeline buttons
    pub lifelines: LifelineBar,
}

/// The forward navigation control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NextButton {
    /// Not shown
    Hidden,
    /// Browse forward through completed steps
    Browse,
    /// Move past the completed frontier step
    NextStage,
}

/// Navigation controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Whether going back is possible
    pub back: bool,
    /// The forward control
    pub next: NextButton,
}

/// One tile of the hint dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HintTile {
    /// The tier
    pub tier: HintTier,
    /// Cost of a first unlock
    pub cost: i64,
    /// Already unlocked on this step; viewing again is free
    pub unlocked: bool,
    /// Whether the tile can be chosen
    pub available: bool,
}

/// Contents of the hint dialog
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintDialog {
    /// Hints left in the whole game
    pub hints_left: u32,
    /// One tile per tier
    pub tiles: Vec<HintTile>,
    /// The text of the chosen tier
    pub revealed: Option<String>,
}

/// Presentation of the open dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModalView {
    /// Success notice
    Success(Announcement),
    /// Wrong answer notice
    Result(Announcement),
    /// Hint dialog
    Hint(HintDialog),
    /// Call dialog
    Call,
}

/// Final screen contents
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Why the game ended
    pub reason: EndReason,
    /// Final score
    pub score: i64,
    /// Seconds spent
    pub time_spent: u64,
    /// Time spent as `MM:SS`
    pub time_display: String,
    /// State of the result submission
    pub submission: Submission,
    /// Top three in display order
    pub podium: Vec<PodiumPlace>,
    /// Leading entries of the leaderboard
    pub leaderboard: TruncatedVec<LeaderboardEntry>,
    /// Rank of this team, 0-indexed, once listed
    pub position: Option<usize>,
}

/// Everything needed to render the game
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// The playing team
    pub team: Team,
    /// Current score
    pub score: i64,
    /// Countdown
    pub clock: Clock,
    /// Position in the catalog
    pub progress: ProgressView,
    /// Current phase
    pub phase: Phase,
    /// The viewed step, while the game runs
    pub step: Option<StepSnapshot>,
    /// Navigation controls
    pub navigation: Navigation,
    /// The open dialog
    pub modal: Option<ModalView>,
    /// Final screen, once the game ended
    pub summary: Option<Summary>,
}

/// A single play-through
///
/// The game owns every piece of session state: the frontier and view
/// positions, one record per visited step, the score, the countdown, and
/// the lifeline pool. It is mutated only through [`Game::receive_message`],
/// [`Game::receive_alarm`], and [`Game::receive_response`].
pub struct Game {
    /// The immutable game definition
    catalog: Catalog,
    /// The playing team
    team: Team,
    /// Frontier and view positions
    progress: Progress,
    /// One record per visited step
    records: Records,
    /// Running score
    score: ScoreTracker,
    /// Countdown
    timer: Timer,
    /// Session-wide lifeline consumption
    lifelines: Lifelines,
    /// The open dialog
    modal: Option<Modal>,
    /// Set once, when the game ends
    ending: Option<Ending>,
    /// Latest leaderboard from the scoring service
    leaderboard: Leaderboard,
    /// Whether the countdown was started
    started: bool,
    /// Randomness for the 50/50
    rng: fastrand::Rng,
}

impl Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("team", &self.team.name)
            .field("progress", &self.progress)
            .field("score", &self.score.value())
            .finish_non_exhaustive()
    }
}

// Convenience methods
impl Game {
    /// Fails unless the game accepts commands right now
    fn ensure_interactive(&self) -> Result<(), Error> {
        match self.progress.phase() {
            Phase::Finished => Err(Error::Finished),
            Phase::Transitioning { .. } => Err(Error::Transitioning),
            Phase::Playing if self.modal.is_some() => Err(Error::Busy),
            Phase::Playing => Ok(()),
        }
    }

    /// Whether the frontier step waits for an opinion acknowledgement
    fn is_submitting(&self) -> bool {
        self.records
            .get(self.progress.active())
            .is_some_and(|record| record.submitting)
    }

    /// Whether the viewed step is the uncompleted frontier
    fn is_open(&self) -> bool {
        !self
            .progress
            .is_locked(self.records.is_completed(self.progress.view()))
    }

    /// Returns the viewed index if it accepts a step command
    fn ensure_open(&self) -> Result<usize, Error> {
        self.ensure_interactive()?;
        if !self.is_open() {
            return Err(Error::Locked);
        }
        if self.is_submitting() {
            return Err(Error::Submitting);
        }
        Ok(self.progress.view())
    }

    /// Type of the viewed step
    fn viewed_kind(&self) -> Result<StepKind, Error> {
        self.catalog
            .step(self.progress.view())
            .map(StepConfig::kind)
            .ok_or(Error::WrongStepType)
    }

    /// Applies an outcome's score change and opens its notice
    fn resolve(
        &mut self,
        index: usize,
        outcome: Outcome,
        announcement: Announcement,
    ) -> Vec<Effect> {
        let penalty = outcome.penalty();
        if penalty != 0 {
            self.score.add(-penalty, Cause::WrongAnswer { step: index });
        }
        debug!(step = index, ?outcome, score = self.score.value(), "step resolved");

        self.timer.pause();
        let mut effects = Vec::new();
        if outcome.succeeded() {
            self.modal = Some(Modal::Success(announcement));
            effects.push(Effect::Celebrate);
        } else {
            self.modal = Some(Modal::Result(announcement));
        }
        effects.push(Effect::Refresh);
        effects
    }

    /// Ends the game; later calls do nothing
    fn end(&mut self, reason: EndReason) -> Vec<Effect> {
        if self.ending.is_some() {
            return Vec::new();
        }
        self.timer.stop();
        self.modal = None;
        self.progress.finish();

        let ending = Ending {
            reason,
            score: self.score.value(),
            time_spent: u64::from(self.timer.elapsed()),
            submission: Submission::Pending,
        };
        info!(
            team = %self.team.name,
            ?reason,
            score = ending.score,
            time_spent = ending.time_spent,
            "game ended"
        );
        let submission = ending.submission_for(&self.team);
        self.ending = Some(ending);

        vec![Effect::SubmitResult(submission), Effect::Refresh]
    }
}

impl Game {
    /// Creates a game for a team from a validated catalog
    ///
    /// `seed` drives the choice of options hidden by the 50/50, so a game
    /// created twice with the same seed behaves identically.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gameshow::game::{Game, IncomingMessage};
    /// use gameshow::steps::config::Catalog;
    /// use gameshow::team::Team;
    ///
    /// let catalog = Catalog::from_json(
    ///     r#"{"steps":[{"type":"mcq","options":["A","B"],"answer":"B"}]}"#,
    /// )
    /// .unwrap();
    /// let team = Team::register(Some("Residents"), &["Ana"]).unwrap();
    /// let mut game = Game::new(catalog, team, 7);
    /// game.start().unwrap();
    /// game.receive_message(IncomingMessage::SelectOption("A".to_string()))
    ///     .unwrap();
    /// assert_eq!(game.score(), 90);
    /// ```
    pub fn new(catalog: Catalog, team: Team, seed: u64) -> Self {
        let settings = catalog.game;
        let mut records = Records::default();
        records.visit(0);
        Self {
            progress: Progress::new(catalog.len()),
            catalog,
            team,
            records,
            score: ScoreTracker::new(settings.initial_score),
            timer: Timer::new(settings.timer_seconds),
            lifelines: Lifelines::new(settings.max_hints_total),
            modal: None,
            ending: None,
            leaderboard: Leaderboard::default(),
            started: false,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Starts the countdown
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyStarted` - the game was started before
    pub fn start(&mut self) -> Result<Vec<Effect>, Error> {
        if self.started {
            return Err(Error::AlreadyStarted);
        }
        self.started = true;
        info!(
            team = %self.team.name,
            steps = self.catalog.len(),
            timer_seconds = self.timer.left(),
            "game started"
        );
        Ok(vec![
            Effect::Schedule(AlarmMessage::Tick, TICK_INTERVAL),
            Effect::Refresh,
        ])
    }

    /// The game definition
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The playing team
    pub fn team(&self) -> &Team {
        &self.team
    }

    /// Current score
    pub fn score(&self) -> i64 {
        self.score.value()
    }

    /// The score and its history
    pub fn score_tracker(&self) -> &ScoreTracker {
        &self.score
    }

    /// The countdown
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Frontier and view positions
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// The record of a visited step
    pub fn record(&self, index: usize) -> Option<&StepRecord> {
        self.records.get(index)
    }

    /// Session-wide lifeline consumption
    pub fn lifelines(&self) -> &Lifelines {
        &self.lifelines
    }

    /// The open dialog
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// How the game ended, once it has
    pub fn ending(&self) -> Option<&Ending> {
        self.ending.as_ref()
    }

    /// Latest leaderboard
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Handles a player command
    ///
    /// # Errors
    ///
    /// * `Error::NotStarted` - [`Game::start`] was not called yet
    ///
    /// Otherwise returns an [`Error`] describing why the command was
    /// rejected; the game is left unchanged in that case.
    #[instrument(skip(self))]
    pub fn receive_message(&mut self, message: IncomingMessage) -> Result<Vec<Effect>, Error> {
        if !self.started {
            return Err(Error::NotStarted);
        }
        match message {
            IncomingMessage::Back => self.navigate(Progress::back),
            IncomingMessage::Forward => self.navigate(Progress::forward),
            IncomingMessage::Advance => self.advance(),
            IncomingMessage::SelectOption(option) => self.select_option(&option),
            IncomingMessage::SubmitPassword(input) => self.submit_password(&input),
            IncomingMessage::AssignLabel { image, label } => self.assign_label(image, label),
            IncomingMessage::SubmitAssignment => self.submit_assignment(),
            IncomingMessage::EditText(text) => self.edit_text(text),
            IncomingMessage::SubmitText => self.submit_text(),
            IncomingMessage::Acknowledge => self.acknowledge(),
            IncomingMessage::OpenHint => self.open_hint(),
            IncomingMessage::UnlockHint(tier) => self.unlock_hint(tier),
            IncomingMessage::UseFiftyFifty => self.use_fifty_fifty(),
            IncomingMessage::OpenCall => self.open_call(),
            IncomingMessage::Dismiss => self.dismiss(),
            IncomingMessage::RetryResult => self.retry_result(),
        }
    }

    /// Handles an alarm whose delay has passed
    ///
    /// Stale alarms (a transition after the game ended, a poll before the
    /// result was accepted) and alarms before the start are ignored.
    #[instrument(skip(self))]
    pub fn receive_alarm(&mut self, message: AlarmMessage) -> Vec<Effect> {
        if !self.started {
            return Vec::new();
        }
        match message {
            AlarmMessage::Tick => match self.timer.tick() {
                Tick::Running(_) => vec![
                    Effect::Schedule(AlarmMessage::Tick, TICK_INTERVAL),
                    Effect::Refresh,
                ],
                Tick::Paused => vec![Effect::Schedule(AlarmMessage::Tick, TICK_INTERVAL)],
                Tick::Expired => {
                    info!("time is up");
                    self.end(EndReason::Expired)
                }
                Tick::Stopped => Vec::new(),
            },
            AlarmMessage::Transition { to } => {
                if self.progress.complete_transition(to) {
                    self.records.visit(to);
                    info!(step = to, "step unlocked");
                    vec![Effect::Refresh]
                } else {
                    debug!(to, "ignoring stale transition");
                    Vec::new()
                }
            }
            AlarmMessage::PollLeaderboard => match &self.ending {
                Some(ending) if ending.submission == Submission::Accepted => vec![
                    Effect::FetchLeaderboard,
                    Effect::Schedule(AlarmMessage::PollLeaderboard, LEADERBOARD_POLL_INTERVAL),
                ],
                _ => Vec::new(),
            },
        }
    }

    /// Handles a reply from the scoring service
    ///
    /// Replies that no longer match the game's state are ignored.
    #[instrument(skip(self))]
    pub fn receive_response(&mut self, response: Response) -> Vec<Effect> {
        match response {
            Response::OpinionSaved { step } => self.opinion_saved(step),
            Response::OpinionFailed { step } => {
                let Some(record) = self
                    .records
                    .get_mut(step)
                    .filter(|record| record.submitting)
                else {
                    return Vec::new();
                };
                record.submitting = false;
                warn!(step, "opinion submission failed");
                vec![
                    Effect::Notify("Error saving. Try again.".to_owned()),
                    Effect::Refresh,
                ]
            }
            Response::ResultAccepted(entries) => {
                let Some(ending) = self
                    .ending
                    .as_mut()
                    .filter(|ending| ending.submission == Submission::Pending)
                else {
                    return Vec::new();
                };
                ending.submission = Submission::Accepted;
                self.leaderboard = Leaderboard::new(entries);
                info!(entries = self.leaderboard.len(), "result accepted");
                vec![
                    Effect::Schedule(AlarmMessage::PollLeaderboard, LEADERBOARD_POLL_INTERVAL),
                    Effect::Refresh,
                ]
            }
            Response::ResultFailed => {
                let Some(ending) = self
                    .ending
                    .as_mut()
                    .filter(|ending| ending.submission == Submission::Pending)
                else {
                    return Vec::new();
                };
                ending.submission = Submission::Failed;
                warn!("result submission failed");
                vec![
                    Effect::Notify("Could not submit the final score. Try again.".to_owned()),
                    Effect::Refresh,
                ]
            }
            Response::Leaderboard(entries) => {
                if self.ending.is_none() {
                    return Vec::new();
                }
                self.leaderboard = Leaderboard::new(entries);
                vec![Effect::Refresh]
            }
        }
    }

    fn navigate(&mut self, step: fn(&mut Progress) -> usize) -> Result<Vec<Effect>, Error> {
        self.ensure_interactive()?;
        if self.is_submitting() {
            return Err(Error::Submitting);
        }
        let view = step(&mut self.progress);
        debug!(view, "viewing step");
        Ok(vec![Effect::Refresh])
    }

    fn advance(&mut self) -> Result<Vec<Effect>, Error> {
        self.ensure_interactive()?;
        let from = self.progress.active();
        match self.progress.begin_advance(self.records.is_completed(from))? {
            Advance::Transition { to } => {
                info!(from, to, "advancing");
                Ok(vec![
                    Effect::Schedule(AlarmMessage::Transition { to }, TRANSITION_DELAY),
                    Effect::Refresh,
                ])
            }
            Advance::Finish => Ok(self.end(EndReason::Completed)),
        }
    }

    fn select_option(&mut self, option: &str) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::MultipleChoice(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let record = self.records.visit(index);
        let outcome = step.evaluate(option, record)?;
        step.settle(option, outcome, record);
        let announcement = step.announce(outcome, record);
        Ok(self.resolve(index, outcome, announcement))
    }

    fn submit_password(&mut self, input: &str) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::Password(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let record = self.records.visit(index);
        let outcome = step.evaluate(input, record)?;
        step.settle(input, outcome, record);
        let announcement = step.announce(outcome, record);
        Ok(self.resolve(index, outcome, announcement))
    }

    fn assign_label(&mut self, image: String, label: String) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::DragDrop(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        step.check_drop(&image, &label)?;
        self.records
            .visit(index)
            .drag_assignment
            .insert(image, label);
        Ok(vec![Effect::Refresh])
    }

    fn submit_assignment(&mut self) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::DragDrop(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let record = self.records.visit(index);
        let outcome = step.evaluate(record)?;
        step.settle(outcome, record);
        let announcement = step.announce(outcome);
        Ok(self.resolve(index, outcome, announcement))
    }

    fn edit_text(&mut self, text: String) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        if !matches!(self.catalog.step(index), Some(StepConfig::Textbox(_))) {
            return Err(Error::WrongStepType);
        }
        self.records.visit(index).text_value = text;
        Ok(vec![Effect::Refresh])
    }

    fn submit_text(&mut self) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::Textbox(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let record = self.records.visit(index);
        let text = step.prepare(record)?;
        record.submitting = true;
        debug!(step = index, "submitting opinion");
        Ok(vec![
            Effect::SubmitOpinion(OpinionSubmission {
                step: index,
                team: self.team.name.clone(),
                text,
            }),
            Effect::Refresh,
        ])
    }

    fn opinion_saved(&mut self, index: usize) -> Vec<Effect> {
        if self.ending.is_some() {
            return Vec::new();
        }
        let Some(StepConfig::Textbox(step)) = self.catalog.step(index) else {
            return Vec::new();
        };
        let Some(record) = self
            .records
            .get_mut(index)
            .filter(|record| record.submitting)
        else {
            return Vec::new();
        };
        let outcome = step.evaluate();
        step.settle(outcome, record);
        let announcement = step.announce();
        info!(step = index, "opinion saved");
        self.resolve(index, outcome, announcement)
    }

    fn acknowledge(&mut self) -> Result<Vec<Effect>, Error> {
        let index = self.ensure_open()?;
        let Some(StepConfig::Info(step)) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let outcome = step.evaluate();
        self.records.visit(index).resolve(outcome);
        debug!(step = index, "acknowledged");
        self.advance()
    }

    fn open_hint(&mut self) -> Result<Vec<Effect>, Error> {
        self.ensure_interactive()?;
        let index = self.progress.view();
        self.lifelines.open_hints(self.viewed_kind()?, self.is_open())?;
        let revisitable = self
            .records
            .get(index)
            .is_some_and(|record| record.hint_unlocked.values().any(|unlocked| *unlocked));
        if self.lifelines.hints_left() == 0 && !revisitable {
            return Err(lifeline::Error::HintBudgetExhausted.into());
        }
        self.modal = Some(Modal::Hint { revealed: None });
        self.timer.pause();
        Ok(vec![Effect::Refresh])
    }

    fn unlock_hint(&mut self, tier: HintTier) -> Result<Vec<Effect>, Error> {
        if !matches!(self.modal, Some(Modal::Hint { .. })) {
            return Err(Error::HintClosed);
        }
        let index = self.progress.view();
        let open = self.is_open();
        let Some(step) = self.catalog.step(index) else {
            return Err(Error::WrongStepType);
        };
        let record = self.records.visit(index);
        let unlock = self
            .lifelines
            .unlock_hint(step.kind(), open, tier, step.prompt(), record)?;
        if let Unlock::Purchased { cost, .. } = unlock {
            self.score
                .add(-cost, Cause::HintPurchase { step: index, tier });
        }
        debug!(
            step = index,
            %tier,
            hint = unlock.text(),
            hints_left = self.lifelines.hints_left(),
            "hint revealed"
        );
        self.modal = Some(Modal::Hint {
            revealed: Some(tier),
        });
        Ok(vec![Effect::Refresh])
    }

    fn use_fifty_fifty(&mut self) -> Result<Vec<Effect>, Error> {
        self.ensure_interactive()?;
        let index = self.progress.view();
        let open = self.is_open();
        let step = match self.catalog.step(index) {
            Some(StepConfig::MultipleChoice(step)) => Some(step),
            _ => None,
        };
        let record = self.records.visit(index);
        let removed = self
            .lifelines
            .fifty_fifty(step, open, record, &mut self.rng)?;
        debug!(step = index, ?removed, "fifty-fifty used");
        Ok(vec![Effect::Refresh])
    }

    fn open_call(&mut self) -> Result<Vec<Effect>, Error> {
        self.ensure_interactive()?;
        let index = self.progress.view();
        let open = self.is_open();
        let kind = self.viewed_kind()?;
        self.lifelines
            .call(kind, open, self.records.visit(index))?;
        debug!(step = index, "call used");
        self.modal = Some(Modal::Call);
        self.timer.pause();
        Ok(vec![Effect::Refresh])
    }

    fn dismiss(&mut self) -> Result<Vec<Effect>, Error> {
        let Some(modal) = self.modal.take() else {
            return Err(Error::NoModal);
        };
        self.timer.resume();
        match modal {
            Modal::Success(_) => self.advance(),
            Modal::Result(_) | Modal::Hint { .. } | Modal::Call => Ok(vec![Effect::Refresh]),
        }
    }

    fn retry_result(&mut self) -> Result<Vec<Effect>, Error> {
        match &mut self.ending {
            Some(ending) if ending.submission == Submission::Failed => {
                ending.submission = Submission::Pending;
                info!("retrying result submission");
                Ok(vec![
                    Effect::SubmitResult(ending.submission_for(&self.team)),
                    Effect::Refresh,
                ])
            }
            _ => Err(Error::NothingToRetry),
        }
    }

    /// Builds everything needed to render the game
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            team: self.team.clone(),
            score: self.score.value(),
            clock: Clock {
                seconds_left: self.timer.left(),
                display: self.timer.format(),
                low: self.timer.is_low(),
                paused: self.timer.is_paused(),
            },
            progress: ProgressView {
                active: self.progress.active(),
                view: self.progress.view(),
                count: self.catalog.len(),
                percent: self.progress.percent(),
            },
            phase: self.progress.phase(),
            step: if self.ending.is_none() {
                self.step_snapshot(self.progress.view())
            } else {
                None
            },
            navigation: self.navigation(),
            modal: self.modal.as_ref().map(|modal| self.modal_view(modal)),
            summary: self.ending.as_ref().map(|ending| self.summary(ending)),
        }
    }

    fn step_snapshot(&self, index: usize) -> Option<StepSnapshot> {
        let step = self.catalog.step(index)?;
        let unvisited = StepRecord::default();
        let record = self.records.get(index).unwrap_or(&unvisited);
        let locked = self.progress.is_locked(record.completed);
        let status = self.lifelines.status(step.kind(), !locked);
        let prompt = step.prompt();
        Some(StepSnapshot {
            index,
            kind: step.kind(),
            title: prompt.title.clone(),
            question: prompt.question.clone(),
            display: step.display(),
            view: step.view(record, locked),
            locked,
            attempts: record.attempts,
            lifelines: LifelineBar {
                hint: status[Lifeline::Hint],
                fifty_fifty: status[Lifeline::FiftyFifty],
                call: status[Lifeline::Call],
                hints_left: self.lifelines.hints_left(),
            },
        })
    }

    fn navigation(&self) -> Navigation {
        let interactive = self.ensure_interactive().is_ok() && !self.is_submitting();
        let next = if !interactive {
            NextButton::Hidden
        } else if !self.progress.is_frontier() {
            NextButton::Browse
        } else if self.records.is_completed(self.progress.active()) {
            NextButton::NextStage
        } else {
            NextButton::Hidden
        };
        Navigation {
            back: interactive && self.progress.can_go_back(),
            next,
        }
    }

    fn modal_view(&self, modal: &Modal) -> ModalView {
        match modal {
            Modal::Success(announcement) => ModalView::Success(announcement.clone()),
            Modal::Result(announcement) => ModalView::Result(announcement.clone()),
            Modal::Hint { revealed } => ModalView::Hint(self.hint_dialog(*revealed)),
            Modal::Call => ModalView::Call,
        }
    }

    fn hint_dialog(&self, revealed: Option<HintTier>) -> HintDialog {
        let index = self.progress.view();
        let prompt = self.catalog.step(index).map(StepConfig::prompt);
        let record = self.records.get(index);
        let hints_left = self.lifelines.hints_left();
        HintDialog {
            hints_left,
            tiles: [HintTier::Low, HintTier::High]
                .into_iter()
                .map(|tier| {
                    let unlocked = record.is_some_and(|record| record.hint_unlocked[tier]);
                    let written = prompt.and_then(|prompt| prompt.hint(tier)).is_some();
                    HintTile {
                        tier,
                        cost: tier.cost(),
                        unlocked,
                        available: written && (unlocked || hints_left > 0),
                    }
                })
                .collect(),
            revealed: revealed
                .and_then(|tier| prompt.and_then(|prompt| prompt.hint(tier)))
                .map(str::to_owned),
        }
    }

    fn summary(&self, ending: &Ending) -> Summary {
        Summary {
            reason: ending.reason,
            score: ending.score,
            time_spent: ending.time_spent,
            time_display: timer::clock(ending.time_spent),
            submission: ending.submission,
            podium: self.leaderboard.podium(),
            leaderboard: self.leaderboard.top(),
            position: self.leaderboard.position(&self.team.name),
        }
    }
}
