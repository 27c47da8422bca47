//! The game round state machine.
//!
//! One authoritative [`RoundPhase`] per round, advanced only by the command
//! and event methods on [`RoundSession`]. Every method returns the ordered
//! list of [`Cue`]s the host must perform; the engine itself performs no
//! I/O. Timers are modelled as issued [`TimerToken`]s so a timer firing
//! after it was superseded (or after the round was torn down) is a no-op
//! rather than a mutation of stale state.

use crate::constants::{
    HINT_ADVANCE_DELAY_MS, MAX_ATTEMPTS, WINDOW_FLOOR_SECS, WINDOW_STEP_SECS,
};
use crate::audio::PlaybackFault;
use crate::hints::{HintKey, hint_for_attempt, quarters_for_attempt};
use crate::level::{LevelId, PlayMode};
use crate::loader::{LoadFailureKind, LoadOutcome};
use crate::puzzle::Puzzle;
use crate::scoring::ScoringPolicy;
use crate::validator::GuessOutcome;
use smallvec::SmallVec;

/// Round tuning. Defaults follow the deployed service contract; the numbers
/// are configuration, not law.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundConfig {
    pub max_attempts: u8,
    pub window_floor_secs: u32,
    pub window_step_secs: u32,
    pub hint_delay_ms: u32,
    pub scoring: ScoringPolicy,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            window_floor_secs: WINDOW_FLOOR_SECS,
            window_step_secs: WINDOW_STEP_SECS,
            hint_delay_ms: HINT_ADVANCE_DELAY_MS,
            scoring: ScoringPolicy::default(),
        }
    }
}

/// The authoritative round state.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundPhase {
    Loading,
    Ready,
    Listening,
    AwaitingAnswer,
    Evaluating,
    Correct,
    Exhausted,
    GivenUp,
    /// Valid level with no puzzle assigned: settled, but not a terminal
    /// outcome and never recorded.
    Vacant,
    LoadError(LoadFailureKind),
}

impl RoundPhase {
    /// Terminal phases accept no further commands besides restart and
    /// advance-to-next-level.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Correct | Self::Exhausted | Self::GivenUp | Self::LoadError(_)
        )
    }
}

/// How a played-out round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishKind {
    Solved,
    OutOfAttempts,
    Surrendered,
}

/// Token identifying one scheduled hint-advance delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Side effects the host must perform, in the order returned.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue {
    /// Fetch the puzzle and feed the outcome to
    /// [`RoundSession::puzzle_loaded`].
    FetchPuzzle { level: LevelId },
    /// Submit the guess and feed the outcome to [`RoundSession::verdict`].
    SubmitGuess { level: LevelId, text: String },
    /// Start the timed snippet; on auto-stop call
    /// [`RoundSession::window_elapsed`].
    PlayWindow { seconds: u32 },
    /// Play the untruncated track.
    PlayFull,
    /// After `delay_ms`, call [`RoundSession::advance_due`] with the token.
    ScheduleAdvance { token: TimerToken, delay_ms: u32 },
    /// Record the terminal outcome; emitted at most once per round.
    RecordCompletion {
        level: LevelId,
        score: u32,
        finish: FinishKind,
    },
}

/// User-facing happenings that are not phases.
#[derive(Clone, Debug, PartialEq)]
pub enum RoundNote {
    EmptyGuess,
    WrongGuess { hint: Option<HintKey> },
    JudgeUnreachable,
    PlaybackBlocked,
    PlaybackFormat(String),
    PlaybackFailed(String),
}

type Cues = Vec<Cue>;

/// One playthrough of a single level, from puzzle load to terminal outcome.
///
/// The session owns its [`Puzzle`] exclusively; replacing the round releases
/// both. The host is responsible for stopping audio and cancelling timers on
/// teardown; stale timer tokens delivered afterwards are no-ops here.
#[derive(Clone, Debug)]
pub struct RoundSession {
    cfg: RoundConfig,
    level: LevelId,
    mode: PlayMode,
    phase: RoundPhase,
    puzzle: Option<Puzzle>,
    attempt: u8,
    revealed: SmallVec<[HintKey; 5]>,
    window_secs: u32,
    replay_allowed: bool,
    score: u32,
    note: Option<RoundNote>,
    recorded: bool,
    advance_token: Option<TimerToken>,
    timer_serial: u64,
}

impl RoundSession {
    /// Construct a round and the cue that loads its puzzle.
    #[must_use]
    pub fn begin(level: LevelId, mode: PlayMode, cfg: RoundConfig) -> (Self, Cues) {
        let session = Self {
            cfg,
            level: level.clone(),
            mode,
            phase: RoundPhase::Loading,
            puzzle: None,
            attempt: 1,
            revealed: SmallVec::new(),
            window_secs: cfg.window_floor_secs,
            replay_allowed: false,
            score: 0,
            note: None,
            recorded: false,
            advance_token: None,
            timer_serial: 0,
        };
        (session, vec![Cue::FetchPuzzle { level }])
    }

    /// Deliver the puzzle-load outcome. Only meaningful in `Loading`.
    pub fn puzzle_loaded(&mut self, outcome: LoadOutcome) -> Cues {
        if self.phase != RoundPhase::Loading {
            return Vec::new();
        }
        match outcome {
            LoadOutcome::Ready(puzzle) => {
                self.puzzle = Some(puzzle);
                self.attempt = 1;
                self.window_secs = self.cfg.window_floor_secs;
                self.revealed.clear();
                self.replay_allowed = false;
                self.phase = RoundPhase::Ready;
            }
            LoadOutcome::Vacant => self.phase = RoundPhase::Vacant,
            LoadOutcome::Failed(kind) => self.phase = RoundPhase::LoadError(kind),
        }
        Vec::new()
    }

    /// Explicit start command. Playback is gated on a user interaction
    /// because the platform may refuse autoplay.
    pub fn start(&mut self) -> Cues {
        if self.phase != RoundPhase::Ready {
            return Vec::new();
        }
        self.note = None;
        self.phase = RoundPhase::Listening;
        vec![Cue::PlayWindow {
            seconds: self.window_secs,
        }]
    }

    /// The snippet window elapsed; answering (and replaying) opens up.
    pub fn window_elapsed(&mut self) -> Cues {
        if self.phase == RoundPhase::Listening {
            self.phase = RoundPhase::AwaitingAnswer;
            self.replay_allowed = true;
        }
        Vec::new()
    }

    /// Replay the current window without advancing the attempt counter.
    pub fn replay(&mut self) -> Cues {
        let permitted = self.phase == RoundPhase::AwaitingAnswer
            && self.replay_allowed
            && self.advance_token.is_none();
        if !permitted {
            return Vec::new();
        }
        self.phase = RoundPhase::Listening;
        vec![Cue::PlayWindow {
            seconds: self.window_secs,
        }]
    }

    /// Submit a guess. Empty trimmed input is rejected in place.
    pub fn submit(&mut self, raw: &str) -> Cues {
        if self.phase != RoundPhase::AwaitingAnswer {
            return Vec::new();
        }
        let text = raw.trim();
        if text.is_empty() {
            self.note = Some(RoundNote::EmptyGuess);
            return Vec::new();
        }
        // A submission overrides a pending automatic advance.
        self.advance_token = None;
        self.note = None;
        self.phase = RoundPhase::Evaluating;
        vec![Cue::SubmitGuess {
            level: self.level.clone(),
            text: text.to_string(),
        }]
    }

    /// Deliver the judge's outcome for the in-flight guess.
    pub fn verdict(&mut self, outcome: GuessOutcome) -> Cues {
        if self.phase != RoundPhase::Evaluating {
            return Vec::new();
        }
        match outcome {
            GuessOutcome::Correct(canonical) => {
                if let Some(puzzle) = self.puzzle.as_mut() {
                    puzzle.reveal(canonical);
                }
                self.score = self.cfg.scoring.score_for(self.attempt);
                self.phase = RoundPhase::Correct;
                self.finish_cues(FinishKind::Solved)
            }
            GuessOutcome::Incorrect if self.attempt < self.cfg.max_attempts => {
                self.attempt += 1;
                let hint = hint_for_attempt(self.attempt);
                if let Some(key) = hint {
                    self.revealed.push(key);
                }
                self.window_secs += self.cfg.window_step_secs;
                self.replay_allowed = false;
                self.note = Some(RoundNote::WrongGuess { hint });
                self.phase = RoundPhase::AwaitingAnswer;
                let token = self.issue_timer();
                self.advance_token = Some(token);
                vec![Cue::ScheduleAdvance {
                    token,
                    delay_ms: self.cfg.hint_delay_ms,
                }]
            }
            GuessOutcome::Incorrect => {
                if let Some(puzzle) = self.puzzle.as_mut() {
                    puzzle.reveal(None);
                }
                self.score = 0;
                self.phase = RoundPhase::Exhausted;
                self.finish_cues(FinishKind::OutOfAttempts)
            }
            GuessOutcome::Unreachable(_) => {
                // Never a wrong attempt; hand the turn back unchanged.
                self.note = Some(RoundNote::JudgeUnreachable);
                self.phase = RoundPhase::AwaitingAnswer;
                Vec::new()
            }
        }
    }

    /// Deliver a fired hint-advance timer. Stale tokens are no-ops.
    pub fn advance_due(&mut self, token: TimerToken) -> Cues {
        if self.advance_token != Some(token) || self.phase != RoundPhase::AwaitingAnswer {
            return Vec::new();
        }
        self.advance_token = None;
        self.phase = RoundPhase::Listening;
        vec![Cue::PlayWindow {
            seconds: self.window_secs,
        }]
    }

    /// Voluntary surrender, allowed at any point before evaluation.
    pub fn give_up(&mut self) -> Cues {
        let surrenderable = matches!(
            self.phase,
            RoundPhase::Ready | RoundPhase::Listening | RoundPhase::AwaitingAnswer
        );
        if !surrenderable {
            return Vec::new();
        }
        self.advance_token = None;
        if let Some(puzzle) = self.puzzle.as_mut() {
            puzzle.reveal(None);
        }
        self.score = 0;
        self.phase = RoundPhase::GivenUp;
        self.finish_cues(FinishKind::Surrendered)
    }

    /// Explicit retry after a load failure.
    pub fn retry(&mut self) -> Cues {
        if !matches!(self.phase, RoundPhase::LoadError(_)) {
            return Vec::new();
        }
        self.phase = RoundPhase::Loading;
        vec![Cue::FetchPuzzle {
            level: self.level.clone(),
        }]
    }

    /// Report a playback fault. `Blocked` is recoverable: the round returns
    /// to `Ready`, re-arming the manual start affordance.
    pub fn playback_report(&mut self, fault: &PlaybackFault) -> Cues {
        self.note = Some(match fault {
            PlaybackFault::Blocked => RoundNote::PlaybackBlocked,
            PlaybackFault::BadFormat(reason) => RoundNote::PlaybackFormat(reason.clone()),
            PlaybackFault::Failed(reason) => RoundNote::PlaybackFailed(reason.clone()),
        });
        if self.phase == RoundPhase::Listening {
            self.phase = RoundPhase::Ready;
        }
        Vec::new()
    }

    /// Fresh round for the same level, carrying mode and config forward.
    #[must_use]
    pub fn restart(&self) -> (Self, Cues) {
        Self::begin(self.level.clone(), self.mode.clone(), self.cfg)
    }

    /// Fresh round for the following level in the same id space.
    #[must_use]
    pub fn next_level(&self) -> (Self, Cues) {
        Self::begin(self.level.next(), self.mode.clone(), self.cfg)
    }

    fn finish_cues(&mut self, finish: FinishKind) -> Cues {
        self.note = None;
        self.replay_allowed = false;
        let mut cues = vec![Cue::PlayFull];
        if !self.recorded {
            self.recorded = true;
            cues.push(Cue::RecordCompletion {
                level: self.level.clone(),
                score: self.score,
                finish,
            });
        }
        cues
    }

    fn issue_timer(&mut self) -> TimerToken {
        self.timer_serial += 1;
        TimerToken(self.timer_serial)
    }

    // Snapshot accessors -----------------------------------------------------

    #[must_use]
    pub const fn phase(&self) -> &RoundPhase {
        &self.phase
    }

    #[must_use]
    pub const fn level(&self) -> &LevelId {
        &self.level
    }

    #[must_use]
    pub const fn mode(&self) -> &PlayMode {
        &self.mode
    }

    #[must_use]
    pub const fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    #[must_use]
    pub const fn attempt(&self) -> u8 {
        self.attempt
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u8 {
        self.cfg.max_attempts
    }

    #[must_use]
    pub const fn window_secs(&self) -> u32 {
        self.window_secs
    }

    #[must_use]
    pub fn revealed_hints(&self) -> &[HintKey] {
        &self.revealed
    }

    #[must_use]
    pub const fn replay_allowed(&self) -> bool {
        self.replay_allowed
    }

    /// Accumulated score; meaningful once the round is terminal.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn note(&self) -> Option<&RoundNote> {
        self.note.as_ref()
    }

    /// Cover quarters unblurred at the current attempt.
    #[must_use]
    pub fn cover_quarters(&self) -> u8 {
        quarters_for_attempt(self.attempt)
    }
}
