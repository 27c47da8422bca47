//! Browser host for one round.
//!
//! The engine emits cues; this module performs them: network calls through
//! `spawn_local`, snippet auto-stop and hint-advance delays through
//! cancel-on-drop timers, completion recording through the mode-appropriate
//! recorder. Teardown synchronously stops audio and cancels timers; a timer
//! that already fired is inert in its slot and token checks make any stale
//! delivery a no-op.

use crate::api::ApiClient;
use crate::audio::ElementOutput;
use crate::storage::SessionProgressStore;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use tunequest_engine::{
    Cue, GuestRecorder, LevelId, PlayMode, PlaybackController, RoundConfig, RoundSession,
    check_guess, load_puzzle, submit_completion,
};
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

pub struct RoundHost {
    round: RefCell<RoundSession>,
    controller: RefCell<PlaybackController<ElementOutput>>,
    api: ApiClient,
    guest: RefCell<GuestRecorder<SessionProgressStore>>,
    stop_timer: RefCell<Option<Timeout>>,
    advance_timer: RefCell<Option<Timeout>>,
    on_change: Callback<()>,
}

impl RoundHost {
    /// Construct the host and kick off the puzzle load.
    #[must_use]
    pub fn begin(level: LevelId, mode: PlayMode, on_change: Callback<()>) -> Rc<Self> {
        Self::begin_with(level, mode, ApiClient::default(), on_change)
    }

    #[must_use]
    pub fn begin_with(
        level: LevelId,
        mode: PlayMode,
        api: ApiClient,
        on_change: Callback<()>,
    ) -> Rc<Self> {
        let (round, cues) = RoundSession::begin(level, mode, RoundConfig::default());
        let host = Rc::new_cyclic(|weak: &std::rc::Weak<Self>| {
            let fault_target = weak.clone();
            let output = ElementOutput::new(Callback::from(move |fault| {
                if let Some(host) = fault_target.upgrade() {
                    let next = host.round.borrow_mut().playback_report(&fault);
                    Self::run(&host, next);
                    host.on_change.emit(());
                }
            }));
            Self {
                round: RefCell::new(round),
                controller: RefCell::new(PlaybackController::new(output)),
                api,
                guest: RefCell::new(GuestRecorder::new(SessionProgressStore)),
                stop_timer: RefCell::new(None),
                advance_timer: RefCell::new(None),
                on_change,
            }
        });
        Self::run(&host, cues);
        host
    }

    /// Stop audio and cancel pending timers. Required when the round is
    /// replaced or the view goes away.
    pub fn teardown(&self) {
        self.stop_timer.borrow_mut().take();
        self.advance_timer.borrow_mut().take();
        self.controller.borrow_mut().stop();
    }

    /// Read the round snapshot.
    pub fn with_round<R>(&self, f: impl FnOnce(&RoundSession) -> R) -> R {
        f(&self.round.borrow())
    }

    // Player commands --------------------------------------------------------

    pub fn start(self: &Rc<Self>) {
        self.command(RoundSession::start);
    }

    pub fn replay(self: &Rc<Self>) {
        self.command(RoundSession::replay);
    }

    pub fn give_up(self: &Rc<Self>) {
        self.command(RoundSession::give_up);
    }

    pub fn retry(self: &Rc<Self>) {
        self.command(RoundSession::retry);
    }

    pub fn submit(self: &Rc<Self>, guess: &str) {
        self.command(|round| round.submit(guess));
    }

    /// Replace the round with a fresh run of the same level.
    pub fn restart(self: &Rc<Self>) {
        self.replace_round(|round| round.restart());
    }

    /// Replace the round with the next level, carrying the mode forward.
    pub fn advance_level(self: &Rc<Self>) {
        self.replace_round(|round| round.next_level());
    }

    fn command(self: &Rc<Self>, f: impl FnOnce(&mut RoundSession) -> Vec<Cue>) {
        let cues = f(&mut self.round.borrow_mut());
        Self::run(self, cues);
        self.on_change.emit(());
    }

    fn replace_round(self: &Rc<Self>, f: impl FnOnce(&RoundSession) -> (RoundSession, Vec<Cue>)) {
        self.teardown();
        let (fresh, cues) = f(&self.round.borrow());
        *self.round.borrow_mut() = fresh;
        Self::run(self, cues);
        self.on_change.emit(());
    }

    // Cue execution ----------------------------------------------------------

    fn run(host: &Rc<Self>, cues: Vec<Cue>) {
        for cue in cues {
            match cue {
                Cue::FetchPuzzle { level } => Self::fetch_puzzle(host, level),
                Cue::SubmitGuess { level, text } => Self::submit_guess(host, level, text),
                Cue::PlayWindow { seconds } => Self::play_window(host, seconds),
                Cue::PlayFull => Self::play_full(host),
                Cue::ScheduleAdvance { token, delay_ms } => {
                    let target = Rc::clone(host);
                    let timeout = Timeout::new(delay_ms, move || {
                        let next = target.round.borrow_mut().advance_due(token);
                        Self::run(&target, next);
                        target.on_change.emit(());
                    });
                    *host.advance_timer.borrow_mut() = Some(timeout);
                }
                Cue::RecordCompletion { level, score, .. } => {
                    Self::record_completion(host, level, score);
                }
            }
        }
    }

    fn fetch_puzzle(host: &Rc<Self>, level: LevelId) {
        let target = Rc::clone(host);
        spawn_local(async move {
            let credential = target.round.borrow().mode().credential().cloned();
            let outcome = load_puzzle(&target.api, &level, credential.as_ref()).await;
            let next = target.round.borrow_mut().puzzle_loaded(outcome);
            Self::run(&target, next);
            target.on_change.emit(());
        });
    }

    fn submit_guess(host: &Rc<Self>, level: LevelId, text: String) {
        let target = Rc::clone(host);
        spawn_local(async move {
            let outcome = check_guess(&target.api, &level, &text).await;
            let next = target.round.borrow_mut().verdict(outcome);
            Self::run(&target, next);
            target.on_change.emit(());
        });
    }

    fn play_window(host: &Rc<Self>, seconds: u32) {
        let Some(source) = host.round.borrow().puzzle().map(|p| p.source().clone()) else {
            return;
        };
        let played = host.controller.borrow_mut().play_window(&source, seconds);
        match played {
            Ok(auto) => {
                let target = Rc::clone(host);
                let timeout = Timeout::new(auto.seconds.saturating_mul(1_000), move || {
                    if target.controller.borrow_mut().auto_stop_due(auto.token) {
                        let next = target.round.borrow_mut().window_elapsed();
                        Self::run(&target, next);
                        target.on_change.emit(());
                    }
                });
                *host.stop_timer.borrow_mut() = Some(timeout);
            }
            Err(fault) => {
                let next = host.round.borrow_mut().playback_report(&fault);
                Self::run(host, next);
            }
        }
    }

    fn play_full(host: &Rc<Self>) {
        // The full track supersedes any window in flight.
        host.stop_timer.borrow_mut().take();
        let Some(source) = host.round.borrow().puzzle().map(|p| p.source().clone()) else {
            return;
        };
        let played = host.controller.borrow_mut().play_full(&source);
        if let Err(fault) = played {
            let next = host.round.borrow_mut().playback_report(&fault);
            Self::run(host, next);
        }
    }

    fn record_completion(host: &Rc<Self>, level: LevelId, score: u32) {
        let is_guest = host.round.borrow().mode().is_guest();
        if is_guest {
            let disposition = host.guest.borrow_mut().record(level.number(), score);
            log::info!("guest completion for level {level}: {disposition:?}");
            return;
        }
        let Some(credential) = host.round.borrow().mode().credential().cloned() else {
            return;
        };
        let target = Rc::clone(host);
        spawn_local(async move {
            // Best effort: dispositions are logged inside, never surfaced.
            let _ = submit_completion(&target.api, &level, score, &credential).await;
        });
    }
}
