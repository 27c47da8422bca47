//! TuneQuest Round Engine
//!
//! Platform-agnostic core logic for the TuneQuest music-guessing game.
//! This crate drives one round of play (puzzle load, gated snippet
//! playback, deterministic hint progression, answer verdicts, scoring, and
//! completion recording) without UI or platform-specific dependencies.
//! Collaborators (song catalog, answer judge, score ledger, audio output,
//! guest progress store) plug in through the traits defined here.

pub mod audio;
pub mod constants;
pub mod hints;
pub mod level;
pub mod loader;
pub mod puzzle;
pub mod recorder;
pub mod round;
pub mod scoring;
pub mod validator;

// Re-export commonly used types
pub use audio::{
    AudioHandle, AudioOutput, AudioSource, AutoStop, PlaybackController, PlaybackFault, StopToken,
};
pub use hints::{HINT_SCHEDULE, HintEntry, HintKey, hint_for_attempt, quarters_for_attempt};
pub use level::{Credential, LevelId, PlayMode};
pub use loader::{LoadFailureKind, LoadOutcome, Remediation, SongCatalog, load_puzzle};
pub use puzzle::{AnswerFields, Puzzle, SongRecord};
pub use recorder::{
    GuestProgressStore, GuestRecorder, LedgerError, ProgressSet, RecordDisposition, ScoreLedger,
    submit_completion,
};
pub use round::{
    Cue, FinishKind, RoundConfig, RoundNote, RoundPhase, RoundSession, TimerToken,
};
pub use scoring::ScoringPolicy;
pub use validator::{AnswerJudge, GuessOutcome, JudgeUnreachable, Verdict, check_guess};
