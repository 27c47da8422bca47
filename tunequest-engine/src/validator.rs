//! Guess submission and verdict interpretation.
//!
//! Comparison semantics (case folding, trimming, fuzzy matching) are the
//! remote judge's policy. The engine interprets the boolean verdict and
//! keeps transport failures strictly apart from wrong answers.

use crate::level::LevelId;
use crate::puzzle::AnswerFields;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// The judge could not be reached; the guess was neither right nor wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("judge unreachable: {0}")]
pub struct JudgeUnreachable(pub String);

/// The judge's verdict on one guess.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    /// Canonical answer fields, returned on a match.
    #[serde(default)]
    pub revealed: Option<AnswerFields>,
}

/// Judge collaborator.
#[async_trait(?Send)]
pub trait AnswerJudge {
    async fn check(&self, level: &LevelId, answer: &str) -> Result<Verdict, JudgeUnreachable>;
}

/// A verdict folded into what the round state machine consumes.
#[derive(Clone, Debug, PartialEq)]
pub enum GuessOutcome {
    Correct(Option<AnswerFields>),
    Incorrect,
    /// Transport failure: must never count as a wrong attempt.
    Unreachable(String),
}

/// Submit one guess and interpret the verdict.
pub async fn check_guess<J>(judge: &J, level: &LevelId, answer: &str) -> GuessOutcome
where
    J: AnswerJudge + ?Sized,
{
    match judge.check(level, answer).await {
        Ok(Verdict {
            correct: true,
            revealed,
        }) => GuessOutcome::Correct(revealed),
        Ok(Verdict { correct: false, .. }) => GuessOutcome::Incorrect,
        Err(JudgeUnreachable(reason)) => GuessOutcome::Unreachable(reason),
    }
}
