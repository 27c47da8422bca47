//! Static hint schedule.
//!
//! The hint revealed at each attempt, and how much of the cover image is
//! unblurred, are a fixed function of the attempt number. Nothing else in
//! the engine may reveal a hint.

use serde::{Deserialize, Serialize};

/// The kinds of hint a puzzle can disclose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKey {
    Year,
    Genre,
    Album,
    Artist,
    TitleTeaser,
}

/// One row of the schedule: reaching `attempt` reveals `key` and unblurs
/// `quarters` quarters of the cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HintEntry {
    pub attempt: u8,
    pub key: HintKey,
    pub quarters: u8,
}

pub const HINT_SCHEDULE: [HintEntry; 5] = [
    HintEntry { attempt: 2, key: HintKey::Year, quarters: 2 },
    HintEntry { attempt: 3, key: HintKey::Genre, quarters: 3 },
    HintEntry { attempt: 4, key: HintKey::Album, quarters: 4 },
    HintEntry { attempt: 5, key: HintKey::Artist, quarters: 4 },
    HintEntry { attempt: 6, key: HintKey::TitleTeaser, quarters: 4 },
];

/// The hint newly revealed when play reaches `attempt`, if any.
#[must_use]
pub fn hint_for_attempt(attempt: u8) -> Option<HintKey> {
    HINT_SCHEDULE
        .iter()
        .find(|entry| entry.attempt == attempt)
        .map(|entry| entry.key)
}

/// Cover quarters unblurred at `attempt`. The first attempt shows one
/// quarter; later attempts never show less than an earlier one.
#[must_use]
pub fn quarters_for_attempt(attempt: u8) -> u8 {
    HINT_SCHEDULE
        .iter()
        .filter(|entry| entry.attempt <= attempt)
        .map(|entry| entry.quarters)
        .max()
        .unwrap_or(1)
}
