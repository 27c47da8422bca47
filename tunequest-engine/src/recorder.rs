//! Completion recording.
//!
//! One contract, two backing stores: guests write to a session-scoped local
//! set, authenticated players submit to the remote ledger. Either way the
//! write is attempted once, an already-played level short-circuits without a
//! duplicate, and persistence failures never unwind the round.

use crate::level::{Credential, LevelId};
use async_trait::async_trait;
use std::collections::BTreeSet;
use thiserror::Error;

/// The guest progress sets, keyed by bare level number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressSet {
    /// Levels that reached any terminal outcome.
    Played,
    /// Levels finished with a positive score.
    Completed,
}

/// Session-scoped string-set persistence for the guest path.
pub trait GuestProgressStore {
    type Error: std::error::Error + 'static;

    /// Load a progress set.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be read.
    fn load(&self, set: ProgressSet) -> Result<BTreeSet<u32>, Self::Error>;

    /// Persist a progress set wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error when the backing store cannot be written.
    fn save(&mut self, set: ProgressSet, levels: &BTreeSet<u32>) -> Result<(), Self::Error>;
}

/// What became of one record attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordDisposition {
    Recorded,
    /// The level was already on record; nothing was written.
    AlreadyPlayed,
    /// Persistence failed; logged and swallowed.
    Dropped,
}

/// Guest-path recorder over a local ephemeral store.
#[derive(Debug, Default)]
pub struct GuestRecorder<S> {
    store: S,
}

impl<S: GuestProgressStore> GuestRecorder<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a terminal round for a guest. Idempotent by construction: a
    /// level already in the played set yields `AlreadyPlayed` and writes
    /// nothing.
    pub fn record(&mut self, level_number: u32, score: u32) -> RecordDisposition {
        let mut played = match self.store.load(ProgressSet::Played) {
            Ok(set) => set,
            Err(err) => {
                log::warn!("guest progress unreadable, completion dropped: {err}");
                return RecordDisposition::Dropped;
            }
        };
        if played.contains(&level_number) {
            return RecordDisposition::AlreadyPlayed;
        }
        played.insert(level_number);
        if let Err(err) = self.store.save(ProgressSet::Played, &played) {
            log::warn!("guest played set not persisted: {err}");
            return RecordDisposition::Dropped;
        }
        if score > 0 {
            match self.store.load(ProgressSet::Completed) {
                Ok(mut completed) => {
                    completed.insert(level_number);
                    if let Err(err) = self.store.save(ProgressSet::Completed, &completed) {
                        log::warn!("guest completed set not persisted: {err}");
                    }
                }
                Err(err) => log::warn!("guest completed set unreadable: {err}"),
            }
        }
        RecordDisposition::Recorded
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

/// Ledger submission failure modes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger already holds a score for this (player, level) pair.
    #[error("score already recorded for this level")]
    AlreadyPlayed,
    #[error("ledger unreachable: {0}")]
    Transport(String),
}

/// Remote ledger collaborator; enforces one record per (player, level).
#[async_trait(?Send)]
pub trait ScoreLedger {
    async fn submit(
        &self,
        level: &LevelId,
        score: u32,
        credential: &Credential,
    ) -> Result<(), LedgerError>;
}

/// Submit a terminal round to the ledger. One attempt, no retry; a conflict
/// is the idempotency guard working, and a transport failure is logged and
/// swallowed. The round's terminal UI never waits on this.
pub async fn submit_completion<L>(
    ledger: &L,
    level: &LevelId,
    score: u32,
    credential: &Credential,
) -> RecordDisposition
where
    L: ScoreLedger + ?Sized,
{
    match ledger.submit(level, score, credential).await {
        Ok(()) => RecordDisposition::Recorded,
        Err(LedgerError::AlreadyPlayed) => {
            log::info!("level {level} already on the ledger, completion suppressed");
            RecordDisposition::AlreadyPlayed
        }
        Err(LedgerError::Transport(reason)) => {
            log::warn!("score submission for level {level} dropped: {reason}");
            RecordDisposition::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;

    #[derive(Default)]
    struct MemoryStore {
        sets: HashMap<ProgressSet, BTreeSet<u32>>,
    }

    impl GuestProgressStore for MemoryStore {
        type Error = Infallible;

        fn load(&self, set: ProgressSet) -> Result<BTreeSet<u32>, Self::Error> {
            Ok(self.sets.get(&set).cloned().unwrap_or_default())
        }

        fn save(&mut self, set: ProgressSet, levels: &BTreeSet<u32>) -> Result<(), Self::Error> {
            self.sets.insert(set, levels.clone());
            Ok(())
        }
    }

    #[test]
    fn guest_record_splits_played_and_completed() {
        let mut recorder = GuestRecorder::new(MemoryStore::default());
        assert_eq!(recorder.record(7, 250), RecordDisposition::Recorded);
        assert_eq!(recorder.record(8, 0), RecordDisposition::Recorded);

        let played = recorder.store().load(ProgressSet::Played).unwrap();
        let completed = recorder.store().load(ProgressSet::Completed).unwrap();
        assert!(played.contains(&7) && played.contains(&8));
        assert!(completed.contains(&7));
        assert!(!completed.contains(&8), "score 0 never marks completion");
    }

    #[test]
    fn guest_record_is_idempotent() {
        let mut recorder = GuestRecorder::new(MemoryStore::default());
        assert_eq!(recorder.record(7, 250), RecordDisposition::Recorded);
        assert_eq!(recorder.record(7, 850), RecordDisposition::AlreadyPlayed);

        let played = recorder.store().load(ProgressSet::Played).unwrap();
        let completed = recorder.store().load(ProgressSet::Completed).unwrap();
        assert_eq!(played.len(), 1);
        assert_eq!(completed.len(), 1);
    }

    struct FixtureLedger {
        responses: RefCell<Vec<Result<(), LedgerError>>>,
    }

    #[async_trait(?Send)]
    impl ScoreLedger for FixtureLedger {
        async fn submit(
            &self,
            _level: &LevelId,
            _score: u32,
            _credential: &Credential,
        ) -> Result<(), LedgerError> {
            self.responses.borrow_mut().remove(0)
        }
    }

    #[test]
    fn ledger_conflict_maps_to_already_played() {
        let ledger = FixtureLedger {
            responses: RefCell::new(vec![Err(LedgerError::AlreadyPlayed)]),
        };
        let disposition = block_on(submit_completion(
            &ledger,
            &LevelId::Catalog(3),
            550,
            &Credential::new("t"),
        ));
        assert_eq!(disposition, RecordDisposition::AlreadyPlayed);
    }

    #[test]
    fn ledger_transport_failure_is_swallowed() {
        let ledger = FixtureLedger {
            responses: RefCell::new(vec![Err(LedgerError::Transport("offline".into()))]),
        };
        let disposition = block_on(submit_completion(
            &ledger,
            &LevelId::Catalog(3),
            550,
            &Credential::new("t"),
        ));
        assert_eq!(disposition, RecordDisposition::Dropped);
    }
}
