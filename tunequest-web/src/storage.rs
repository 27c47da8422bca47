//! Guest progress persistence over `sessionStorage`.
//!
//! The sets live only for the browser session, matching the guest's lack of
//! durable identity: logging in (or closing the tab) clears them.

use crate::dom::{js_error_message, session_storage};
use std::collections::BTreeSet;
use tunequest_engine::{GuestProgressStore, ProgressSet};

const PLAYED_KEY: &str = "tunequest.guest.played";
const COMPLETED_KEY: &str = "tunequest.guest.completed";

#[derive(Debug, thiserror::Error)]
pub enum WebStoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// `GuestProgressStore` backed by browser `sessionStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionProgressStore;

const fn key_for(set: ProgressSet) -> &'static str {
    match set {
        ProgressSet::Played => PLAYED_KEY,
        ProgressSet::Completed => COMPLETED_KEY,
    }
}

impl GuestProgressStore for SessionProgressStore {
    type Error = WebStoreError;

    fn load(&self, set: ProgressSet) -> Result<BTreeSet<u32>, Self::Error> {
        let storage =
            session_storage().map_err(|err| WebStoreError::Storage(js_error_message(&err)))?;
        let raw = storage
            .get_item(key_for(set))
            .map_err(|err| WebStoreError::Storage(js_error_message(&err)))?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(BTreeSet::new()),
        }
    }

    fn save(&mut self, set: ProgressSet, levels: &BTreeSet<u32>) -> Result<(), Self::Error> {
        let storage =
            session_storage().map_err(|err| WebStoreError::Storage(js_error_message(&err)))?;
        let json = serde_json::to_string(levels)?;
        storage
            .set_item(key_for(set), &json)
            .map_err(|err| WebStoreError::Storage(js_error_message(&err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_per_set() {
        assert_ne!(key_for(ProgressSet::Played), key_for(ProgressSet::Completed));
    }

    #[test]
    fn level_sets_round_trip_through_json() {
        let levels: BTreeSet<u32> = [7, 3, 12].into_iter().collect();
        let json = serde_json::to_string(&levels).unwrap();
        let back: BTreeSet<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, levels);
    }
}
