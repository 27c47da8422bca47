//! Puzzle loading and failure classification.

use crate::level::{Credential, LevelId};
use crate::puzzle::{Puzzle, SongRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Why a puzzle fetch failed. The catalog provider classifies its own
/// transport; the engine maps each kind to the remediation the UI should
/// offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LoadFailureKind {
    /// Forbidden: the account has no linked external music provider.
    #[error("level requires a linked music account")]
    NeedsLink,
    /// Forbidden: the level is gated behind account registration/upgrade.
    #[error("level requires a registered account")]
    NeedsUpgrade,
    #[error("level not found")]
    NotFound,
    /// The credential was rejected or has expired.
    #[error("authentication expired or invalid")]
    Unauthenticated,
    #[error("network failure while loading level")]
    Network,
    #[error("unclassified load failure")]
    Unknown,
}

/// What the player should be prompted to do about a load failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remediation {
    Retry,
    LinkMusicAccount,
    Register,
    Reauthenticate,
}

impl LoadFailureKind {
    #[must_use]
    pub const fn remediation(self) -> Remediation {
        match self {
            Self::NeedsLink => Remediation::LinkMusicAccount,
            Self::NeedsUpgrade => Remediation::Register,
            Self::Unauthenticated => Remediation::Reauthenticate,
            Self::NotFound | Self::Network | Self::Unknown => Remediation::Retry,
        }
    }
}

/// Catalog collaborator: serves the song record for a level.
///
/// `Ok(None)` means the level exists but currently has no song assigned:
/// a successful, empty load, never a failure.
#[async_trait(?Send)]
pub trait SongCatalog {
    async fn fetch(
        &self,
        level: &LevelId,
        credential: Option<&Credential>,
    ) -> Result<Option<SongRecord>, LoadFailureKind>;
}

/// Outcome of one load command.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome {
    Ready(Puzzle),
    /// Valid level with no puzzle assigned.
    Vacant,
    Failed(LoadFailureKind),
}

/// Fetch and build the puzzle for a level.
pub async fn load_puzzle<C>(
    catalog: &C,
    level: &LevelId,
    credential: Option<&Credential>,
) -> LoadOutcome
where
    C: SongCatalog + ?Sized,
{
    match catalog.fetch(level, credential).await {
        Ok(Some(record)) => LoadOutcome::Ready(Puzzle::from_record(record)),
        Ok(None) => LoadOutcome::Vacant,
        Err(kind) => LoadOutcome::Failed(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct FixtureCatalog {
        responses: RefCell<Vec<Result<Option<SongRecord>, LoadFailureKind>>>,
        seen: RefCell<Vec<(String, bool)>>,
    }

    impl FixtureCatalog {
        fn new(responses: Vec<Result<Option<SongRecord>, LoadFailureKind>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl SongCatalog for FixtureCatalog {
        async fn fetch(
            &self,
            level: &LevelId,
            credential: Option<&Credential>,
        ) -> Result<Option<SongRecord>, LoadFailureKind> {
            self.seen
                .borrow_mut()
                .push((level.to_string(), credential.is_some()));
            self.responses.borrow_mut().remove(0)
        }
    }

    fn record() -> SongRecord {
        SongRecord {
            id: "trk".into(),
            title: "Song Two".into(),
            artists: "Blur".into(),
            album: "Self".into(),
            year: 1997,
            genre: "Britpop".into(),
            audio: "https://cdn.example/s.mp3".into(),
            image_url: "https://cdn.example/s.jpg".into(),
        }
    }

    #[test]
    fn load_builds_puzzle_and_routes_id() {
        let catalog = FixtureCatalog::new(vec![Ok(Some(record()))]);
        let level = LevelId::Guest(7);
        let outcome = block_on(load_puzzle(&catalog, &level, None));
        assert!(matches!(outcome, LoadOutcome::Ready(_)));
        assert_eq!(catalog.seen.borrow()[0], ("7_local".to_string(), false));
    }

    #[test]
    fn empty_level_is_vacant_not_failed() {
        let catalog = FixtureCatalog::new(vec![Ok(None)]);
        let outcome = block_on(load_puzzle(&catalog, &LevelId::Catalog(3), None));
        assert_eq!(outcome, LoadOutcome::Vacant);
    }

    #[test]
    fn failures_pass_through_classified() {
        let catalog = FixtureCatalog::new(vec![Err(LoadFailureKind::NeedsLink)]);
        let outcome = block_on(load_puzzle(&catalog, &LevelId::Catalog(3), None));
        assert_eq!(outcome, LoadOutcome::Failed(LoadFailureKind::NeedsLink));
    }

    #[test]
    fn remediation_per_kind() {
        assert_eq!(
            LoadFailureKind::NeedsLink.remediation(),
            Remediation::LinkMusicAccount
        );
        assert_eq!(
            LoadFailureKind::NeedsUpgrade.remediation(),
            Remediation::Register
        );
        assert_eq!(
            LoadFailureKind::Unauthenticated.remediation(),
            Remediation::Reauthenticate
        );
        assert_eq!(LoadFailureKind::Network.remediation(), Remediation::Retry);
        assert_eq!(LoadFailureKind::NotFound.remediation(), Remediation::Retry);
        assert_eq!(LoadFailureKind::Unknown.remediation(), Remediation::Retry);
    }
}
