//! Level identity and play mode.
//!
//! Guest and authenticated players draw from disjoint level id spaces: guest
//! ids carry a local-only suffix (`"7_local"`), authenticated ids are bare
//! numbers (`"7"`). Progress is keyed by the bare number in either space.

use crate::constants::GUEST_LEVEL_SUFFIX;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A level identifier, tagged with the catalog id space it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelId {
    /// Local guest catalog, rendered with the `_local` suffix.
    Guest(u32),
    /// The authenticated provider catalog.
    Catalog(u32),
}

impl LevelId {
    /// Parse a raw level id string into its id space.
    ///
    /// Returns `None` for ids that are not a bare number or a
    /// number followed by the guest suffix.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Some(stem) = trimmed.strip_suffix(GUEST_LEVEL_SUFFIX) {
            stem.parse().ok().map(LevelId::Guest)
        } else {
            trimmed.parse().ok().map(LevelId::Catalog)
        }
    }

    /// Build a level id in the id space matching the play mode.
    #[must_use]
    pub const fn for_mode(number: u32, mode: &PlayMode) -> Self {
        match mode {
            PlayMode::Guest => Self::Guest(number),
            PlayMode::Authenticated(_) => Self::Catalog(number),
        }
    }

    /// The bare level number, used to key completion records.
    #[must_use]
    pub const fn number(&self) -> u32 {
        match self {
            Self::Guest(n) | Self::Catalog(n) => *n,
        }
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// The following level within the same id space.
    #[must_use]
    pub const fn next(&self) -> Self {
        match self {
            Self::Guest(n) => Self::Guest(*n + 1),
            Self::Catalog(n) => Self::Catalog(*n + 1),
        }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(n) => write!(f, "{n}{GUEST_LEVEL_SUFFIX}"),
            Self::Catalog(n) => write!(f, "{n}"),
        }
    }
}

/// An opaque bearer token attached to authenticated requests.
///
/// The engine never parses or issues credentials; it only forwards them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bearer tokens stay out of logs.
        f.write_str("Credential(..)")
    }
}

/// Whether the round belongs to a guest or an authenticated player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayMode {
    Guest,
    Authenticated(Credential),
}

impl PlayMode {
    /// Select the mode from a token the login flow may have left behind.
    #[must_use]
    pub fn from_token(token: Option<String>) -> Self {
        token.map_or(Self::Guest, |t| Self::Authenticated(Credential::new(t)))
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Guest => None,
            Self::Authenticated(cred) => Some(cred),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_routes_id_spaces() {
        assert_eq!(LevelId::parse("7_local"), Some(LevelId::Guest(7)));
        assert_eq!(LevelId::parse("12"), Some(LevelId::Catalog(12)));
        assert_eq!(LevelId::parse(" 3 "), Some(LevelId::Catalog(3)));
        assert_eq!(LevelId::parse("abc_local"), None);
        assert_eq!(LevelId::parse("seven"), None);
        assert_eq!(LevelId::parse(""), None);
    }

    #[test]
    fn display_round_trips() {
        for raw in ["7_local", "12"] {
            let id = LevelId::parse(raw).unwrap();
            assert_eq!(id.to_string(), raw);
        }
    }

    #[test]
    fn number_strips_id_space() {
        assert_eq!(LevelId::Guest(7).number(), 7);
        assert_eq!(LevelId::Catalog(7).number(), 7);
    }

    #[test]
    fn next_stays_in_id_space() {
        assert_eq!(LevelId::Guest(1).next(), LevelId::Guest(2));
        assert_eq!(LevelId::Catalog(9).next(), LevelId::Catalog(10));
    }

    #[test]
    fn mode_from_token_and_credential_access() {
        let guest = PlayMode::from_token(None);
        assert!(guest.is_guest());
        assert!(guest.credential().is_none());

        let auth = PlayMode::from_token(Some("Bearer abc".into()));
        assert!(!auth.is_guest());
        assert_eq!(auth.credential().unwrap().as_str(), "Bearer abc");
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("secret-token");
        assert_eq!(format!("{cred:?}"), "Credential(..)");
    }

    #[test]
    fn for_mode_selects_id_space() {
        assert_eq!(LevelId::for_mode(4, &PlayMode::Guest), LevelId::Guest(4));
        let auth = PlayMode::Authenticated(Credential::new("t"));
        assert_eq!(LevelId::for_mode(4, &auth), LevelId::Catalog(4));
    }
}
