//! Audio playback ownership and timing.
//!
//! A round plays audio through exactly one live handle. The controller
//! enforces that: starting a new window or full playback always halts the
//! previous handle first, and every scheduled auto-stop is token-guarded so
//! a superseded timer firing late is a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a play attempt could not proceed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlaybackFault {
    /// The platform refused to start without a user gesture. Recoverable:
    /// the round re-arms its manual start affordance.
    #[error("playback blocked until a user gesture")]
    Blocked,
    /// An embedded source failed structural validation.
    #[error("malformed embedded audio source: {0}")]
    BadFormat(String),
    /// Any other platform playback failure.
    #[error("audio playback failed: {0}")]
    Failed(String),
}

/// An audio source: a plain URL, or audio embedded as a data URI (the guest
/// catalog ships its snippets inline).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSource {
    Url(String),
    Embedded(String),
}

impl AudioSource {
    /// Classify a raw source string. Classification never fails; structural
    /// validation happens in [`AudioSource::validate`] before any play
    /// attempt.
    #[must_use]
    pub fn classify(raw: String) -> Self {
        if raw.starts_with("data:") {
            Self::Embedded(raw)
        } else {
            Self::Url(raw)
        }
    }

    /// Structural check for embedded sources: a declared media type followed
    /// by a single comma-delimited payload.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackFault::BadFormat`] describing the first structural
    /// problem found.
    pub fn validate(&self) -> Result<(), PlaybackFault> {
        let Self::Embedded(raw) = self else {
            return Ok(());
        };
        let body = raw
            .strip_prefix("data:")
            .ok_or_else(|| PlaybackFault::BadFormat(String::from("missing data: prefix")))?;
        if body.matches(',').count() != 1 {
            return Err(PlaybackFault::BadFormat(String::from(
                "expected a single comma-delimited payload",
            )));
        }
        let (header, payload) = body
            .split_once(',')
            .ok_or_else(|| PlaybackFault::BadFormat(String::from("missing payload delimiter")))?;
        if payload.is_empty() {
            return Err(PlaybackFault::BadFormat(String::from("empty payload")));
        }
        let media_type = header.split(';').next().unwrap_or_default();
        if !is_media_type(media_type) {
            return Err(PlaybackFault::BadFormat(format!(
                "invalid media type '{media_type}'"
            )));
        }
        Ok(())
    }

    /// The raw string handed to the platform player.
    #[must_use]
    pub fn as_href(&self) -> &str {
        match self {
            Self::Url(raw) | Self::Embedded(raw) => raw,
        }
    }
}

fn is_media_type(candidate: &str) -> bool {
    regex::Regex::new(r"^[a-z]+/[a-zA-Z0-9.+-]+$")
        .map(|re| re.is_match(candidate))
        .unwrap_or(false)
}

/// Platform seam: something that can start playing a source from position
/// zero and hand back a stoppable handle.
pub trait AudioOutput {
    type Handle: AudioHandle;

    /// Begin playback from the start of `source`.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaybackFault`] when the platform cannot start playback.
    fn start(&mut self, source: &AudioSource) -> Result<Self::Handle, PlaybackFault>;
}

/// A live playback handle. Dropping a handle does not stop it; the
/// controller calls [`AudioHandle::stop`] explicitly.
pub trait AudioHandle {
    /// Halt playback and rewind to position zero.
    fn stop(&mut self);
}

/// Token identifying one scheduled auto-stop. Stale tokens are no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopToken(u64);

/// The auto-stop obligation returned by [`PlaybackController::play_window`]:
/// the host schedules a timer for `seconds` and feeds the token back through
/// [`PlaybackController::auto_stop_due`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoStop {
    pub token: StopToken,
    pub seconds: u32,
}

/// Owns the single live audio handle for a round.
pub struct PlaybackController<O: AudioOutput> {
    output: O,
    active: Option<O::Handle>,
    // Bumped on every ownership transfer; pending auto-stops must match.
    serial: u64,
}

impl<O: AudioOutput> PlaybackController<O> {
    pub const fn new(output: O) -> Self {
        Self {
            output,
            active: None,
            serial: 0,
        }
    }

    /// Play a timed snippet from position zero. Any active handle is fully
    /// stopped before the new one starts, and any previously scheduled
    /// auto-stop is invalidated.
    ///
    /// # Errors
    ///
    /// Returns the platform fault, or [`PlaybackFault::BadFormat`] for a
    /// malformed embedded source, without starting playback.
    pub fn play_window(
        &mut self,
        source: &AudioSource,
        seconds: u32,
    ) -> Result<AutoStop, PlaybackFault> {
        source.validate()?;
        self.halt_active();
        self.serial += 1;
        let handle = self.output.start(source)?;
        self.active = Some(handle);
        Ok(AutoStop {
            token: StopToken(self.serial),
            seconds,
        })
    }

    /// Play the untruncated track. No auto-stop is scheduled and any pending
    /// one is invalidated.
    ///
    /// # Errors
    ///
    /// Returns the platform fault, or [`PlaybackFault::BadFormat`] for a
    /// malformed embedded source, without starting playback.
    pub fn play_full(&mut self, source: &AudioSource) -> Result<(), PlaybackFault> {
        source.validate()?;
        self.halt_active();
        self.serial += 1;
        let handle = self.output.start(source)?;
        self.active = Some(handle);
        Ok(())
    }

    /// Deliver a fired auto-stop timer. Returns `true` when the window
    /// genuinely elapsed (and the handle was halted); `false` for a timer
    /// superseded by a later play or stop.
    pub fn auto_stop_due(&mut self, token: StopToken) -> bool {
        if token.0 != self.serial {
            return false;
        }
        self.halt_active();
        true
    }

    /// Halt playback, release the handle, and invalidate pending timers.
    /// Must be called on round teardown.
    pub fn stop(&mut self) {
        self.serial += 1;
        self.halt_active();
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    fn halt_active(&mut self) {
        if let Some(mut handle) = self.active.take() {
            handle.stop();
        }
    }
}

impl<O: AudioOutput> fmt::Debug for PlaybackController<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("active", &self.active.is_some())
            .field("serial", &self.serial)
            .finish()
    }
}
