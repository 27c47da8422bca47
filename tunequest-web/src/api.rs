//! HTTP implementations of the engine's network collaborators.
//!
//! The engine consumes classified outcomes; turning transport and HTTP
//! status into those classifications is this module's whole job. Forbidden
//! responses carry a `code` field distinguishing a missing music-provider
//! link from a level gated behind registration.

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder};
use serde::{Deserialize, Serialize};
use tunequest_engine::{
    AnswerJudge, Credential, JudgeUnreachable, LedgerError, LevelId, LoadFailureKind, ScoreLedger,
    SongCatalog, SongRecord, Verdict,
};

pub const DEFAULT_API_BASE: &str = "/api/v1";

/// Client for the TuneQuest backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn authorized(request: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
        match credential {
            Some(cred) => request.header("Authorization", cred.as_str()),
            None => request,
        }
    }
}

#[derive(Deserialize)]
struct SongEnvelope {
    /// `null` when the level is valid but has no song assigned.
    song: Option<SongRecord>,
}

#[derive(Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Serialize)]
struct ValidatePayload<'a> {
    level_id: String,
    answer: &'a str,
}

#[derive(Serialize)]
struct ScorePayload {
    level_id: String,
    score: u32,
}

/// Map a non-success catalog status (plus the optional error `code` from the
/// body) onto the engine's load-failure taxonomy.
fn classify_load_status(status: u16, code: Option<&str>) -> LoadFailureKind {
    match status {
        401 => LoadFailureKind::Unauthenticated,
        // Forbidden splits on the body code; the historical default is a
        // missing provider link.
        403 if code == Some("needs_upgrade") => LoadFailureKind::NeedsUpgrade,
        403 => LoadFailureKind::NeedsLink,
        404 => LoadFailureKind::NotFound,
        _ => LoadFailureKind::Unknown,
    }
}

/// A duplicate-score response: HTTP conflict, or the legacy 400 with the
/// `already_played` code.
fn is_ledger_conflict(status: u16, code: Option<&str>) -> bool {
    status == 409 || code == Some("already_played")
}

#[async_trait(?Send)]
impl SongCatalog for ApiClient {
    async fn fetch(
        &self,
        level: &LevelId,
        credential: Option<&Credential>,
    ) -> Result<Option<SongRecord>, LoadFailureKind> {
        let url = format!("{}/songs/{level}", self.base_url);
        let request = Self::authorized(Request::get(&url), credential);
        let response = request
            .send()
            .await
            .map_err(|_| LoadFailureKind::Network)?;
        if response.ok() {
            let envelope: SongEnvelope = response
                .json()
                .await
                .map_err(|_| LoadFailureKind::Unknown)?;
            Ok(envelope.song)
        } else {
            let status = response.status();
            let code = response
                .json::<ErrorBody>()
                .await
                .unwrap_or_default()
                .code;
            Err(classify_load_status(status, code.as_deref()))
        }
    }
}

#[async_trait(?Send)]
impl AnswerJudge for ApiClient {
    async fn check(&self, level: &LevelId, answer: &str) -> Result<Verdict, JudgeUnreachable> {
        let url = format!("{}/game/validate", self.base_url);
        let payload = ValidatePayload {
            level_id: level.to_string(),
            answer,
        };
        let response = Request::post(&url)
            .json(&payload)
            .map_err(|err| JudgeUnreachable(err.to_string()))?
            .send()
            .await
            .map_err(|err| JudgeUnreachable(err.to_string()))?;
        if response.ok() {
            response
                .json::<Verdict>()
                .await
                .map_err(|err| JudgeUnreachable(err.to_string()))
        } else {
            Err(JudgeUnreachable(format!(
                "judge answered with status {}",
                response.status()
            )))
        }
    }
}

#[async_trait(?Send)]
impl ScoreLedger for ApiClient {
    async fn submit(
        &self,
        level: &LevelId,
        score: u32,
        credential: &Credential,
    ) -> Result<(), LedgerError> {
        let url = format!("{}/game/submit-score", self.base_url);
        let payload = ScorePayload {
            level_id: level.to_string(),
            score,
        };
        let response = Request::post(&url)
            .header("Authorization", credential.as_str())
            .json(&payload)
            .map_err(|err| LedgerError::Transport(err.to_string()))?
            .send()
            .await
            .map_err(|err| LedgerError::Transport(err.to_string()))?;
        if response.ok() {
            return Ok(());
        }
        let status = response.status();
        let code = response
            .json::<ErrorBody>()
            .await
            .unwrap_or_default()
            .code;
        if is_ledger_conflict(status, code.as_deref()) {
            Err(LedgerError::AlreadyPlayed)
        } else {
            Err(LedgerError::Transport(format!("ledger status {status}")))
        }
    }
}
