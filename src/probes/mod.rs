//! Probe set
//!
//! Each probe exercises one backend capability, records its own outcomes and
//! returns whether every check it made passed. Expected failures (transport
//! errors, bad statuses, missing fixtures) are recorded, never returned; an
//! `Err` from a probe means something unanticipated and is reported as a
//! crash by the orchestrator.

pub mod auth;
pub mod catalog;
pub mod health;
pub mod player;
pub mod practice;
pub mod realtime;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::{Backend, ProbeResponse, ResponseBody, TransportError};
use crate::runner::fixtures::{FixtureRegistry, Role};
use crate::runner::state::ResultRecorder;
use crate::utils::Config;

/// Longest body excerpt kept in failure details
const DETAIL_BODY_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeKind {
    /// Liveness check gating the rest of the run
    Health,
    /// Register (or log in) the student and teacher fixtures
    Registration,
    /// Fetch the student's player record
    PlayerData,
    /// List question sets
    QuestionSets,
    /// List slimes
    Slimes,
    /// Practice stats, history and save
    Practice,
    /// Realtime transport handshake reachability
    Realtime,
}

impl ProbeKind {
    /// Probes run after a successful liveness check, in order
    pub const SUITE: [ProbeKind; 6] = [
        ProbeKind::Registration,
        ProbeKind::PlayerData,
        ProbeKind::QuestionSets,
        ProbeKind::Slimes,
        ProbeKind::Practice,
        ProbeKind::Realtime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeKind::Health => "health",
            ProbeKind::Registration => "registration",
            ProbeKind::PlayerData => "player-data",
            ProbeKind::QuestionSets => "question-sets",
            ProbeKind::Slimes => "slimes",
            ProbeKind::Practice => "practice",
            ProbeKind::Realtime => "realtime",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProbeKind::Health => "backend answers GET /api/slimes",
            ProbeKind::Registration => "register or log in student and teacher fixtures",
            ProbeKind::PlayerData => "GET /api/player/<student id>",
            ProbeKind::QuestionSets => "GET /api/question-sets, must be non-empty",
            ProbeKind::Slimes => "GET /api/slimes",
            ProbeKind::Practice => "practice stats, history and save for the student",
            ProbeKind::Realtime => "realtime handshake path is served",
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Recorded failure causes
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("returned status {status}")]
    UnexpectedStatus { status: u16, body: ResponseBody },

    #[error("endpoint not implemented (404)")]
    FeatureAbsent,

    #[error("no {role} user available for testing")]
    FixtureMissing { role: Role },

    #[error("returned an empty collection")]
    EmptyCollection,

    #[error("returned a malformed body: {0}")]
    MalformedResponse(String),
}

impl ProbeError {
    pub fn unexpected(response: ProbeResponse) -> Self {
        ProbeError::UnexpectedStatus {
            status: response.status,
            body: response.body,
        }
    }

    /// Outcome message for a failure of `subject`
    pub fn message(&self, subject: &str) -> String {
        match self {
            ProbeError::FixtureMissing { .. } => self.to_string(),
            ProbeError::Transport(e) => format!("{} error: {}", subject, e),
            _ => format!("{} {}", subject, self),
        }
    }

    /// Structured payload stored alongside the failed outcome
    pub fn detail(&self) -> Option<Value> {
        match self {
            ProbeError::UnexpectedStatus { status, body } => Some(json!({
                "status": status,
                "body": excerpt(body),
            })),
            _ => None,
        }
    }
}

/// Bodies longer than `DETAIL_BODY_LIMIT` are cut; oversized JSON is kept
/// as its truncated serialization
fn excerpt(body: &ResponseBody) -> Value {
    let text = match body {
        ResponseBody::Json(value) => value.to_string(),
        ResponseBody::Text(text) => text.clone(),
    };

    if text.chars().count() > DETAIL_BODY_LIMIT {
        Value::String(text.chars().take(DETAIL_BODY_LIMIT).collect::<String>() + "…")
    } else {
        body.to_value()
    }
}

/// 200 passes, anything else is unexpected
pub fn expect_ok(response: ProbeResponse) -> Result<ProbeResponse, ProbeError> {
    if response.is_ok() {
        Ok(response)
    } else {
        Err(ProbeError::unexpected(response))
    }
}

/// Like `expect_ok`, but 404 means the backend lacks the feature
pub fn expect_implemented(response: ProbeResponse) -> Result<ProbeResponse, ProbeError> {
    match response.status {
        200 => Ok(response),
        404 => Err(ProbeError::FeatureAbsent),
        _ => Err(ProbeError::unexpected(response)),
    }
}

/// State a probe may touch
pub struct ProbeContext<'a> {
    pub backend: &'a dyn Backend,
    pub recorder: &'a mut ResultRecorder,
    pub fixtures: &'a mut FixtureRegistry,
    pub config: &'a Config,
}

impl ProbeContext<'_> {
    /// Record a passing outcome
    pub fn pass(&mut self, name: &str, message: &str) -> bool {
        self.recorder.record(name, true, message, None);
        true
    }

    /// Record a failing outcome described by `error`
    pub fn fail(&mut self, name: &str, subject: &str, error: &ProbeError) -> bool {
        log::debug!("{} failed: {:?}", name, error);
        self.recorder
            .record(name, false, &error.message(subject), error.detail());
        false
    }

    /// Id of the student fixture, recording a failure under `name` if absent
    pub fn student_id(&mut self, name: &str) -> Option<String> {
        match self.fixtures.require(Role::Student) {
            Ok(identity) => Some(identity.id.clone()),
            Err(e) => {
                self.fail(name, name, &e);
                None
            }
        }
    }
}

/// Run a single probe
pub async fn run_probe(kind: ProbeKind, ctx: &mut ProbeContext<'_>) -> Result<bool> {
    match kind {
        ProbeKind::Health => health::run(ctx).await,
        ProbeKind::Registration => auth::run(ctx).await,
        ProbeKind::PlayerData => player::run(ctx).await,
        ProbeKind::QuestionSets => catalog::run_question_sets(ctx).await,
        ProbeKind::Slimes => catalog::run_slimes(ctx).await,
        ProbeKind::Practice => practice::run(ctx).await,
        ProbeKind::Realtime => realtime::run(ctx).await,
    }
}
