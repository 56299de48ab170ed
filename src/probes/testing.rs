//! In-memory backend for probe and orchestrator unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use super::ProbeContext;
use crate::client::{Backend, ProbeResponse, TransportError};
use crate::runner::fixtures::{FixtureRegistry, Role};
use crate::runner::state::ResultRecorder;
use crate::utils::Config;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Respond(ProbeResponse),
    Fail(TransportError),
    Panic,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Replies are queued per route; the last reply of a route repeats.
/// Unscripted routes answer 404 like an Express backend would.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    routes: Mutex<HashMap<(String, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, method: &str, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_get(self, path: &str, status: u16, body: Value) -> Self {
        self.reply("GET", path, Reply::Respond(ProbeResponse::json(status, body)))
    }

    pub fn on_post(self, path: &str, status: u16, body: Value) -> Self {
        self.reply("POST", path, Reply::Respond(ProbeResponse::json(status, body)))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn answer(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path: path.to_string(),
            body: body.cloned(),
            timeout,
        });

        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(method.to_string(), path.to_string())) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Panic) => panic!("scripted panic on {} {}", method, path),
            None => Ok(ProbeResponse::text(
                404,
                &format!("Cannot {} {}", method, path),
            )),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn base_url(&self) -> &str {
        "http://scripted"
    }

    async fn get(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        self.answer("GET", path, None, timeout)
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        self.answer("POST", path, Some(body), timeout)
    }
}

pub(crate) fn refused(path: &str) -> Reply {
    Reply::Fail(TransportError::Connect {
        url: format!("http://scripted{}", path),
        reason: "Connection refused (os error 111)".to_string(),
    })
}

/// Owns everything a probe needs so tests can inspect it afterwards
pub(crate) struct Harness {
    pub backend: ScriptedBackend,
    pub recorder: ResultRecorder,
    pub fixtures: FixtureRegistry,
    pub config: Config,
}

impl Harness {
    pub fn new(backend: ScriptedBackend) -> Self {
        Self {
            backend,
            recorder: ResultRecorder::silent(),
            fixtures: FixtureRegistry::new(),
            config: Config::default(),
        }
    }

    /// Harness with the student fixture already registered as `id`
    pub fn with_student(backend: ScriptedBackend, id: &str) -> Self {
        let mut harness = Self::new(backend);
        let identity = serde_json::from_value(serde_json::json!({
            "id": id,
            "username": "practicetester",
            "role": "student"
        }))
        .unwrap();
        harness.fixtures.set(Role::Student, identity);
        harness
    }

    pub fn ctx(&mut self) -> ProbeContext<'_> {
        ProbeContext {
            backend: &self.backend,
            recorder: &mut self.recorder,
            fixtures: &mut self.fixtures,
            config: &self.config,
        }
    }

    /// (name, success, message) triples in recording order
    pub fn outcomes(&self) -> Vec<(String, bool, String)> {
        self.recorder
            .outcomes()
            .iter()
            .map(|o| (o.name.clone(), o.success, o.message.clone()))
            .collect()
    }
}
