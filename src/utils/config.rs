use std::time::Duration;

use crate::client::types::{Credentials, PracticeResult};
use crate::runner::fixtures::Role;

/// Backend address used when nothing else is given
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend root, always with a scheme and without a trailing slash
    pub base_url: String,

    /// Timeout applied to every request unless a probe overrides it (ms)
    pub default_timeout_ms: u64,

    /// Timeout for the liveness probe (ms)
    pub health_timeout_ms: u64,

    /// Realtime transport handshake path
    pub handshake_path: String,

    /// Credentials used for the student fixture
    pub student: Credentials,

    /// Credentials used for the teacher fixture
    pub teacher: Credentials,

    /// Payload posted by the practice save probe
    pub practice_result: PracticeResult,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_timeout_ms: 10_000,
            health_timeout_ms: 5_000,
            handshake_path: "/socket.io/".to_string(),
            student: Credentials::new("practicetester", "test123"),
            teacher: Credentials::new("teachertest", "test123"),
            practice_result: PracticeResult {
                score: 850,
                questions_correct: 8,
                questions_total: 10,
                difficulty: "medium".to_string(),
                game_mode: "classic".to_string(),
                currency_earned: 42,
            },
        }
    }
}

impl Config {
    /// Default configuration pointed at another backend
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            ..Self::default()
        }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn credentials(&self, role: Role) -> &Credentials {
        match role {
            Role::Student => &self.student,
            Role::Teacher => &self.teacher,
        }
    }
}

/// Accepts `host:port` as well as full URLs
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
