use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::client::types::Identity;
use crate::probes::ProbeError;

/// Fixture role, sent verbatim as the `role` field on registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    /// Registration order
    pub const ALL: [Role; 2] = [Role::Student, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identities created during the run, keyed by role
#[derive(Debug, Default)]
pub struct FixtureRegistry {
    fixtures: HashMap<Role, Identity>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the identity for `role`, returning the one it replaced
    pub fn set(&mut self, role: Role, identity: Identity) -> Option<Identity> {
        log::debug!("fixture {} -> id {}", role, identity.id);
        self.fixtures.insert(role, identity)
    }

    pub fn get(&self, role: Role) -> Option<&Identity> {
        self.fixtures.get(&role)
    }

    /// Like `get`, but absence is a probe failure
    pub fn require(&self, role: Role) -> Result<&Identity, ProbeError> {
        self.get(role).ok_or(ProbeError::FixtureMissing { role })
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}
