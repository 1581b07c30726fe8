//! Permission resolution contract and static grant table.
//!
//! # Responsibility
//! - Define the `PermissionResolver` capability injected into services.
//! - Provide a deterministic map-backed resolver driven by configuration.
//!
//! # Invariants
//! - Resolution is a pure function of `(actor, namespace)`; nothing is cached.
//! - An unauthenticated actor is `None`, never a sentinel string.

use crate::model::permission::PermissionLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolves the permission level an actor holds for a namespace.
pub trait PermissionResolver {
    fn resolve(&self, actor: Option<&str>, namespace: &str) -> PermissionLevel;
}

impl<F> PermissionResolver for F
where
    F: Fn(Option<&str>, &str) -> PermissionLevel,
{
    fn resolve(&self, actor: Option<&str>, namespace: &str) -> PermissionLevel {
        self(actor, namespace)
    }
}

/// Namespace grants keyed by actor, plus anonymous grants and a fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionGrants {
    /// Level used when no explicit grant matches.
    pub default: PermissionLevel,
    /// Grants for unauthenticated callers, keyed by namespace.
    pub anonymous: BTreeMap<String, PermissionLevel>,
    /// Grants per actor identity, keyed by namespace.
    pub actors: BTreeMap<String, BTreeMap<String, PermissionLevel>>,
}

/// Resolver backed by a fixed grant table.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionResolver {
    grants: PermissionGrants,
}

impl StaticPermissionResolver {
    pub fn new(grants: PermissionGrants) -> Self {
        Self { grants }
    }

    /// Grants `level` on `namespace` to `actor` (`None` for anonymous).
    pub fn grant(
        mut self,
        actor: Option<&str>,
        namespace: impl Into<String>,
        level: PermissionLevel,
    ) -> Self {
        let table = match actor {
            Some(actor) => self.grants.actors.entry(actor.to_string()).or_default(),
            None => &mut self.grants.anonymous,
        };
        table.insert(namespace.into(), level);
        self
    }

    pub fn grants(&self) -> &PermissionGrants {
        &self.grants
    }
}

impl PermissionResolver for StaticPermissionResolver {
    fn resolve(&self, actor: Option<&str>, namespace: &str) -> PermissionLevel {
        let table = match actor {
            Some(actor) => self.grants.actors.get(actor),
            None => Some(&self.grants.anonymous),
        };
        table
            .and_then(|grants| grants.get(namespace))
            .copied()
            .unwrap_or(self.grants.default)
    }
}
