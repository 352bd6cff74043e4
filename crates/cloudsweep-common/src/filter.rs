//! Allow-list resource filtering
//!
//! A collector only records a candidate resource if its identifier passes
//! the configured filter. An empty filter includes everything, so audits
//! without an allow-list see the full inventory.

use serde::{Deserialize, Serialize};

/// Optional allow-list of resource identifiers to audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceFilter {
    allowed: Vec<String>,
}

impl ResourceFilter {
    /// Create a filter from allow-list entries.
    ///
    /// An entry matches an identifier exactly, or by prefix when it ends
    /// with `*`.
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Whether no allow-list is configured.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Whether a candidate identifier should be included.
    pub fn is_included(&self, identifier: &str) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        self.allowed.iter().any(|entry| match entry.strip_suffix('*') {
            Some(prefix) => identifier.starts_with(prefix),
            None => entry == identifier,
        })
    }
}
