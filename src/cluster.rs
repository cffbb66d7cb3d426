//! Registry cluster membership
//!
//! A [`Cluster`] is the client's view of the registry nodes: an ordered
//! machine list plus the current leader (always the first entry of the most
//! recently synced list). It is pure data; the sync I/O lives in
//! [`crate::client::RegistryClient`].

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Endpoint assumed when no seed machines are supplied.
pub const DEFAULT_MACHINE: &str = "http://127.0.0.1:8761";

/// Delimiter used by the registry's `/machines` response body.
const MACHINE_LIST_DELIMITER: &str = ", ";

/// A single registry node address (`host[:port]`, optionally with scheme).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Machine(String);

impl Machine {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL for requests against this machine. The scheme defaults to
    /// `http` when the address carries none.
    pub fn base_url(&self) -> Result<Url> {
        let raw = if self.0.contains("://") {
            self.0.clone()
        } else {
            format!("http://{}", self.0)
        };
        Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("invalid machine address {:?}: {e}", self.0)))
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Machine {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

impl From<String> for Machine {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

/// The known registry nodes and the current leader.
///
/// Invariant: `machines` is never empty, and `leader` is always an element
/// of `machines`.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub leader: Machine,
    pub machines: Vec<Machine>,
}

impl Cluster {
    /// Build the initial view from seed machines. An empty seed list falls
    /// back to [`DEFAULT_MACHINE`].
    #[must_use]
    pub fn new(machines: Vec<Machine>) -> Self {
        let machines = if machines.is_empty() {
            vec![Machine::new(DEFAULT_MACHINE)]
        } else {
            machines
        };
        Self {
            leader: machines[0].clone(),
            machines,
        }
    }

    /// Parse a `/machines` response body: a comma-space delimited address
    /// list. Entries that do not parse as URLs are dropped, so a garbage
    /// response yields an empty list and the caller treats the node as
    /// failed instead of accepting the body verbatim.
    #[must_use]
    pub fn parse_machine_list(body: &str) -> Vec<Machine> {
        body.split(MACHINE_LIST_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Machine::new)
            .filter(|machine| machine.base_url().is_ok())
            .collect()
    }

    /// Replace the machine list with a freshly synced one and promote its
    /// first entry to leader.
    pub fn update_from_list(&mut self, machines: Vec<Machine>) {
        debug_assert!(!machines.is_empty());
        if self.leader != machines[0] {
            tracing::debug!(from = %self.leader, to = %machines[0], "switching cluster leader");
        }
        self.machines = machines;
        self.leader = self.machines[0].clone();
    }
}
