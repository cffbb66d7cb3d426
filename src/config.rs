//! Client configuration
//!
//! Seed nodes may be given as a single address or a list of addresses;
//! an empty value falls back to the registry's conventional local endpoint.

use serde::Deserialize;

/// Seed registry nodes: one address or several.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RegistrySeeds {
    One(String),
    Many(Vec<String>),
}

impl RegistrySeeds {
    /// Resolve into a flat address list. May be empty; the cluster layer
    /// substitutes its default machine in that case.
    #[must_use]
    pub fn into_addresses(self) -> Vec<String> {
        match self {
            Self::One(addr) => vec![addr],
            Self::Many(addrs) => addrs,
        }
    }
}

impl Default for RegistrySeeds {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<&str> for RegistrySeeds {
    fn from(addr: &str) -> Self {
        Self::One(addr.to_string())
    }
}

impl From<String> for RegistrySeeds {
    fn from(addr: String) -> Self {
        Self::One(addr)
    }
}

impl From<Vec<String>> for RegistrySeeds {
    fn from(addrs: Vec<String>) -> Self {
        Self::Many(addrs)
    }
}

/// Registry client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub seeds: RegistrySeeds,
    /// Connection timeout in seconds for registry dials
    pub connect_timeout_secs: u64,
}

impl RegistryConfig {
    #[must_use]
    pub fn with_seeds(seeds: impl Into<RegistrySeeds>) -> Self {
        Self {
            seeds: seeds.into(),
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seeds: RegistrySeeds::default(),
            connect_timeout_secs: 1,
        }
    }
}
