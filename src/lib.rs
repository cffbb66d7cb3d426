//! Async client for a clustered, Eureka-compatible service registry.
//!
//! Three cooperating pieces, all driven by the caller's periodic loops:
//!
//! - [`RegistryClient`] owns the cluster view (machine list + leader),
//!   fails over across nodes when syncing membership, and issues the
//!   registry REST calls.
//! - [`RegistrationClient`] keeps one local [`ServiceInstance`] registered
//!   via lazy, heartbeat-driven registration.
//! - [`ChangeDetector`] reports whether a watched application's instance
//!   list has changed since the last check.
//!
//! The discovered instance list is eventually consistent, best effort; this
//! is a client, not a registry server.

pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod instance;
pub mod registration;
pub mod watch;

pub use client::RegistryClient;
pub use cluster::{Cluster, Machine, DEFAULT_MACHINE};
pub use config::{RegistryConfig, RegistrySeeds};
pub use error::{Error, Result};
pub use instance::{
    normalize_id, Application, Applications, InstanceInfo, InstanceStatus, PortInfo,
    ServiceInstance,
};
pub use registration::{HeartbeatOutcome, RegistrationClient};
pub use watch::ChangeDetector;
