//! Registry HTTP client
//!
//! Owns the cluster view and issues all REST calls against the current
//! leader. Cluster sync is first-success failover: candidates are tried in
//! order and the first reachable node's `/machines` response replaces the
//! stored membership.

use std::time::Duration;

use parking_lot::RwLock;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::cluster::{Cluster, Machine};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::instance::{normalize_id, Application, Applications, InstanceInfo, ServiceInstance};

/// Client for a clustered, Eureka-compatible registry.
///
/// Cheap to share behind an `Arc`; the cluster view is read-locked per call
/// and readers always see a consistent snapshot of the machine list.
pub struct RegistryClient {
    http: reqwest::Client,
    cluster: RwLock<Cluster>,
}

impl RegistryClient {
    /// Build a client from seed configuration. Every seed must parse as a
    /// URL; a malformed seed is a configuration error that cannot be
    /// serviced later, so it is rejected here.
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let machines: Vec<Machine> = config
            .seeds
            .into_addresses()
            .into_iter()
            .map(Machine::new)
            .collect();
        for machine in &machines {
            machine.base_url()?;
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            cluster: RwLock::new(Cluster::new(machines)),
        })
    }

    /// Snapshot of the current machine list.
    #[must_use]
    pub fn machines(&self) -> Vec<Machine> {
        self.cluster.read().machines.clone()
    }

    /// The node currently preferred for requests.
    #[must_use]
    pub fn leader(&self) -> Machine {
        self.cluster.read().leader.clone()
    }

    /// Replace cluster membership by querying the given candidates in order.
    ///
    /// The first candidate that answers `/machines` with a usable list wins:
    /// its response replaces the stored machine list and the list's first
    /// entry becomes leader. Returns `false`, leaving prior state untouched,
    /// when every candidate fails.
    pub async fn set_cluster(&self, candidates: &[Machine]) -> bool {
        for machine in candidates {
            let url = match endpoint(machine, &["machines"]) {
                Ok(url) => url,
                Err(_) => continue,
            };
            // Transport or read failure: try the next machine in the cluster.
            let body = match self.http.get(url).send().await {
                Ok(resp) => match resp.text().await {
                    Ok(body) => body,
                    Err(_) => continue,
                },
                Err(_) => continue,
            };

            let parsed = Cluster::parse_machine_list(&body);
            if parsed.is_empty() {
                // Nothing usable in the response; treat the node as failed.
                continue;
            }

            let mut cluster = self.cluster.write();
            cluster.update_from_list(parsed);
            let machines: Vec<&str> = cluster.machines.iter().map(Machine::as_str).collect();
            debug!(machines = %machines.join(", "), "synced cluster membership");
            return true;
        }
        false
    }

    /// Refresh membership using the currently known machine list.
    pub async fn sync_cluster(&self) -> bool {
        let machines = self.machines();
        self.set_cluster(&machines).await
    }

    /// GET `/apps`: the full application listing.
    pub async fn get_applications(&self) -> Result<Applications> {
        self.get_xml(&["apps"]).await
    }

    /// GET `/apps/{appId}`: one application and its instances.
    pub async fn get_application(&self, app_id: &str) -> Result<Application> {
        self.get_xml(&["apps", app_id]).await
    }

    /// GET `/apps/{appId}/{instanceId}`: look up one registered instance.
    /// A 404 maps to [`Error::NotFound`] so callers can distinguish absence
    /// from other failures.
    pub async fn get_instance(&self, app_id: &str, instance_id: &str) -> Result<InstanceInfo> {
        let instance_id = normalize_id(instance_id);
        let url = endpoint(&self.leader(), &["apps", app_id, &instance_id])?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("{app_id}/{instance_id}")));
        }
        if !status.is_success() {
            return Err(unexpected(
                status,
                format!("instance lookup failed for {app_id}/{instance_id}"),
            ));
        }
        let body = resp.text().await?;
        Ok(quick_xml::de::from_str(&body)?)
    }

    /// POST `/apps/{appId}`: register an instance. The registry acknowledges
    /// with 204 No Content.
    pub async fn register_instance(&self, app_id: &str, instance: &ServiceInstance) -> Result<()> {
        let url = endpoint(&self.leader(), &["apps", app_id])?;
        let resp = self
            .http
            .post(url)
            .json(&instance.register_body())
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            return Err(unexpected(status, "incorrect response from registration"));
        }
        Ok(())
    }

    /// PUT `/apps/{appId}/{instanceId}`: renew the instance's lease.
    pub async fn send_heartbeat(&self, app_id: &str, instance_id: &str) -> Result<()> {
        let instance_id = normalize_id(instance_id);
        let url = endpoint(&self.leader(), &["apps", app_id, &instance_id])?;
        let resp = self.http.put(url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(unexpected(status, "incorrect response from heartbeat"));
        }
        Ok(())
    }

    /// DELETE `/apps/{appId}/{instanceId}`: remove the instance. Any
    /// non-error status counts as success.
    pub async fn unregister_instance(&self, app_id: &str, instance_id: &str) -> Result<()> {
        let instance_id = normalize_id(instance_id);
        let url = endpoint(&self.leader(), &["apps", app_id, &instance_id])?;
        let resp = self.http.delete(url).send().await?;
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(unexpected(status, "incorrect response from deregistration"));
        }
        Ok(())
    }

    async fn get_xml<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = endpoint(&self.leader(), segments)?;
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(unexpected(
                status,
                format!("registry query failed for /{}", segments.join("/")),
            ));
        }
        let body = resp.text().await?;
        Ok(quick_xml::de::from_str(&body)?)
    }
}

fn unexpected(status: StatusCode, message: impl Into<String>) -> Error {
    Error::UnexpectedStatus {
        status: status.as_u16(),
        message: message.into(),
    }
}

/// Join path segments onto a machine's base URL.
fn endpoint(machine: &Machine, segments: &[&str]) -> Result<Url> {
    let mut url = machine.base_url()?;
    {
        let mut path = url.path_segments_mut().map_err(|()| {
            Error::Configuration(format!("machine address {machine} cannot be a base URL"))
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}
