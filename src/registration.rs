//! Lazy, heartbeat-driven instance registration
//!
//! Every heartbeat cycle first checks the registry for the instance and
//! re-registers when it is absent, then sends the liveness signal. This
//! self-heals after registry restarts or lease expiry without a separate
//! startup registration step.

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::RegistryClient;
use crate::instance::ServiceInstance;

/// What happened during one heartbeat cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatOutcome {
    /// The instance was found absent and a registration was accepted.
    pub registered: bool,
    /// The heartbeat itself landed.
    pub heartbeat_ok: bool,
}

/// Keeps one local service instance registered and alive in the registry.
pub struct RegistrationClient {
    registry: Arc<RegistryClient>,
    instance: ServiceInstance,
}

impl RegistrationClient {
    #[must_use]
    pub fn new(registry: Arc<RegistryClient>, instance: ServiceInstance) -> Self {
        Self { registry, instance }
    }

    #[must_use]
    pub fn instance(&self) -> &ServiceInstance {
        &self.instance
    }

    /// One heartbeat cycle: ensure the instance is registered, then renew
    /// its lease. Failures are logged and reported in the outcome but never
    /// escalated; the next scheduled cycle retries from scratch.
    pub async fn heartbeat(&self) -> HeartbeatOutcome {
        let registered = self.ensure_registered().await;

        let heartbeat_ok = match self
            .registry
            .send_heartbeat(&self.instance.app_name, &self.instance.id)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(app = %self.instance.app_name, error = %err, "heartbeat failed");
                false
            }
        };

        HeartbeatOutcome {
            registered,
            heartbeat_ok,
        }
    }

    /// Remove the instance from the registry. Failure is logged and the
    /// caller proceeds as if removed.
    pub async fn deregister(&self) {
        if let Err(err) = self
            .registry
            .unregister_instance(&self.instance.app_name, &self.instance.id)
            .await
        {
            info!(app = %self.instance.app_name, error = %err, "deregistering failed");
        }
    }

    /// Take the instance out of rotation for maintenance. Same registry
    /// operation as [`Self::deregister`]; the next heartbeat would re-add it.
    pub async fn mark_for_maintenance(&self) {
        self.deregister().await;
    }

    /// Look the instance up and register it when absent. Any lookup failure
    /// is treated as "not registered"; a failed registration is retried on
    /// the next cycle.
    async fn ensure_registered(&self) -> bool {
        if self
            .registry
            .get_instance(&self.instance.app_name, &self.instance.id)
            .await
            .is_ok()
        {
            return false;
        }

        info!(
            app = %self.instance.app_name,
            ip = %self.instance.ip_address,
            port = self.instance.port,
            "registering service instance"
        );
        match self
            .registry
            .register_instance(&self.instance.app_name, &self.instance)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                warn!(app = %self.instance.app_name, error = %err, "service registration failed");
                false
            }
        }
    }
}
