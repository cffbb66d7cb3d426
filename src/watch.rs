//! Instance-list change detection
//!
//! Keeps the last observed instance list per watched application and reports
//! whether a fresh registry query differs from it, so dependents reload only
//! on real topology changes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::client::RegistryClient;
use crate::instance::InstanceInfo;

/// Detects changes in watched applications' instance lists.
///
/// Safe for concurrent watchers of distinct applications; the snapshot map
/// is locked only for the compare-and-store section, never across a request.
pub struct ChangeDetector {
    registry: Arc<RegistryClient>,
    snapshots: Mutex<HashMap<String, Vec<InstanceInfo>>>,
}

impl ChangeDetector {
    #[must_use]
    pub fn new(registry: Arc<RegistryClient>) -> Self {
        Self {
            registry,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Whether `app_name`'s instance set has changed since the last check.
    ///
    /// A query failure is reported as "no change" and leaves the stored
    /// baseline untouched; a transient failure must never look like a
    /// topology change. The first successful query establishes the baseline
    /// silently.
    pub async fn check_for_changes(&self, app_name: &str) -> bool {
        let app = match self.registry.get_application(app_name).await {
            Ok(app) => app,
            Err(err) => {
                warn!(app = app_name, error = %err, "failed to query application");
                return false;
            }
        };
        let fresh = app.instances;

        let mut snapshots = self.snapshots.lock();
        let changed = match snapshots.get(app_name) {
            Some(baseline) => instances_changed(baseline, &fresh),
            None => false,
        };
        // Store on change, on first sight, and on an empty read; the
        // empty-read case keeps a stale non-empty baseline from lingering.
        if changed || fresh.is_empty() || !snapshots.contains_key(app_name) {
            snapshots.insert(app_name.to_string(), fresh);
        }
        changed
    }
}

/// Two lists differ when their lengths differ or, after sorting both by IP
/// address (instance id as tie-break), any position differs in address or
/// port.
fn instances_changed(baseline: &[InstanceInfo], fresh: &[InstanceInfo]) -> bool {
    if baseline.len() != fresh.len() {
        return true;
    }

    let mut baseline: Vec<&InstanceInfo> = baseline.iter().collect();
    let mut fresh: Vec<&InstanceInfo> = fresh.iter().collect();
    baseline.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
    fresh.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

    baseline
        .iter()
        .zip(&fresh)
        .any(|(a, b)| a.ip_addr != b.ip_addr || a.port.value != b.port.value)
}

fn sort_key(instance: &InstanceInfo) -> (&str, &str) {
    (instance.ip_addr.as_str(), instance.instance_id.as_str())
}
