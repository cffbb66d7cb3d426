//! Instance model and registry wire types
//!
//! [`ServiceInstance`] is the local process describing itself for
//! registration. [`InstanceInfo`], [`Application`] and [`Applications`] are
//! read-only projections decoded from the registry's XML query responses.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Lifecycle status of an instance as understood by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstanceStatus {
    Up,
    Down,
    Starting,
}

/// Normalize an instance id for registry calls: dots become dashes and the
/// result is lowercased. Idempotent; applied before every call that
/// references an instance id.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    raw.replace('.', "-").to_lowercase()
}

/// The local service instance this process registers and heartbeats as.
#[derive(Debug, Clone)]
pub struct ServiceInstance {
    pub id: String,
    pub app_name: String,
    pub host_name: String,
    pub ip_address: String,
    pub port: u16,
    pub ttl_seconds: u32,
    pub is_secure: bool,
    pub status: InstanceStatus,
}

impl ServiceInstance {
    #[must_use]
    pub fn normalized_id(&self) -> String {
        normalize_id(&self.id)
    }

    /// Registration request body, in the registry's `{"instance": {...}}`
    /// JSON shape.
    pub(crate) fn register_body(&self) -> serde_json::Value {
        json!({
            "instance": {
                "instanceId": self.normalized_id(),
                "hostName": self.host_name,
                "app": self.app_name,
                "ipAddr": self.ip_address,
                "vipAddress": self.app_name,
                "status": self.status,
                "port": {
                    "$": self.port,
                    "@enabled": if self.is_secure { "false" } else { "true" },
                },
                "securePort": {
                    "$": self.port,
                    "@enabled": if self.is_secure { "true" } else { "false" },
                },
                "dataCenterInfo": { "name": "MyOwn" },
                "leaseInfo": { "durationInSecs": self.ttl_seconds },
            }
        })
    }
}

/// A port as the registry reports it: `<port enabled="true">8080</port>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortInfo {
    #[serde(rename = "@enabled", default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "$text")]
    pub value: u16,
}

const fn default_enabled() -> bool {
    true
}

/// One registered instance as returned by the registry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceInfo {
    #[serde(default)]
    pub instance_id: String,
    pub host_name: String,
    pub app: String,
    pub ip_addr: String,
    pub status: InstanceStatus,
    pub port: PortInfo,
    #[serde(default)]
    pub secure_port: Option<PortInfo>,
}

/// A named application and its current instances; refreshed on each query,
/// never owned locally.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "instance", default)]
    pub instances: Vec<InstanceInfo>,
}

/// The full application listing from `/apps`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Applications {
    #[serde(rename = "application", default)]
    pub applications: Vec<Application>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_instance() -> ServiceInstance {
        ServiceInstance {
            id: "MyService.1".to_string(),
            app_name: "myservice".to_string(),
            host_name: "my-host".to_string(),
            ip_address: "10.0.0.5".to_string(),
            port: 8080,
            ttl_seconds: 30,
            is_secure: false,
            status: InstanceStatus::Up,
        }
    }

    #[test]
    fn normalize_id_lowercases_and_dashes() {
        assert_eq!(normalize_id("Host.Name.1"), "host-name-1");
    }

    #[test]
    fn normalize_id_is_idempotent() {
        let once = normalize_id("Host.Name.1");
        assert_eq!(normalize_id(&once), once);
    }

    #[test]
    fn register_body_uses_normalized_id() {
        let body = local_instance().register_body();
        assert_eq!(body["instance"]["instanceId"], "myservice-1");
        assert_eq!(body["instance"]["status"], "UP");
        assert_eq!(body["instance"]["port"]["$"], 8080);
        assert_eq!(body["instance"]["port"]["@enabled"], "true");
        assert_eq!(body["instance"]["leaseInfo"]["durationInSecs"], 30);
    }

    #[test]
    fn secure_instance_flips_port_enablement() {
        let mut instance = local_instance();
        instance.is_secure = true;
        let body = instance.register_body();
        assert_eq!(body["instance"]["port"]["@enabled"], "false");
        assert_eq!(body["instance"]["securePort"]["@enabled"], "true");
    }

    #[test]
    fn decodes_application_xml() {
        let xml = r#"
            <application>
                <name>UPSTREAM</name>
                <instance>
                    <instanceId>upstream-1</instanceId>
                    <hostName>upstream-1.local</hostName>
                    <app>UPSTREAM</app>
                    <ipAddr>10.0.0.1</ipAddr>
                    <status>UP</status>
                    <port enabled="true">8080</port>
                </instance>
                <instance>
                    <instanceId>upstream-2</instanceId>
                    <hostName>upstream-2.local</hostName>
                    <app>UPSTREAM</app>
                    <ipAddr>10.0.0.2</ipAddr>
                    <status>STARTING</status>
                    <port enabled="true">8081</port>
                </instance>
            </application>
        "#;
        let app: Application = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(app.name, "UPSTREAM");
        assert_eq!(app.instances.len(), 2);
        assert_eq!(app.instances[0].ip_addr, "10.0.0.1");
        assert_eq!(app.instances[0].port.value, 8080);
        assert_eq!(app.instances[1].status, InstanceStatus::Starting);
    }

    #[test]
    fn decodes_applications_listing_xml() {
        let xml = r#"
            <applications>
                <versions__delta>1</versions__delta>
                <apps__hashcode>UP_1_</apps__hashcode>
                <application>
                    <name>UPSTREAM</name>
                    <instance>
                        <instanceId>upstream-1</instanceId>
                        <hostName>upstream-1.local</hostName>
                        <app>UPSTREAM</app>
                        <ipAddr>10.0.0.1</ipAddr>
                        <status>UP</status>
                        <port enabled="true">8080</port>
                    </instance>
                </application>
            </applications>
        "#;
        let apps: Applications = quick_xml::de::from_str(xml).unwrap();
        assert_eq!(apps.applications.len(), 1);
        assert_eq!(apps.applications[0].name, "UPSTREAM");
    }

    #[test]
    fn application_with_no_instances_decodes_empty() {
        let xml = "<application><name>EMPTY</name></application>";
        let app: Application = quick_xml::de::from_str(xml).unwrap();
        assert!(app.instances.is_empty());
    }
}
