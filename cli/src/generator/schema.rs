//! # Deployment Descriptor Schema
//!
//! File: cli/src/generator/schema.rs
//!
//! Typed form of `nexlayer.yaml`:
//!
//! ```yaml
//! application:
//!   name: my-app
//!   pods:
//!     - name: web
//!       type: nextjs
//!       image: <% REGISTRY %>/my-app:latest
//!       path: /
//!       vars:
//!         - key: NODE_ENV
//!           value: production
//!       servicePorts:
//!         - name: http
//!           port: 3000
//!           targetPort: 3000
//!           protocol: TCP
//! ```
//!
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexlayerYaml {
    pub application: Application,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub pods: Vec<Pod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    #[serde(rename = "type")]
    pub pod_type: String,
    pub image: String,
    /// HTTP route prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vars: Vec<EnvVar>,
    #[serde(rename = "servicePorts")]
    pub service_ports: Vec<ServicePort>,
}

impl Pod {
    /// Port of the first service port, if any.
    pub fn primary_port(&self) -> Option<u16> {
        self.service_ports.first().map(|p| p.port)
    }

    #[cfg(test)]
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|v| v.key == key)
            .map(|v| v.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePort {
    pub name: String,
    pub port: u16,
    #[serde(rename = "targetPort")]
    pub target_port: u16,
    pub protocol: String,
}

impl ServicePort {
    /// The `http` TCP port forwarding `port` to itself.
    pub fn http(port: u16) -> Self {
        Self {
            name: "http".to_string(),
            port,
            target_port: port,
            protocol: "TCP".to_string(),
        }
    }
}
